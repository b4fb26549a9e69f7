//! In memory representation of a linear algebra expression
//!
//! A [`Statement`] is an arena of [`Node`]s: sub-expressions reference each other by
//! [`NodeIndex`], never by address, so the statement can be moved or cloned freely.
//! Statements are built by the expression front end and are only read by the generator.

use crate::dispatch::LeafCategory;
use crate::errors::{GeneratorError, Result};
use crate::translator::{ImplicitMatrix, ImplicitVector, Matrix, Scalar, Vector};
use crate::variable::Numeric;
use std::fmt;
use std::sync::Arc;

/// Numeric type tag of a leaf.
///
/// The front end can tag leaves with any of these, the generator only supports
/// [`NumericType::Float`] and [`NumericType::Double`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Half,
    Float,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Scalar,
    Vector,
    Matrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtype {
    /// Object stored in device memory
    Plain,
    HostScalar,
    ImplicitVector,
    ImplicitMatrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationFamily {
    Unary,
    Binary,
    Product,
    VectorReduction,
    RowsReduction,
    ColumnsReduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationSubfamily {
    /// Infix operator, inlined as `(lhs op rhs)`
    ElementwiseOperator,
    /// Function applied per element, inlined as `name(lhs,rhs)`
    ElementwiseFunction,
    /// Computed by a dedicated kernel, the node is replaced by its mapped result
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    // unary
    Abs,
    Acos,
    Asin,
    Atan,
    Ceil,
    Cos,
    Cosh,
    Exp,
    Floor,
    Log,
    Log10,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
    Trans,
    Norm1,
    Norm2,
    NormInf,

    // binary
    Assign,
    InplaceAdd,
    InplaceSub,
    Add,
    Sub,
    Mult,
    Div,
    Access,
    ElementProd,
    ElementDiv,
    ElementPow,
    ElementEq,
    ElementNeq,
    ElementGreater,
    ElementGeq,
    ElementLess,
    ElementLeq,
    ElementFmax,
    ElementFmin,

    // products
    InnerProd,
    MatVecProd,
    MatMatProd,
}

/// Operation descriptor of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    pub family: OperationFamily,
    pub subfamily: OperationSubfamily,
    pub kind: OperationKind,
}

impl Operation {
    pub const fn new(
        family: OperationFamily,
        subfamily: OperationSubfamily,
        kind: OperationKind,
    ) -> Self {
        Operation {
            family,
            subfamily,
            kind,
        }
    }

    /// The canonical descriptor of `kind`, as the expression front end classifies it
    pub fn of(kind: OperationKind) -> Self {
        use OperationFamily as F;
        use OperationKind::*;
        use OperationSubfamily as S;

        let (family, subfamily) = match kind {
            Abs | Acos | Asin | Atan | Ceil | Cos | Cosh | Exp | Floor | Log | Log10 | Sin
            | Sinh | Sqrt | Tan | Tanh => (F::Unary, S::ElementwiseFunction),
            Trans => (F::Unary, S::Function),
            Norm1 | Norm2 | NormInf | InnerProd => (F::VectorReduction, S::Function),
            Assign | InplaceAdd | InplaceSub | Add | Sub | Mult | Div | Access | ElementProd
            | ElementDiv => (F::Binary, S::ElementwiseOperator),
            ElementPow | ElementEq | ElementNeq | ElementGreater | ElementGeq | ElementLess
            | ElementLeq | ElementFmax | ElementFmin => (F::Binary, S::ElementwiseFunction),
            MatVecProd => (F::RowsReduction, S::Function),
            MatMatProd => (F::Product, S::Function),
        };
        Operation::new(family, subfamily, kind)
    }
}

/// Selects one of the two supported precisions
#[derive(Debug, Clone)]
pub enum Precision<F, D> {
    Float(F),
    Double(D),
}

/// The concrete object a leaf points to, one variant per leaf category
#[derive(Debug, Clone)]
pub enum DeviceObject {
    HostScalar(Precision<f32, f64>),
    Scalar(Precision<Arc<Scalar<f32>>, Arc<Scalar<f64>>>),
    Vector(Precision<Arc<Vector<f32>>, Arc<Vector<f64>>>),
    ImplicitVector(Precision<Arc<ImplicitVector<f32>>, Arc<ImplicitVector<f64>>>),
    Matrix(Precision<Arc<Matrix<f32>>, Arc<Matrix<f64>>>),
    ImplicitMatrix(Precision<Arc<ImplicitMatrix<f32>>, Arc<ImplicitMatrix<f64>>>),
}

impl DeviceObject {
    pub fn category(&self) -> LeafCategory {
        match self {
            DeviceObject::HostScalar(_) => LeafCategory::HostScalar,
            DeviceObject::Scalar(_) => LeafCategory::Scalar,
            DeviceObject::Vector(_) => LeafCategory::Vector,
            DeviceObject::ImplicitVector(_) => LeafCategory::ImplicitVector,
            DeviceObject::Matrix(_) => LeafCategory::Matrix,
            DeviceObject::ImplicitMatrix(_) => LeafCategory::ImplicitMatrix,
        }
    }

    pub fn numeric_type(&self) -> NumericType {
        let is_float = match self {
            DeviceObject::HostScalar(p) => matches!(p, Precision::Float(_)),
            DeviceObject::Scalar(p) => matches!(p, Precision::Float(_)),
            DeviceObject::Vector(p) => matches!(p, Precision::Float(_)),
            DeviceObject::ImplicitVector(p) => matches!(p, Precision::Float(_)),
            DeviceObject::Matrix(p) => matches!(p, Precision::Float(_)),
            DeviceObject::ImplicitMatrix(p) => matches!(p, Precision::Float(_)),
        };
        if is_float {
            NumericType::Float
        } else {
            NumericType::Double
        }
    }
}

macro_rules! device_object_from {
    ($($variant:ident => $float:ty, $double:ty;)*) => {
        $(
            impl From<$float> for DeviceObject {
                fn from(object: $float) -> Self {
                    DeviceObject::$variant(Precision::Float(object))
                }
            }

            impl From<$double> for DeviceObject {
                fn from(object: $double) -> Self {
                    DeviceObject::$variant(Precision::Double(object))
                }
            }
        )*
    };
}

device_object_from! {
    HostScalar => f32, f64;
    Scalar => Arc<Scalar<f32>>, Arc<Scalar<f64>>;
    Vector => Arc<Vector<f32>>, Arc<Vector<f64>>;
    ImplicitVector => Arc<ImplicitVector<f32>>, Arc<ImplicitVector<f64>>;
    Matrix => Arc<Matrix<f32>>, Arc<Matrix<f64>>;
    ImplicitMatrix => Arc<ImplicitMatrix<f32>>, Arc<ImplicitMatrix<f64>>;
}

/// A terminal operand: the tags the front end wrote plus the object they describe
#[derive(Debug, Clone)]
pub struct Leaf {
    family: TypeFamily,
    subtype: Subtype,
    numeric_type: NumericType,
    object: DeviceObject,
}

impl Leaf {
    /// Creates a leaf whose tags are derived from `object`
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use wgpu_kernelgen::statement::{Leaf, NumericType, TypeFamily};
    /// use wgpu_kernelgen::translator::Vector;
    ///
    /// let x = Leaf::new(Arc::new(Vector::from_slice("x", &[1.0f64, 2.0])));
    /// assert_eq!(x.family(), TypeFamily::Vector);
    /// assert_eq!(x.numeric_type(), NumericType::Double);
    /// ```
    pub fn new(object: impl Into<DeviceObject>) -> Self {
        let object = object.into();
        let (family, subtype) = object.category().tags();
        Leaf {
            family,
            subtype,
            numeric_type: object.numeric_type(),
            object,
        }
    }

    /// Creates a leaf from tags written independently by the front end
    ///
    /// No consistency check is done here: tags that don't describe `object` are
    /// reported when the leaf gets dispatched.
    pub fn from_parts(
        family: TypeFamily,
        subtype: Subtype,
        numeric_type: NumericType,
        object: DeviceObject,
    ) -> Self {
        Leaf {
            family,
            subtype,
            numeric_type,
            object,
        }
    }

    pub fn host_scalar<T: Numeric>(value: T) -> Self
    where
        DeviceObject: From<T>,
    {
        Leaf::new(value)
    }

    pub fn family(&self) -> TypeFamily {
        self.family
    }

    pub fn subtype(&self) -> Subtype {
        self.subtype
    }

    pub fn numeric_type(&self) -> NumericType {
        self.numeric_type
    }

    pub fn object(&self) -> &DeviceObject {
        &self.object
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(pub usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum Operand {
    Leaf(Leaf),
    /// Sub-expression stored in another node of the same statement
    Composite(NodeIndex),
}

impl Operand {
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Operand::Leaf(leaf) => Some(leaf),
            Operand::Composite(_) => None,
        }
    }
}

impl From<Leaf> for Operand {
    fn from(leaf: Leaf) -> Self {
        Operand::Leaf(leaf)
    }
}

impl From<NodeIndex> for Operand {
    fn from(index: NodeIndex) -> Self {
        Operand::Composite(index)
    }
}

/// One operation application, `rhs` is `None` for unary operations
#[derive(Debug, Clone)]
pub struct Node {
    pub op: Operation,
    pub lhs: Operand,
    pub rhs: Option<Operand>,
}

#[derive(Debug, Clone, Default)]
pub struct Statement {
    nodes: Vec<Node>,
}

impl Statement {
    pub fn new(nodes: Vec<Node>) -> Self {
        Statement { nodes }
    }

    pub fn node(&self, index: NodeIndex) -> Result<&Node> {
        self.nodes
            .get(index.0)
            .ok_or(GeneratorError::InvalidNodeIndex(index.0))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks that every composite operand points inside the statement and that no
    /// node can reach itself
    pub fn validate(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let mut marks = vec![Mark::New; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if marks[start] != Mark::New {
                continue;
            }
            // (node, next operand to inspect)
            let mut stack = vec![(start, 0usize)];
            marks[start] = Mark::Open;
            while let Some((current, operand)) = stack.pop() {
                let node = &self.nodes[current];
                let child = match operand {
                    0 => Some(&node.lhs),
                    1 => node.rhs.as_ref(),
                    _ => {
                        marks[current] = Mark::Done;
                        continue;
                    }
                };
                stack.push((current, operand + 1));
                if let Some(Operand::Composite(index)) = child {
                    let next = self.node(*index).map(|_| index.0)?;
                    match marks[next] {
                        Mark::New => {
                            marks[next] = Mark::Open;
                            stack.push((next, 0));
                        }
                        Mark::Open => return Err(GeneratorError::CyclicStatement(*index)),
                        Mark::Done => {}
                    }
                }
            }
        }
        Ok(())
    }
}

/// Builds a [`Statement`] node by node
///
/// # Example
/// ```
/// use wgpu_kernelgen::statement::{Leaf, OperationKind, StatementBuilder};
///
/// let mut builder = StatementBuilder::new();
/// let sum = builder.binary(OperationKind::Add, Leaf::host_scalar(1.0f32), Leaf::host_scalar(2.0f32));
/// let root = builder.binary(OperationKind::Mult, sum, Leaf::host_scalar(3.0f32));
/// let statement = builder.build();
/// assert_eq!(statement.len(), 2);
/// assert!(statement.node(root).is_ok());
/// ```
#[derive(Debug, Default)]
pub struct StatementBuilder {
    nodes: Vec<Node>,
}

impl StatementBuilder {
    pub fn new() -> Self {
        StatementBuilder { nodes: Vec::new() }
    }

    pub fn push(&mut self, op: Operation, lhs: Operand, rhs: Option<Operand>) -> NodeIndex {
        self.nodes.push(Node { op, lhs, rhs });
        NodeIndex(self.nodes.len() - 1)
    }

    pub fn unary(&mut self, kind: OperationKind, operand: impl Into<Operand>) -> NodeIndex {
        self.push(Operation::of(kind), operand.into(), None)
    }

    pub fn binary(
        &mut self,
        kind: OperationKind,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
    ) -> NodeIndex {
        self.push(Operation::of(kind), lhs.into(), Some(rhs.into()))
    }

    pub fn build(self) -> Statement {
        Statement::new(self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(value: f32) -> Operand {
        Leaf::host_scalar(value).into()
    }

    #[test]
    fn leaf_tags_follow_the_object() {
        let leaf = Leaf::new(Arc::new(Matrix::<f32>::zeros(
            "a",
            2,
            2,
            crate::translator::Layout::ColumnMajor,
        )));
        assert_eq!(leaf.family(), TypeFamily::Matrix);
        assert_eq!(leaf.subtype(), Subtype::Plain);
        assert_eq!(leaf.numeric_type(), NumericType::Float);

        let host = Leaf::host_scalar(2.0f64);
        assert_eq!(host.family(), TypeFamily::Scalar);
        assert_eq!(host.subtype(), Subtype::HostScalar);
        assert_eq!(host.numeric_type(), NumericType::Double);
    }

    #[test]
    fn canonical_classification() {
        assert_eq!(
            Operation::of(OperationKind::Mult).subfamily,
            OperationSubfamily::ElementwiseOperator
        );
        assert_eq!(
            Operation::of(OperationKind::ElementPow).subfamily,
            OperationSubfamily::ElementwiseFunction
        );
        assert_eq!(
            Operation::of(OperationKind::MatVecProd).family,
            OperationFamily::RowsReduction
        );
    }

    #[test]
    fn validate_accepts_forward_references() {
        let nodes = vec![
            Node {
                op: Operation::of(OperationKind::Mult),
                lhs: Operand::Composite(NodeIndex(1)),
                rhs: Some(scalar(2.0)),
            },
            Node {
                op: Operation::of(OperationKind::Add),
                lhs: scalar(1.0),
                rhs: Some(scalar(1.0)),
            },
        ];
        assert!(Statement::new(nodes).validate().is_ok());
    }

    #[test]
    fn validate_accepts_shared_subexpressions() {
        let mut builder = StatementBuilder::new();
        let shared = builder.binary(OperationKind::Add, scalar(1.0), scalar(2.0));
        builder.binary(OperationKind::Mult, shared, shared);
        assert!(builder.build().validate().is_ok());
    }

    #[test]
    fn validate_rejects_cycles_and_dangling_indices() {
        let cyclic = Statement::new(vec![Node {
            op: Operation::of(OperationKind::Add),
            lhs: scalar(1.0),
            rhs: Some(Operand::Composite(NodeIndex(0))),
        }]);
        assert_eq!(
            cyclic.validate(),
            Err(GeneratorError::CyclicStatement(NodeIndex(0)))
        );

        let dangling = Statement::new(vec![Node {
            op: Operation::of(OperationKind::Abs),
            lhs: Operand::Composite(NodeIndex(4)),
            rhs: None,
        }]);
        assert_eq!(
            dangling.validate(),
            Err(GeneratorError::InvalidNodeIndex(4))
        );
    }
}
