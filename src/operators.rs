//! Source tokens of the operators and the pure predicates the generator uses to decide
//! how a node is turned into code

use crate::errors::{GeneratorError, Result};
use crate::statement::{
    DeviceObject, Leaf, NumericType, Operand, Operation, OperationFamily, OperationKind,
    OperationSubfamily, Precision, Statement, Subtype, TypeFamily,
};

/// Source token of an operator: a function name or an infix symbol
///
/// # Errors
/// - [`GeneratorError::UnsupportedOperator`] if the kernels have no way to express `kind`
///
/// # Example
/// ```
/// use wgpu_kernelgen::operators::token;
/// use wgpu_kernelgen::statement::OperationKind;
///
/// assert_eq!(token(OperationKind::InplaceAdd).unwrap(), "+=");
/// assert!(token(OperationKind::Exp).is_err());
/// ```
pub fn token(kind: OperationKind) -> Result<&'static str> {
    use OperationKind::*;

    let token = match kind {
        // function
        Abs => "abs",
        ElementPow => "pow",

        // arithmetic
        Assign => "=",
        InplaceAdd => "+=",
        InplaceSub => "-=",
        Add => "+",
        Sub => "-",
        Mult => "*",
        Div => "/",
        Access => "[]",

        // relational
        ElementEq => "isequal",
        ElementNeq => "isnotequal",
        ElementGreater => "isgreater",
        ElementGeq => "isgreaterequal",
        ElementLess => "isless",
        ElementLeq => "islessequal",

        ElementFmax => "fmax",
        ElementFmin => "fmin",

        Trans => "trans",

        // leaves computed by their own kernel
        InnerProd => "iprod",
        MatMatProd => "mmprod",
        MatVecProd => "mvprod",

        other => return Err(GeneratorError::UnsupportedOperator(other)),
    };
    Ok(token)
}

/// Name of a numeric type in the kernel source
pub fn numeric_type_to_string(numeric_type: NumericType) -> Result<&'static str> {
    match numeric_type {
        NumericType::Float => Ok("float"),
        NumericType::Double => Ok("double"),
        other => Err(GeneratorError::UnsupportedNumericType(other)),
    }
}

pub fn is_reduction(op: &Operation) -> bool {
    matches!(
        op.family,
        OperationFamily::VectorReduction
            | OperationFamily::RowsReduction
            | OperationFamily::ColumnsReduction
    )
}

/// True when the node can't be inlined and has to be computed by a dedicated kernel
pub fn requires_kernel(op: &Operation) -> bool {
    op.subfamily == OperationSubfamily::Function || is_reduction(op)
}

pub fn is_row_major_matrix(leaf: &Leaf) -> bool {
    if leaf.family() != TypeFamily::Matrix || leaf.subtype() != Subtype::Plain {
        return false;
    }
    match (leaf.numeric_type(), leaf.object()) {
        (NumericType::Float, DeviceObject::Matrix(Precision::Float(matrix))) => {
            matrix.is_row_major()
        }
        (NumericType::Double, DeviceObject::Matrix(Precision::Double(matrix))) => {
            matrix.is_row_major()
        }
        _ => false,
    }
}

fn is_row_major_operand(operand: &Operand) -> bool {
    operand.as_leaf().map_or(false, is_row_major_matrix)
}

/// Whether the kernel has to read `operand` as the transpose of its canonical layout
///
/// Row major storage is the transpose of the column major layout the kernels are written
/// for. An explicit `trans` node over a column major operand is transposed as well, while
/// `trans` over a row major matrix cancels out.
pub fn is_transposed(statement: &Statement, operand: &Operand) -> bool {
    match operand {
        Operand::Leaf(leaf) => is_row_major_matrix(leaf),
        Operand::Composite(index) => statement.node(*index).map_or(false, |node| {
            node.op.kind == OperationKind::Trans && !is_row_major_operand(&node.lhs)
        }),
    }
}
