//! Resolution of type erased leaves into concrete typed objects
//!
//! A [`Leaf`] only tells what it points to through its tags. The functions here select the
//! single concrete object those tags describe and hand it to a [`LeafFn`], an operation
//! with one generic method per leaf category. Precision is resolved by monomorphization,
//! so every operation is written once for `f32` and `f64`.
//!
//! The derived queries the kernel argument binding needs (element size, padded sizes,
//! device handle) are expressed as [`LeafFn`]s and go through the same dispatch.

use crate::errors::{GeneratorError, Result};
use crate::statement::{DeviceObject, Leaf, NumericType, Precision, Subtype, TypeFamily};
use crate::translator::{ImplicitMatrix, ImplicitVector, Matrix, Scalar, Vector};
use crate::variable::{MemHandle, Numeric};

/// The six kinds of object a leaf can point to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafCategory {
    HostScalar,
    Scalar,
    Vector,
    ImplicitVector,
    Matrix,
    ImplicitMatrix,
}

impl LeafCategory {
    /// Classifies a `family`/`subtype` pair
    ///
    /// # Errors
    /// - [`GeneratorError::UnsupportedDataStructure`] if the pair is not one of the six categories
    pub fn from_tags(family: TypeFamily, subtype: Subtype) -> Result<Self> {
        match (family, subtype) {
            (TypeFamily::Scalar, Subtype::HostScalar) => Ok(LeafCategory::HostScalar),
            (TypeFamily::Scalar, Subtype::Plain) => Ok(LeafCategory::Scalar),
            (TypeFamily::Vector, Subtype::Plain) => Ok(LeafCategory::Vector),
            (TypeFamily::Vector, Subtype::ImplicitVector) => Ok(LeafCategory::ImplicitVector),
            (TypeFamily::Matrix, Subtype::Plain) => Ok(LeafCategory::Matrix),
            (TypeFamily::Matrix, Subtype::ImplicitMatrix) => Ok(LeafCategory::ImplicitMatrix),
            (family, subtype) => Err(GeneratorError::UnsupportedDataStructure { family, subtype }),
        }
    }

    /// The tags describing this category
    pub fn tags(self) -> (TypeFamily, Subtype) {
        match self {
            LeafCategory::HostScalar => (TypeFamily::Scalar, Subtype::HostScalar),
            LeafCategory::Scalar => (TypeFamily::Scalar, Subtype::Plain),
            LeafCategory::Vector => (TypeFamily::Vector, Subtype::Plain),
            LeafCategory::ImplicitVector => (TypeFamily::Vector, Subtype::ImplicitVector),
            LeafCategory::Matrix => (TypeFamily::Matrix, Subtype::Plain),
            LeafCategory::ImplicitMatrix => (TypeFamily::Matrix, Subtype::ImplicitMatrix),
        }
    }
}

/// An operation with per concrete type behaviour
///
/// Exactly one method is called per dispatch, with the object the leaf points to.
pub trait LeafFn {
    type Output;

    fn host_scalar<T: Numeric>(&self, value: &T) -> Self::Output;
    fn scalar<T: Numeric>(&self, scalar: &Scalar<T>) -> Self::Output;
    fn vector<T: Numeric>(&self, vector: &Vector<T>) -> Self::Output;
    fn implicit_vector<T: Numeric>(&self, vector: &ImplicitVector<T>) -> Self::Output;
    fn matrix<T: Numeric>(&self, matrix: &Matrix<T>) -> Self::Output;
    fn implicit_matrix<T: Numeric>(&self, matrix: &ImplicitMatrix<T>) -> Self::Output;
}

fn expect_category(leaf: &Leaf, expected: LeafCategory, operation: &'static str) -> Result<()> {
    let category = LeafCategory::from_tags(leaf.family(), leaf.subtype())?;
    if category == expected {
        Ok(())
    } else {
        Err(GeneratorError::UnsupportedType {
            operation,
            category,
            numeric_type: leaf.numeric_type(),
        })
    }
}

/// Error for a float/double leaf whose tags don't describe the object it carries
fn mismatch(leaf: &Leaf, operation: &'static str) -> GeneratorError {
    GeneratorError::UnsupportedType {
        operation,
        category: leaf.object().category(),
        numeric_type: leaf.object().numeric_type(),
    }
}

/// Calls `fun` on the object of a host scalar leaf
pub fn call_on_host_scalar<F: LeafFn>(leaf: &Leaf, fun: &F) -> Result<F::Output> {
    const OPERATION: &str = "call_on_host_scalar";
    expect_category(leaf, LeafCategory::HostScalar, OPERATION)?;
    match (leaf.numeric_type(), leaf.object()) {
        (NumericType::Float, DeviceObject::HostScalar(Precision::Float(value))) => {
            Ok(fun.host_scalar(value))
        }
        (NumericType::Double, DeviceObject::HostScalar(Precision::Double(value))) => {
            Ok(fun.host_scalar(value))
        }
        (NumericType::Float | NumericType::Double, _) => Err(mismatch(leaf, OPERATION)),
        (other, _) => Err(GeneratorError::UnsupportedNumericType(other)),
    }
}

/// Calls `fun` on the object of a device scalar leaf
pub fn call_on_scalar<F: LeafFn>(leaf: &Leaf, fun: &F) -> Result<F::Output> {
    const OPERATION: &str = "call_on_scalar";
    expect_category(leaf, LeafCategory::Scalar, OPERATION)?;
    match (leaf.numeric_type(), leaf.object()) {
        (NumericType::Float, DeviceObject::Scalar(Precision::Float(scalar))) => {
            Ok(fun.scalar(&**scalar))
        }
        (NumericType::Double, DeviceObject::Scalar(Precision::Double(scalar))) => {
            Ok(fun.scalar(&**scalar))
        }
        (NumericType::Float | NumericType::Double, _) => Err(mismatch(leaf, OPERATION)),
        (other, _) => Err(GeneratorError::UnsupportedNumericType(other)),
    }
}

pub fn call_on_vector<F: LeafFn>(leaf: &Leaf, fun: &F) -> Result<F::Output> {
    const OPERATION: &str = "call_on_vector";
    expect_category(leaf, LeafCategory::Vector, OPERATION)?;
    match (leaf.numeric_type(), leaf.object()) {
        (NumericType::Float, DeviceObject::Vector(Precision::Float(vector))) => {
            Ok(fun.vector(&**vector))
        }
        (NumericType::Double, DeviceObject::Vector(Precision::Double(vector))) => {
            Ok(fun.vector(&**vector))
        }
        (NumericType::Float | NumericType::Double, _) => Err(mismatch(leaf, OPERATION)),
        (other, _) => Err(GeneratorError::UnsupportedNumericType(other)),
    }
}

pub fn call_on_implicit_vector<F: LeafFn>(leaf: &Leaf, fun: &F) -> Result<F::Output> {
    const OPERATION: &str = "call_on_implicit_vector";
    expect_category(leaf, LeafCategory::ImplicitVector, OPERATION)?;
    match (leaf.numeric_type(), leaf.object()) {
        (NumericType::Float, DeviceObject::ImplicitVector(Precision::Float(vector))) => {
            Ok(fun.implicit_vector(&**vector))
        }
        (NumericType::Double, DeviceObject::ImplicitVector(Precision::Double(vector))) => {
            Ok(fun.implicit_vector(&**vector))
        }
        (NumericType::Float | NumericType::Double, _) => Err(mismatch(leaf, OPERATION)),
        (other, _) => Err(GeneratorError::UnsupportedNumericType(other)),
    }
}

pub fn call_on_matrix<F: LeafFn>(leaf: &Leaf, fun: &F) -> Result<F::Output> {
    const OPERATION: &str = "call_on_matrix";
    expect_category(leaf, LeafCategory::Matrix, OPERATION)?;
    match (leaf.numeric_type(), leaf.object()) {
        (NumericType::Float, DeviceObject::Matrix(Precision::Float(matrix))) => {
            Ok(fun.matrix(&**matrix))
        }
        (NumericType::Double, DeviceObject::Matrix(Precision::Double(matrix))) => {
            Ok(fun.matrix(&**matrix))
        }
        (NumericType::Float | NumericType::Double, _) => Err(mismatch(leaf, OPERATION)),
        (other, _) => Err(GeneratorError::UnsupportedNumericType(other)),
    }
}

pub fn call_on_implicit_matrix<F: LeafFn>(leaf: &Leaf, fun: &F) -> Result<F::Output> {
    const OPERATION: &str = "call_on_implicit_matrix";
    expect_category(leaf, LeafCategory::ImplicitMatrix, OPERATION)?;
    match (leaf.numeric_type(), leaf.object()) {
        (NumericType::Float, DeviceObject::ImplicitMatrix(Precision::Float(matrix))) => {
            Ok(fun.implicit_matrix(&**matrix))
        }
        (NumericType::Double, DeviceObject::ImplicitMatrix(Precision::Double(matrix))) => {
            Ok(fun.implicit_matrix(&**matrix))
        }
        (NumericType::Float | NumericType::Double, _) => Err(mismatch(leaf, OPERATION)),
        (other, _) => Err(GeneratorError::UnsupportedNumericType(other)),
    }
}

/// Calls `fun` on whatever object `leaf` points to
///
/// # Errors
/// - [`GeneratorError::UnsupportedDataStructure`] if the leaf tags are not one of the six categories
/// - [`GeneratorError::UnsupportedNumericType`] if the leaf is neither float nor double
/// - [`GeneratorError::UnsupportedType`] if the tags don't describe the object the leaf carries
pub fn call_on_element<F: LeafFn>(leaf: &Leaf, fun: &F) -> Result<F::Output> {
    match LeafCategory::from_tags(leaf.family(), leaf.subtype())? {
        LeafCategory::HostScalar => call_on_host_scalar(leaf, fun),
        LeafCategory::Scalar => call_on_scalar(leaf, fun),
        LeafCategory::Vector => call_on_vector(leaf, fun),
        LeafCategory::ImplicitVector => call_on_implicit_vector(leaf, fun),
        LeafCategory::Matrix => call_on_matrix(leaf, fun),
        LeafCategory::ImplicitMatrix => call_on_implicit_matrix(leaf, fun),
    }
}

/// Byte size of one element
pub struct ScalartypeSize;

impl LeafFn for ScalartypeSize {
    type Output = usize;

    fn host_scalar<T: Numeric>(&self, _: &T) -> usize {
        std::mem::size_of::<T>()
    }
    fn scalar<T: Numeric>(&self, _: &Scalar<T>) -> usize {
        std::mem::size_of::<T>()
    }
    fn vector<T: Numeric>(&self, _: &Vector<T>) -> usize {
        std::mem::size_of::<T>()
    }
    fn implicit_vector<T: Numeric>(&self, _: &ImplicitVector<T>) -> usize {
        std::mem::size_of::<T>()
    }
    fn matrix<T: Numeric>(&self, _: &Matrix<T>) -> usize {
        std::mem::size_of::<T>()
    }
    fn implicit_matrix<T: Numeric>(&self, _: &ImplicitMatrix<T>) -> usize {
        std::mem::size_of::<T>()
    }
}

/// Total number of elements, padding included
pub struct InternalSize;

impl LeafFn for InternalSize {
    type Output = usize;

    fn host_scalar<T: Numeric>(&self, _: &T) -> usize {
        1
    }
    fn scalar<T: Numeric>(&self, _: &Scalar<T>) -> usize {
        1
    }
    fn vector<T: Numeric>(&self, vector: &Vector<T>) -> usize {
        vector.internal_size()
    }
    fn implicit_vector<T: Numeric>(&self, vector: &ImplicitVector<T>) -> usize {
        vector.size()
    }
    fn matrix<T: Numeric>(&self, matrix: &Matrix<T>) -> usize {
        matrix.internal_size()
    }
    fn implicit_matrix<T: Numeric>(&self, matrix: &ImplicitMatrix<T>) -> usize {
        let (rows, cols) = matrix.dim();
        rows * cols
    }
}

fn not_a_matrix<T: Numeric>(operation: &'static str, category: LeafCategory) -> Result<usize> {
    Err(GeneratorError::UnsupportedType {
        operation,
        category,
        numeric_type: T::NUMERIC_TYPE,
    })
}

/// Padded number of rows, only defined for matrices
pub struct InternalSize1;

impl LeafFn for InternalSize1 {
    type Output = Result<usize>;

    fn host_scalar<T: Numeric>(&self, _: &T) -> Result<usize> {
        not_a_matrix::<T>("internal_size1", LeafCategory::HostScalar)
    }
    fn scalar<T: Numeric>(&self, _: &Scalar<T>) -> Result<usize> {
        not_a_matrix::<T>("internal_size1", LeafCategory::Scalar)
    }
    fn vector<T: Numeric>(&self, _: &Vector<T>) -> Result<usize> {
        not_a_matrix::<T>("internal_size1", LeafCategory::Vector)
    }
    fn implicit_vector<T: Numeric>(&self, _: &ImplicitVector<T>) -> Result<usize> {
        not_a_matrix::<T>("internal_size1", LeafCategory::ImplicitVector)
    }
    fn matrix<T: Numeric>(&self, matrix: &Matrix<T>) -> Result<usize> {
        Ok(matrix.internal_size1())
    }
    fn implicit_matrix<T: Numeric>(&self, matrix: &ImplicitMatrix<T>) -> Result<usize> {
        Ok(matrix.dim().0)
    }
}

/// Padded number of columns, only defined for matrices
pub struct InternalSize2;

impl LeafFn for InternalSize2 {
    type Output = Result<usize>;

    fn host_scalar<T: Numeric>(&self, _: &T) -> Result<usize> {
        not_a_matrix::<T>("internal_size2", LeafCategory::HostScalar)
    }
    fn scalar<T: Numeric>(&self, _: &Scalar<T>) -> Result<usize> {
        not_a_matrix::<T>("internal_size2", LeafCategory::Scalar)
    }
    fn vector<T: Numeric>(&self, _: &Vector<T>) -> Result<usize> {
        not_a_matrix::<T>("internal_size2", LeafCategory::Vector)
    }
    fn implicit_vector<T: Numeric>(&self, _: &ImplicitVector<T>) -> Result<usize> {
        not_a_matrix::<T>("internal_size2", LeafCategory::ImplicitVector)
    }
    fn matrix<T: Numeric>(&self, matrix: &Matrix<T>) -> Result<usize> {
        Ok(matrix.internal_size2())
    }
    fn implicit_matrix<T: Numeric>(&self, matrix: &ImplicitMatrix<T>) -> Result<usize> {
        Ok(matrix.dim().1)
    }
}

/// Device memory handle, only objects stored on the device have one
pub struct Handle;

impl Handle {
    fn none<T: Numeric>(category: LeafCategory) -> Result<MemHandle> {
        Err(GeneratorError::UnsupportedType {
            operation: "handle",
            category,
            numeric_type: T::NUMERIC_TYPE,
        })
    }
}

impl LeafFn for Handle {
    type Output = Result<MemHandle>;

    fn host_scalar<T: Numeric>(&self, _: &T) -> Result<MemHandle> {
        Handle::none::<T>(LeafCategory::HostScalar)
    }
    fn scalar<T: Numeric>(&self, scalar: &Scalar<T>) -> Result<MemHandle> {
        Ok(scalar.handle().clone())
    }
    fn vector<T: Numeric>(&self, vector: &Vector<T>) -> Result<MemHandle> {
        Ok(vector.handle().clone())
    }
    fn implicit_vector<T: Numeric>(&self, _: &ImplicitVector<T>) -> Result<MemHandle> {
        Handle::none::<T>(LeafCategory::ImplicitVector)
    }
    fn matrix<T: Numeric>(&self, matrix: &Matrix<T>) -> Result<MemHandle> {
        Ok(matrix.handle().clone())
    }
    fn implicit_matrix<T: Numeric>(&self, _: &ImplicitMatrix<T>) -> Result<MemHandle> {
        Handle::none::<T>(LeafCategory::ImplicitMatrix)
    }
}

pub fn scalartype_size(leaf: &Leaf) -> Result<usize> {
    call_on_element(leaf, &ScalartypeSize)
}

pub fn internal_size(leaf: &Leaf) -> Result<usize> {
    call_on_element(leaf, &InternalSize)
}

pub fn internal_size1(leaf: &Leaf) -> Result<usize> {
    call_on_element(leaf, &InternalSize1)?
}

pub fn internal_size2(leaf: &Leaf) -> Result<usize> {
    call_on_element(leaf, &InternalSize2)?
}

pub fn handle(leaf: &Leaf) -> Result<MemHandle> {
    call_on_element(leaf, &Handle)?
}
