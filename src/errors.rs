//! This module contains all the specific error implementation for the crate
//!
//! Every error here is fatal to the fragment being generated: nothing is retried
//! and no partially generated text is handed back. Callers are expected to fall back
//! to a non fused execution path when a kernel can't be built.

use crate::dispatch::LeafCategory;
use crate::statement::{NodeIndex, NumericType, OperationKind, Subtype, TypeFamily};
use crate::traverse::Role;
use thiserror::Error;

/// Result type used across the generator
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The operator has no entry in the symbol table
    #[error("Unsupported operator {0:?}: it has no source token in the generator")]
    UnsupportedOperator(OperationKind),
    #[error("Unsupported numeric type {0:?}, only float and double leaves can be generated")]
    UnsupportedNumericType(NumericType),
    #[error("Unsupported datastructure type {family:?} with subtype {subtype:?}: not among {{Scalar, Vector, Matrix}}")]
    UnsupportedDataStructure { family: TypeFamily, subtype: Subtype },
    /// A valid leaf reached an operation that is not implemented for it, or the leaf
    /// tags don't describe the object it carries
    #[error("{operation} is not implemented for a {numeric_type:?} {category:?} leaf")]
    UnsupportedType {
        operation: &'static str,
        category: LeafCategory,
        numeric_type: NumericType,
    },
    #[error("No mapped symbol for node {node} in role {role:?}, the mapping pass didn't cover this statement")]
    MappingLookupFailure { node: NodeIndex, role: Role },
    #[error("Node {node} has no {role:?} operand")]
    MissingOperand { node: NodeIndex, role: Role },
    #[error("Node index {0} is out of the statement bounds")]
    InvalidNodeIndex(usize),
    #[error("Statement is not acyclic, node {0} is reachable from itself")]
    CyclicStatement(NodeIndex),
    /// Vector typed elements have at most 16 components, addressed by one hex digit
    #[error("SIMD lane {0} is out of range, lanes go from 0 to 15")]
    InvalidSimdLane(u32),
}
