//! Symbols the generated code uses for the leaves of a statement
//!
//! The mapping pass that names kernel arguments runs before the generation and fills a
//! [`MappingTable`]. The generator only reads it.

use crate::config::ExpressionFormat;
use crate::errors::{GeneratorError, Result};
use crate::statement::NodeIndex;
use crate::translator::Layout;
use crate::traverse::Role;
use std::collections::HashMap;

/// What a `(node, role)` pair stands for in the kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedObject {
    /// Text used as is, e.g. the result of a reduction computed earlier
    Symbol(String),
    /// Host scalar passed by value
    HostScalar { name: String },
    /// Scalar in device memory, passed as a pointer
    Scalar { name: String },
    Vector { name: String },
    /// `ld` is the leading dimension expression of the padded storage
    Matrix {
        name: String,
        ld: String,
        layout: Layout,
    },
    /// Implicit vector or matrix, every element is the same value
    Implicit { name: String },
}

impl MappedObject {
    pub fn symbol(text: &str) -> Self {
        MappedObject::Symbol(text.to_string())
    }

    /// Renders the access expression for the element selected by `format`
    ///
    /// The SIMD lane is written as one hex digit, the component syntax of vector types
    /// (`.s0` to `.s9`, then `.sa` to `.sf`).
    ///
    /// # Example
    /// ```
    /// use wgpu_kernelgen::config::ExpressionFormat;
    /// use wgpu_kernelgen::mapping::MappedObject;
    /// use wgpu_kernelgen::translator::Layout;
    ///
    /// let a = MappedObject::Matrix { name: "A".into(), ld: "lda".into(), layout: Layout::RowMajor };
    /// assert_eq!(a.generate(&ExpressionFormat::new("r", "c")), "A[r*lda+c]");
    /// ```
    pub fn generate(&self, format: &ExpressionFormat) -> String {
        let (first, second) = format.index();
        let access = match self {
            MappedObject::Symbol(text) => return text.clone(),
            MappedObject::HostScalar { name } | MappedObject::Implicit { name } => {
                return name.clone()
            }
            MappedObject::Scalar { name } => return format!("*{name}"),
            MappedObject::Vector { name } => format!("{name}[{first}]"),
            MappedObject::Matrix {
                name,
                ld,
                layout: Layout::RowMajor,
            } => format!("{name}[{first}*{ld}+{second}]"),
            MappedObject::Matrix {
                name,
                ld,
                layout: Layout::ColumnMajor,
            } => format!("{name}[{first}+{second}*{ld}]"),
        };
        match format.simd_lane() {
            Some(lane) => format!("{access}.s{lane:x}"),
            None => access,
        }
    }
}

/// Lookup from `(node, role)` to the symbol of that leaf
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: HashMap<(NodeIndex, Role), MappedObject>,
}

impl MappingTable {
    pub fn new() -> Self {
        MappingTable {
            entries: HashMap::new(),
        }
    }

    /// Adds the symbol for `(node, role)`, returning the one it replaces
    pub fn insert(
        &mut self,
        node: NodeIndex,
        role: Role,
        object: MappedObject,
    ) -> Option<MappedObject> {
        self.entries.insert((node, role), object)
    }

    /// # Errors
    /// - [`GeneratorError::MappingLookupFailure`] if the pair was never mapped
    pub fn get(&self, node: NodeIndex, role: Role) -> Result<&MappedObject> {
        self.entries
            .get(&(node, role))
            .ok_or(GeneratorError::MappingLookupFailure { node, role })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<((NodeIndex, Role), MappedObject)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = ((NodeIndex, Role), MappedObject)>>(iter: I) -> Self {
        MappingTable {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_accesses() {
        let format = ExpressionFormat::new("gid", "k");
        let cases = [
            (MappedObject::symbol("acc"), "acc"),
            (
                MappedObject::HostScalar {
                    name: "alpha".into(),
                },
                "alpha",
            ),
            (MappedObject::Scalar { name: "s".into() }, "*s"),
            (MappedObject::Vector { name: "x".into() }, "x[gid]"),
            (
                MappedObject::Matrix {
                    name: "A".into(),
                    ld: "128".into(),
                    layout: Layout::ColumnMajor,
                },
                "A[gid+k*128]",
            ),
            (MappedObject::Implicit { name: "one".into() }, "one"),
        ];
        for (object, expected) in cases {
            assert_eq!(object.generate(&format), expected);
        }
    }

    #[test]
    fn simd_lane_applies_to_buffers_only() {
        let format = ExpressionFormat::default().with_simd_lane(3).unwrap();
        assert_eq!(
            MappedObject::Vector { name: "x".into() }.generate(&format),
            "x[i].s3"
        );
        assert_eq!(
            MappedObject::HostScalar { name: "a".into() }.generate(&format),
            "a"
        );
    }

    #[test]
    fn simd_lanes_are_single_hex_digits() {
        let x = MappedObject::Vector { name: "x".into() };
        let a = MappedObject::Matrix {
            name: "A".into(),
            ld: "ld".into(),
            layout: Layout::RowMajor,
        };
        for (lane, suffix) in [(9, ".s9"), (10, ".sa"), (15, ".sf")] {
            let format = ExpressionFormat::default().with_simd_lane(lane).unwrap();
            assert_eq!(x.generate(&format), format!("x[i]{suffix}"));
            assert_eq!(a.generate(&format), format!("A[i*ld+j]{suffix}"));
        }
        assert_eq!(
            ExpressionFormat::default().with_simd_lane(16),
            Err(GeneratorError::InvalidSimdLane(16))
        );
    }

    #[test]
    fn missing_entries_are_reported() {
        let table: MappingTable = [(
            (NodeIndex(0), Role::Lhs),
            MappedObject::symbol("a"),
        )]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(NodeIndex(0), Role::Lhs),
            Ok(&MappedObject::symbol("a"))
        );
        assert_eq!(
            table.get(NodeIndex(0), Role::Rhs),
            Err(GeneratorError::MappingLookupFailure {
                node: NodeIndex(0),
                role: Role::Rhs
            })
        );
    }
}
