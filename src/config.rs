//! Formatting parameters for the generated expressions

use crate::errors::{GeneratorError, Result};

/// Number of components a vector typed element can have, lanes are `0..SIMD_LANES`
pub const SIMD_LANES: u32 = 16;

/// Describes how per element accesses are phrased in the generated text.
///
/// The generator itself never looks inside these strings, they're handed over to the
/// [`MappedObject`](crate::mapping::MappedObject)s when a leaf symbol gets rendered.
///
/// # Example
/// ```
/// use wgpu_kernelgen::config::ExpressionFormat;
///
/// let format = ExpressionFormat::new("gid", "0").with_simd_lane(2).unwrap();
/// assert_eq!(format.first_index(), "gid");
/// assert_eq!(format.simd_lane(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpressionFormat {
    index: (String, String),
    simd_lane: Option<u32>,
}

impl ExpressionFormat {
    /// Creates a format with the given index expression pair and no SIMD lane selected
    ///
    /// # Arguments
    /// * - `first` - the row (or only) index expression of the work item
    /// * - `second` - the column index expression, ignored by vector accesses
    pub fn new(first: &str, second: &str) -> Self {
        ExpressionFormat {
            index: (first.to_string(), second.to_string()),
            simd_lane: None,
        }
    }

    /// Selects the component of a vector typed element the leaves should read
    ///
    /// # Errors
    /// - [`GeneratorError::InvalidSimdLane`] if `lane` is not below [`SIMD_LANES`]
    pub fn with_simd_lane(mut self, lane: u32) -> Result<Self> {
        if lane >= SIMD_LANES {
            return Err(GeneratorError::InvalidSimdLane(lane));
        }
        self.simd_lane = Some(lane);
        Ok(self)
    }

    pub fn index(&self) -> (&str, &str) {
        (&self.index.0, &self.index.1)
    }

    pub fn first_index(&self) -> &str {
        &self.index.0
    }

    pub fn second_index(&self) -> &str {
        &self.index.1
    }

    pub fn simd_lane(&self) -> Option<u32> {
        self.simd_lane
    }
}

impl Default for ExpressionFormat {
    fn default() -> Self {
        ExpressionFormat::new("i", "j")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_past_the_last_component_are_rejected() {
        let format = ExpressionFormat::default();
        assert_eq!(
            format.clone().with_simd_lane(15).map(|f| f.simd_lane()),
            Ok(Some(15))
        );
        assert_eq!(
            format.clone().with_simd_lane(16),
            Err(GeneratorError::InvalidSimdLane(16))
        );
        assert_eq!(
            format.with_simd_lane(u32::MAX),
            Err(GeneratorError::InvalidSimdLane(u32::MAX))
        );
    }
}
