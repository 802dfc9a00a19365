//! Error types for index and obstacle construction.

use thiserror::Error;

/// Errors arising from spatial index, box or obstacle construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    /// An index or box with zero dimensions was requested.
    #[error("spatial structures need at least one dimension")]
    ZeroDimensions,
    /// The grid cell size was not a finite positive number.
    #[error("invalid cell size {cell_size}: must be finite and positive")]
    InvalidCellSize {
        /// The offending cell size.
        cell_size: f64,
    },
    /// Two coordinate vectors of different dimensionality were combined.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimensionality the structure was built for.
        expected: usize,
        /// Dimensionality supplied.
        got: usize,
    },
    /// A bounding box or obstacle had non-finite or inverted corners.
    #[error("invalid extent: {reason}")]
    InvalidExtent {
        /// What went wrong.
        reason: String,
    },
}
