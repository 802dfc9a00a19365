//! Error types shared across the Alembic workspace.

use thiserror::Error;

/// Errors from position construction and position arithmetic.
///
/// A dimension mismatch is a distinct, recoverable error. It is never
/// folded into a zero or infinite distance.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PositionError {
    /// Two positions of different dimensionality were combined.
    #[error("incompatible dimensions: {left} vs {right}")]
    IncompatibleDimension {
        /// Dimensionality of the receiver.
        left: usize,
        /// Dimensionality of the argument.
        right: usize,
    },
    /// A coordinate was NaN or infinite.
    #[error("coordinate {axis} is not finite: {value}")]
    NonFiniteCoordinate {
        /// Zero-based axis of the offending coordinate.
        axis: usize,
        /// The offending value.
        value: f64,
    },
    /// A position with zero dimensions was requested.
    #[error("positions need at least one dimension")]
    Empty,
    /// A bounding-box radius was negative or NaN.
    #[error("invalid range {range}: must be non-negative and not NaN")]
    InvalidRange {
        /// The offending radius.
        range: f64,
    },
    /// Lattice arithmetic left the `i64` coordinate range.
    #[error("lattice position ({x}, {y}) overflowed")]
    LatticeOverflow {
        /// x coordinate of the receiver.
        x: i64,
        /// y coordinate of the receiver.
        y: i64,
    },
}
