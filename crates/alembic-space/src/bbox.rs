//! Axis-aligned bounding boxes used as index queries.

use alembic_core::position::Coords;
use alembic_core::Position;

use crate::error::SpaceError;

/// An axis-aligned, inclusive box in D dimensions.
///
/// ```
/// use alembic_space::BoundingBox;
///
/// let b = BoundingBox::new(&[0.0, 0.0], &[2.0, 1.0]).unwrap();
/// assert!(b.contains(&[2.0, 0.5]));
/// assert!(!b.contains(&[2.5, 0.5]));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    min: Coords,
    max: Coords,
}

impl BoundingBox {
    /// Create a box from its lower and upper corners.
    ///
    /// Corners must have the same, non-zero dimensionality, contain no
    /// NaN, and satisfy `min[i] <= max[i]` on every axis. Infinite
    /// corners are allowed and describe unbounded slabs.
    pub fn new(min: &[f64], max: &[f64]) -> Result<Self, SpaceError> {
        if min.is_empty() {
            return Err(SpaceError::ZeroDimensions);
        }
        if min.len() != max.len() {
            return Err(SpaceError::DimensionMismatch {
                expected: min.len(),
                got: max.len(),
            });
        }
        for (axis, (lo, hi)) in min.iter().zip(max).enumerate() {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(SpaceError::InvalidExtent {
                    reason: format!("axis {axis}: [{lo}, {hi}]"),
                });
            }
        }
        Ok(Self {
            min: min.into(),
            max: max.into(),
        })
    }

    /// The box of radius `range` around `center`, as computed by the
    /// position type itself.
    pub fn around<P: Position>(center: &P, range: f64) -> Result<Self, SpaceError> {
        let (lo, hi) = center
            .bounding_box(range)
            .map_err(|e| SpaceError::InvalidExtent {
                reason: e.to_string(),
            })?;
        Self::new(&lo, &hi)
    }

    /// Number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.min.len()
    }

    /// Lower corner.
    pub fn min(&self) -> &[f64] {
        &self.min
    }

    /// Upper corner.
    pub fn max(&self) -> &[f64] {
        &self.max
    }

    /// Whether `coords` lies inside the box (boundaries included).
    ///
    /// Coordinates of a different dimensionality are never contained.
    pub fn contains(&self, coords: &[f64]) -> bool {
        coords.len() == self.dimensions()
            && coords
                .iter()
                .zip(self.min.iter().zip(&self.max))
                .all(|(c, (lo, hi))| lo <= c && c <= hi)
    }
}
