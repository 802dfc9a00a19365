//! The [`Position`] contract and its two shipped implementations.

use std::fmt;

use smallvec::SmallVec;

use crate::error::PositionError;

/// Inline coordinate storage; positions up to 4D never allocate.
pub type Coords = SmallVec<[f64; 4]>;

/// An immutable, fixed-dimension point in an environment.
///
/// Every operation that combines two positions checks that their
/// dimensionality agrees and fails with
/// [`PositionError::IncompatibleDimension`] otherwise.
///
/// # Contract
///
/// - `coordinates().len() == dimensions()` and every coordinate is finite.
/// - `distance_to` is a metric: reflexive, symmetric, triangle inequality.
/// - `bounding_box(r)` returns `(lower, upper)` corners that contain every
///   position within distance `r` of `self`. An infinite `r` yields
///   infinite corners, so the corners are raw coordinates rather than
///   positions.
/// - `from_coordinates(p.coordinates())` reproduces `p`.
pub trait Position: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Number of dimensions.
    fn dimensions(&self) -> usize;

    /// Cartesian coordinates, one per dimension.
    fn coordinates(&self) -> Coords;

    /// Distance to another position of the same dimensionality.
    fn distance_to(&self, other: &Self) -> Result<f64, PositionError>;

    /// Lower-left and upper-right corners of the axis-aligned box of
    /// radius `range` centered on this position.
    fn bounding_box(&self, range: f64) -> Result<(Coords, Coords), PositionError>;

    /// Component-wise sum, used to translate a position by an offset.
    fn sum(&self, other: &Self) -> Result<Self, PositionError>;

    /// Build a position from raw cartesian coordinates.
    ///
    /// Lattice implementations snap to the nearest lattice point.
    fn from_coordinates(coords: &[f64]) -> Result<Self, PositionError>;
}

fn check_dims(left: usize, right: usize) -> Result<(), PositionError> {
    if left == right {
        Ok(())
    } else {
        Err(PositionError::IncompatibleDimension { left, right })
    }
}

fn check_range(range: f64) -> Result<(), PositionError> {
    if range.is_nan() || range < 0.0 {
        Err(PositionError::InvalidRange { range })
    } else {
        Ok(())
    }
}

// ── Euclidean ───────────────────────────────────────────────────

/// A continuous position of any dimensionality with the Euclidean metric.
///
/// Coordinates are validated finite at construction.
///
/// # Examples
///
/// ```
/// use alembic_core::{Euclidean, Position};
///
/// let a = Euclidean::new([0.0, 0.0]).unwrap();
/// let b = Euclidean::new([3.0, 4.0]).unwrap();
/// assert_eq!(a.distance_to(&b).unwrap(), 5.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Euclidean {
    coords: Coords,
}

impl Euclidean {
    /// Create a position from its coordinates.
    ///
    /// Returns `Err(PositionError::Empty)` for zero coordinates and
    /// `Err(PositionError::NonFiniteCoordinate)` for NaN or infinite ones.
    pub fn new(coords: impl IntoIterator<Item = f64>) -> Result<Self, PositionError> {
        let coords: Coords = coords.into_iter().collect();
        if coords.is_empty() {
            return Err(PositionError::Empty);
        }
        if let Some((axis, &value)) = coords.iter().enumerate().find(|(_, c)| !c.is_finite()) {
            return Err(PositionError::NonFiniteCoordinate { axis, value });
        }
        Ok(Self { coords })
    }

    /// The origin of a `dims`-dimensional space.
    pub fn origin(dims: usize) -> Result<Self, PositionError> {
        Self::new(std::iter::repeat(0.0).take(dims))
    }

    /// Borrow the coordinates without copying.
    pub fn as_slice(&self) -> &[f64] {
        &self.coords
    }
}

impl Position for Euclidean {
    fn dimensions(&self) -> usize {
        self.coords.len()
    }

    fn coordinates(&self) -> Coords {
        self.coords.clone()
    }

    fn distance_to(&self, other: &Self) -> Result<f64, PositionError> {
        check_dims(self.dimensions(), other.dimensions())?;
        let sq: f64 = self
            .coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Ok(sq.sqrt())
    }

    fn bounding_box(&self, range: f64) -> Result<(Coords, Coords), PositionError> {
        check_range(range)?;
        let lower = self.coords.iter().map(|c| c - range).collect();
        let upper = self.coords.iter().map(|c| c + range).collect();
        Ok((lower, upper))
    }

    fn sum(&self, other: &Self) -> Result<Self, PositionError> {
        check_dims(self.dimensions(), other.dimensions())?;
        Self::new(self.coords.iter().zip(&other.coords).map(|(a, b)| a + b))
    }

    fn from_coordinates(coords: &[f64]) -> Result<Self, PositionError> {
        Self::new(coords.iter().copied())
    }
}

impl fmt::Display for Euclidean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

// ── Manhattan2D ─────────────────────────────────────────────────

/// A point on the integer lattice with the L1 (taxicab) metric.
///
/// Bounding boxes truncate their radius to an integer: no lattice point
/// lies at a fractional distance, so nothing is lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Manhattan2D {
    x: i64,
    y: i64,
}

impl Manhattan2D {
    /// Create a lattice position.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The x coordinate.
    pub fn x(&self) -> i64 {
        self.x
    }

    /// The y coordinate.
    pub fn y(&self) -> i64 {
        self.y
    }
}

impl Position for Manhattan2D {
    fn dimensions(&self) -> usize {
        2
    }

    fn coordinates(&self) -> Coords {
        smallvec::smallvec![self.x as f64, self.y as f64]
    }

    fn distance_to(&self, other: &Self) -> Result<f64, PositionError> {
        // Unsigned differences cannot overflow.
        Ok(self.x.abs_diff(other.x) as f64 + self.y.abs_diff(other.y) as f64)
    }

    fn bounding_box(&self, range: f64) -> Result<(Coords, Coords), PositionError> {
        check_range(range)?;
        if range.is_infinite() {
            return Ok((
                smallvec::smallvec![f64::NEG_INFINITY; 2],
                smallvec::smallvec![f64::INFINITY; 2],
            ));
        }
        // Truncation toward zero; saturates for huge radii.
        let r = range as i64;
        let lower = Self::new(self.x.saturating_sub(r), self.y.saturating_sub(r));
        let upper = Self::new(self.x.saturating_add(r), self.y.saturating_add(r));
        Ok((lower.coordinates(), upper.coordinates()))
    }

    fn sum(&self, other: &Self) -> Result<Self, PositionError> {
        match (self.x.checked_add(other.x), self.y.checked_add(other.y)) {
            (Some(x), Some(y)) => Ok(Self::new(x, y)),
            _ => Err(PositionError::LatticeOverflow {
                x: self.x,
                y: self.y,
            }),
        }
    }

    fn from_coordinates(coords: &[f64]) -> Result<Self, PositionError> {
        check_dims(2, coords.len())?;
        if let Some((axis, &value)) = coords.iter().enumerate().find(|(_, c)| !c.is_finite()) {
            return Err(PositionError::NonFiniteCoordinate { axis, value });
        }
        Ok(Self::new(coords[0].round() as i64, coords[1].round() as i64))
    }
}

impl fmt::Display for Manhattan2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
