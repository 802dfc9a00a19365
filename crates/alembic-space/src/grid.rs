//! Uniform hash-grid index.

use std::hash::Hash;

use alembic_core::position::Coords;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::bbox::BoundingBox;
use crate::error::SpaceError;
use crate::index::{coords_acceptable, SpatialIndex};

/// Integer cell key, one component per dimension.
type CellKey = SmallVec<[i64; 4]>;

/// A [`SpatialIndex`] that buckets elements into cubic cells of side
/// `cell_size`.
///
/// Queries visit only the cells overlapping the box. When the box spans
/// more cells than are occupied (huge radii, sparse populations), the
/// occupied cells are scanned instead.
///
/// # Examples
///
/// ```
/// use alembic_space::{BoundingBox, GridIndex, SpatialIndex};
///
/// let mut grid = GridIndex::new(2, 1.0).unwrap();
/// assert!(grid.insert(7u32, &[0.5, 0.5]));
/// assert!(grid.insert(8u32, &[5.0, 5.0]));
/// let hits = grid.query(&BoundingBox::new(&[0.0, 0.0], &[1.0, 1.0]).unwrap());
/// assert_eq!(hits, vec![7]);
/// ```
#[derive(Clone, Debug)]
pub struct GridIndex<E> {
    dims: usize,
    cell_size: f64,
    cells: IndexMap<CellKey, Vec<E>>,
    positions: IndexMap<E, Coords>,
}

impl<E: Copy + Eq + Hash> GridIndex<E> {
    /// Create an empty grid for `dims`-dimensional coordinates.
    ///
    /// Returns `Err` if `dims == 0` or `cell_size` is not finite and
    /// strictly positive.
    pub fn new(dims: usize, cell_size: f64) -> Result<Self, SpaceError> {
        if dims == 0 {
            return Err(SpaceError::ZeroDimensions);
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SpaceError::InvalidCellSize { cell_size });
        }
        Ok(Self {
            dims,
            cell_size,
            cells: IndexMap::new(),
            positions: IndexMap::new(),
        })
    }

    /// Side length of each cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_of(&self, coords: &[f64]) -> CellKey {
        // `as` saturates, so far-out coordinates share the edge cells.
        coords
            .iter()
            .map(|c| (c / self.cell_size).floor() as i64)
            .collect()
    }

    fn detach(&mut self, elem: E, key: &CellKey) {
        if let Some(bucket) = self.cells.get_mut(key) {
            if let Some(i) = bucket.iter().position(|e| *e == elem) {
                bucket.swap_remove(i);
            }
            if bucket.is_empty() {
                self.cells.swap_remove(key);
            }
        }
    }

    fn attach(&mut self, elem: E, key: CellKey) {
        self.cells.entry(key).or_default().push(elem);
    }
}

impl<E> SpatialIndex<E> for GridIndex<E>
where
    E: Copy + Eq + Hash + Send + Sync,
{
    fn dimensions(&self) -> usize {
        self.dims
    }

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn insert(&mut self, elem: E, coords: &[f64]) -> bool {
        if !coords_acceptable(self.dims, coords) || self.positions.contains_key(&elem) {
            return false;
        }
        let key = self.cell_of(coords);
        self.attach(elem, key);
        self.positions.insert(elem, coords.into());
        true
    }

    fn remove(&mut self, elem: E, coords: &[f64]) -> bool {
        match self.positions.get(&elem) {
            Some(stored) if stored.as_slice() == coords => {}
            _ => return false,
        }
        let key = self.cell_of(coords);
        self.detach(elem, &key);
        self.positions.shift_remove(&elem);
        true
    }

    fn move_element(&mut self, elem: E, from: &[f64], to: &[f64]) -> bool {
        if !coords_acceptable(self.dims, to) {
            return false;
        }
        match self.positions.get(&elem) {
            Some(stored) if stored.as_slice() == from => {}
            _ => return false,
        }
        let old_key = self.cell_of(from);
        let new_key = self.cell_of(to);
        if old_key != new_key {
            self.detach(elem, &old_key);
            self.attach(elem, new_key);
        }
        if let Some(stored) = self.positions.get_mut(&elem) {
            *stored = to.into();
        }
        true
    }

    fn query(&self, bbox: &BoundingBox) -> Vec<E> {
        if bbox.dimensions() != self.dims || self.positions.is_empty() {
            return Vec::new();
        }
        let lo = self.cell_of(bbox.min());
        let hi = self.cell_of(bbox.max());

        // Number of cells the box spans, saturating.
        let span = lo.iter().zip(&hi).fold(1u128, |acc, (l, h)| {
            let width = (i128::from(*h) - i128::from(*l) + 1) as u128;
            acc.saturating_mul(width)
        });

        let mut hits = Vec::new();
        let mut take = |bucket: &Vec<E>| {
            for elem in bucket {
                if self
                    .positions
                    .get(elem)
                    .is_some_and(|c| bbox.contains(c))
                {
                    hits.push(*elem);
                }
            }
        };

        if span > self.cells.len() as u128 {
            for (key, bucket) in &self.cells {
                if key.iter().zip(lo.iter().zip(&hi)).all(|(k, (l, h))| l <= k && k <= h) {
                    take(bucket);
                }
            }
        } else {
            let mut cursor = lo.clone();
            'walk: loop {
                if let Some(bucket) = self.cells.get(&cursor) {
                    take(bucket);
                }
                // Odometer increment over [lo, hi].
                for axis in 0..self.dims {
                    if cursor[axis] < hi[axis] {
                        cursor[axis] += 1;
                        continue 'walk;
                    }
                    cursor[axis] = lo[axis];
                }
                break;
            }
        }
        hits
    }
}
