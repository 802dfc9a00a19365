//! Linear-scan reference index.

use std::hash::Hash;

use alembic_core::position::Coords;
use indexmap::IndexMap;

use crate::bbox::BoundingBox;
use crate::error::SpaceError;
use crate::index::{coords_acceptable, SpatialIndex};

/// A [`SpatialIndex`] that scans every element on each query.
///
/// O(n) queries, exact results. Used as the oracle that faster backends
/// are verified against, and perfectly adequate for small populations.
#[derive(Clone, Debug)]
pub struct BruteForceIndex<E> {
    dims: usize,
    elements: IndexMap<E, Coords>,
}

impl<E: Copy + Eq + Hash> BruteForceIndex<E> {
    /// Create an empty index for `dims`-dimensional coordinates.
    pub fn new(dims: usize) -> Result<Self, SpaceError> {
        if dims == 0 {
            return Err(SpaceError::ZeroDimensions);
        }
        Ok(Self {
            dims,
            elements: IndexMap::new(),
        })
    }
}

impl<E> SpatialIndex<E> for BruteForceIndex<E>
where
    E: Copy + Eq + Hash + Send + Sync,
{
    fn dimensions(&self) -> usize {
        self.dims
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn insert(&mut self, elem: E, coords: &[f64]) -> bool {
        if !coords_acceptable(self.dims, coords) || self.elements.contains_key(&elem) {
            return false;
        }
        self.elements.insert(elem, coords.into());
        true
    }

    fn remove(&mut self, elem: E, coords: &[f64]) -> bool {
        match self.elements.get(&elem) {
            Some(stored) if stored.as_slice() == coords => {
                self.elements.shift_remove(&elem);
                true
            }
            _ => false,
        }
    }

    fn move_element(&mut self, elem: E, from: &[f64], to: &[f64]) -> bool {
        if !coords_acceptable(self.dims, to) {
            return false;
        }
        match self.elements.get_mut(&elem) {
            Some(stored) if stored.as_slice() == from => {
                *stored = to.into();
                true
            }
            _ => false,
        }
    }

    fn query(&self, bbox: &BoundingBox) -> Vec<E> {
        self.elements
            .iter()
            .filter(|(_, coords)| bbox.contains(coords))
            .map(|(e, _)| *e)
            .collect()
    }
}
