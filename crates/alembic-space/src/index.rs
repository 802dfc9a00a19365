//! The core [`SpatialIndex`] trait.

use std::hash::Hash;

use crate::bbox::BoundingBox;

/// A D-dimensional point index over elements of type `E`.
///
/// Environments keep every node in exactly one index, at exactly the
/// position recorded in their node-to-position map. The boolean results
/// report whether the index accepted the mutation; a `false` means the
/// caller's bookkeeping and the index have diverged, which the caller
/// treats as fatal.
///
/// # Contract
///
/// - `insert` rejects duplicates, dimension mismatches and non-finite
///   coordinates.
/// - `remove` and `move_element` reject absent elements and `from`
///   coordinates that differ from the stored ones.
/// - `query` returns every element whose coordinates lie in the box
///   (inclusive). Returning extra elements is allowed: callers post-filter
///   by exact distance. A box of the wrong dimensionality matches nothing.
///
/// # Thread Safety
///
/// `Sync` is required because range queries may fan their post-filter out
/// across scoped threads that share `&Environment`.
pub trait SpatialIndex<E>: Send + Sync
where
    E: Copy + Eq + Hash,
{
    /// Number of dimensions every stored coordinate has.
    fn dimensions(&self) -> usize;

    /// Number of stored elements.
    fn len(&self) -> usize;

    /// Whether the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `elem` at `coords`.
    fn insert(&mut self, elem: E, coords: &[f64]) -> bool;

    /// Remove `elem`, which must currently be stored at `coords`.
    fn remove(&mut self, elem: E, coords: &[f64]) -> bool;

    /// Relocate `elem` from `from` to `to`.
    ///
    /// On rejection the index is left unchanged.
    fn move_element(&mut self, elem: E, from: &[f64], to: &[f64]) -> bool;

    /// Elements whose coordinates may lie inside `bbox`.
    fn query(&self, bbox: &BoundingBox) -> Vec<E>;
}

/// Shared validation for backend `insert`/`move_element` targets.
pub(crate) fn coords_acceptable(dims: usize, coords: &[f64]) -> bool {
    coords.len() == dims && coords.iter().all(|c| c.is_finite())
}
