//! Sorted neighbor sets.

use alembic_core::{NodeId, Position};

use crate::environment::Environment;
use crate::error::EnvironmentError;
use crate::node::Concentration;

/// A node together with the nodes it can currently interact with.
///
/// A snapshot value: whoever computes it owns it, and it is recomputed
/// after any mutation that may change adjacency. Neighbor ids are kept
/// sorted ascending without duplicates, so membership is a binary search.
///
/// ```
/// use alembic_core::NodeId;
/// use alembic_model::Neighborhood;
///
/// let mut n = Neighborhood::new(NodeId(0), [NodeId(5), NodeId(2), NodeId(5)]);
/// assert_eq!(n.neighbors(), &[NodeId(2), NodeId(5)]);
/// n.add_neighbor(NodeId(3));
/// assert!(n.contains(NodeId(3)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Neighborhood {
    center: NodeId,
    neighbors: Vec<NodeId>,
}

impl Neighborhood {
    /// Create a neighborhood; `ids` are sorted and deduplicated.
    pub fn new(center: NodeId, ids: impl IntoIterator<Item = NodeId>) -> Self {
        let mut neighbors: Vec<NodeId> = ids.into_iter().collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        Self { center, neighbors }
    }

    /// A neighborhood with no neighbors.
    pub fn empty(center: NodeId) -> Self {
        Self {
            center,
            neighbors: Vec::new(),
        }
    }

    /// The node this neighborhood surrounds.
    pub fn center(&self) -> NodeId {
        self.center
    }

    /// Neighbor ids, ascending.
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    /// Whether `id` is a neighbor.
    pub fn contains(&self, id: NodeId) -> bool {
        self.neighbors.binary_search(&id).is_ok()
    }

    /// Add a neighbor. No effect if already present.
    pub fn add_neighbor(&mut self, id: NodeId) {
        if let Err(at) = self.neighbors.binary_search(&id) {
            self.neighbors.insert(at, id);
        }
    }

    /// Remove a neighbor. No effect if absent.
    pub fn remove_neighbor(&mut self, id: NodeId) {
        if let Ok(at) = self.neighbors.binary_search(&id) {
            self.neighbors.remove(at);
        }
    }

    /// Neighbors whose distance from the center lies strictly between
    /// `min` and `max`, in ascending id order.
    pub fn between_range<T: Concentration, P: Position>(
        &self,
        min: f64,
        max: f64,
        env: &Environment<T, P>,
    ) -> Result<Vec<NodeId>, EnvironmentError> {
        let mut found = Vec::new();
        for id in &self.neighbors {
            let d = env.distance_between_nodes(self.center, *id)?;
            if min < d && d < max {
                found.push(*id);
            }
        }
        Ok(found)
    }

    /// The `n`-th neighbor, wrapping around modulo the size.
    ///
    /// `None` only when the neighborhood is empty.
    pub fn neighbor_by_number(&self, n: usize) -> Option<NodeId> {
        if self.neighbors.is_empty() {
            None
        } else {
            Some(self.neighbors[n % self.neighbors.len()])
        }
    }

    /// Iterate neighbor ids, ascending.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.neighbors.iter().copied()
    }

    /// Number of neighbors.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether there are no neighbors.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

impl<'a> IntoIterator for &'a Neighborhood {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.neighbors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::node::Node;
    use alembic_core::Euclidean;
    use proptest::prelude::*;

    #[test]
    fn add_remove_are_idempotent() {
        let mut n = Neighborhood::empty(NodeId(0));
        n.add_neighbor(NodeId(4));
        n.add_neighbor(NodeId(1));
        n.add_neighbor(NodeId(4));
        assert_eq!(n.neighbors(), &[NodeId(1), NodeId(4)]);
        n.remove_neighbor(NodeId(7));
        n.remove_neighbor(NodeId(1));
        n.remove_neighbor(NodeId(1));
        assert_eq!(n.neighbors(), &[NodeId(4)]);
    }

    #[test]
    fn neighbor_by_number_wraps() {
        let n = Neighborhood::new(NodeId(0), [NodeId(3), NodeId(1), NodeId(2)]);
        assert_eq!(n.neighbor_by_number(0), Some(NodeId(1)));
        assert_eq!(n.neighbor_by_number(4), Some(NodeId(2)));
        assert_eq!(Neighborhood::empty(NodeId(0)).neighbor_by_number(0), None);
    }

    #[test]
    fn equality_needs_same_center() {
        let a = Neighborhood::new(NodeId(0), [NodeId(1)]);
        let b = Neighborhood::new(NodeId(2), [NodeId(1)]);
        assert_ne!(a, b);
        assert_eq!(a, Neighborhood::new(NodeId(0), [NodeId(1), NodeId(1)]));
    }

    #[test]
    fn between_range_bounds_are_exclusive() {
        let mut env: Environment<f64, Euclidean> =
            Environment::new(2, EnvironmentConfig::default()).unwrap();
        for (i, x) in [0.0, 1.0, 2.0, 3.0].into_iter().enumerate() {
            env.add_node(Node::new(NodeId(i as u32)), Euclidean::new([x, 0.0]).unwrap())
                .unwrap();
        }
        let n = Neighborhood::new(NodeId(0), [NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(n.between_range(1.0, 3.0, &env).unwrap(), vec![NodeId(2)]);
        assert_eq!(
            n.between_range(0.5, 3.5, &env).unwrap(),
            vec![NodeId(1), NodeId(2), NodeId(3)]
        );
    }

    #[test]
    fn between_range_reports_missing_nodes() {
        let env: Environment<f64, Euclidean> =
            Environment::new(2, EnvironmentConfig::default()).unwrap();
        let n = Neighborhood::new(NodeId(0), [NodeId(1)]);
        assert!(matches!(
            n.between_range(0.0, 1.0, &env),
            Err(EnvironmentError::NodeNotFound { .. })
        ));
    }

    proptest! {
        #[test]
        fn stays_sorted_and_unique(ops in proptest::collection::vec((any::<bool>(), 0u32..20), 0..100)) {
            let mut n = Neighborhood::empty(NodeId(0));
            let mut model = std::collections::BTreeSet::new();
            for (add, id) in ops {
                if add {
                    n.add_neighbor(NodeId(id));
                    model.insert(id);
                } else {
                    n.remove_neighbor(NodeId(id));
                    model.remove(&id);
                }
                prop_assert!(n.neighbors().windows(2).all(|w| w[0] < w[1]));
            }
            let expected: Vec<NodeId> = model.into_iter().map(NodeId).collect();
            prop_assert_eq!(n.neighbors(), expected.as_slice());
        }
    }
}
