//! Admission hooks consulted when nodes enter or leave an environment.

use alembic_core::{Position, PositionError};
use alembic_space::{BoundingBox, SpaceError};

use crate::node::Node;

/// Environment-specific admission and placement rules.
///
/// [`Environment::add_node`](crate::Environment::add_node) calls
/// `should_admit`, then `insertion_position`, then `on_added` once the node
/// is stored. `on_removed` runs after a node has left. All methods have
/// permissive defaults.
pub trait AdmissionPolicy<T, P>: Send + Sync {
    /// Whether `node` may join at `requested`.
    fn should_admit(&self, _node: &Node<T>, _requested: &P) -> bool {
        true
    }

    /// Where an admitted node actually lands (clamping, snapping).
    fn insertion_position(&self, _node: &Node<T>, requested: P) -> Result<P, PositionError> {
        Ok(requested)
    }

    /// Called after `node` has been stored at `position`.
    fn on_added(&mut self, _node: &Node<T>, _position: &P) {}

    /// Called after `node` has been removed from `last_position`.
    fn on_removed(&mut self, _node: &Node<T>, _last_position: &P) {}
}

/// Admits every node where it asks to be.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenPolicy;

impl<T, P> AdmissionPolicy<T, P> for OpenPolicy {}

/// What a [`BoundedPolicy`] does with nodes requested outside its box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutOfBounds {
    /// Refuse the node.
    Reject,
    /// Admit the node at the nearest point inside the box.
    Clamp,
}

/// Confines nodes to an axis-aligned box.
#[derive(Clone, Debug)]
pub struct BoundedPolicy {
    bounds: BoundingBox,
    mode: OutOfBounds,
}

impl BoundedPolicy {
    /// Create a policy for the box `[min, max]`.
    pub fn new(min: &[f64], max: &[f64], mode: OutOfBounds) -> Result<Self, SpaceError> {
        Ok(Self {
            bounds: BoundingBox::new(min, max)?,
            mode,
        })
    }

    /// The admitted region.
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }
}

impl<T, P: Position> AdmissionPolicy<T, P> for BoundedPolicy {
    fn should_admit(&self, _node: &Node<T>, requested: &P) -> bool {
        if requested.dimensions() != self.bounds.dimensions() {
            return false;
        }
        match self.mode {
            OutOfBounds::Reject => self.bounds.contains(&requested.coordinates()),
            OutOfBounds::Clamp => true,
        }
    }

    fn insertion_position(&self, _node: &Node<T>, requested: P) -> Result<P, PositionError> {
        let coords = requested.coordinates();
        if self.bounds.contains(&coords) {
            return Ok(requested);
        }
        let clamped: Vec<f64> = coords
            .iter()
            .zip(self.bounds.min().iter().zip(self.bounds.max()))
            .map(|(c, (lo, hi))| c.clamp(*lo, *hi))
            .collect();
        P::from_coordinates(&clamped)
    }
}
