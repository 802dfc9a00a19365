//! Stock actions that move their owning node.
//!
//! All of them act locally and declare no modified molecules: the
//! engine learns about moves from the environment's mutation journal.

use alembic_core::{lock_rng, Context, Molecule, NodeId, Position, PositionError, SharedRng};
use rand::Rng;

use crate::action::Action;
use crate::environment::{planar, Environment};
use crate::error::{ActionError, EnvironmentError};
use crate::node::Concentration;

fn current<T: Concentration, P: Position>(
    env: &Environment<T, P>,
    node: NodeId,
) -> Result<P, ActionError> {
    env.position(node)
        .cloned()
        .ok_or_else(|| EnvironmentError::NodeNotFound { node }.into())
}

// ── MoveToPosition ──────────────────────────────────────────────

/// Moves the owning node to a fixed absolute position.
#[derive(Clone, Debug)]
pub struct MoveToPosition<P> {
    node: NodeId,
    target: P,
}

impl<P> MoveToPosition<P> {
    /// Move `node` to `target` when executed.
    pub fn new(node: NodeId, target: P) -> Self {
        Self { node, target }
    }
}

impl<T: Concentration, P: Position> Action<T, P> for MoveToPosition<P> {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn modified_molecules(&self) -> Option<&[Molecule]> {
        Some(&[][..])
    }

    fn execute(&mut self, env: &mut Environment<T, P>) -> Result<(), ActionError> {
        env.move_node_to_position(self.node, self.target.clone())?;
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>> {
        Box::new(Self::new(node, self.target.clone()))
    }
}

// ── MoveBy ──────────────────────────────────────────────────────

/// Translates the owning node by a fixed offset.
#[derive(Clone, Debug)]
pub struct MoveBy<P> {
    node: NodeId,
    delta: P,
}

impl<P> MoveBy<P> {
    /// Translate `node` by `delta` when executed.
    pub fn new(node: NodeId, delta: P) -> Self {
        Self { node, delta }
    }
}

impl<T: Concentration, P: Position> Action<T, P> for MoveBy<P> {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn modified_molecules(&self) -> Option<&[Molecule]> {
        Some(&[][..])
    }

    fn execute(&mut self, env: &mut Environment<T, P>) -> Result<(), ActionError> {
        env.move_node(self.node, &self.delta)?;
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>> {
        Box::new(Self::new(node, self.delta.clone()))
    }
}

// ── FakeMove ────────────────────────────────────────────────────

/// Moves the owning node onto its own position.
///
/// Changes nothing but still journals a move, which forces the engine
/// to recompute the node's neighborhood.
#[derive(Clone, Copy, Debug)]
pub struct FakeMove {
    node: NodeId,
}

impl FakeMove {
    /// Touch `node` when executed.
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }
}

impl<T: Concentration, P: Position> Action<T, P> for FakeMove {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn modified_molecules(&self) -> Option<&[Molecule]> {
        Some(&[][..])
    }

    fn execute(&mut self, env: &mut Environment<T, P>) -> Result<(), ActionError> {
        let here = current(env, self.node)?;
        env.move_node_to_position(self.node, here)?;
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>> {
        Box::new(Self::new(node))
    }
}

// ── MoveForwardAndTeleport ──────────────────────────────────────

/// Walks the owning node along +x in steps of `dx` on a fixed row,
/// teleporting it back to `min_x` once it has passed `max_x`.
///
/// The row is the node's y coordinate the first time the action runs.
/// Two-dimensional environments only.
#[derive(Clone, Debug)]
pub struct MoveForwardAndTeleport {
    node: NodeId,
    dx: f64,
    min_x: f64,
    max_x: f64,
    row: Option<f64>,
}

impl MoveForwardAndTeleport {
    /// Walk `node` by `dx` per firing within `[min_x, max_x]`.
    pub fn new(node: NodeId, dx: f64, min_x: f64, max_x: f64) -> Self {
        Self {
            node,
            dx,
            min_x,
            max_x,
            row: None,
        }
    }
}

impl<T: Concentration, P: Position> Action<T, P> for MoveForwardAndTeleport {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn modified_molecules(&self) -> Option<&[Molecule]> {
        Some(&[][..])
    }

    fn execute(&mut self, env: &mut Environment<T, P>) -> Result<(), ActionError> {
        let [x, y] = planar(&current(env, self.node)?)?;
        let y = *self.row.get_or_insert(y);
        let x = if x > self.max_x { self.min_x } else { x + self.dx };
        env.move_node_to_position(self.node, P::from_coordinates(&[x, y])?)?;
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>> {
        Box::new(Self::new(node, self.dx, self.min_x, self.max_x))
    }
}

// ── BrownianMove ────────────────────────────────────────────────

/// Random walk: each firing translates the owning node by an offset
/// drawn uniformly from `[-r/2, r/2)` on both axes.
///
/// Two-dimensional environments only.
#[derive(Clone, Debug)]
pub struct BrownianMove {
    node: NodeId,
    range: f64,
    rng: SharedRng,
}

impl BrownianMove {
    /// Jitter `node` within a square of side `range` per firing.
    pub fn new(node: NodeId, range: f64, rng: SharedRng) -> Self {
        Self { node, range, rng }
    }

    /// Side of the jitter square.
    pub fn range(&self) -> f64 {
        self.range
    }
}

impl<T: Concentration, P: Position> Action<T, P> for BrownianMove {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn modified_molecules(&self) -> Option<&[Molecule]> {
        Some(&[][..])
    }

    fn execute(&mut self, env: &mut Environment<T, P>) -> Result<(), ActionError> {
        if env.dimensions() != 2 {
            return Err(PositionError::IncompatibleDimension {
                left: 2,
                right: env.dimensions(),
            }
            .into());
        }
        let step = {
            let mut rng = lock_rng(&self.rng);
            [
                (rng.gen::<f64>() - 0.5) * self.range,
                (rng.gen::<f64>() - 0.5) * self.range,
            ]
        };
        env.move_node(self.node, &P::from_coordinates(&step)?)?;
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>> {
        Box::new(Self::new(node, self.range, self.rng.clone()))
    }
}
