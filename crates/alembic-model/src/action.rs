//! The [`Action`] contract and the stock molecule and removal actions.
//!
//! Movement actions live in [`crate::movement`].

use std::fmt;

use alembic_core::{Context, Molecule, NodeId, Position};

use crate::environment::Environment;
use crate::error::{ActionError, EnvironmentError};
use crate::node::Concentration;

/// An effect of a reaction firing.
///
/// Actions hold only the id of their owning node and receive the
/// environment mutably when executed.
///
/// # Contract
///
/// - `modified_molecules` lists every molecule `execute` may change, or
///   `None` if it may change any molecule. Actions that only move or
///   remove nodes declare no molecules; the engine picks up their
///   effects from the environment's mutation journal.
/// - `context` says how far from the owning node `execute` writes.
pub trait Action<T, P>: fmt::Debug + Send + Sync {
    /// The owning node.
    fn node(&self) -> NodeId;

    /// How far from the owning node this action writes.
    fn context(&self) -> Context;

    /// Molecules this action writes, or `None` for "any molecule".
    fn modified_molecules(&self) -> Option<&[Molecule]>;

    /// Apply the effect.
    fn execute(&mut self, env: &mut Environment<T, P>) -> Result<(), ActionError>;

    /// A copy of this action bound to another node.
    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>>;
}

// ── SetConcentration ────────────────────────────────────────────

/// Sets one molecule on the owning node to a fixed value.
#[derive(Clone, Debug)]
pub struct SetConcentration<T> {
    node: NodeId,
    molecule: Molecule,
    value: T,
}

impl<T> SetConcentration<T> {
    /// Set `molecule` to `value` on `node`.
    pub fn new(node: NodeId, molecule: Molecule, value: T) -> Self {
        Self {
            node,
            molecule,
            value,
        }
    }
}

impl<T: Concentration, P: Position> Action<T, P> for SetConcentration<T> {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn modified_molecules(&self) -> Option<&[Molecule]> {
        Some(std::slice::from_ref(&self.molecule))
    }

    fn execute(&mut self, env: &mut Environment<T, P>) -> Result<(), ActionError> {
        let node = env
            .node_mut(self.node)
            .ok_or(EnvironmentError::NodeNotFound { node: self.node })?;
        node.set_concentration(self.molecule.clone(), self.value.clone());
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>> {
        Box::new(Self::new(node, self.molecule.clone(), self.value.clone()))
    }
}

// ── RemoveNode ──────────────────────────────────────────────────

/// Removes the owning node from the environment.
#[derive(Clone, Copy, Debug)]
pub struct RemoveNode {
    node: NodeId,
}

impl RemoveNode {
    /// Remove `node` when executed.
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }
}

impl<T: Concentration, P: Position> Action<T, P> for RemoveNode {
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
        env.remove_node(self.node)?;
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>> {
        Box::new(Self::new(node))
    }
}
