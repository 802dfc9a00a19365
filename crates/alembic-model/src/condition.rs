//! The [`Condition`] contract and the stock [`ContainsMolecule`] condition.

use std::fmt;

use alembic_core::{Context, Molecule, NodeId, Position};

use crate::environment::Environment;
use crate::node::Concentration;

/// A guard on a reaction, evaluated against the environment.
///
/// Conditions hold only the id of their owning node and receive the
/// environment on every call, so they never alias environment state.
///
/// # Contract
///
/// - `propensity_conditioning` returns a non-negative factor. A negative
///   value aborts the simulation; zero disables the owning reaction.
/// - `influencing_molecules` lists every molecule whose concentration can
///   change the result of `is_valid` or `propensity_conditioning`, or
///   `None` if the condition may depend on any molecule.
/// - `context` says how far from the owning node the condition reads.
pub trait Condition<T, P>: fmt::Debug + Send + Sync {
    /// The owning node.
    fn node(&self) -> NodeId;

    /// How far from the owning node this condition reads.
    fn context(&self) -> Context;

    /// Molecules this condition reads, or `None` for "any molecule".
    fn influencing_molecules(&self) -> Option<&[Molecule]>;

    /// Whether the owning reaction may fire.
    fn is_valid(&self, env: &Environment<T, P>) -> bool;

    /// Multiplicative factor applied to the owning reaction's rate.
    fn propensity_conditioning(&self, env: &Environment<T, P>) -> f64;

    /// A copy of this condition bound to another node.
    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Condition<T, P>>;
}

/// Valid iff the owning node holds a molecule, whatever its concentration.
#[derive(Clone, Debug)]
pub struct ContainsMolecule {
    node: NodeId,
    molecule: Molecule,
}

impl ContainsMolecule {
    /// Guard on `node` holding `molecule`.
    pub fn new(node: NodeId, molecule: Molecule) -> Self {
        Self { node, molecule }
    }
}

impl<T: Concentration, P: Position> Condition<T, P> for ContainsMolecule {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn influencing_molecules(&self) -> Option<&[Molecule]> {
        Some(std::slice::from_ref(&self.molecule))
    }

    fn is_valid(&self, env: &Environment<T, P>) -> bool {
        env.node(self.node)
            .is_some_and(|n| n.contains(&self.molecule))
    }

    fn propensity_conditioning(&self, env: &Environment<T, P>) -> f64 {
        if self.is_valid(env) {
            1.0
        } else {
            0.0
        }
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Condition<T, P>> {
        Box::new(Self::new(node, self.molecule.clone()))
    }
}
