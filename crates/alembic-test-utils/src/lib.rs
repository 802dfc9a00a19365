//! Test utilities and mock types for Alembic development.
//!
//! Provides mock implementations of the model contracts ([`Condition`],
//! [`Action`]) whose behavior is fixed by public fields, plus
//! environment builders in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alembic_core::{Context, Molecule, NodeId, Position};
use alembic_model::{Action, ActionError, Concentration, Condition, Environment};

/// Condition with a fixed verdict and conditioning factor.
///
/// `reads: None` declares a dependency on every molecule.
#[derive(Clone, Debug)]
pub struct MockCondition {
    pub node: NodeId,
    pub valid: bool,
    pub factor: f64,
    pub context: Context,
    pub reads: Option<Vec<Molecule>>,
}

impl MockCondition {
    /// A valid, neutral (factor 1) local condition reading `reads`.
    pub fn new(node: NodeId, reads: &[&str]) -> Self {
        Self {
            node,
            valid: true,
            factor: 1.0,
            context: Context::Local,
            reads: Some(reads.iter().map(Molecule::new).collect()),
        }
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn reading_everything(mut self) -> Self {
        self.reads = None;
        self
    }
}

impl<T: Concentration, P: Position> Condition<T, P> for MockCondition {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        self.context
    }

    fn influencing_molecules(&self) -> Option<&[Molecule]> {
        self.reads.as_deref()
    }

    fn is_valid(&self, _env: &Environment<T, P>) -> bool {
        self.valid
    }

    fn propensity_conditioning(&self, _env: &Environment<T, P>) -> f64 {
        self.factor
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Condition<T, P>> {
        Box::new(Self {
            node,
            ..self.clone()
        })
    }
}

/// Action that records its executions in a shared counter and writes
/// nothing to the environment.
///
/// Clones made by `clone_on_new_node` share the counter, so a test can
/// observe a whole family of reactions through one handle.
#[derive(Clone, Debug)]
pub struct CountingAction {
    pub node: NodeId,
    pub context: Context,
    pub writes: Option<Vec<Molecule>>,
    pub calls: Arc<AtomicUsize>,
}

impl CountingAction {
    pub fn new(node: NodeId, writes: &[&str]) -> Self {
        Self {
            node,
            context: Context::Local,
            writes: Some(writes.iter().map(Molecule::new).collect()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn writing_everything(mut self) -> Self {
        self.writes = None;
        self
    }

    /// How many times `execute()` has run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<T: Concentration, P: Position> Action<T, P> for CountingAction {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        self.context
    }

    fn modified_molecules(&self) -> Option<&[Molecule]> {
        self.writes.as_deref()
    }

    fn execute(&mut self, _env: &mut Environment<T, P>) -> Result<(), ActionError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>> {
        Box::new(Self {
            node,
            ..self.clone()
        })
    }
}

/// Action that increments a molecule on its node by one, starting from
/// zero when absent.
#[derive(Clone, Debug)]
pub struct IncrementAction {
    pub node: NodeId,
    pub molecule: Molecule,
}

impl IncrementAction {
    pub fn new(node: NodeId, molecule: &str) -> Self {
        Self {
            node,
            molecule: Molecule::new(molecule),
        }
    }
}

impl<P: Position> Action<f64, P> for IncrementAction {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn modified_molecules(&self) -> Option<&[Molecule]> {
        Some(std::slice::from_ref(&self.molecule))
    }

    fn execute(&mut self, env: &mut Environment<f64, P>) -> Result<(), ActionError> {
        let node = env.node_mut(self.node).ok_or_else(|| ActionError::Failed {
            node: self.node,
            reason: "node is gone".into(),
        })?;
        let current = node.concentration(&self.molecule).copied().unwrap_or(0.0);
        node.set_concentration(self.molecule.clone(), current + 1.0);
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<f64, P>> {
        Box::new(Self {
            node,
            molecule: self.molecule.clone(),
        })
    }
}

/// Fails deterministically after a configurable number of successful calls.
#[derive(Clone, Debug)]
pub struct FailingAction {
    pub node: NodeId,
    pub succeed_count: usize,
    call_count: usize,
}

impl FailingAction {
    /// Create an action that succeeds `succeed_count` times then fails.
    pub fn new(node: NodeId, succeed_count: usize) -> Self {
        Self {
            node,
            succeed_count,
            call_count: 0,
        }
    }

    /// How many times `execute()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count
    }
}

impl<T: Concentration, P: Position> Action<T, P> for FailingAction {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Local
    }

    fn modified_molecules(&self) -> Option<&[Molecule]> {
        Some(&[][..])
    }

    fn execute(&mut self, _env: &mut Environment<T, P>) -> Result<(), ActionError> {
        let n = self.call_count;
        self.call_count += 1;
        if n >= self.succeed_count {
            return Err(ActionError::Failed {
                node: self.node,
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Ok(())
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Action<T, P>> {
        Box::new(Self::new(node, self.succeed_count))
    }
}
