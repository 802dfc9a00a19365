//! The [`Reaction`]: conditions, actions and a time distribution on a node.

use std::cmp::Ordering;
use std::fmt;

use alembic_core::{
    spread_hash, Context, IdGenerator, MoleculeSet, NodeId, Position, ReactionId, Time,
};
use tracing::error;

use crate::action::Action;
use crate::condition::Condition;
use crate::distribution::TimeDistribution;
use crate::environment::Environment;
use crate::error::ReactionError;
use crate::node::Concentration;

/// How a reaction turns its conditions into a propensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RateModel {
    /// Mass-action style: the distribution's rate times every condition's
    /// conditioning factor. A zero factor short-circuits to zero.
    #[default]
    Chemical,
    /// The distribution's rate, whatever the conditions say. Conditions
    /// still gate execution.
    Event,
}

/// Total scheduling order: tau first, reaction id to break ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScheduleKey {
    /// Putative firing time.
    pub tau: Time,
    /// Tie-breaker.
    pub reaction: ReactionId,
}

/// A stochastic event hosted by a node.
///
/// Identity is the reaction id; the spread hash of the id is exposed for
/// hash-based collections that benefit from a well-distributed key.
///
/// Influence sets and contexts are derived whenever the condition or
/// action list is replaced: the input context is the least strict
/// context among the conditions, the output context the least strict
/// among the actions, and any contributor declaring `None` molecules
/// makes the corresponding set unbounded.
pub struct Reaction<T, P> {
    id: ReactionId,
    hash: i32,
    node: NodeId,
    model: RateModel,
    distribution: Box<dyn TimeDistribution>,
    conditions: Vec<Box<dyn Condition<T, P>>>,
    actions: Vec<Box<dyn Action<T, P>>>,
    influencing: MoleculeSet,
    influenced: MoleculeSet,
    input_context: Context,
    output_context: Context,
    rate: f64,
}

impl<T: Concentration, P: Position> Reaction<T, P> {
    /// Create a reaction on `node` with the next id from `ids`.
    pub fn new(
        ids: &IdGenerator,
        node: NodeId,
        distribution: Box<dyn TimeDistribution>,
        model: RateModel,
    ) -> Self {
        Self::with_id(ids.next_reaction_id(), node, distribution, model)
    }

    /// Create a reaction with an explicit id.
    pub fn with_id(
        id: ReactionId,
        node: NodeId,
        distribution: Box<dyn TimeDistribution>,
        model: RateModel,
    ) -> Self {
        Self {
            id,
            hash: spread_hash(id.0),
            node,
            model,
            distribution,
            conditions: Vec::new(),
            actions: Vec::new(),
            influencing: MoleculeSet::empty(),
            influenced: MoleculeSet::empty(),
            input_context: Context::Local,
            output_context: Context::Local,
            rate: 0.0,
        }
    }

    /// Builder form of [`set_conditions`](Self::set_conditions).
    pub fn with_conditions(mut self, conditions: Vec<Box<dyn Condition<T, P>>>) -> Self {
        self.set_conditions(conditions);
        self
    }

    /// Builder form of [`set_actions`](Self::set_actions).
    pub fn with_actions(mut self, actions: Vec<Box<dyn Action<T, P>>>) -> Self {
        self.set_actions(actions);
        self
    }

    /// Replace the conditions and rederive influencing molecules and the
    /// input context.
    pub fn set_conditions(&mut self, conditions: Vec<Box<dyn Condition<T, P>>>) {
        let mut influencing = MoleculeSet::empty();
        for c in &conditions {
            influencing.extend_with(c.influencing_molecules());
        }
        self.input_context = Context::least_strict_of(conditions.iter().map(|c| c.context()));
        self.influencing = influencing;
        self.conditions = conditions;
    }

    /// Replace the actions and rederive influenced molecules and the
    /// output context.
    pub fn set_actions(&mut self, actions: Vec<Box<dyn Action<T, P>>>) {
        let mut influenced = MoleculeSet::empty();
        for a in &actions {
            influenced.extend_with(a.modified_molecules());
        }
        self.output_context = Context::least_strict_of(actions.iter().map(|a| a.context()));
        self.influenced = influenced;
        self.actions = actions;
    }

    /// Whether every condition holds. Stops at the first failing one.
    pub fn can_execute(&self, env: &Environment<T, P>) -> bool {
        self.conditions.iter().all(|c| c.is_valid(env))
    }

    /// Run every action in order. The first failure aborts the rest.
    pub fn execute(&mut self, env: &mut Environment<T, P>) -> Result<(), ReactionError> {
        for (i, action) in self.actions.iter_mut().enumerate() {
            if let Err(source) = action.execute(env) {
                error!(reaction = %self.id, node = %self.node, action = i, %source, "action failed");
                return Err(ReactionError::Action {
                    reaction: self.id,
                    node: self.node,
                    action: i,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Recompute the rate and forward it to the time distribution.
    ///
    /// `executed` is true right after this reaction fired, false for the
    /// initial scheduling pass and when only its inputs changed.
    pub fn update(
        &mut self,
        now: Time,
        executed: bool,
        env: &Environment<T, P>,
    ) -> Result<(), ReactionError> {
        self.rate = match self.model {
            RateModel::Chemical => self.conditioned_rate(env)?,
            RateModel::Event => self.distribution.rate(),
        };
        self.distribution
            .update(now, executed, self.rate)
            .map_err(|source| {
                error!(reaction = %self.id, node = %self.node, %source, "distribution update failed");
                ReactionError::Distribution {
                    reaction: self.id,
                    node: self.node,
                    source,
                }
            })
    }

    fn conditioned_rate(&self, env: &Environment<T, P>) -> Result<f64, ReactionError> {
        let mut rate = self.distribution.rate();
        for (i, c) in self.conditions.iter().enumerate() {
            let factor = c.propensity_conditioning(env);
            if factor == 0.0 {
                return Ok(0.0);
            }
            if factor < 0.0 {
                error!(
                    reaction = %self.id,
                    node = %self.node,
                    condition = i,
                    factor,
                    "negative propensity conditioning"
                );
                return Err(ReactionError::NegativeConditioning {
                    reaction: self.id,
                    node: self.node,
                    condition: i,
                    value: factor,
                });
            }
            rate *= factor;
        }
        Ok(rate)
    }

    /// A copy of this reaction on another node, with a fresh id.
    ///
    /// The distribution is cloned with its tau but without history;
    /// conditions and actions are cloned onto `node`.
    pub fn clone_on_new_node(&self, node: NodeId, ids: &IdGenerator) -> Self {
        let id = ids.next_reaction_id();
        let conditions = self
            .conditions
            .iter()
            .map(|c| c.clone_on_new_node(node))
            .collect();
        let actions = self
            .actions
            .iter()
            .map(|a| a.clone_on_new_node(node))
            .collect();
        Self::with_id(id, node, self.distribution.clone_box(), self.model)
            .with_conditions(conditions)
            .with_actions(actions)
    }
}

impl<T, P> Reaction<T, P> {
    /// The reaction's id.
    pub fn id(&self) -> ReactionId {
        self.id
    }

    /// The spread hash of the id.
    pub fn hash_code(&self) -> i32 {
        self.hash
    }

    /// The hosting node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// How the rate is derived.
    pub fn rate_model(&self) -> RateModel {
        self.model
    }

    /// Putative time of the next firing.
    pub fn tau(&self) -> Time {
        self.distribution.next_occurrence()
    }

    /// Rate computed by the last [`update`](Self::update).
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Order two reactions by tau alone.
    pub fn cmp_by_tau(&self, other: &Self) -> Ordering {
        self.tau().cmp(&other.tau())
    }

    /// Deterministic queue key: tau, then id.
    pub fn schedule_key(&self) -> ScheduleKey {
        ScheduleKey {
            tau: self.tau(),
            reaction: self.id,
        }
    }

    /// The time distribution.
    pub fn distribution(&self) -> &dyn TimeDistribution {
        self.distribution.as_ref()
    }

    /// The conditions, in evaluation order.
    pub fn conditions(&self) -> &[Box<dyn Condition<T, P>>] {
        &self.conditions
    }

    /// The actions, in execution order.
    pub fn actions(&self) -> &[Box<dyn Action<T, P>>] {
        &self.actions
    }

    /// Molecules read by the conditions.
    pub fn influencing_molecules(&self) -> &MoleculeSet {
        &self.influencing
    }

    /// Molecules written by the actions.
    pub fn influenced_molecules(&self) -> &MoleculeSet {
        &self.influenced
    }

    /// Least strict context among the conditions.
    pub fn input_context(&self) -> Context {
        self.input_context
    }

    /// Least strict context among the actions.
    pub fn output_context(&self) -> Context {
        self.output_context
    }
}

impl<T, P> PartialEq for Reaction<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T, P> Eq for Reaction<T, P> {}

impl<T, P> fmt::Debug for Reaction<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reaction")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("model", &self.model)
            .field("tau", &self.tau())
            .field("rate", &self.rate)
            .field("conditions", &self.conditions.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}
