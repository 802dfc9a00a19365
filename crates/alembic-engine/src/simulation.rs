//! The [`Simulation`]: a single-threaded discrete-event loop.
//!
//! Each step pops the reaction with the smallest `(tau, id)`, advances the
//! clock to its tau, runs it if its conditions hold, rewires the
//! neighborhoods touched by the resulting environment mutations, and then
//! reschedules the fired reaction followed by every reaction that depends
//! on it.

use std::time::Instant;

use alembic_core::{shared_rng, Context, IdGenerator, NodeId, Position, ReactionId, SharedRng, Time};
use alembic_model::{
    Concentration, Environment, EnvironmentError, EnvironmentMutation, LinkError, LinkingRule,
    Neighborhood, Reaction, ReactionError,
};
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{ConfigError, SimulationConfig};
use crate::dependency::depends_on;
use crate::metrics::StepMetrics;
use crate::queue::ReactionQueue;

// ── SimulationError ────────────────────────────────────────────────

/// Errors returned by [`Simulation`]. Everything but `UnknownNode` and
/// `DuplicateReaction` aborts the simulation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SimulationError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A reaction could not be evaluated, executed or rescheduled.
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    /// The environment rejected an operation.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    /// A neighborhood could not be computed.
    #[error(transparent)]
    Link(#[from] LinkError),
    /// A reaction names a node that is not in the environment.
    #[error("reaction {reaction} is hosted by node {node}, which is not in the environment")]
    UnknownNode {
        /// The rejected reaction.
        reaction: ReactionId,
        /// Its missing host.
        node: NodeId,
    },
    /// A reaction with the same id is already registered.
    #[error("reaction {reaction} is already registered")]
    DuplicateReaction {
        /// The rejected reaction.
        reaction: ReactionId,
    },
    /// An earlier fatal error stopped the simulation.
    #[error("simulation aborted by an earlier fatal error")]
    Aborted,
}

// ── Status ─────────────────────────────────────────────────────────

/// Why a simulation stopped stepping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishReason {
    /// No reaction is scheduled at a finite time.
    QueueExhausted,
    /// The next reaction is scheduled past the configured end time.
    EndTime,
    /// The configured step cap was reached.
    MaxSteps,
}

/// Lifecycle of a [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Built; neighborhoods and schedule not computed yet.
    Ready,
    /// Initialized and stepping.
    Running,
    /// Stopped normally. Further steps report the same reason.
    Finished(FinishReason),
    /// Stopped by a fatal error. Further steps fail.
    Aborted,
}

/// What a single [`Simulation::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The reaction's conditions held and its actions ran.
    Fired {
        /// The reaction that fired.
        reaction: ReactionId,
        /// The clock after the step.
        time: Time,
    },
    /// The reaction's turn came but a condition failed; it was only
    /// rescheduled.
    Skipped {
        /// The reaction that was skipped.
        reaction: ReactionId,
        /// The clock after the step.
        time: Time,
    },
    /// Nothing ran: the simulation is over.
    Finished(FinishReason),
}

// ── Simulation ─────────────────────────────────────────────────────

/// Owns an environment, its linking rule and every reaction, and drives
/// them through time.
///
/// Built in [`Status::Ready`]; the first [`step`](Self::step) (or an
/// explicit [`initialize`](Self::initialize)) computes every neighborhood
/// and schedules every reaction at time zero. The initial pass does not
/// count as a firing, so periodic reactions first fire at their start
/// time.
pub struct Simulation<T, P> {
    env: Environment<T, P>,
    rule: Box<dyn LinkingRule<T, P>>,
    config: SimulationConfig,
    ids: IdGenerator,
    rng: SharedRng,
    reactions: IndexMap<ReactionId, Reaction<T, P>>,
    global_readers: IndexSet<ReactionId>,
    queue: ReactionQueue,
    neighborhoods: IndexMap<NodeId, Neighborhood>,
    time: Time,
    steps: u64,
    status: Status,
    metrics: StepMetrics,
}

/// Neighborhood rewiring produced by one batch of mutations.
struct Rewiring<T, P> {
    /// Nodes whose neighborhood changed.
    changed: IndexSet<NodeId>,
    /// Reactions removed with their node.
    dropped: Vec<Reaction<T, P>>,
}

impl<T: Concentration, P: Position> Simulation<T, P> {
    /// Create a simulation over `env`, linking nodes with `rule`.
    pub fn new(
        env: Environment<T, P>,
        rule: impl LinkingRule<T, P> + 'static,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        env.config().validate().map_err(ConfigError::from)?;
        Ok(Self {
            env,
            rule: Box::new(rule),
            ids: IdGenerator::new(config.id_mode),
            rng: shared_rng(config.seed),
            config,
            reactions: IndexMap::new(),
            global_readers: IndexSet::new(),
            queue: ReactionQueue::new(),
            neighborhoods: IndexMap::new(),
            time: Time::ZERO,
            steps: 0,
            status: Status::Ready,
            metrics: StepMetrics::default(),
        })
    }

    /// Register a reaction on its node.
    ///
    /// After initialization the reaction is scheduled immediately at the
    /// current time.
    pub fn add_reaction(&mut self, reaction: Reaction<T, P>) -> Result<ReactionId, SimulationError> {
        if self.status == Status::Aborted {
            return Err(SimulationError::Aborted);
        }
        let id = reaction.id();
        let node = reaction.node();
        if self.reactions.contains_key(&id) {
            return Err(SimulationError::DuplicateReaction { reaction: id });
        }
        let host = self
            .env
            .node_mut(node)
            .ok_or(SimulationError::UnknownNode { reaction: id, node })?;
        host.add_reaction(id);
        if reaction.input_context() == Context::Global {
            self.global_readers.insert(id);
        }
        self.reactions.insert(id, reaction);

        if self.status != Status::Ready {
            if let Err(e) = self.schedule(id, false) {
                return Err(self.abort(e));
            }
        }
        Ok(id)
    }

    /// Unregister a reaction. It never fires again.
    pub fn remove_reaction(&mut self, id: ReactionId) -> Option<Reaction<T, P>> {
        self.queue.remove(id);
        self.global_readers.shift_remove(&id);
        let reaction = self.reactions.shift_remove(&id)?;
        if let Some(host) = self.env.node_mut(reaction.node()) {
            host.remove_reaction(id);
        }
        Some(reaction)
    }

    /// Compute every neighborhood and schedule every reaction.
    ///
    /// Idempotent once it has succeeded.
    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        match self.status {
            Status::Aborted => Err(SimulationError::Aborted),
            Status::Ready => match self.try_initialize() {
                Ok(()) => {
                    self.status = Status::Running;
                    info!(
                        nodes = self.env.node_count(),
                        reactions = self.reactions.len(),
                        seed = self.config.seed,
                        "simulation initialized"
                    );
                    Ok(())
                }
                Err(e) => Err(self.abort(e)),
            },
            Status::Running | Status::Finished(_) => Ok(()),
        }
    }

    fn try_initialize(&mut self) -> Result<(), SimulationError> {
        // Nodes placed before the simulation existed are covered by the
        // full pass below.
        self.env.drain_mutations();
        let nodes: Vec<NodeId> = self.env.node_ids().collect();
        for node in nodes {
            self.recompute_neighborhood(node)?;
            self.metrics.neighborhoods_total += 1;
        }
        let reactions: Vec<ReactionId> = self.reactions.keys().copied().collect();
        for id in reactions {
            self.schedule(id, false)?;
        }
        Ok(())
    }

    /// Run one event.
    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        match self.status {
            Status::Aborted => return Err(SimulationError::Aborted),
            Status::Finished(reason) => return Ok(StepOutcome::Finished(reason)),
            Status::Ready => self.initialize()?,
            Status::Running => {}
        }

        let start = Instant::now();
        self.metrics.begin_step();
        let result = self.try_step();
        self.metrics.total_us = start.elapsed().as_micros() as u64;
        self.metrics.finish_step();

        match result {
            Ok(StepOutcome::Finished(reason)) => {
                self.status = Status::Finished(reason);
                info!(?reason, time = %self.time, steps = self.steps, "simulation finished");
                Ok(StepOutcome::Finished(reason))
            }
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(self.abort(e)),
        }
    }

    /// Step until the simulation finishes or fails.
    pub fn run(&mut self) -> Result<FinishReason, SimulationError> {
        loop {
            if let StepOutcome::Finished(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    fn try_step(&mut self) -> Result<StepOutcome, SimulationError> {
        if self.config.max_steps.is_some_and(|max| self.steps >= max) {
            return Ok(StepOutcome::Finished(FinishReason::MaxSteps));
        }
        let Some(next) = self.queue.peek() else {
            return Ok(StepOutcome::Finished(FinishReason::QueueExhausted));
        };
        if next.tau.is_infinite() {
            return Ok(StepOutcome::Finished(FinishReason::QueueExhausted));
        }
        if next.tau > self.config.end_time {
            return Ok(StepOutcome::Finished(FinishReason::EndTime));
        }
        self.queue.pop();

        let id = next.reaction;
        // Reactions registered late may carry a tau in the past.
        self.time = self.time.max(next.tau);
        self.steps += 1;
        self.metrics.reaction = Some(id);

        let Some(reaction) = self.reactions.get_mut(&id) else {
            return Ok(StepOutcome::Skipped {
                reaction: id,
                time: self.time,
            });
        };
        let node = reaction.node();
        let executed = reaction.can_execute(&self.env);
        if executed {
            reaction.execute(&mut self.env)?;
        }
        self.metrics.executed = executed;
        debug!(reaction = %id, node = %node, time = %self.time, executed, "step");

        if !executed {
            self.schedule(id, true)?;
            return Ok(StepOutcome::Skipped {
                reaction: id,
                time: self.time,
            });
        }

        let rewiring = self.apply_mutations()?;
        let dependents = match self
            .reactions
            .get(&id)
            .or_else(|| rewiring.dropped.iter().find(|r| r.id() == id))
        {
            Some(fired) => self.dependents_of(fired, &rewiring.changed),
            None => Vec::new(),
        };
        if self.reactions.contains_key(&id) {
            self.schedule(id, true)?;
        }
        for dependent in &dependents {
            self.schedule(*dependent, false)?;
        }
        self.metrics.dependents_updated = dependents.len();
        debug!(reaction = %id, dependents = dependents.len(), "rescheduled");

        Ok(StepOutcome::Fired {
            reaction: id,
            time: self.time,
        })
    }

    /// Update a reaction at the current time and (re)queue it.
    fn schedule(&mut self, id: ReactionId, executed: bool) -> Result<(), SimulationError> {
        let Some(reaction) = self.reactions.get_mut(&id) else {
            return Ok(());
        };
        reaction.update(self.time, executed, &self.env)?;
        self.queue.push(reaction.schedule_key());
        Ok(())
    }

    // ── neighborhoods ──────────────────────────────────────────────

    fn recompute_neighborhood(&mut self, node: NodeId) -> Result<bool, SimulationError> {
        let fresh = self.rule.compute_neighborhood(node, &self.env)?;
        let changed = self.neighborhoods.get(&node) != Some(&fresh);
        debug!(node = %node, neighbors = fresh.len(), changed, "neighborhood recomputed");
        self.neighborhoods.insert(node, fresh);
        Ok(changed)
    }

    fn apply_mutations(&mut self) -> Result<Rewiring<T, P>, SimulationError> {
        let mut rewiring = Rewiring {
            changed: IndexSet::new(),
            dropped: Vec::new(),
        };
        for mutation in self.env.drain_mutations() {
            match mutation {
                EnvironmentMutation::NodeAdded { node, .. }
                | EnvironmentMutation::NodeMoved { node, .. } => {
                    self.relink(node, &mut rewiring.changed)?;
                }
                EnvironmentMutation::NodeRemoved { node, .. } => {
                    rewiring.dropped.extend(self.drop_reactions_of(node));
                    self.neighborhoods.shift_remove(&node);
                    rewiring.changed.shift_remove(&node);
                    for (other, neighborhood) in self.neighborhoods.iter_mut() {
                        if neighborhood.contains(node) {
                            neighborhood.remove_neighbor(node);
                            rewiring.changed.insert(*other);
                        }
                    }
                }
                EnvironmentMutation::ObstaclesChanged => {
                    let nodes: Vec<NodeId> = self.env.node_ids().collect();
                    for node in nodes {
                        if self.recompute_neighborhood(node)? {
                            rewiring.changed.insert(node);
                        }
                        self.metrics.neighborhoods_recomputed += 1;
                    }
                }
            }
        }
        Ok(rewiring)
    }

    /// Recompute a node's neighborhood and those of its old and new
    /// neighbors.
    fn relink(&mut self, node: NodeId, changed: &mut IndexSet<NodeId>) -> Result<(), SimulationError> {
        if !self.env.contains_node(node) {
            return Ok(());
        }
        let neighbors_of = |nbs: &IndexMap<NodeId, Neighborhood>| {
            nbs.get(&node)
                .map(|n| n.neighbors().to_vec())
                .unwrap_or_default()
        };
        let before = neighbors_of(&self.neighborhoods);
        if self.recompute_neighborhood(node)? {
            changed.insert(node);
        }
        self.metrics.neighborhoods_recomputed += 1;
        let after = neighbors_of(&self.neighborhoods);

        let mut touched: IndexSet<NodeId> = before.into_iter().chain(after).collect();
        touched.shift_remove(&node);
        for other in touched {
            if !self.env.contains_node(other) {
                continue;
            }
            if self.recompute_neighborhood(other)? {
                changed.insert(other);
            }
            self.metrics.neighborhoods_recomputed += 1;
        }
        Ok(())
    }

    fn drop_reactions_of(&mut self, node: NodeId) -> Vec<Reaction<T, P>> {
        let ids: Vec<ReactionId> = self
            .reactions
            .values()
            .filter(|r| r.node() == node)
            .map(|r| r.id())
            .collect();
        let mut dropped = Vec::with_capacity(ids.len());
        for id in ids {
            self.queue.remove(id);
            self.global_readers.shift_remove(&id);
            if let Some(reaction) = self.reactions.shift_remove(&id) {
                dropped.push(reaction);
            }
        }
        if !dropped.is_empty() {
            debug!(node = %node, dropped = dropped.len(), "reactions of removed node dropped");
        }
        self.metrics.reactions_dropped += dropped.len();
        dropped
    }

    // ── dependencies ───────────────────────────────────────────────

    /// Reactions to update after `fired`, in a deterministic order.
    ///
    /// Besides direct dependents, every non-local reaction hosted by a node
    /// whose neighborhood changed is included.
    fn dependents_of(&self, fired: &Reaction<T, P>, rewired: &IndexSet<NodeId>) -> Vec<ReactionId> {
        let origin = fired.node();
        let neighborhood = self.neighborhoods.get(&origin);

        let mut candidates: IndexSet<ReactionId> = IndexSet::new();
        if fired.output_context() == Context::Global {
            candidates.extend(self.reactions.keys().copied());
        } else {
            let hosts = std::iter::once(origin).chain(neighborhood.into_iter().flat_map(|n| n.iter()));
            for host in hosts {
                if let Some(n) = self.env.node(host) {
                    candidates.extend(n.reactions().iter().copied());
                }
            }
            candidates.extend(self.global_readers.iter().copied());
        }

        let mut dependents: IndexSet<ReactionId> = candidates
            .into_iter()
            .filter(|id| {
                self.reactions
                    .get(id)
                    .is_some_and(|r| depends_on(fired, r, neighborhood))
            })
            .collect();

        for node in rewired {
            let Some(host) = self.env.node(*node) else {
                continue;
            };
            for id in host.reactions() {
                let non_local = self
                    .reactions
                    .get(id)
                    .is_some_and(|r| r.input_context() != Context::Local);
                if non_local && *id != fired.id() {
                    dependents.insert(*id);
                }
            }
        }
        dependents.into_iter().collect()
    }

    fn abort(&mut self, e: SimulationError) -> SimulationError {
        self.status = Status::Aborted;
        error!(time = %self.time, steps = self.steps, error = %e, "simulation aborted");
        e
    }
}

// ── accessors ──────────────────────────────────────────────────────

impl<T, P> Simulation<T, P> {
    /// The simulation clock.
    pub fn time(&self) -> Time {
        self.time
    }

    /// Steps taken so far, fired or skipped.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Lifecycle state.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The environment, read-only.
    pub fn environment(&self) -> &Environment<T, P> {
        &self.env
    }

    /// The last computed neighborhood of `node`.
    pub fn neighborhood(&self, node: NodeId) -> Option<&Neighborhood> {
        self.neighborhoods.get(&node)
    }

    /// A registered reaction.
    pub fn reaction(&self, id: ReactionId) -> Option<&Reaction<T, P>> {
        self.reactions.get(&id)
    }

    /// Every registered reaction, in registration order.
    pub fn reactions(&self) -> impl Iterator<Item = &Reaction<T, P>> {
        self.reactions.values()
    }

    /// When the next reaction is due, if any is queued.
    pub fn next_time(&self) -> Option<Time> {
        self.queue.peek().map(|k| k.tau)
    }

    /// Metrics of the last step plus cumulative counters.
    pub fn metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// The configuration the simulation was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Id source for reactions and nodes built for this simulation.
    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    /// Handle on the seeded RNG, for stochastic distributions and actions.
    pub fn rng(&self) -> SharedRng {
        self.rng.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alembic_core::{Euclidean, Molecule};
    use alembic_model::{
        Action, Condition, ContainsMolecule, DiracComb, EnvironmentConfig, EuclideanDistance,
        MoveToPosition, Node, RateModel, RemoveNode, SetConcentration, Trigger,
    };

    type Sim = Simulation<f64, Euclidean>;
    type R = Reaction<f64, Euclidean>;

    fn pos(x: f64, y: f64) -> Euclidean {
        Euclidean::new([x, y]).unwrap()
    }

    fn sim(points: &[(f64, f64)], config: SimulationConfig) -> Sim {
        let mut env = Environment::new(2, EnvironmentConfig::default()).unwrap();
        for (i, (x, y)) in points.iter().enumerate() {
            env.add_node(Node::new(NodeId(i as u32)), pos(*x, *y)).unwrap();
        }
        Simulation::new(env, EuclideanDistance::new(1.5), config).unwrap()
    }

    fn comb(sim: &Sim, node: u32, start: f64, rate: f64) -> R {
        R::new(
            sim.id_generator(),
            NodeId(node),
            Box::new(DiracComb::new(Time::new(start), rate).unwrap()),
            RateModel::Chemical,
        )
    }

    fn set(node: u32, molecule: &str) -> Box<dyn Action<f64, Euclidean>> {
        Box::new(SetConcentration::new(NodeId(node), Molecule::new(molecule), 1.0))
    }

    fn has(node: u32, molecule: &str) -> Box<dyn Condition<f64, Euclidean>> {
        Box::new(ContainsMolecule::new(NodeId(node), Molecule::new(molecule)))
    }

    #[test]
    fn invalid_config_is_rejected() {
        let env = Environment::<f64, Euclidean>::new(2, EnvironmentConfig::default()).unwrap();
        let config = SimulationConfig {
            max_steps: Some(0),
            ..SimulationConfig::default()
        };
        match Simulation::new(env, EuclideanDistance::new(1.0), config) {
            Err(SimulationError::Config(ConfigError::ZeroMaxSteps)) => {}
            other => panic!("expected ZeroMaxSteps, got {:?}", other.err()),
        }
    }

    #[test]
    fn reaction_on_missing_node_is_rejected() {
        let mut s = sim(&[(0.0, 0.0)], SimulationConfig::default());
        let r = comb(&s, 7, 0.0, 1.0);
        let id = r.id();
        match s.add_reaction(r) {
            Err(SimulationError::UnknownNode { reaction, node }) => {
                assert_eq!(reaction, id);
                assert_eq!(node, NodeId(7));
            }
            other => panic!("expected UnknownNode, got {other:?}"),
        }
        assert_eq!(s.status(), Status::Ready);
    }

    #[test]
    fn duplicate_reaction_is_rejected() {
        let mut s = sim(&[(0.0, 0.0)], SimulationConfig::default());
        let id = ReactionId(100);
        let make = || {
            R::with_id(
                id,
                NodeId(0),
                Box::new(DiracComb::new(Time::ZERO, 1.0).unwrap()),
                RateModel::Chemical,
            )
        };
        s.add_reaction(make()).unwrap();
        assert_eq!(
            s.add_reaction(make()),
            Err(SimulationError::DuplicateReaction { reaction: id })
        );
    }

    #[test]
    fn initialize_computes_neighborhoods() {
        let mut s = sim(&[(0.0, 0.0), (1.0, 0.0), (5.0, 0.0)], SimulationConfig::default());
        s.initialize().unwrap();
        assert_eq!(s.status(), Status::Running);
        assert_eq!(s.neighborhood(NodeId(0)).unwrap().neighbors(), &[NodeId(1)]);
        assert!(s.neighborhood(NodeId(2)).unwrap().is_empty());
        assert_eq!(s.metrics().neighborhoods_total, 3);
    }

    #[test]
    fn empty_simulation_finishes_immediately() {
        let mut s = sim(&[(0.0, 0.0)], SimulationConfig::default());
        assert_eq!(s.run(), Ok(FinishReason::QueueExhausted));
        assert_eq!(s.steps(), 0);
        assert_eq!(
            s.step(),
            Ok(StepOutcome::Finished(FinishReason::QueueExhausted))
        );
    }

    #[test]
    fn comb_fires_until_end_time() {
        let config = SimulationConfig {
            end_time: Time::new(2.0),
            ..SimulationConfig::default()
        };
        let mut s = sim(&[(0.0, 0.0)], config);
        let r = comb(&s, 0, 0.5, 2.0).with_actions(vec![set(0, "x")]);
        s.add_reaction(r).unwrap();
        assert_eq!(s.run(), Ok(FinishReason::EndTime));
        // 0.5, 1.0, 1.5, 2.0
        assert_eq!(s.steps(), 4);
        assert_eq!(s.time(), Time::new(2.0));
        assert_eq!(s.metrics().executed_total, 4);
    }

    #[test]
    fn max_steps_caps_the_run() {
        let config = SimulationConfig {
            max_steps: Some(3),
            ..SimulationConfig::default()
        };
        let mut s = sim(&[(0.0, 0.0)], config);
        s.add_reaction(comb(&s, 0, 0.0, 1.0)).unwrap();
        assert_eq!(s.run(), Ok(FinishReason::MaxSteps));
        assert_eq!(s.steps(), 3);
        assert_eq!(s.status(), Status::Finished(FinishReason::MaxSteps));
    }

    #[test]
    fn failed_condition_skips_but_reschedules() {
        let config = SimulationConfig {
            max_steps: Some(2),
            ..SimulationConfig::default()
        };
        let mut s = sim(&[(0.0, 0.0)], config);
        let r = comb(&s, 0, 1.0, 1.0)
            .with_conditions(vec![has(0, "never")])
            .with_actions(vec![set(0, "x")]);
        let id = s.add_reaction(r).unwrap();
        match s.step() {
            Ok(StepOutcome::Skipped { reaction, time }) => {
                assert_eq!(reaction, id);
                assert_eq!(time, Time::new(1.0));
            }
            other => panic!("expected Skipped, got {other:?}"),
        }
        assert_eq!(s.next_time(), Some(Time::new(2.0)));
        assert_eq!(s.metrics().skipped_total, 1);
    }

    #[test]
    fn firing_wakes_dependents() {
        let config = SimulationConfig {
            max_steps: Some(1),
            ..SimulationConfig::default()
        };
        let mut s = sim(&[(0.0, 0.0)], config);
        // Producer fires at t=1 and writes "x"; the consumer is parked at
        // rate 0 until "x" appears.
        let producer = R::new(
            s.id_generator(),
            NodeId(0),
            Box::new(Trigger::new(Time::new(1.0))),
            RateModel::Event,
        )
        .with_actions(vec![set(0, "x")]);
        let consumer = R::new(
            s.id_generator(),
            NodeId(0),
            Box::new(
                alembic_model::ExponentialTime::new(1.0, Time::ZERO, s.rng()).unwrap(),
            ),
            RateModel::Chemical,
        )
        .with_conditions(vec![has(0, "x")]);
        s.add_reaction(producer).unwrap();
        let consumer = s.add_reaction(consumer).unwrap();

        s.initialize().unwrap();
        assert!(s.reaction(consumer).unwrap().tau().is_infinite());
        s.step().unwrap();
        assert_eq!(s.metrics().dependents_updated, 1);
        let tau = s.reaction(consumer).unwrap().tau();
        assert!(tau.is_finite() && tau > Time::new(1.0));
    }

    #[test]
    fn removed_node_takes_its_reactions() {
        let mut s = sim(&[(0.0, 0.0), (1.0, 0.0)], SimulationConfig::default());
        let killer = R::new(
            s.id_generator(),
            NodeId(1),
            Box::new(Trigger::new(Time::new(1.0))),
            RateModel::Event,
        )
        .with_actions(vec![Box::new(RemoveNode::new(NodeId(1)))]);
        let sibling = comb(&s, 1, 5.0, 1.0);
        s.add_reaction(killer).unwrap();
        let sibling = s.add_reaction(sibling).unwrap();

        s.initialize().unwrap();
        assert_eq!(s.neighborhood(NodeId(0)).unwrap().neighbors(), &[NodeId(1)]);
        s.step().unwrap();

        assert!(!s.environment().contains_node(NodeId(1)));
        assert!(s.reaction(sibling).is_none());
        assert!(s.neighborhood(NodeId(1)).is_none());
        assert!(s.neighborhood(NodeId(0)).unwrap().is_empty());
        assert_eq!(s.metrics().reactions_dropped, 2);
        assert_eq!(s.run(), Ok(FinishReason::QueueExhausted));
    }

    #[test]
    fn moving_a_node_relinks_both_sides() {
        let mut s = sim(&[(0.0, 0.0), (1.0, 0.0), (4.0, 0.0)], SimulationConfig::default());
        let mover = R::new(
            s.id_generator(),
            NodeId(1),
            Box::new(Trigger::new(Time::new(1.0))),
            RateModel::Event,
        )
        .with_actions(vec![Box::new(MoveToPosition::new(NodeId(1), pos(3.0, 0.0)))]);
        s.add_reaction(mover).unwrap();
        s.step().unwrap();

        assert!(s.neighborhood(NodeId(0)).unwrap().is_empty());
        assert_eq!(s.neighborhood(NodeId(1)).unwrap().neighbors(), &[NodeId(2)]);
        assert_eq!(s.neighborhood(NodeId(2)).unwrap().neighbors(), &[NodeId(1)]);
        assert_eq!(s.metrics().neighborhoods_recomputed, 3);
    }

    #[test]
    fn fatal_error_aborts() {
        let mut s = sim(&[(0.0, 0.0)], SimulationConfig::default());
        // Writes to a node that does not exist.
        let r = comb(&s, 0, 1.0, 1.0).with_actions(vec![set(9, "x")]);
        s.add_reaction(r).unwrap();
        match s.step() {
            Err(SimulationError::Reaction(ReactionError::Action { .. })) => {}
            other => panic!("expected an action error, got {other:?}"),
        }
        assert_eq!(s.status(), Status::Aborted);
        assert_eq!(s.step(), Err(SimulationError::Aborted));
        assert_eq!(
            s.add_reaction(comb(&s, 0, 1.0, 1.0)),
            Err(SimulationError::Aborted)
        );
    }

    #[test]
    fn late_reactions_are_scheduled_on_arrival() {
        let mut s = sim(&[(0.0, 0.0)], SimulationConfig::default());
        s.initialize().unwrap();
        assert_eq!(s.next_time(), None);
        s.add_reaction(comb(&s, 0, 3.0, 1.0)).unwrap();
        assert_eq!(s.next_time(), Some(Time::new(3.0)));
        let id = s.reactions().next().unwrap().id();
        let removed = s.remove_reaction(id).unwrap();
        assert_eq!(s.next_time(), None);
        assert!(s.environment().node(NodeId(0)).unwrap().reactions().is_empty());
        assert_eq!(removed.node(), NodeId(0));
    }
}
