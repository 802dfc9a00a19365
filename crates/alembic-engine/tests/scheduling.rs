//! End-to-end scheduling properties of the reference engine.

use alembic_core::{Context, Euclidean, Molecule, NodeId, ReactionId, Time};
use alembic_engine::{FinishReason, Simulation, SimulationConfig, SimulationError, Status, StepOutcome};
use alembic_model::{
    Action, ActionError, Condition, DiracComb, Environment, ExponentialTime, EuclideanDistance,
    MoveToPosition, RateModel, Reaction, ReactionError, RemoveNode, Trigger,
};
use alembic_test_utils::fixtures::line;
use alembic_test_utils::{CountingAction, FailingAction, IncrementAction, MockCondition};
use proptest::prelude::*;

type Sim = Simulation<f64, Euclidean>;

fn walkers(nodes: u32, seed: u64, end: f64) -> Sim {
    let config = SimulationConfig {
        seed,
        end_time: Time::new(end),
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(line(nodes, 1.0), EuclideanDistance::new(1.5), config).unwrap();
    for i in 0..nodes {
        let node = NodeId(i);
        let actions: Vec<Box<dyn Action<f64, Euclidean>>> =
            vec![Box::new(IncrementAction::new(node, "count"))];
        let conditions: Vec<Box<dyn Condition<f64, Euclidean>>> =
            vec![Box::new(MockCondition::new(node, &["count"]).with_factor(f64::from(i + 1)))];
        let r = Reaction::new(
            sim.id_generator(),
            node,
            Box::new(ExponentialTime::new(1.0, Time::ZERO, sim.rng()).unwrap()),
            RateModel::Chemical,
        )
        .with_conditions(conditions)
        .with_actions(actions);
        sim.add_reaction(r).unwrap();
    }
    sim
}

fn trace(sim: &mut Sim) -> Vec<(ReactionId, Time)> {
    let mut out = Vec::new();
    loop {
        match sim.step().unwrap() {
            StepOutcome::Fired { reaction, time } | StepOutcome::Skipped { reaction, time } => {
                out.push((reaction, time))
            }
            StepOutcome::Finished(_) => return out,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn time_never_goes_backwards(seed in any::<u64>(), nodes in 1u32..8) {
        let mut sim = walkers(nodes, seed, 20.0);
        let steps = trace(&mut sim);
        prop_assert!(!steps.is_empty());
        for pair in steps.windows(2) {
            prop_assert!(pair[0].1 <= pair[1].1);
        }
        prop_assert!(sim.time() <= Time::new(20.0));
    }

    #[test]
    fn same_seed_same_history(seed in any::<u64>()) {
        let a = trace(&mut walkers(4, seed, 3.0));
        let b = trace(&mut walkers(4, seed, 3.0));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn removed_nodes_never_fire_again(seed in any::<u64>(), at in 0.5f64..4.0) {
        let mut sim = walkers(5, seed, 6.0);
        let victim = NodeId(2);
        let counter = CountingAction::new(victim, &[]);
        let actions: Vec<Box<dyn Action<f64, Euclidean>>> = vec![Box::new(counter.clone())];
        let watched = Reaction::new(
            sim.id_generator(),
            victim,
            Box::new(ExponentialTime::new(3.0, Time::ZERO, sim.rng()).unwrap()),
            RateModel::Chemical,
        )
        .with_actions(actions);
        let watched = sim.add_reaction(watched).unwrap();
        let kill: Vec<Box<dyn Action<f64, Euclidean>>> = vec![Box::new(RemoveNode::new(victim))];
        let killer = Reaction::new(
            sim.id_generator(),
            NodeId(0),
            Box::new(Trigger::new(Time::new(at))),
            RateModel::Event,
        )
        .with_actions(kill);
        sim.add_reaction(killer).unwrap();

        let steps = trace(&mut sim);
        prop_assert!(!sim.environment().contains_node(victim));
        prop_assert!(sim.reaction(watched).is_none());
        for (reaction, time) in &steps {
            if *reaction == watched {
                prop_assert!(*time <= Time::new(at));
            }
        }
        let fired = steps.iter().filter(|(r, _)| *r == watched).count();
        prop_assert_eq!(counter.calls(), fired);
    }
}

#[test]
fn propensity_follows_conditioning() {
    // Node 7 fires eight times as often as node 0.
    let mut sim = walkers(8, 11, 200.0);
    assert_eq!(sim.run(), Ok(FinishReason::EndTime));
    let count = |i: u32| {
        sim.environment()
            .node(NodeId(i))
            .and_then(|n| n.concentration(&"count".into()).copied())
            .unwrap_or(0.0)
    };
    let slow = count(0);
    let fast = count(7);
    assert!(slow > 100.0, "slow {slow}");
    let ratio = fast / slow;
    assert!((6.0..10.0).contains(&ratio), "ratio {ratio}");
}

#[test]
fn firing_on_one_node_leaves_others_alone() {
    let mut sim = walkers(3, 5, 10.0);
    sim.initialize().unwrap();
    let before: Vec<Time> = sim.reactions().map(|r| r.tau()).collect();
    let fired = match sim.step().unwrap() {
        StepOutcome::Fired { reaction, .. } => reaction,
        other => panic!("expected a firing, got {other:?}"),
    };
    // Only the fired reaction reads what it wrote; the others keep their tau.
    assert_eq!(sim.metrics().dependents_updated, 0);
    for (r, tau) in sim.reactions().zip(before) {
        if r.id() != fired {
            assert_eq!(r.tau(), tau);
        }
    }
}

// ── topology changes ───────────────────────────────────────────────

/// Conditioning equal to the number of nodes within `range` of `node`.
#[derive(Debug)]
struct CrowdSize {
    node: NodeId,
    range: f64,
}

impl Condition<f64, Euclidean> for CrowdSize {
    fn node(&self) -> NodeId {
        self.node
    }

    fn context(&self) -> Context {
        Context::Neighborhood
    }

    fn influencing_molecules(&self) -> Option<&[Molecule]> {
        Some(&[][..])
    }

    fn is_valid(&self, _env: &Environment<f64, Euclidean>) -> bool {
        true
    }

    fn propensity_conditioning(&self, env: &Environment<f64, Euclidean>) -> f64 {
        env.nodes_within_range(self.node, self.range)
            .map(|n| n.len() as f64)
            .unwrap_or(0.0)
    }

    fn clone_on_new_node(&self, node: NodeId) -> Box<dyn Condition<f64, Euclidean>> {
        Box::new(CrowdSize { node, ..*self })
    }
}

/// Nodes 0, 1, 2 on a line, linked 0-1 and 1-2. Node 0 hosts a slow
/// reader whose propensity counts its neighbors; node 1 hosts a
/// one-shot reaction at t = 1 running `action`.
fn crowd(action: Box<dyn Action<f64, Euclidean>>) -> (Sim, ReactionId) {
    let mut sim = Simulation::new(
        line(3, 1.0),
        EuclideanDistance::new(1.5),
        SimulationConfig::default(),
    )
    .unwrap();
    let conditions: Vec<Box<dyn Condition<f64, Euclidean>>> = vec![Box::new(CrowdSize {
        node: NodeId(0),
        range: 1.5,
    })];
    let reader = Reaction::new(
        sim.id_generator(),
        NodeId(0),
        Box::new(ExponentialTime::new(1e-6, Time::ZERO, sim.rng()).unwrap()),
        RateModel::Chemical,
    )
    .with_conditions(conditions);
    let reader = sim.add_reaction(reader).unwrap();
    let mover = Reaction::new(
        sim.id_generator(),
        NodeId(1),
        Box::new(Trigger::new(Time::new(1.0))),
        RateModel::Event,
    )
    .with_actions(vec![action]);
    sim.add_reaction(mover).unwrap();
    (sim, reader)
}

fn assert_reader_parked_after_topology_change(mut sim: Sim, reader: ReactionId) {
    sim.initialize().unwrap();
    let before = sim.reaction(reader).unwrap().tau();
    assert!(before.is_finite());
    assert!(before > Time::new(1.0), "reader due at {before}");

    match sim.step().unwrap() {
        StepOutcome::Fired { time, .. } => assert_eq!(time, Time::new(1.0)),
        other => panic!("expected the one-shot to fire, got {other:?}"),
    }
    // The reader sits on a node whose neighborhood was rewired: it is
    // rescheduled even though the fired reaction wrote no molecule.
    assert_eq!(sim.metrics().dependents_updated, 1);
    assert!(sim.neighborhood(NodeId(0)).unwrap().is_empty());
    assert_eq!(sim.reaction(reader).unwrap().tau(), Time::INFINITY);
    assert_eq!(sim.run(), Ok(FinishReason::QueueExhausted));
}

#[test]
fn moving_away_reschedules_rewired_neighbors() {
    let target = Euclidean::new([10.0, 0.0]).unwrap();
    let (sim, reader) = crowd(Box::new(MoveToPosition::new(NodeId(1), target)));
    assert_reader_parked_after_topology_change(sim, reader);
}

#[test]
fn removal_reschedules_rewired_neighbors() {
    let (sim, reader) = crowd(Box::new(RemoveNode::new(NodeId(1))));
    assert_reader_parked_after_topology_change(sim, reader);
}

// ── fail fast ──────────────────────────────────────────────────────

#[test]
fn failing_action_aborts_the_simulation() {
    let mut sim = Simulation::new(
        line(2, 1.0),
        EuclideanDistance::new(1.5),
        SimulationConfig::default(),
    )
    .unwrap();
    let actions: Vec<Box<dyn Action<f64, Euclidean>>> =
        vec![Box::new(FailingAction::new(NodeId(0), 2))];
    let heartbeat = Reaction::new(
        sim.id_generator(),
        NodeId(0),
        Box::new(DiracComb::new(Time::new(1.0), 1.0).unwrap()),
        RateModel::Event,
    )
    .with_actions(actions);
    let heartbeat = sim.add_reaction(heartbeat).unwrap();

    match sim.run() {
        Err(SimulationError::Reaction(ReactionError::Action {
            reaction,
            node: NodeId(0),
            action: 0,
            source: ActionError::Failed { .. },
        })) => assert_eq!(reaction, heartbeat),
        other => panic!("expected an action failure, got {other:?}"),
    }
    // Two clean firings at t = 1 and t = 2, the third fails.
    assert_eq!(sim.time(), Time::new(3.0));
    assert_eq!(sim.steps(), 3);
    assert_eq!(sim.status(), Status::Aborted);
    assert_eq!(sim.step(), Err(SimulationError::Aborted));
}
