//! Random walkers on a plane, linked by distance.
//!
//! Every node jitters at exponentially distributed times; node 0 leaves
//! at t = 5. Run with `RUST_LOG=alembic_engine=debug` to see every step.

use alembic_core::{Euclidean, NodeId, Time};
use alembic_engine::{Simulation, SimulationConfig};
use alembic_model::{
    Action, BrownianMove, DiracComb, Environment, EnvironmentConfig, EuclideanDistance,
    ExponentialTime, Node, RateModel, Reaction, RemoveNode, Trigger,
};
use tracing_subscriber::EnvFilter;

type Walkers = Simulation<f64, Euclidean>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut env: Environment<f64, Euclidean> = Environment::new(2, EnvironmentConfig::default())?;
    for i in 0..25u32 {
        let (x, y) = (f64::from(i % 5), f64::from(i / 5));
        env.add_node(Node::new(NodeId(i)), Euclidean::new([x, y])?)?;
    }

    let config = SimulationConfig {
        seed: 42,
        end_time: Time::new(10.0),
        ..SimulationConfig::default()
    };
    let mut sim: Walkers = Simulation::new(env, EuclideanDistance::new(1.2), config)?;

    for i in 0..25u32 {
        let node = NodeId(i);
        let walk: Vec<Box<dyn Action<f64, Euclidean>>> =
            vec![Box::new(BrownianMove::new(node, 0.5, sim.rng()))];
        let reaction = Reaction::new(
            sim.id_generator(),
            node,
            Box::new(ExponentialTime::new(1.0, Time::ZERO, sim.rng())?),
            RateModel::Chemical,
        )
        .with_actions(walk);
        sim.add_reaction(reaction)?;
    }

    let leave: Vec<Box<dyn Action<f64, Euclidean>>> = vec![Box::new(RemoveNode::new(NodeId(0)))];
    let departure = Reaction::new(
        sim.id_generator(),
        NodeId(0),
        Box::new(Trigger::new(Time::new(5.0))),
        RateModel::Event,
    )
    .with_actions(leave);
    sim.add_reaction(departure)?;

    // A heartbeat that does nothing but mark whole time units.
    let heartbeat = Reaction::new(
        sim.id_generator(),
        NodeId(24),
        Box::new(DiracComb::new(Time::new(1.0), 1.0)?),
        RateModel::Chemical,
    );
    sim.add_reaction(heartbeat)?;

    let reason = sim.run()?;
    let metrics = sim.metrics();
    let linked = sim
        .environment()
        .node_ids()
        .filter(|id| sim.neighborhood(*id).is_some_and(|n| !n.is_empty()))
        .count();
    println!(
        "finished ({reason:?}) at t={} after {} steps: {} fired, {} neighborhood updates, \
         {} of {} nodes linked",
        sim.time(),
        sim.steps(),
        metrics.executed_total,
        metrics.neighborhoods_total,
        linked,
        sim.environment().node_count(),
    );
    Ok(())
}
