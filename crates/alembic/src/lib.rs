//! Alembic: discrete-event simulation of spatially situated stochastic
//! systems.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Alembic sub-crates. For most users, adding `alembic` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use alembic::prelude::*;
//!
//! // Two nodes three units apart.
//! let mut env: Environment<f64, Euclidean> =
//!     Environment::new(2, EnvironmentConfig::default()).unwrap();
//! env.add_node(Node::new(NodeId(0)), Euclidean::new([0.0, 0.0]).unwrap()).unwrap();
//! env.add_node(Node::new(NodeId(1)), Euclidean::new([3.0, 0.0]).unwrap()).unwrap();
//!
//! let mut sim = Simulation::new(env, EuclideanDistance::new(5.0), SimulationConfig::default())
//!     .unwrap();
//!
//! // Node 0 sets "done" once, at t = 1.
//! let actions: Vec<Box<dyn Action<f64, Euclidean>>> =
//!     vec![Box::new(SetConcentration::new(NodeId(0), Molecule::new("done"), 1.0))];
//! let reaction = Reaction::new(
//!     sim.id_generator(),
//!     NodeId(0),
//!     Box::new(Trigger::new(Time::new(1.0))),
//!     RateModel::Event,
//! )
//! .with_actions(actions);
//! sim.add_reaction(reaction).unwrap();
//!
//! assert_eq!(sim.run().unwrap(), FinishReason::QueueExhausted);
//! assert_eq!(sim.time(), Time::new(1.0));
//! assert_eq!(sim.neighborhood(NodeId(0)).unwrap().neighbors(), &[NodeId(1)]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `alembic-core` | Ids, molecules, contexts, time, positions, RNG handle |
//! | [`space`] | `alembic-space` | Spatial indexes, bounding boxes, obstacles |
//! | [`model`] | `alembic-model` | Nodes, environment, linking rules, reactions |
//! | [`engine`] | `alembic-engine` | Reference event loop and its metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, ids, and the position contract (`alembic-core`).
///
/// Contains [`types::Molecule`], [`types::Time`], [`types::Context`],
/// [`types::IdGenerator`] and the [`types::Position`] trait with its
/// [`types::Euclidean`] and [`types::Manhattan2D`] implementations.
pub use alembic_core as types;

/// Spatial indexing and obstacles (`alembic-space`).
///
/// Provides the [`space::SpatialIndex`] trait, the [`space::GridIndex`]
/// and [`space::BruteForceIndex`] backends, and [`space::ObstacleSet`].
pub use alembic_space as space;

/// The simulation model (`alembic-model`).
///
/// [`model::Environment`], [`model::Reaction`], the linking rules, time
/// distributions, and the [`model::Condition`] / [`model::Action`]
/// extension points.
pub use alembic_model as model;

/// The reference event loop (`alembic-engine`).
///
/// [`engine::Simulation`] drives an environment and its reactions through
/// time.
pub use alembic_engine as engine;

/// Common imports for typical Alembic usage.
///
/// ```rust
/// use alembic::prelude::*;
/// ```
///
/// This imports the most frequently used types: ids and positions, the
/// environment and its linking rules, reactions with their stock
/// conditions, actions and distributions, and the simulation loop.
pub mod prelude {
    // Core types
    pub use alembic_core::{
        Context, Euclidean, IdGenerator, IdMode, Manhattan2D, Molecule, NodeId, Position,
        ReactionId, Time,
    };

    // Space
    pub use alembic_space::RectObstacle;

    // Model
    pub use alembic_model::{
        Action, Concentration, Condition, ConnectionBeam, ContainsMolecule, DiracComb,
        Environment, EnvironmentConfig, EuclideanDistance, ExponentialTime, LinkingRule,
        Neighborhood, Node, ObstaclesBreakConnection, RateModel, Reaction, RemoveNode,
        SetConcentration, TimeDistribution, Trigger,
    };

    // Errors
    pub use alembic_core::PositionError;
    pub use alembic_model::{ActionError, EnvironmentError, LinkError, ReactionError};

    // Engine
    pub use alembic_engine::{
        FinishReason, Simulation, SimulationConfig, SimulationError, StepMetrics, StepOutcome,
    };
}
