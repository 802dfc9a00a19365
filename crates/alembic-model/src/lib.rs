//! Nodes, environments, linking rules and reactions for Alembic simulations.
//!
//! This crate holds the simulation model proper:
//!
//! - [`Environment`]: the authoritative node set, node-to-position map and
//!   spatial index, with admission hooks, obstacles and a mutation journal.
//! - [`Neighborhood`] and the [`LinkingRule`] variants that compute it.
//! - The [`Condition`] and [`Action`] contracts plus stock implementations.
//! - The [`TimeDistribution`] variants that decide when reactions fire.
//! - [`Reaction`], which ties conditions, actions and a distribution to a node.
//!
//! Scheduling lives one level up, in `alembic-engine`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod condition;
pub mod config;
pub mod distribution;
pub mod environment;
pub mod error;
pub mod linking;
pub mod movement;
pub mod neighborhood;
pub mod node;
pub mod policy;
pub mod reaction;

pub use action::{Action, RemoveNode, SetConcentration};
pub use condition::{Condition, ContainsMolecule};
pub use config::EnvironmentConfig;
pub use distribution::{DiracComb, ExponentialTime, TimeDistribution, Trigger};
pub use environment::{Environment, EnvironmentMutation};
pub use error::{
    ActionError, ConfigError, DistributionError, EnvironmentError, LinkError, ReactionError,
};
pub use linking::{ConnectionBeam, EuclideanDistance, LinkingRule, ObstaclesBreakConnection};
pub use movement::{BrownianMove, FakeMove, MoveBy, MoveForwardAndTeleport, MoveToPosition};
pub use neighborhood::Neighborhood;
pub use node::{Concentration, Node};
pub use policy::{AdmissionPolicy, BoundedPolicy, OpenPolicy, OutOfBounds};
pub use reaction::{RateModel, Reaction, ScheduleKey};
