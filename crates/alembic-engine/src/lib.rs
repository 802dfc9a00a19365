//! Reference event loop for Alembic simulations.
//!
//! [`Simulation`] owns an [`Environment`](alembic_model::Environment), a
//! [`LinkingRule`](alembic_model::LinkingRule) and every
//! [`Reaction`](alembic_model::Reaction), and executes reactions one at a
//! time in `(tau, id)` order. After each firing it recomputes the
//! neighborhoods touched by environment mutations and reschedules the
//! reactions that depend on the one that fired.
//!
//! The loop is a convenience: any scheduler honoring the reaction contract
//! (`tau`, `can_execute`, `execute`, `update`) can drive the model crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dependency;
pub mod metrics;
pub mod queue;
pub mod simulation;

pub use config::{ConfigError, SimulationConfig};
pub use dependency::depends_on;
pub use metrics::StepMetrics;
pub use queue::ReactionQueue;
pub use simulation::{FinishReason, Simulation, SimulationError, Status, StepOutcome};
