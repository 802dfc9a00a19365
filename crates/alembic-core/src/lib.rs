//! Core types and traits for the Alembic simulation kernel.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: node and reaction
//! identifiers, the hash-spreading sequence, molecules and influence
//! sets, interaction contexts, simulation time, positions, and the
//! shared random number generator handle.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod id;
pub mod influence;
pub mod molecule;
pub mod position;
pub mod rng;
pub mod time;

pub use context::Context;
pub use error::PositionError;
pub use id::{spread_hash, EnvironmentInstanceId, IdGenerator, IdMode, NodeId, ReactionId};
pub use influence::MoleculeSet;
pub use molecule::Molecule;
pub use position::{Euclidean, Manhattan2D, Position};
pub use rng::{lock_rng, shared_rng, SharedRng};
pub use time::Time;
