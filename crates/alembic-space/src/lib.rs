//! Spatial indexes and obstacle geometry for Alembic simulations.
//!
//! This crate defines the [`SpatialIndex`] trait, the contract through
//! which environments answer "which elements lie in this box?", along
//! with two backends and the rectangular obstacles that linking rules
//! consult.
//!
//! # Backends
//!
//! - [`GridIndex`]: uniform hash grid of configurable cell size, any dimension
//! - [`BruteForceIndex`]: linear scan, the reference other backends are checked against
//!
//! # Obstacles
//!
//! [`RectObstacle`] and [`ObstacleSet`] model axis-aligned 2D walls. Polygon
//! work (segment tests, unions, differences) goes through the `geo` crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bbox;
pub mod brute;
pub mod error;
pub mod grid;
pub mod index;
pub mod obstacle;

#[cfg(test)]
pub(crate) mod compliance;

pub use bbox::BoundingBox;
pub use brute::BruteForceIndex;
pub use error::SpaceError;
pub use grid::GridIndex;
pub use index::SpatialIndex;
pub use obstacle::{ObstacleSet, RectObstacle};
