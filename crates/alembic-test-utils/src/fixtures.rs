//! Environment builders for tests.
//!
//! - [`line`]: nodes evenly spaced along the x axis of a 2D Euclidean space.
//! - [`scatter`]: nodes at caller-supplied planar coordinates.
//! - [`lattice`]: a dense block of nodes on the Manhattan lattice.

use alembic_core::{Euclidean, Manhattan2D, NodeId};
use alembic_model::{Environment, EnvironmentConfig, Node};

/// Real-valued concentrations over 2D Euclidean positions.
pub type PlanarEnv = Environment<f64, Euclidean>;

/// `n` nodes with ids `0..n` at `(i * spacing, 0)`.
pub fn line(n: u32, spacing: f64) -> PlanarEnv {
    scatter((0..n).map(|i| (f64::from(i) * spacing, 0.0)))
}

/// One node per point, with ids assigned in iteration order from 0.
pub fn scatter(points: impl IntoIterator<Item = (f64, f64)>) -> PlanarEnv {
    scatter_with(EnvironmentConfig::default(), points)
}

/// [`scatter`] with an explicit environment configuration.
pub fn scatter_with(
    config: EnvironmentConfig,
    points: impl IntoIterator<Item = (f64, f64)>,
) -> PlanarEnv {
    let mut env = Environment::new(2, config).expect("fixture config is valid");
    for (i, (x, y)) in points.into_iter().enumerate() {
        let id = NodeId(u32::try_from(i).expect("fixture too large"));
        let position = Euclidean::new([x, y]).expect("fixture coordinates are finite");
        env.add_node(Node::new(id), position)
            .expect("fixture node is accepted");
    }
    env
}

/// A `width` x `height` block of lattice nodes, row-major ids from 0.
pub fn lattice(width: i64, height: i64) -> Environment<f64, Manhattan2D> {
    let mut env = Environment::new(2, EnvironmentConfig::default()).expect("fixture config is valid");
    let mut next = 0u32;
    for y in 0..height {
        for x in 0..width {
            env.add_node(Node::new(NodeId(next)), Manhattan2D::new(x, y))
                .expect("fixture node is accepted");
            next += 1;
        }
    }
    env
}
