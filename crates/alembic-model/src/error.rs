//! Error types for the simulation model.
//!
//! Organized by subsystem: environment, linking, time distributions,
//! actions, reactions, and configuration. Fatal conditions carry the
//! ids needed to locate the offending node or reaction.

use alembic_core::{NodeId, PositionError, ReactionId};
use alembic_space::SpaceError;
use thiserror::Error;

/// Errors from [`Environment`](crate::Environment) operations.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EnvironmentError {
    /// The node is not part of the environment.
    #[error("node {node} not found")]
    NodeNotFound {
        /// The missing node.
        node: NodeId,
    },
    /// A node with the same id is already present.
    #[error("node {node} is already in the environment")]
    DuplicateNode {
        /// The duplicated node.
        node: NodeId,
    },
    /// The spatial index refused a mutation the position map accepted.
    ///
    /// Fatal: the environment is poisoned.
    #[error("spatial index rejected {operation} of node {node}")]
    IndexDesync {
        /// The node being mutated.
        node: NodeId,
        /// Which mutation failed (`"insert"`, `"remove"` or `"move"`).
        operation: &'static str,
    },
    /// A previous index failure left the environment inconsistent.
    #[error("environment is poisoned by an earlier spatial index failure")]
    Poisoned,
    /// Obstacles only exist in two-dimensional environments.
    #[error("obstacles require a 2D environment, this one has {dimensions} dimensions")]
    ObstaclesRequire2D {
        /// Dimensionality of the environment.
        dimensions: usize,
    },
    /// Position arithmetic failed.
    #[error(transparent)]
    Position(#[from] PositionError),
    /// Index or box construction failed.
    #[error(transparent)]
    Space(#[from] SpaceError),
}

/// Errors from [`LinkingRule`](crate::LinkingRule) evaluation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LinkError {
    /// The environment query behind the rule failed.
    #[error("linking rule failed for node {center}: {source}")]
    Environment {
        /// The node whose neighborhood was being computed.
        center: NodeId,
        /// The underlying environment error.
        #[source]
        source: EnvironmentError,
    },
}

/// Errors from [`TimeDistribution`](crate::TimeDistribution) updates and
/// construction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DistributionError {
    /// A propensity of NaN was supplied.
    #[error("propensity is NaN")]
    NanPropensity,
    /// A negative propensity was supplied.
    #[error("propensity {propensity} is negative")]
    NegativePropensity {
        /// The offending propensity.
        propensity: f64,
    },
    /// A rate parameter was not finite and positive.
    #[error("rate {rate} must be finite and positive")]
    InvalidRate {
        /// The offending rate.
        rate: f64,
    },
}

/// Errors raised by an [`Action`](crate::Action) while executing.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ActionError {
    /// The environment refused the mutation.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    /// Position arithmetic failed.
    #[error(transparent)]
    Position(#[from] PositionError),
    /// An action-specific failure.
    #[error("action on node {node} failed: {reason}")]
    Failed {
        /// The node the action belongs to.
        node: NodeId,
        /// Human-readable description of the failure.
        reason: String,
    },
}

/// Errors from [`Reaction`](crate::Reaction) evaluation. All are fatal.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ReactionError {
    /// A condition returned a negative propensity conditioning factor.
    #[error(
        "condition {condition} of reaction {reaction} on node {node} returned negative conditioning {value}"
    )]
    NegativeConditioning {
        /// The reaction being updated.
        reaction: ReactionId,
        /// The node hosting the reaction.
        node: NodeId,
        /// Index of the condition within the reaction.
        condition: usize,
        /// The offending factor.
        value: f64,
    },
    /// The time distribution rejected the computed propensity.
    #[error("reaction {reaction} on node {node}: {source}")]
    Distribution {
        /// The reaction being updated.
        reaction: ReactionId,
        /// The node hosting the reaction.
        node: NodeId,
        /// The underlying distribution error.
        #[source]
        source: DistributionError,
    },
    /// An action failed while the reaction executed.
    #[error("action {action} of reaction {reaction} on node {node} failed: {source}")]
    Action {
        /// The reaction being executed.
        reaction: ReactionId,
        /// The node hosting the reaction.
        node: NodeId,
        /// Index of the action within the reaction.
        action: usize,
        /// The underlying action error.
        #[source]
        source: ActionError,
    },
}

/// Errors detected during [`EnvironmentConfig::validate()`](crate::EnvironmentConfig::validate).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid cell size is NaN, infinite, zero, or negative.
    #[error("grid_cell_size must be finite and positive, got {value}")]
    InvalidCellSize {
        /// The invalid value.
        value: f64,
    },
    /// Zero worker threads were requested.
    #[error("worker_count must be at least 1")]
    NoWorkers,
    /// Zero dimensions were requested.
    #[error("environments need at least one dimension")]
    ZeroDimensions,
}
