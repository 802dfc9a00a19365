//! The [`Environment`]: nodes, positions, spatial index and obstacles.

use std::fmt;

use alembic_core::{EnvironmentInstanceId, NodeId, Position, PositionError};
use alembic_space::{BoundingBox, GridIndex, ObstacleSet, RectObstacle, SpatialIndex};
use indexmap::IndexMap;
use tracing::{debug, error, warn};

use crate::config::EnvironmentConfig;
use crate::error::{ConfigError, EnvironmentError};
use crate::node::{Concentration, Node};
use crate::policy::{AdmissionPolicy, OpenPolicy};

// ── EnvironmentMutation ─────────────────────────────────────────

/// A change to the environment's population, geometry or obstacles.
///
/// Every successful mutation is appended to a journal that the scheduler
/// drains with [`Environment::drain_mutations`], so it can recompute the
/// affected neighborhoods before updating dependent reactions.
#[derive(Clone, Debug, PartialEq)]
pub enum EnvironmentMutation<P> {
    /// A node joined.
    NodeAdded {
        /// The new node.
        node: NodeId,
        /// Where it was placed.
        position: P,
    },
    /// A node left.
    NodeRemoved {
        /// The removed node.
        node: NodeId,
        /// Its position just before removal.
        last_position: P,
    },
    /// A node moved.
    NodeMoved {
        /// The moved node.
        node: NodeId,
        /// Position before the move.
        from: P,
        /// Position after the move.
        to: P,
    },
    /// The obstacle set changed.
    ObstaclesChanged,
}

// ── Environment ─────────────────────────────────────────────────

/// The spatial container of a simulation.
///
/// Owns the node set, the authoritative node-to-position map and a
/// [`SpatialIndex`]. A node is in the index iff it is in the position
/// map, at exactly the mapped position. If the index ever refuses a
/// mutation the map accepted, that invariant is broken: the environment
/// is poisoned and every later mutation fails with
/// [`EnvironmentError::Poisoned`].
///
/// Queries take `&self` and mutations `&mut self`, so a parallel range
/// query can never observe a mutation in flight.
pub struct Environment<T, P> {
    instance_id: EnvironmentInstanceId,
    config: EnvironmentConfig,
    dimensions: usize,
    nodes: IndexMap<NodeId, Node<T>>,
    positions: IndexMap<NodeId, P>,
    index: Box<dyn SpatialIndex<NodeId>>,
    policy: Box<dyn AdmissionPolicy<T, P>>,
    obstacles: ObstacleSet,
    journal: Vec<EnvironmentMutation<P>>,
    poisoned: bool,
}

impl<T: Concentration, P: Position> Environment<T, P> {
    /// Create an empty environment backed by a [`GridIndex`].
    ///
    /// Validates `config` and builds the grid with its cell size.
    pub fn new(dimensions: usize, config: EnvironmentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if dimensions == 0 {
            return Err(ConfigError::ZeroDimensions);
        }
        let grid = GridIndex::new(dimensions, config.grid_cell_size).map_err(|_| {
            ConfigError::InvalidCellSize {
                value: config.grid_cell_size,
            }
        })?;
        Ok(Self::with_index(Box::new(grid), config))
    }

    /// Create an empty environment around an existing index.
    ///
    /// The environment's dimensionality is the index's. `config` is
    /// trusted; call [`EnvironmentConfig::validate`] first if it came
    /// from outside.
    pub fn with_index(index: Box<dyn SpatialIndex<NodeId>>, config: EnvironmentConfig) -> Self {
        Self {
            instance_id: EnvironmentInstanceId::next(),
            dimensions: index.dimensions(),
            config,
            nodes: IndexMap::new(),
            positions: IndexMap::new(),
            index,
            policy: Box::new(OpenPolicy),
            obstacles: ObstacleSet::new(),
            journal: Vec::new(),
            poisoned: false,
        }
    }

    /// Replace the admission policy.
    pub fn with_policy(mut self, policy: impl AdmissionPolicy<T, P> + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    // ── mutation ────────────────────────────────────────────────

    fn ensure_healthy(&self) -> Result<(), EnvironmentError> {
        if self.poisoned {
            Err(EnvironmentError::Poisoned)
        } else {
            Ok(())
        }
    }

    fn ensure_dimensions(&self, position: &P) -> Result<(), EnvironmentError> {
        if position.dimensions() == self.dimensions {
            Ok(())
        } else {
            Err(PositionError::IncompatibleDimension {
                left: self.dimensions,
                right: position.dimensions(),
            }
            .into())
        }
    }

    fn poison(&mut self, node: NodeId, operation: &'static str) -> EnvironmentError {
        self.poisoned = true;
        error!(
            environment = %self.instance_id,
            %node,
            operation,
            "spatial index desynchronized; environment poisoned"
        );
        EnvironmentError::IndexDesync { node, operation }
    }

    /// Add `node` at (or near) `requested`.
    ///
    /// Returns `Ok(false)` and drops the node if the admission policy
    /// refuses it. Otherwise the node is placed where the policy's
    /// `insertion_position` says and `Ok(true)` is returned.
    pub fn add_node(&mut self, node: Node<T>, requested: P) -> Result<bool, EnvironmentError> {
        self.ensure_healthy()?;
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(EnvironmentError::DuplicateNode { node: id });
        }
        if !self.policy.should_admit(&node, &requested) {
            warn!(node = %id, "admission refused");
            return Ok(false);
        }
        let position = self.policy.insertion_position(&node, requested)?;
        self.ensure_dimensions(&position)?;

        self.positions.insert(id, position.clone());
        if !self.index.insert(id, &position.coordinates()) {
            return Err(self.poison(id, "insert"));
        }
        self.policy.on_added(&node, &position);
        self.nodes.insert(id, node);
        debug!(node = %id, "node added");
        self.journal.push(EnvironmentMutation::NodeAdded { node: id, position });
        Ok(true)
    }

    /// Remove a node and return it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node<T>, EnvironmentError> {
        self.ensure_healthy()?;
        let Some(node) = self.nodes.shift_remove(&id) else {
            return Err(EnvironmentError::NodeNotFound { node: id });
        };
        let Some(last_position) = self.positions.shift_remove(&id) else {
            return Err(self.poison(id, "remove"));
        };
        if !self.index.remove(id, &last_position.coordinates()) {
            return Err(self.poison(id, "remove"));
        }
        self.policy.on_removed(&node, &last_position);
        debug!(node = %id, "node removed");
        self.journal.push(EnvironmentMutation::NodeRemoved {
            node: id,
            last_position,
        });
        Ok(node)
    }

    /// Move a node to an absolute position.
    pub fn move_node_to_position(&mut self, id: NodeId, to: P) -> Result<(), EnvironmentError> {
        self.ensure_healthy()?;
        self.ensure_dimensions(&to)?;
        let Some(slot) = self.positions.get_mut(&id) else {
            return Err(EnvironmentError::NodeNotFound { node: id });
        };
        let from = std::mem::replace(slot, to.clone());
        if !self
            .index
            .move_element(id, &from.coordinates(), &to.coordinates())
        {
            return Err(self.poison(id, "move"));
        }
        self.journal
            .push(EnvironmentMutation::NodeMoved { node: id, from, to });
        Ok(())
    }

    /// Move a node by a relative offset.
    pub fn move_node(&mut self, id: NodeId, delta: &P) -> Result<(), EnvironmentError> {
        let current = self
            .positions
            .get(&id)
            .ok_or(EnvironmentError::NodeNotFound { node: id })?;
        let to = current.sum(delta)?;
        self.move_node_to_position(id, to)
    }

    /// Mutable access to a node's concentrations and reaction list.
    ///
    /// Positions can only change through the move operations.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.nodes.get_mut(&id)
    }

    /// Add an obstacle. Only two-dimensional environments have obstacles.
    pub fn add_obstacle(&mut self, obstacle: RectObstacle) -> Result<(), EnvironmentError> {
        self.ensure_healthy()?;
        if self.dimensions != 2 {
            return Err(EnvironmentError::ObstaclesRequire2D {
                dimensions: self.dimensions,
            });
        }
        self.obstacles.add(obstacle);
        self.journal.push(EnvironmentMutation::ObstaclesChanged);
        Ok(())
    }

    /// Hand every mutation recorded since the last drain to the caller.
    pub fn drain_mutations(&mut self) -> Vec<EnvironmentMutation<P>> {
        std::mem::take(&mut self.journal)
    }

    // ── queries ─────────────────────────────────────────────────

    /// Nodes within `range` of node `center`, excluding `center`, sorted by id.
    pub fn nodes_within_range(
        &self,
        center: NodeId,
        range: f64,
    ) -> Result<Vec<NodeId>, EnvironmentError> {
        let position = self
            .positions
            .get(&center)
            .ok_or(EnvironmentError::NodeNotFound { node: center })?;
        let mut found = self.nodes_within_range_of(position, range)?;
        found.retain(|id| *id != center);
        Ok(found)
    }

    /// Nodes within `range` of `position` (inclusive), sorted by id.
    pub fn nodes_within_range_of(
        &self,
        position: &P,
        range: f64,
    ) -> Result<Vec<NodeId>, EnvironmentError> {
        self.ensure_dimensions(position)?;
        let (lower, upper) = position.bounding_box(range)?;
        let bbox = BoundingBox::new(&lower, &upper)?;
        let candidates = self.index.query(&bbox);

        let mut found = if candidates.len() > self.config.parallel_filter_threshold
            && self.config.worker_count > 1
        {
            self.filter_parallel(position, range, &candidates)?
        } else {
            self.filter_within(position, range, &candidates)?
        };
        found.sort_unstable();
        Ok(found)
    }

    fn filter_within(
        &self,
        center: &P,
        range: f64,
        candidates: &[NodeId],
    ) -> Result<Vec<NodeId>, EnvironmentError> {
        let mut kept = Vec::with_capacity(candidates.len());
        for id in candidates {
            let pos = self
                .positions
                .get(id)
                .ok_or(EnvironmentError::NodeNotFound { node: *id })?;
            if center.distance_to(pos)? <= range {
                kept.push(*id);
            }
        }
        Ok(kept)
    }

    fn filter_parallel(
        &self,
        center: &P,
        range: f64,
        candidates: &[NodeId],
    ) -> Result<Vec<NodeId>, EnvironmentError> {
        let chunk = candidates.len().div_ceil(self.config.worker_count);
        let parts: Vec<Result<Vec<NodeId>, EnvironmentError>> = std::thread::scope(|s| {
            let handles: Vec<_> = candidates
                .chunks(chunk)
                .map(|part| s.spawn(move || self.filter_within(center, range, part)))
                .collect();
            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });
        let mut kept = Vec::with_capacity(candidates.len());
        for part in parts {
            kept.extend(part?);
        }
        Ok(kept)
    }

    /// Distance between two nodes.
    pub fn distance_between_nodes(&self, a: NodeId, b: NodeId) -> Result<f64, EnvironmentError> {
        let pa = self
            .positions
            .get(&a)
            .ok_or(EnvironmentError::NodeNotFound { node: a })?;
        let pb = self
            .positions
            .get(&b)
            .ok_or(EnvironmentError::NodeNotFound { node: b })?;
        Ok(pa.distance_to(pb)?)
    }

    /// Whether the straight segment between two positions touches an obstacle.
    ///
    /// Always `false` when there are no obstacles. Positions must be 2D.
    pub fn intersects_obstacle(&self, a: &P, b: &P) -> Result<bool, EnvironmentError> {
        if self.obstacles.is_empty() {
            return Ok(false);
        }
        let (ca, cb) = (planar(a)?, planar(b)?);
        Ok(self.obstacles.intersects_segment(ca, cb))
    }

    /// The node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(&id)
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.values()
    }

    /// All node ids, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the node is present.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Current position of a node.
    pub fn position(&self, id: NodeId) -> Option<&P> {
        self.positions.get(&id)
    }

    /// Dimensionality of every position in this environment.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Obstacles, in insertion order.
    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// Counter bumped whenever the obstacle set changes.
    pub fn obstacle_generation(&self) -> u64 {
        self.obstacles.generation()
    }

    /// Process-unique id of this environment instance.
    pub fn instance_id(&self) -> EnvironmentInstanceId {
        self.instance_id
    }

    /// The configuration this environment was built with.
    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Whether an index failure has poisoned the environment.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}

/// Project a 2D position onto an `[x, y]` pair.
pub(crate) fn planar<P: Position>(p: &P) -> Result<[f64; 2], PositionError> {
    let c = p.coordinates();
    if c.len() != 2 {
        return Err(PositionError::IncompatibleDimension {
            left: 2,
            right: c.len(),
        });
    }
    Ok([c[0], c[1]])
}

impl<T, P> fmt::Debug for Environment<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("instance_id", &self.instance_id)
            .field("dimensions", &self.dimensions)
            .field("nodes", &self.nodes.len())
            .field("obstacles", &self.obstacles.len())
            .field("poisoned", &self.poisoned)
            .finish()
    }
}
