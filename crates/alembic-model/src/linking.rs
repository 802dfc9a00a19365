//! Linking rules: who can interact with whom.

use std::sync::{Mutex, PoisonError};

use alembic_core::{EnvironmentInstanceId, NodeId, Position};
use geo::{BooleanOps, Coord, Intersects, LineString, MultiPolygon, Point, Polygon};
use tracing::debug;

use crate::environment::{planar, Environment};
use crate::error::{EnvironmentError, LinkError};
use crate::neighborhood::Neighborhood;
use crate::node::Concentration;

/// Computes the neighborhood of a node from the current environment.
///
/// Rules must be pure functions of the environment state: computing the
/// same node twice without an intervening mutation yields equal
/// neighborhoods. The reference engine additionally assumes rules are
/// symmetric (`b` neighbors `a` iff `a` neighbors `b`) when deciding which
/// neighborhoods a move invalidates.
pub trait LinkingRule<T, P>: Send + Sync {
    /// Compute the neighborhood of `center`.
    fn compute_neighborhood(
        &self,
        center: NodeId,
        env: &Environment<T, P>,
    ) -> Result<Neighborhood, LinkError>;

    /// The connection radius.
    fn range(&self) -> f64;
}

fn link_err(center: NodeId) -> impl FnOnce(EnvironmentError) -> LinkError {
    move |source| LinkError::Environment { center, source }
}

fn within_range<T: Concentration, P: Position>(
    center: NodeId,
    range: f64,
    env: &Environment<T, P>,
) -> Result<Vec<NodeId>, LinkError> {
    env.nodes_within_range(center, range)
        .map_err(link_err(center))
}

fn position_of<T: Concentration, P: Position>(
    id: NodeId,
    env: &Environment<T, P>,
    center: NodeId,
) -> Result<&P, LinkError> {
    env.position(id).ok_or(LinkError::Environment {
        center,
        source: EnvironmentError::NodeNotFound { node: id },
    })
}

// ── EuclideanDistance ───────────────────────────────────────────

/// Links every pair of nodes within a fixed distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EuclideanDistance {
    range: f64,
}

impl EuclideanDistance {
    /// Link nodes at most `range` apart.
    pub fn new(range: f64) -> Self {
        Self { range }
    }
}

impl<T: Concentration, P: Position> LinkingRule<T, P> for EuclideanDistance {
    fn compute_neighborhood(
        &self,
        center: NodeId,
        env: &Environment<T, P>,
    ) -> Result<Neighborhood, LinkError> {
        Ok(Neighborhood::new(
            center,
            within_range(center, self.range, env)?,
        ))
    }

    fn range(&self) -> f64 {
        self.range
    }
}

// ── ObstaclesBreakConnection ────────────────────────────────────

/// [`EuclideanDistance`], minus the neighbors hidden behind an obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstaclesBreakConnection {
    range: f64,
}

impl ObstaclesBreakConnection {
    /// Link unobstructed nodes at most `range` apart.
    pub fn new(range: f64) -> Self {
        Self { range }
    }
}

impl<T: Concentration, P: Position> LinkingRule<T, P> for ObstaclesBreakConnection {
    fn compute_neighborhood(
        &self,
        center: NodeId,
        env: &Environment<T, P>,
    ) -> Result<Neighborhood, LinkError> {
        let candidates = within_range(center, self.range, env)?;
        if env.obstacles().is_empty() || candidates.is_empty() {
            return Ok(Neighborhood::new(center, candidates));
        }
        let origin = position_of(center, env, center)?;
        let mut kept = Vec::with_capacity(candidates.len());
        for id in candidates {
            let target = position_of(id, env, center)?;
            if !env
                .intersects_obstacle(origin, target)
                .map_err(link_err(center))?
            {
                kept.push(id);
            }
        }
        Ok(Neighborhood::new(center, kept))
    }

    fn range(&self) -> f64 {
        self.range
    }
}

// ── ConnectionBeam ──────────────────────────────────────────────

#[derive(Debug)]
struct ObstacleCache {
    environment: EnvironmentInstanceId,
    generation: u64,
    union: MultiPolygon<f64>,
}

/// [`ObstaclesBreakConnection`] with diffraction: a blocked neighbor stays
/// linked if a beam of half-width `beam_width` around the line of sight
/// can still get around the obstacles.
///
/// The beam is the rectangle around the segment between the two nodes,
/// widened by `beam_width` on each side and extended by `beam_width` past
/// each end. The union of all obstacles (each grown by one ulp) is
/// subtracted from it; the nodes stay linked if one connected piece of
/// what remains holds both of them.
///
/// The obstacle union is cached and rebuilt only when the environment
/// instance or its obstacle generation changes.
#[derive(Debug)]
pub struct ConnectionBeam {
    range: f64,
    beam_width: f64,
    cache: Mutex<Option<ObstacleCache>>,
}

impl ConnectionBeam {
    /// Link nodes at most `range` apart, diffracting around obstacles
    /// with a beam of half-width `beam_width`.
    pub fn new(range: f64, beam_width: f64) -> Self {
        Self {
            range,
            beam_width,
            cache: Mutex::new(None),
        }
    }

    /// Half-width of the beam.
    pub fn beam_width(&self) -> f64 {
        self.beam_width
    }

    fn beam(&self, a: [f64; 2], b: [f64; 2]) -> Polygon<f64> {
        let angle = (b[1] - a[1]).atan2(b[0] - a[0]);
        // Offset across the line of sight, and along it.
        let (dx, dy) = (
            self.beam_width * (std::f64::consts::FRAC_PI_2 + angle).cos(),
            self.beam_width * (std::f64::consts::FRAC_PI_2 + angle).sin(),
        );
        let (cx, cy) = (self.beam_width * angle.cos(), self.beam_width * angle.sin());
        let ring = vec![
            Coord { x: a[0] + dx - cx, y: a[1] + dy - cy },
            Coord { x: a[0] - dx - cx, y: a[1] - dy - cy },
            Coord { x: b[0] - dx + cx, y: b[1] - dy + cy },
            Coord { x: b[0] + dx + cx, y: b[1] + dy + cy },
            Coord { x: a[0] + dx - cx, y: a[1] + dy - cy },
        ];
        Polygon::new(LineString::new(ring), Vec::new())
    }

    fn beam_overcomes(&self, a: [f64; 2], b: [f64; 2], obstacles: &MultiPolygon<f64>) -> bool {
        let free = MultiPolygon::new(vec![self.beam(a, b)]).difference(obstacles);
        let (pa, pb) = (Point::new(a[0], a[1]), Point::new(b[0], b[1]));
        free.0
            .iter()
            .any(|piece| piece.intersects(&pa) && piece.intersects(&pb))
    }
}

impl<T: Concentration, P: Position> LinkingRule<T, P> for ConnectionBeam {
    fn compute_neighborhood(
        &self,
        center: NodeId,
        env: &Environment<T, P>,
    ) -> Result<Neighborhood, LinkError> {
        let candidates = within_range(center, self.range, env)?;
        if env.obstacles().is_empty() || candidates.is_empty() {
            return Ok(Neighborhood::new(center, candidates));
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let stale = cache.as_ref().map_or(true, |c| {
            c.environment != env.instance_id() || c.generation != env.obstacle_generation()
        });
        if stale {
            debug!(
                environment = %env.instance_id(),
                generation = env.obstacle_generation(),
                "rebuilding obstacle union"
            );
            *cache = Some(ObstacleCache {
                environment: env.instance_id(),
                generation: env.obstacle_generation(),
                union: env.obstacles().expanded_union(),
            });
        }
        let Some(obstacles) = cache.as_ref().map(|c| &c.union) else {
            return Ok(Neighborhood::new(center, candidates));
        };

        let origin = position_of(center, env, center)?;
        let a = planar(origin).map_err(|e| link_err(center)(e.into()))?;
        let mut kept = Vec::with_capacity(candidates.len());
        for id in candidates {
            let target = position_of(id, env, center)?;
            let blocked = env
                .intersects_obstacle(origin, target)
                .map_err(link_err(center))?;
            if !blocked {
                kept.push(id);
                continue;
            }
            let b = planar(target).map_err(|e| link_err(center)(e.into()))?;
            if self.beam_overcomes(a, b, obstacles) {
                kept.push(id);
            }
        }
        Ok(Neighborhood::new(center, kept))
    }

    fn range(&self) -> f64 {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::node::Node;
    use alembic_core::Euclidean;
    use alembic_space::RectObstacle;

    fn env_with(points: &[(f64, f64)]) -> Environment<f64, Euclidean> {
        let mut env = Environment::new(2, EnvironmentConfig::default()).unwrap();
        for (i, (x, y)) in points.iter().enumerate() {
            env.add_node(Node::new(NodeId(i as u32)), Euclidean::new([*x, *y]).unwrap())
                .unwrap();
        }
        env
    }

    fn ids(n: &Neighborhood) -> Vec<u32> {
        n.iter().map(|id| id.0).collect()
    }

    #[test]
    fn euclidean_links_within_range() {
        let env = env_with(&[(0.0, 0.0), (3.0, 0.0)]);
        let wide = EuclideanDistance::new(5.0);
        let narrow = EuclideanDistance::new(2.0);
        assert_eq!(ids(&wide.compute_neighborhood(NodeId(0), &env).unwrap()), vec![1]);
        assert!(narrow
            .compute_neighborhood(NodeId(0), &env)
            .unwrap()
            .is_empty());
        assert_eq!(LinkingRule::<f64, Euclidean>::range(&wide), 5.0);
    }

    #[test]
    fn infinite_range_links_everyone() {
        let env = env_with(&[(0.0, 0.0), (3.0, 0.0), (-9e9, 9e9)]);
        let rule = EuclideanDistance::new(f64::INFINITY);
        assert_eq!(ids(&rule.compute_neighborhood(NodeId(0), &env).unwrap()), vec![1, 2]);
    }

    #[test]
    fn missing_center_is_reported() {
        let env = env_with(&[(0.0, 0.0)]);
        match EuclideanDistance::new(1.0).compute_neighborhood(NodeId(7), &env) {
            Err(LinkError::Environment {
                center: NodeId(7),
                source: EnvironmentError::NodeNotFound { .. },
            }) => {}
            other => panic!("expected NodeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn obstacle_breaks_line_of_sight() {
        let mut env = env_with(&[(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)]);
        env.add_obstacle(RectObstacle::new(1.9, -0.1, 2.1, 0.1).unwrap())
            .unwrap();
        let rule = ObstaclesBreakConnection::new(5.0);
        assert_eq!(ids(&rule.compute_neighborhood(NodeId(0), &env).unwrap()), vec![2]);
    }

    #[test]
    fn no_obstacles_means_euclidean() {
        let env = env_with(&[(0.0, 0.0), (4.0, 0.0), (0.0, 3.0), (9.0, 9.0)]);
        let euclid = EuclideanDistance::new(5.0);
        let obstacles = ObstaclesBreakConnection::new(5.0);
        let beam = ConnectionBeam::new(5.0, 0.5);
        for c in 0..4 {
            let expected = euclid.compute_neighborhood(NodeId(c), &env).unwrap();
            assert_eq!(obstacles.compute_neighborhood(NodeId(c), &env).unwrap(), expected);
            assert_eq!(beam.compute_neighborhood(NodeId(c), &env).unwrap(), expected);
        }
    }

    #[test]
    fn beam_diffracts_around_small_obstacle() {
        let mut env = env_with(&[(0.0, 0.0), (4.0, 0.0)]);
        env.add_obstacle(RectObstacle::new(1.9, -0.1, 2.1, 0.1).unwrap())
            .unwrap();
        let wide = ConnectionBeam::new(5.0, 0.5);
        let narrow = ConnectionBeam::new(5.0, 0.05);
        assert_eq!(ids(&wide.compute_neighborhood(NodeId(0), &env).unwrap()), vec![1]);
        assert!(narrow
            .compute_neighborhood(NodeId(0), &env)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn beam_cache_follows_obstacle_generation() {
        let mut env = env_with(&[(0.0, 0.0), (4.0, 0.0)]);
        env.add_obstacle(RectObstacle::new(1.9, 1.0, 2.1, 2.0).unwrap())
            .unwrap();
        let rule = ConnectionBeam::new(5.0, 0.5);
        assert_eq!(ids(&rule.compute_neighborhood(NodeId(0), &env).unwrap()), vec![1]);
        // A wall spanning the whole beam.
        env.add_obstacle(RectObstacle::new(1.9, -5.0, 2.1, 5.0).unwrap())
            .unwrap();
        assert!(rule
            .compute_neighborhood(NodeId(0), &env)
            .unwrap()
            .is_empty());
    }
}
