//! Axis-aligned rectangular obstacles in the plane.

use geo::{BooleanOps, Coord, Intersects, Line, MultiPolygon, Polygon, Rect};

use crate::error::SpaceError;

/// A solid axis-aligned rectangle that blocks line of sight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectObstacle {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl RectObstacle {
    /// Create an obstacle from two opposite corners.
    ///
    /// Corners may be given in any order. Returns `Err` if any coordinate
    /// is not finite or the rectangle has zero width or height.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, SpaceError> {
        if ![x1, y1, x2, y2].iter().all(|c| c.is_finite()) {
            return Err(SpaceError::InvalidExtent {
                reason: format!("non-finite obstacle corner ({x1}, {y1}) ({x2}, {y2})"),
            });
        }
        let (min_x, max_x) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (min_y, max_y) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        if min_x == max_x || min_y == max_y {
            return Err(SpaceError::InvalidExtent {
                reason: format!("degenerate obstacle [{min_x}, {max_x}] x [{min_y}, {max_y}]"),
            });
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Lower-left corner.
    pub fn min(&self) -> [f64; 2] {
        [self.min_x, self.min_y]
    }

    /// Upper-right corner.
    pub fn max(&self) -> [f64; 2] {
        [self.max_x, self.max_y]
    }

    /// Whether `p` lies inside or on the border of the obstacle.
    pub fn contains_point(&self, p: [f64; 2]) -> bool {
        self.min_x <= p[0] && p[0] <= self.max_x && self.min_y <= p[1] && p[1] <= self.max_y
    }

    /// Whether the segment from `a` to `b` touches the obstacle.
    pub fn intersects_segment(&self, a: [f64; 2], b: [f64; 2]) -> bool {
        if a[0].max(b[0]) < self.min_x
            || a[0].min(b[0]) > self.max_x
            || a[1].max(b[1]) < self.min_y
            || a[1].min(b[1]) > self.max_y
        {
            return false;
        }
        let line = Line::new(Coord { x: a[0], y: a[1] }, Coord { x: b[0], y: b[1] });
        self.to_polygon().intersects(&line)
    }

    /// The obstacle as a `geo` polygon.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            Coord {
                x: self.min_x,
                y: self.min_y,
            },
            Coord {
                x: self.max_x,
                y: self.max_y,
            },
        )
        .to_polygon()
    }

    /// The obstacle grown outward by one ulp on every side.
    ///
    /// Subtracting the grown rectangle from a polygon guarantees that a
    /// path grazing the original border is considered blocked.
    pub fn expanded(&self) -> Self {
        Self {
            min_x: self.min_x.next_down(),
            min_y: self.min_y.next_down(),
            max_x: self.max_x.next_up(),
            max_y: self.max_y.next_up(),
        }
    }
}

/// An ordered collection of obstacles with a change counter.
///
/// The generation increases on every mutation, letting callers cache
/// derived geometry (the obstacle union, typically) and rebuild it only
/// when stale.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSet {
    obstacles: Vec<RectObstacle>,
    generation: u64,
}

impl ObstacleSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an obstacle and bump the generation.
    pub fn add(&mut self, obstacle: RectObstacle) {
        self.obstacles.push(obstacle);
        self.generation += 1;
    }

    /// Remove every obstacle and bump the generation.
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.generation += 1;
    }

    /// Number of obstacles.
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Whether there are no obstacles.
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Mutation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Iterate obstacles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RectObstacle> {
        self.obstacles.iter()
    }

    /// Whether the segment from `a` to `b` touches any obstacle.
    pub fn intersects_segment(&self, a: [f64; 2], b: [f64; 2]) -> bool {
        self.obstacles.iter().any(|o| o.intersects_segment(a, b))
    }

    /// Union of every obstacle, each grown by one ulp.
    pub fn expanded_union(&self) -> MultiPolygon<f64> {
        self.obstacles
            .iter()
            .fold(MultiPolygon::new(Vec::new()), |acc, o| {
                acc.union(&MultiPolygon::new(vec![o.expanded().to_polygon()]))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn wall() -> RectObstacle {
        RectObstacle::new(1.0, -1.0, 2.0, 1.0).unwrap()
    }

    #[test]
    fn corners_are_normalized() {
        let o = RectObstacle::new(2.0, 1.0, 1.0, -1.0).unwrap();
        assert_eq!(o, wall());
    }

    #[test]
    fn degenerate_and_non_finite_rejected() {
        assert!(RectObstacle::new(0.0, 0.0, 0.0, 1.0).is_err());
        assert!(RectObstacle::new(0.0, 0.0, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn segment_crossing_and_missing() {
        let o = wall();
        assert!(o.intersects_segment([0.0, 0.0], [3.0, 0.0]));
        assert!(!o.intersects_segment([0.0, 2.0], [3.0, 2.0]));
        assert!(o.intersects_segment([1.5, 0.0], [1.5, 0.5]));
        assert!(!o.intersects_segment([0.0, 0.0], [0.9, 0.0]));
    }

    #[test]
    fn expansion_is_one_ulp() {
        let e = wall().expanded();
        assert!(e.min()[0] < 1.0);
        assert_eq!(e.min()[0].next_up(), 1.0);
        assert_eq!(e.max()[1].next_down(), 1.0);
    }

    #[test]
    fn generation_tracks_mutations() {
        let mut set = ObstacleSet::new();
        assert_eq!(set.generation(), 0);
        set.add(wall());
        set.add(RectObstacle::new(5.0, 5.0, 6.0, 6.0).unwrap());
        assert_eq!(set.generation(), 2);
        assert_eq!(set.len(), 2);
        assert!(set.intersects_segment([0.0, 0.0], [3.0, 0.0]));
        set.clear();
        assert_eq!(set.generation(), 3);
        assert!(set.is_empty());
    }

    #[test]
    fn union_of_overlapping_obstacles() {
        let mut set = ObstacleSet::new();
        set.add(RectObstacle::new(0.0, 0.0, 2.0, 2.0).unwrap());
        set.add(RectObstacle::new(1.0, 0.0, 3.0, 2.0).unwrap());
        let area = set.expanded_union().unsigned_area();
        assert!((area - 6.0).abs() < 1e-9, "area {area}");
    }
}
