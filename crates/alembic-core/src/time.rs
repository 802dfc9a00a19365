//! Simulation time.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// A point on the simulation clock.
///
/// Wraps an `f64` and orders it with [`f64::total_cmp`], so times can key
/// ordered collections. `+∞` marks "never". Times are produced by time
/// distributions, which reject NaN inputs before they reach the clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct Time(f64);

impl Time {
    /// The start of every simulation.
    pub const ZERO: Self = Self(0.0);
    /// A time that is never reached.
    pub const INFINITY: Self = Self(f64::INFINITY);

    /// Wrap a raw time value.
    pub const fn new(t: f64) -> Self {
        Self(t)
    }

    /// The raw time value.
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether this time is `+∞`.
    pub fn is_infinite(self) -> bool {
        self.0 == f64::INFINITY
    }

    /// Whether this time is finite.
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<f64> for Time {
    type Output = Time;

    fn add(self, rhs: f64) -> Time {
        Time(self.0 + rhs)
    }
}

impl Sub for Time {
    type Output = f64;

    fn sub(self, rhs: Time) -> f64 {
        self.0 - rhs.0
    }
}

impl From<f64> for Time {
    fn from(t: f64) -> Self {
        Self(t)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
