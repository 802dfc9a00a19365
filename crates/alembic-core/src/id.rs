//! Strongly-typed identifiers, id generation, and hash spreading.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Identifies a node within a simulation.
///
/// Node ids are allocated by an [`IdGenerator`] and never reused.
/// Nodes order and compare by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a reaction within a simulation.
///
/// Doubles as the deterministic tie-breaker when two reactions are
/// scheduled at exactly the same time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactionId(pub u32);

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ReactionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`EnvironmentInstanceId`] allocation.
static ENVIRONMENT_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for an environment.
///
/// Allocated from a monotonic atomic counter via
/// [`EnvironmentInstanceId::next`]. Caches keyed on an environment (the
/// obstacle union kept by beam linking rules, for instance) compare this
/// id instead of an address, so a dropped environment and a fresh one
/// allocated at the same place never alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvironmentInstanceId(u64);

impl EnvironmentInstanceId {
    /// Allocate a fresh, unique instance ID. Thread-safe.
    pub fn next() -> Self {
        Self(ENVIRONMENT_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EnvironmentInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── IdGenerator ─────────────────────────────────────────────────

/// Process-wide counter backing [`IdMode::Shared`].
static SHARED_ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// How an [`IdGenerator`] allocates identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdMode {
    /// Generator-local sequential counter starting at 0.
    ///
    /// Two generators created in the same mode hand out the same
    /// sequence, regardless of which thread runs them.
    #[default]
    Stable,
    /// A single counter shared by every generator in the process.
    Shared,
}

/// Allocates node and reaction identifiers.
///
/// ```
/// use alembic_core::{IdGenerator, IdMode};
///
/// let ids = IdGenerator::new(IdMode::Stable);
/// assert_eq!(ids.next_id(), 0);
/// assert_eq!(ids.next_id(), 1);
/// ```
#[derive(Debug)]
pub struct IdGenerator {
    mode: IdMode,
    local: AtomicU32,
}

impl IdGenerator {
    /// Create a generator in the given mode.
    pub fn new(mode: IdMode) -> Self {
        Self {
            mode,
            local: AtomicU32::new(0),
        }
    }

    /// The allocation mode of this generator.
    pub fn mode(&self) -> IdMode {
        self.mode
    }

    /// Allocate the next raw identifier.
    pub fn next_id(&self) -> u32 {
        match self.mode {
            IdMode::Stable => self.local.fetch_add(1, Ordering::Relaxed),
            IdMode::Shared => SHARED_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Allocate the next identifier as a [`NodeId`].
    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.next_id())
    }

    /// Allocate the next identifier as a [`ReactionId`].
    pub fn next_reaction_id(&self) -> ReactionId {
        ReactionId(self.next_id())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(IdMode::default())
    }
}

// ── spread_hash ─────────────────────────────────────────────────

const HASH_SPAN: u64 = 1 << 30;

/// Map a sequential id onto a well-spread `i32` hash.
///
/// Id 0 maps to 0. Ids `2k + 1` and `2k + 2` share a magnitude, the
/// first positive and the second negative. Magnitudes walk the odd
/// multiples of `2^30 / pow` for `pow = 1, 2, 4, ...`, so consecutive
/// ids land far apart:
/// `0, 2^30, -2^30, 2^29, -2^29, 2^28, -2^28, 3·2^28, -3·2^28, 2^27, ...`.
/// Once `pow` exceeds `2^30` the magnitude truncates to 0.
///
/// ```
/// use alembic_core::spread_hash;
///
/// assert_eq!(spread_hash(0), 0);
/// assert_eq!(spread_hash(1), 1 << 30);
/// assert_eq!(spread_hash(2), -(1 << 30));
/// assert_eq!(spread_hash(7), 3 << 28);
/// ```
pub fn spread_hash(id: u32) -> i32 {
    if id == 0 {
        return 0;
    }
    let pair = u64::from((id - 1) / 2);
    let positive = (id - 1) % 2 == 0;
    let (pow, odd) = if pair == 0 {
        (1u64, 1u64)
    } else {
        let exp = 64 - pair.leading_zeros();
        let pow = 1u64 << exp;
        (pow, 2 * (pair - (pow >> 1)) + 1)
    };
    if pow > HASH_SPAN {
        return 0;
    }
    // odd < pow, so the product stays below 2^30.
    let magnitude = (HASH_SPAN / pow * odd) as i32;
    if positive {
        magnitude
    } else {
        -magnitude
    }
}
