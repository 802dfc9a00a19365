//! Interaction contexts and their strictness order.

use std::fmt;

/// How far the effect (or the inputs) of a condition or action reaches.
///
/// Strictness runs `Local` (most strict) > `Neighborhood` > `Global`
/// (least strict). A reaction's input context is the least strict
/// context among its conditions, its output context the least strict
/// among its actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Context {
    /// Touches only the owning node.
    #[default]
    Local,
    /// Touches the owning node and its current neighbors.
    Neighborhood,
    /// May touch any node in the environment.
    Global,
}

impl Context {
    fn rank(self) -> u8 {
        match self {
            Self::Local => 0,
            Self::Neighborhood => 1,
            Self::Global => 2,
        }
    }

    /// Whether `self` is strictly more strict than `other`.
    pub fn is_more_strict(self, other: Self) -> bool {
        self.rank() < other.rank()
    }

    /// The least strict of two contexts.
    pub fn least_strict(self, other: Self) -> Self {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }

    /// The least strict context in `contexts`, or `Local` when empty.
    pub fn least_strict_of(contexts: impl IntoIterator<Item = Self>) -> Self {
        contexts
            .into_iter()
            .fold(Self::Local, |acc, ctx| acc.least_strict(ctx))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Neighborhood => "neighborhood",
            Self::Global => "global",
        };
        f.write_str(name)
    }
}
