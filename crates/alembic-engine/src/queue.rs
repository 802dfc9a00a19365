//! Indexed priority queue of reaction firing times.

use std::collections::BTreeSet;

use alembic_core::ReactionId;
use alembic_model::ScheduleKey;
use indexmap::IndexMap;

/// Reactions ordered by [`ScheduleKey`], addressable by id.
///
/// Every reaction appears at most once. Keys with equal tau come out in
/// reaction-id order, so two runs with the same seed pop the same
/// sequence.
#[derive(Clone, Debug, Default)]
pub struct ReactionQueue {
    ordered: BTreeSet<ScheduleKey>,
    keys: IndexMap<ReactionId, ScheduleKey>,
}

impl ReactionQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key.reaction` at `key.tau`, replacing any earlier entry.
    pub fn push(&mut self, key: ScheduleKey) {
        if let Some(old) = self.keys.insert(key.reaction, key) {
            self.ordered.remove(&old);
        }
        self.ordered.insert(key);
    }

    /// Reschedule a queued reaction. Returns false (and does nothing) if
    /// the reaction is not queued.
    pub fn update(&mut self, key: ScheduleKey) -> bool {
        if !self.keys.contains_key(&key.reaction) {
            return false;
        }
        self.push(key);
        true
    }

    /// Drop a reaction from the queue.
    pub fn remove(&mut self, reaction: ReactionId) -> Option<ScheduleKey> {
        let key = self.keys.swap_remove(&reaction)?;
        self.ordered.remove(&key);
        Some(key)
    }

    /// The earliest entry.
    pub fn peek(&self) -> Option<ScheduleKey> {
        self.ordered.first().copied()
    }

    /// Remove and return the earliest entry.
    pub fn pop(&mut self) -> Option<ScheduleKey> {
        let key = self.ordered.pop_first()?;
        self.keys.swap_remove(&key.reaction);
        Some(key)
    }

    /// The current key of a queued reaction.
    pub fn key_of(&self, reaction: ReactionId) -> Option<ScheduleKey> {
        self.keys.get(&reaction).copied()
    }

    /// Whether a reaction is queued.
    pub fn contains(&self, reaction: ReactionId) -> bool {
        self.keys.contains_key(&reaction)
    }

    /// Number of queued reactions.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alembic_core::Time;
    use proptest::prelude::*;

    fn key(tau: f64, id: u32) -> ScheduleKey {
        ScheduleKey {
            tau: Time::new(tau),
            reaction: ReactionId(id),
        }
    }

    #[test]
    fn pops_in_tau_then_id_order() {
        let mut q = ReactionQueue::new();
        q.push(key(2.0, 0));
        q.push(key(1.0, 5));
        q.push(key(1.0, 3));
        q.push(key(f64::INFINITY, 1));
        let popped: Vec<u32> = std::iter::from_fn(|| q.pop()).map(|k| k.reaction.0).collect();
        assert_eq!(popped, vec![3, 5, 0, 1]);
        assert!(q.is_empty());
    }

    #[test]
    fn push_replaces_existing_entry() {
        let mut q = ReactionQueue::new();
        q.push(key(1.0, 7));
        q.push(key(4.0, 7));
        assert_eq!(q.len(), 1);
        assert_eq!(q.peek(), Some(key(4.0, 7)));
    }

    #[test]
    fn update_ignores_unknown_reactions() {
        let mut q = ReactionQueue::new();
        assert!(!q.update(key(1.0, 2)));
        assert!(q.is_empty());
        q.push(key(1.0, 2));
        assert!(q.update(key(0.5, 2)));
        assert_eq!(q.key_of(ReactionId(2)), Some(key(0.5, 2)));
    }

    #[test]
    fn remove_drops_entry() {
        let mut q = ReactionQueue::new();
        q.push(key(1.0, 1));
        q.push(key(2.0, 2));
        assert_eq!(q.remove(ReactionId(1)), Some(key(1.0, 1)));
        assert_eq!(q.remove(ReactionId(1)), None);
        assert!(!q.contains(ReactionId(1)));
        assert_eq!(q.peek(), Some(key(2.0, 2)));
    }

    proptest! {
        #[test]
        fn pop_order_is_sorted(entries in prop::collection::vec((0.0f64..100.0, 0u32..50), 0..80)) {
            let mut q = ReactionQueue::new();
            let mut latest = IndexMap::new();
            for (tau, id) in entries {
                q.push(key(tau, id));
                latest.insert(id, key(tau, id));
            }
            let mut expected: Vec<ScheduleKey> = latest.into_values().collect();
            expected.sort();
            let popped: Vec<ScheduleKey> = std::iter::from_fn(|| q.pop()).collect();
            prop_assert_eq!(popped, expected);
        }
    }
}
