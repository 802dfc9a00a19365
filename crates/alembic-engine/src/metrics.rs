//! Per-step metrics for the simulation engine.
//!
//! [`StepMetrics`] captures what the last step did and how long it took,
//! alongside counters accumulated since the simulation was built.

use alembic_core::ReactionId;

/// Work done during a single step, plus cumulative counters.
///
/// The engine overwrites the per-step fields after each `step()` call and
/// carries the cumulative ones forward.
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// The reaction popped from the queue, if any.
    pub reaction: Option<ReactionId>,
    /// Whether the popped reaction's conditions held and its actions ran.
    pub executed: bool,
    /// Dependent reactions rescheduled after the firing.
    pub dependents_updated: usize,
    /// Neighborhoods recomputed from environment mutations.
    pub neighborhoods_recomputed: usize,
    /// Reactions dropped because their node left the environment.
    pub reactions_dropped: usize,
    /// Cumulative number of executed reactions.
    pub executed_total: u64,
    /// Cumulative number of popped reactions whose conditions failed.
    pub skipped_total: u64,
    /// Cumulative number of dependent reschedules.
    pub dependents_total: u64,
    /// Cumulative number of neighborhood recomputations, including the
    /// initial pass.
    pub neighborhoods_total: u64,
    /// Cumulative number of dropped reactions.
    pub dropped_total: u64,
}

impl StepMetrics {
    /// Reset the per-step fields, keeping the cumulative counters.
    pub(crate) fn begin_step(&mut self) {
        self.total_us = 0;
        self.reaction = None;
        self.executed = false;
        self.dependents_updated = 0;
        self.neighborhoods_recomputed = 0;
        self.reactions_dropped = 0;
    }

    /// Fold the per-step fields into the cumulative counters.
    pub(crate) fn finish_step(&mut self) {
        if self.reaction.is_some() {
            if self.executed {
                self.executed_total += 1;
            } else {
                self.skipped_total += 1;
            }
        }
        self.dependents_total += self.dependents_updated as u64;
        self.neighborhoods_total += self.neighborhoods_recomputed as u64;
        self.dropped_total += self.reactions_dropped as u64;
    }
}
