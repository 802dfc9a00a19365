//! Simulation configuration, validation, and error types.
//!
//! [`SimulationConfig`] is the builder input for a
//! [`Simulation`](crate::Simulation).
//! [`validate()`](SimulationConfig::validate) checks structural invariants
//! before anything is scheduled.

use alembic_core::{IdMode, Time};
use thiserror::Error;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimulationConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The environment's own configuration is invalid.
    #[error("environment: {0}")]
    Environment(#[from] alembic_model::ConfigError),
    /// `end_time` is NaN or negative.
    #[error("end_time must be a non-negative time or +inf, got {value}")]
    InvalidEndTime {
        /// The invalid value.
        value: f64,
    },
    /// `max_steps` is `Some(0)`.
    #[error("max_steps must be at least 1 when set")]
    ZeroMaxSteps,
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Configuration for a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Seed of the RNG shared by every stochastic distribution. Default: 0.
    pub seed: u64,
    /// Where reaction and node ids come from. Default: [`IdMode::Stable`].
    pub id_mode: IdMode,
    /// Reactions scheduled after this time never fire. Default: `+∞`.
    pub end_time: Time,
    /// Upper bound on the number of steps. Default: unbounded.
    pub max_steps: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            id_mode: IdMode::Stable,
            end_time: Time::INFINITY,
            max_steps: None,
        }
    }
}

impl SimulationConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. End time must be comparable and not before the start.
        let end = self.end_time.value();
        if end.is_nan() || end < 0.0 {
            return Err(ConfigError::InvalidEndTime { value: end });
        }
        // 2. A step cap of zero could never make progress.
        if self.max_steps == Some(0) {
            return Err(ConfigError::ZeroMaxSteps);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn bad_end_time_rejected() {
        for value in [f64::NAN, -1.0, f64::NEG_INFINITY] {
            let c = SimulationConfig {
                end_time: Time::new(value),
                ..SimulationConfig::default()
            };
            match c.validate() {
                Err(ConfigError::InvalidEndTime { .. }) => {}
                other => panic!("expected InvalidEndTime, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_max_steps_rejected() {
        let c = SimulationConfig {
            max_steps: Some(0),
            ..SimulationConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroMaxSteps));
    }

    #[test]
    fn environment_errors_convert() {
        let e: ConfigError = alembic_model::ConfigError::NoWorkers.into();
        assert_eq!(
            e.to_string(),
            "environment: worker_count must be at least 1"
        );
    }
}
