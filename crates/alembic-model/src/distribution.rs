//! Time distributions: when a reaction fires next.
//!
//! Each reaction owns one distribution. The distribution holds the
//! putative time of the next firing (tau) and rescales it whenever the
//! reaction reports a new propensity.

use std::fmt;

use alembic_core::{lock_rng, SharedRng, Time};
use rand_distr::{Distribution, Exp};

use crate::error::DistributionError;

/// Schedules the firings of a single reaction.
///
/// # Contract
///
/// - `next_occurrence` is the time of the next firing, `Time::INFINITY`
///   for "never".
/// - `update` is called after the owning reaction fires (`executed`) and
///   whenever one of its inputs may have changed (`!executed`). It
///   validates the propensity, then hands over to `update_status`.
/// - `clone_box` copies parameters and tau, but not update history.
pub trait TimeDistribution: fmt::Debug + Send + Sync {
    /// Time of the next firing.
    fn next_occurrence(&self) -> Time;

    /// The distribution's intrinsic rate.
    ///
    /// NaN for distributions that are not driven by a rate.
    fn rate(&self) -> f64;

    /// Whether `update` should reject NaN and negative propensities.
    ///
    /// Distributions that ignore the propensity (a one-shot trigger fed
    /// its own NaN rate, say) opt out.
    fn is_propensity_driven(&self) -> bool {
        true
    }

    /// Validate `propensity` and recompute tau.
    fn update(
        &mut self,
        now: Time,
        executed: bool,
        propensity: f64,
    ) -> Result<(), DistributionError> {
        if self.is_propensity_driven() {
            if propensity.is_nan() {
                return Err(DistributionError::NanPropensity);
            }
            if propensity < 0.0 {
                return Err(DistributionError::NegativePropensity { propensity });
            }
        }
        self.update_status(now, executed, propensity)
    }

    /// Recompute tau from an already validated propensity.
    fn update_status(
        &mut self,
        now: Time,
        executed: bool,
        propensity: f64,
    ) -> Result<(), DistributionError>;

    /// A fresh copy with the same parameters and tau.
    fn clone_box(&self) -> Box<dyn TimeDistribution>;
}

// ── Trigger ─────────────────────────────────────────────────────

/// Fires exactly once, at a fixed time.
///
/// The first update is a dry run (the initial scheduling pass). After it,
/// the first executed update at or past the event time pushes tau to
/// `+∞` for good.
#[derive(Clone, Debug)]
pub struct Trigger {
    tau: Time,
    dry_run_done: bool,
}

impl Trigger {
    /// Fire once at `event`.
    pub fn new(event: Time) -> Self {
        Self {
            tau: event,
            dry_run_done: false,
        }
    }
}

impl TimeDistribution for Trigger {
    fn next_occurrence(&self) -> Time {
        self.tau
    }

    fn rate(&self) -> f64 {
        f64::NAN
    }

    fn is_propensity_driven(&self) -> bool {
        false
    }

    fn update_status(
        &mut self,
        now: Time,
        executed: bool,
        _propensity: f64,
    ) -> Result<(), DistributionError> {
        if self.dry_run_done && executed && now >= self.tau {
            self.tau = Time::INFINITY;
        }
        self.dry_run_done = true;
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn TimeDistribution> {
        Box::new(Self::new(self.tau))
    }
}

// ── DiracComb ───────────────────────────────────────────────────

/// Fires periodically with period `1 / rate`, starting at `start`.
///
/// Every executed update advances tau by one period; other updates leave
/// it alone, so the firing times are exactly `start + k / rate`.
#[derive(Clone, Debug)]
pub struct DiracComb {
    tau: Time,
    rate: f64,
}

impl DiracComb {
    /// Fire at `start`, then every `1 / rate`.
    ///
    /// Returns `Err` unless `rate` is finite and positive.
    pub fn new(start: Time, rate: f64) -> Result<Self, DistributionError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DistributionError::InvalidRate { rate });
        }
        Ok(Self { tau: start, rate })
    }
}

impl TimeDistribution for DiracComb {
    fn next_occurrence(&self) -> Time {
        self.tau
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn update_status(
        &mut self,
        _now: Time,
        executed: bool,
        _propensity: f64,
    ) -> Result<(), DistributionError> {
        if executed {
            self.tau = self.tau + 1.0 / self.rate;
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn TimeDistribution> {
        Box::new(self.clone())
    }
}

// ── ExponentialTime ─────────────────────────────────────────────

/// Markovian firing times: the gap to the next firing is exponentially
/// distributed with parameter equal to the current propensity.
///
/// When the propensity changes without the reaction firing, the pending
/// gap is rescaled by `old / new` instead of being redrawn (the
/// next-reaction method), which keeps the process exact and saves a
/// random draw.
///
/// Before the first update no propensity has been seen: a first update
/// with propensity zero parks tau at `+∞`, any other draws a gap.
#[derive(Clone, Debug)]
pub struct ExponentialTime {
    tau: Time,
    rate: f64,
    last_propensity: Option<f64>,
    rng: SharedRng,
}

impl ExponentialTime {
    /// Markovian distribution with intrinsic `rate`, starting at `start`.
    pub fn new(rate: f64, start: Time, rng: SharedRng) -> Result<Self, DistributionError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(DistributionError::InvalidRate { rate });
        }
        Ok(Self {
            tau: start,
            rate,
            last_propensity: None,
            rng,
        })
    }

    /// The propensity seen by the previous update, if any.
    pub fn last_propensity(&self) -> Option<f64> {
        self.last_propensity
    }

    fn draw(&self, now: Time, propensity: f64) -> Result<Time, DistributionError> {
        let exp = Exp::new(propensity)
            .map_err(|_| DistributionError::InvalidRate { rate: propensity })?;
        let gap: f64 = exp.sample(&mut *lock_rng(&self.rng));
        Ok(now + gap)
    }
}

impl TimeDistribution for ExponentialTime {
    fn next_occurrence(&self) -> Time {
        self.tau
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn update_status(
        &mut self,
        now: Time,
        executed: bool,
        propensity: f64,
    ) -> Result<(), DistributionError> {
        match self.last_propensity {
            Some(old) if propensity != 0.0 && old != 0.0 && !executed => {
                if old != propensity {
                    self.tau = now + (self.tau - now) * (old / propensity);
                }
            }
            _ if propensity != 0.0 => self.tau = self.draw(now, propensity)?,
            Some(old) if old == 0.0 => {}
            _ => self.tau = Time::INFINITY,
        }
        self.last_propensity = Some(propensity);
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn TimeDistribution> {
        Box::new(Self {
            tau: self.tau,
            rate: self.rate,
            last_propensity: None,
            rng: self.rng.clone(),
        })
    }
}
