//! Environment configuration and validation.

use crate::error::ConfigError;

/// Tuning knobs for an [`Environment`](crate::Environment).
#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentConfig {
    /// Side length of the default [`GridIndex`](alembic_space::GridIndex)
    /// cells. Should be close to the typical linking range. Default: 1.0.
    pub grid_cell_size: f64,
    /// Range queries with more candidates than this fan their distance
    /// post-filter out across worker threads. Default: 4096.
    pub parallel_filter_threshold: usize,
    /// Worker threads used by the parallel post-filter. Default:
    /// available parallelism, clamped to `[1, 16]`.
    pub worker_count: usize,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            grid_cell_size: 1.0,
            parallel_filter_threshold: 4096,
            worker_count: cpus.clamp(1, 16),
        }
    }
}

impl EnvironmentConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Cell size must be usable as a grid divisor.
        if !self.grid_cell_size.is_finite() || self.grid_cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize {
                value: self.grid_cell_size,
            });
        }
        // 2. At least the calling thread filters.
        if self.worker_count == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}
