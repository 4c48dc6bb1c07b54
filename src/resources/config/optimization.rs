use serde::{Deserialize, Serialize};

use crate::resources::errors::{ConfigError, Result};

/// Options of the optimizer and its evaluation pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Worker threads evaluating points, 0 means one per available core
    pub threads: usize,
    /// Stop after this many optimizer steps
    pub max_steps: usize,
    /// Stop once the step size falls below this
    pub min_step: f64,
    pub use_expansion: bool,
    pub use_coordinate_search: bool,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            max_steps: 100,
            min_step: 0.001,
            use_expansion: true,
            use_coordinate_search: true,
        }
    }
}

impl OptimizationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(ConfigError::Validation("max_steps must be at least 1".into()));
        }
        if !(self.min_step > 0.0 && self.min_step < 1.0) {
            return Err(ConfigError::Validation("min_step must be in (0, 1)".into()));
        }
        Ok(())
    }

    /// Resolved number of worker threads.
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        }
    }
}
