use thiserror::Error;

use crate::components::DesignError;
use crate::simulation::SimulationError;

/// Failure to evaluate a point or to run the optimizer.
#[derive(Error, Debug, Clone)]
pub enum OptimizationError {
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Design(#[from] DesignError),

    #[error("Evaluation was aborted")]
    Aborted,

    #[error("Waiting was interrupted")]
    Interrupted,

    #[error("Point has not been submitted for computation")]
    NotComputed,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Evaluation panicked: {0}")]
    Panicked(String),

    #[error("Could not start worker pool: {0}")]
    Pool(String),
}

impl OptimizationError {
    /// Whether the error means the point itself could not be evaluated, as
    /// opposed to a failure of the optimization machinery.
    pub fn is_evaluation_failure(&self) -> bool {
        matches!(
            self,
            Self::Evaluation(_) | Self::Simulation(_) | Self::Design(_) | Self::Panicked(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OptimizationError>;
