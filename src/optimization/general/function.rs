use crate::optimization::general::{Point, Result};
use crate::utils::Interrupt;

/// Scalar function minimized by the optimizer.
///
/// Implementations are called concurrently from worker threads. `interrupt`
/// is raised when the point's evaluation was aborted; long computations should
/// poll it and return [`OptimizationError::Aborted`](crate::optimization::OptimizationError::Aborted).
pub trait Function: Send + Sync {
    fn evaluate(&self, point: &Point, interrupt: &Interrupt) -> Result<f64>;
}

impl<F> Function for F
where
    F: Fn(&Point) -> f64 + Send + Sync,
{
    fn evaluate(&self, point: &Point, _interrupt: &Interrupt) -> Result<f64> {
        Ok(self(point))
    }
}
