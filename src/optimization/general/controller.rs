use tracing::debug;

use crate::optimization::general::Point;

/// Decides after every optimizer step whether to carry on.
pub trait OptimizationController {
    /// Return `false` to stop the optimization.
    fn step_taken(
        &mut self,
        old_point: &Point,
        old_value: f64,
        new_point: &Point,
        new_value: f64,
        step_size: f64,
    ) -> bool;
}

impl<F> OptimizationController for F
where
    F: FnMut(&Point, f64, &Point, f64, f64) -> bool,
{
    fn step_taken(
        &mut self,
        old_point: &Point,
        old_value: f64,
        new_point: &Point,
        new_value: f64,
        step_size: f64,
    ) -> bool {
        self(old_point, old_value, new_point, new_value, step_size)
    }
}

/// Stops after a number of steps or once the step size is small enough.
#[derive(Debug, Clone)]
pub struct DefaultOptimizationController {
    max_steps: usize,
    min_step: f64,
    steps: usize,
}

impl DefaultOptimizationController {
    pub fn new(max_steps: usize, min_step: f64) -> Self {
        Self {
            max_steps,
            min_step,
            steps: 0,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl OptimizationController for DefaultOptimizationController {
    fn step_taken(
        &mut self,
        _old_point: &Point,
        _old_value: f64,
        _new_point: &Point,
        new_value: f64,
        step_size: f64,
    ) -> bool {
        self.steps += 1;
        if self.steps >= self.max_steps {
            debug!("Step limit {} reached at value {}", self.max_steps, new_value);
            return false;
        }
        if step_size < self.min_step {
            debug!("Step size {:.2e} below {:.2e}", step_size, self.min_step);
            return false;
        }
        true
    }
}
