use serde::{Deserialize, Serialize};

/// Turns a parameter value into the value the optimizer minimizes.
pub trait OptimizationGoal: Send + Sync {
    fn minimization_parameter(&self, value: f64) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinimizationGoal;

impl OptimizationGoal for MinimizationGoal {
    fn minimization_parameter(&self, value: f64) -> f64 {
        value
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaximizationGoal;

impl OptimizationGoal for MaximizationGoal {
    fn minimization_parameter(&self, value: f64) -> f64 {
        -value
    }
}

/// Seek a specific parameter value.
#[derive(Debug, Clone, Copy)]
pub struct ValueSeekGoal {
    pub target: f64,
}

impl ValueSeekGoal {
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl OptimizationGoal for ValueSeekGoal {
    fn minimization_parameter(&self, value: f64) -> f64 {
        (value - self.target).abs()
    }
}

/// Goal selection as written in problem files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum GoalConfig {
    Minimize,
    Maximize,
    Seek { target: f64 },
}

impl GoalConfig {
    pub fn build(&self) -> Box<dyn OptimizationGoal> {
        match *self {
            Self::Minimize => Box::new(MinimizationGoal),
            Self::Maximize => Box::new(MaximizationGoal),
            Self::Seek { target } => Box::new(ValueSeekGoal::new(target)),
        }
    }
}
