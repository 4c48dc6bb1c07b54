//! Rocket-specific objective: what to modify, what to measure and where
//! designs are admissible.

mod domain;
mod function;
mod goal;
mod modifier;
mod observer;
mod parameter;
mod problem;

pub use domain::{DomainConfig, IdentityDomain, SimulationDomain, StabilityDomain};
pub use function::{RocketOptimizationFunction, OUTSIDE_DOMAIN_PENALTY};
pub use goal::{GoalConfig, MaximizationGoal, MinimizationGoal, OptimizationGoal, ValueSeekGoal};
pub use modifier::{default_modifiers, ComponentModifier, SimulationModifier};
pub use observer::{ChannelObserver, EvaluationObserver, EvaluationRecord};
pub use parameter::{FlightParameter, OptimizableParameter};
pub use problem::{ModifierConfig, MotorSelection, OptimizationProblem};
