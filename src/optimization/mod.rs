pub mod general;
pub mod rocket;

pub use general::{
    AbortOutcome, DefaultOptimizationController, Function, FunctionCache, FunctionOptimizer,
    MultidirectionalSearchOptimizer, OptimizationController, OptimizationError,
    ParallelExecutorCache, Point, SearchStatistics,
};
pub use rocket::{
    default_modifiers, ChannelObserver, ComponentModifier, EvaluationObserver, EvaluationRecord,
    FlightParameter, IdentityDomain, MaximizationGoal, MinimizationGoal, OptimizableParameter,
    OptimizationGoal, OptimizationProblem, RocketOptimizationFunction, SimulationDomain,
    SimulationModifier, StabilityDomain, ValueSeekGoal,
};
