pub mod optimization;
pub mod simulation;

pub use optimization::OptimizationConfig;
pub use simulation::SimulationOptions;
