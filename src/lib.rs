//! Event-driven model rocket flight simulation with parallel design optimization.
//!
//! `components` holds the design tree and motors, `systems` the cached
//! aerodynamic and mass evaluators plus the integrator, `simulation` the
//! event-driven flight simulator with its listener chain, and `optimization`
//! the function cache, the search optimizer and the rocket objective.

pub mod components;
pub mod optimization;
pub mod resources;
pub mod simulation;
pub mod systems;
pub mod utils;

pub use components::{Rocket, RocketComponent, ThrustCurveMotor};
pub use optimization::{OptimizationProblem, RocketOptimizationFunction};
pub use simulation::{FlightData, Simulator};
