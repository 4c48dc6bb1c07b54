pub mod aerodynamics;
pub mod cache;
pub mod mass;
pub mod physics;

pub use aerodynamics::{
    AerodynamicEvaluator, BarrowmanCalculator, CenterOfPressure, FlightConditions, ROLL_SAMPLES,
};
pub use cache::{CacheValidity, CachedEvaluator, CounterDomain};
pub use mass::{MassCalculator, MassEvaluator, MassProperties};
pub use physics::{limited_time_step, rk4_step, StateDerivatives};
