mod barrowman;
mod conditions;

pub use barrowman::{
    AerodynamicEvaluator, BarrowmanCalculator, CenterOfPressure, ROLL_SAMPLES,
};
pub use conditions::FlightConditions;
