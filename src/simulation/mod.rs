pub mod engine;
pub mod error;
pub mod event;
pub mod flight_data;
pub mod forces;
pub mod listener;
pub mod status;
pub mod warning;

pub use engine::Simulator;
pub use error::{ListenerError, SimulationError};
pub use event::{EventQueue, FlightEvent, FlightEventType, EVENT_TIME_EPSILON};
pub use flight_data::{FlightData, FlightDataBranch, FlightDataType};
pub use forces::{FlightModel, ForceEvaluation};
pub use listener::{
    ApogeeEndListener, CoastToApogeeListener, GroundHitEndListener, HookOutcome, HookResult,
    InterruptListener, ListenerChain, SimulationListener,
};
pub use status::SimulationStatus;
pub use warning::{Warning, WarningSet};
