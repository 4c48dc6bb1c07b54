use thiserror::Error;

use crate::simulation::FlightData;

#[derive(Error, Debug, Clone)]
pub enum SimulationError {
    /// The rocket could not be launched; raised before stepping starts.
    #[error("Launch error: {0}")]
    Launch(String),
    #[error("Simulation failed: {message}")]
    Calculation {
        message: String,
        data: Box<FlightData>,
    },
    #[error("Simulation cancelled")]
    Cancelled { data: Box<FlightData> },
}

impl SimulationError {
    /// Output gathered before the run stopped, if any.
    pub fn flight_data(&self) -> Option<&FlightData> {
        match self {
            Self::Launch(_) => None,
            Self::Calculation { data, .. } | Self::Cancelled { data } => Some(data),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Failure reported by a listener hook.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ListenerError {
    #[error("Listener failed: {0}")]
    Failed(String),
    #[error("Listener requested cancellation")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SimulationError>;
