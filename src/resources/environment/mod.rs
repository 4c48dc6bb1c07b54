mod config;
mod environment;

pub use config::{wind_from_bearing, AtmosphereConfig, AtmosphereType, EnvironmentConfig, WindConfig};
pub use environment::{AtmosphericConditions, EnvironmentModel};
