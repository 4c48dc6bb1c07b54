pub mod config;
pub mod environment;
pub mod errors;

pub use config::{OptimizationConfig, SimulationOptions};
pub use environment::{
    AtmosphereConfig, AtmosphereType, AtmosphericConditions, EnvironmentConfig, EnvironmentModel,
    WindConfig,
};
pub use errors::ConfigError;
