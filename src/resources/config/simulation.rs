use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::resources::environment::EnvironmentConfig;
use crate::resources::errors::{ConfigError, Result};

/// Options of a single flight simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// [m]
    pub launch_rod_length: f64,
    /// Rod inclination from vertical [deg]
    pub launch_rod_angle: f64,
    /// Direction the rod leans towards [deg, clockwise from north]
    pub launch_rod_direction: f64,
    /// Launch site altitude above sea level [m]
    pub launch_altitude: f64,
    /// Base integration step [s]
    pub time_step: f64,
    /// Integration step once a recovery device is deployed [s]
    pub descent_time_step: f64,
    /// Lower bound of the event-limited step [s]
    pub min_time_step: f64,
    /// Hard limit on simulated time [s]
    pub max_simulation_time: f64,
    pub environment: EnvironmentConfig,
    /// Record stability, CP, CG, Mach and drag coefficient channels
    pub calculate_extras: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            launch_rod_length: 1.0,
            launch_rod_angle: 0.0,
            launch_rod_direction: 0.0,
            launch_altitude: 0.0,
            time_step: 0.01,
            descent_time_step: 0.05,
            min_time_step: 0.001,
            max_simulation_time: 1200.0,
            environment: EnvironmentConfig::default(),
            calculate_extras: true,
        }
    }
}

impl SimulationOptions {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let options: Self = serde_yaml::from_reader(file)?;
        options.validate()?;
        Ok(options)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.launch_rod_length >= 0.0 && self.launch_rod_length.is_finite()) {
            return Err(ConfigError::Validation(
                "launch_rod_length must be a non-negative number".into(),
            ));
        }
        if !(0.0..90.0).contains(&self.launch_rod_angle) {
            return Err(ConfigError::Validation(
                "launch_rod_angle must be in [0, 90) degrees".into(),
            ));
        }
        if !(self.min_time_step > 0.0
            && self.time_step >= self.min_time_step
            && self.descent_time_step >= self.min_time_step)
        {
            return Err(ConfigError::Validation(
                "time steps must satisfy 0 < min_time_step <= time_step, descent_time_step".into(),
            ));
        }
        if !(self.max_simulation_time > 0.0) {
            return Err(ConfigError::Validation(
                "max_simulation_time must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Unit vector along the launch rod in the launch-site frame.
    pub fn rod_direction(&self) -> Vector3<f64> {
        let inclination = self.launch_rod_angle.to_radians();
        let azimuth = self.launch_rod_direction.to_radians();
        Vector3::new(
            inclination.sin() * azimuth.sin(),
            inclination.sin() * azimuth.cos(),
            inclination.cos(),
        )
    }
}
