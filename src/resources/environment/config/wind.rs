use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WindConfig {
    Constant {
        velocity: Vector3<f64>,
    },
    PowerLaw {
        /// Reference wind speed [m/s]
        u_r: f64,
        /// Reference height [m]
        z_r: f64,
        /// Direction the wind blows from [deg, clockwise from north]
        bearing: f64,
        alpha: f64,
    },
    /// Mean wind with seeded, reproducible gusts.
    Turbulent {
        mean_speed: f64,
        bearing: f64,
        /// Standard deviation of gusts relative to the mean speed
        intensity: f64,
        seed: u64,
    },
}

impl Default for WindConfig {
    fn default() -> Self {
        Self::Constant {
            velocity: Vector3::zeros(),
        }
    }
}
