mod atmosphere;
mod wind;

pub use atmosphere::{AtmosphereConfig, AtmosphereType};
pub use wind::WindConfig;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub wind: WindConfig,
    pub atmosphere: AtmosphereConfig,
}

impl EnvironmentConfig {
    pub fn new(wind: WindConfig, atmosphere: AtmosphereConfig) -> Self {
        Self { wind, atmosphere }
    }

    /// Constant wind of `wind_speed` blowing from `wind_direction` degrees.
    pub fn with_constant_wind(wind_speed: f64, wind_direction: f64) -> Self {
        Self {
            wind: WindConfig::Constant {
                velocity: wind_from_bearing(wind_speed, wind_direction),
            },
            atmosphere: AtmosphereConfig::default(),
        }
    }

    pub fn with_power_law_wind(u_r: f64, z_r: f64, bearing: f64, alpha: f64) -> Self {
        Self {
            wind: WindConfig::PowerLaw {
                u_r,
                z_r,
                bearing,
                alpha,
            },
            atmosphere: AtmosphereConfig::default(),
        }
    }

    pub fn with_turbulent_wind(mean_speed: f64, bearing: f64, intensity: f64, seed: u64) -> Self {
        Self {
            wind: WindConfig::Turbulent {
                mean_speed,
                bearing,
                intensity,
                seed,
            },
            atmosphere: AtmosphereConfig::default(),
        }
    }
}

/// East-north-up velocity of a wind blowing from `bearing` degrees.
pub fn wind_from_bearing(speed: f64, bearing: f64) -> Vector3<f64> {
    let angle_rad = bearing.to_radians();
    Vector3::new(-speed * angle_rad.sin(), -speed * angle_rad.cos(), 0.0)
}
