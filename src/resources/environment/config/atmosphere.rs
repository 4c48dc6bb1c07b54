use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereConfig {
    pub model_type: AtmosphereType,
    pub sea_level_density: f64,
    pub sea_level_temperature: f64,
    pub sea_level_pressure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtmosphereType {
    /// Sea-level conditions at every altitude
    Constant,
    /// International Standard Atmosphere, troposphere and lower stratosphere
    Standard,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            model_type: AtmosphereType::Standard,
            sea_level_density: 1.225,
            sea_level_temperature: 288.15,
            sea_level_pressure: 101_325.0,
        }
    }
}

impl AtmosphereConfig {
    pub fn constant() -> Self {
        Self {
            model_type: AtmosphereType::Constant,
            ..Default::default()
        }
    }
}
