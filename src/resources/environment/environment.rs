use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, Uniform};
use tracing::warn;

use super::config::{wind_from_bearing, AtmosphereType, EnvironmentConfig, WindConfig};

const GAS_CONSTANT: f64 = 287.053;
const GAMMA: f64 = 1.4;
const G0: f64 = 9.80665;
const EARTH_RADIUS: f64 = 6_371_000.0;

/// Base altitude [m] and temperature lapse rate [K/m] of each ISA layer.
const ISA_LAYERS: [(f64, f64); 7] = [
    (0.0, -0.0065),
    (11_000.0, 0.0),
    (20_000.0, 0.001),
    (32_000.0, 0.0028),
    (47_000.0, 0.0),
    (51_000.0, -0.0028),
    (71_000.0, -0.002),
];

/// Number of sinusoidal modes making up the turbulent wind.
const GUST_MODES: usize = 12;

/// Air properties at one altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphericConditions {
    /// [K]
    pub temperature: f64,
    /// [Pa]
    pub pressure: f64,
    /// [kg/m³]
    pub density: f64,
    /// [m/s]
    pub speed_of_sound: f64,
    /// [m²/s]
    pub kinematic_viscosity: f64,
}

impl AtmosphericConditions {
    fn from_temperature_pressure(temperature: f64, pressure: f64) -> Self {
        let density = pressure / (GAS_CONSTANT * temperature);
        Self::new(temperature, pressure, density)
    }

    fn new(temperature: f64, pressure: f64, density: f64) -> Self {
        // Sutherland's law for dynamic viscosity
        let mu = 1.458e-6 * temperature.powf(1.5) / (temperature + 110.4);
        Self {
            temperature,
            pressure,
            density,
            speed_of_sound: (GAMMA * GAS_CONSTANT * temperature).sqrt(),
            kinematic_viscosity: mu / density,
        }
    }
}

#[derive(Debug, Clone)]
struct GustMode {
    amplitude: Vector3<f64>,
    /// [rad/s]
    frequency: f64,
    phase: f64,
}

#[derive(Debug, Clone)]
enum WindModel {
    Constant(Vector3<f64>),
    PowerLaw {
        reference: Vector3<f64>,
        z_r: f64,
        alpha: f64,
    },
    Turbulent {
        mean: Vector3<f64>,
        modes: Vec<GustMode>,
    },
}

/// Atmosphere and wind for one simulation run.
///
/// Built from an [`EnvironmentConfig`]; the turbulent wind draws its modes once
/// from a seeded generator so repeated runs see the same gusts.
#[derive(Debug, Clone)]
pub struct EnvironmentModel {
    config: EnvironmentConfig,
    wind: WindModel,
}

impl EnvironmentModel {
    pub fn new(config: &EnvironmentConfig) -> Self {
        let wind = match &config.wind {
            WindConfig::Constant { velocity } => WindModel::Constant(*velocity),
            WindConfig::PowerLaw {
                u_r,
                z_r,
                bearing,
                alpha,
            } => WindModel::PowerLaw {
                reference: wind_from_bearing(*u_r, *bearing),
                z_r: z_r.max(1e-3),
                alpha: *alpha,
            },
            WindConfig::Turbulent {
                mean_speed,
                bearing,
                intensity,
                seed,
            } => WindModel::Turbulent {
                mean: wind_from_bearing(*mean_speed, *bearing),
                modes: gust_modes(*mean_speed * *intensity, *seed),
            },
        };

        Self {
            config: config.clone(),
            wind,
        }
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Air properties at `altitude` metres above sea level.
    pub fn atmosphere(&self, altitude: f64) -> AtmosphericConditions {
        let atmosphere = &self.config.atmosphere;
        match atmosphere.model_type {
            AtmosphereType::Constant => AtmosphericConditions::new(
                atmosphere.sea_level_temperature,
                atmosphere.sea_level_pressure,
                atmosphere.sea_level_density,
            ),
            AtmosphereType::Standard => {
                let (temperature, pressure) = isa_temperature_pressure(
                    altitude,
                    atmosphere.sea_level_temperature,
                    atmosphere.sea_level_pressure,
                );
                AtmosphericConditions::from_temperature_pressure(temperature, pressure)
            }
        }
    }

    pub fn get_density(&self, altitude: f64) -> f64 {
        self.atmosphere(altitude).density
    }

    /// Wind velocity at `position` (launch-site frame, z above ground) and time `t`.
    pub fn get_wind(&self, position: &Vector3<f64>, t: f64) -> Vector3<f64> {
        match &self.wind {
            WindModel::Constant(velocity) => *velocity,
            WindModel::PowerLaw {
                reference,
                z_r,
                alpha,
            } => {
                let height = position.z.max(0.0);
                reference * (height / z_r).powf(*alpha)
            }
            WindModel::Turbulent { mean, modes } => {
                modes.iter().fold(*mean, |wind, mode| {
                    wind + mode.amplitude * (mode.frequency * t + mode.phase).sin()
                })
            }
        }
    }

    /// Gravitational acceleration at `altitude` metres above sea level.
    pub fn gravity(&self, altitude: f64) -> f64 {
        let ratio = EARTH_RADIUS / (EARTH_RADIUS + altitude.max(0.0));
        G0 * ratio * ratio
    }
}

fn isa_temperature_pressure(altitude: f64, t0: f64, p0: f64) -> (f64, f64) {
    let altitude = altitude.max(0.0);
    let mut temperature = t0;
    let mut pressure = p0;

    for (i, &(base, lapse)) in ISA_LAYERS.iter().enumerate() {
        let top = ISA_LAYERS.get(i + 1).map_or(f64::INFINITY, |l| l.0);
        let dh = altitude.min(top) - base;
        if dh <= 0.0 {
            break;
        }

        if lapse.abs() < 1e-12 {
            pressure *= (-G0 * dh / (GAS_CONSTANT * temperature)).exp();
        } else {
            let next_temperature = temperature + lapse * dh;
            pressure *= (next_temperature / temperature).powf(-G0 / (GAS_CONSTANT * lapse));
            temperature = next_temperature;
        }

        if altitude <= top {
            break;
        }
    }

    (temperature, pressure)
}

fn gust_modes(sigma: f64, seed: u64) -> Vec<GustMode> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let per_mode = sigma / (GUST_MODES as f64 / 2.0).sqrt();
    let amplitude = match Normal::new(0.0, per_mode.abs()) {
        Ok(normal) => normal,
        Err(e) => {
            warn!("Invalid gust intensity {}: {}; using calm air", sigma, e);
            return Vec::new();
        }
    };
    // 0.05 Hz to 2 Hz covers the gust spectrum a model rocket responds to
    let frequency = Uniform::new(0.05 * std::f64::consts::TAU, 2.0 * std::f64::consts::TAU);

    (0..GUST_MODES)
        .map(|_| GustMode {
            amplitude: Vector3::new(
                amplitude.sample(&mut rng),
                amplitude.sample(&mut rng),
                0.25 * amplitude.sample(&mut rng),
            ),
            frequency: frequency.sample(&mut rng),
            phase: rng.gen_range(0.0..std::f64::consts::TAU),
        })
        .collect()
}
