use nalgebra::Vector3;

use crate::components::Rocket;
use crate::resources::AtmosphericConditions;

const MIN_AIRSPEED_THRESHOLD: f64 = 1e-6;

/// Flow state the aerodynamic evaluator is queried with.
///
/// `theta` is the roll angle of the flow plane around the rocket axis. The
/// worst-case CP search writes the most unstable roll angle back into it.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightConditions {
    /// Angle of attack [rad]
    pub aoa: f64,
    /// Roll angle of the lateral airflow [rad]
    pub theta: f64,
    pub mach: f64,
    /// Airspeed [m/s]
    pub velocity: f64,
    /// [kg/m³]
    pub density: f64,
    /// [m²/s]
    pub kinematic_viscosity: f64,
    /// Reference diameter [m]
    pub reference_length: f64,
    /// Reference cross-section [m²]
    pub reference_area: f64,
}

impl FlightConditions {
    /// Still air at sea level for the given rocket.
    pub fn new(rocket: &Rocket) -> Self {
        let reference_radius = rocket.reference_radius();
        Self {
            aoa: 0.0,
            theta: 0.0,
            mach: 0.3,
            velocity: 0.0,
            density: 1.225,
            kinematic_viscosity: 1.46e-5,
            reference_length: 2.0 * reference_radius,
            reference_area: rocket.reference_area(),
        }
    }

    /// Set airspeed, Mach number and air properties in one go.
    pub fn set_air_data(&mut self, velocity: f64, atmosphere: &AtmosphericConditions) {
        self.velocity = velocity;
        self.mach = velocity / atmosphere.speed_of_sound;
        self.density = atmosphere.density;
        self.kinematic_viscosity = atmosphere.kinematic_viscosity;
    }

    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.density * self.velocity * self.velocity
    }

    /// Angle between the rocket axis and the relative airflow.
    ///
    /// # Arguments
    /// - `axis`: Unit vector along the rocket axis.
    /// - `relative_velocity`: Rocket velocity relative to the air.
    pub fn angle_of_attack(axis: &Vector3<f64>, relative_velocity: &Vector3<f64>) -> f64 {
        let airspeed = relative_velocity.norm();
        if airspeed > MIN_AIRSPEED_THRESHOLD {
            (axis.dot(relative_velocity) / airspeed).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        }
    }
}
