use nalgebra::Vector3;

use crate::components::{ComponentId, ForceCategory, ForceSet, Rocket, ThrustCurveMotor};
use crate::resources::EnvironmentModel;
use crate::systems::{AerodynamicEvaluator, FlightConditions, MassEvaluator, MassProperties};

/// Everything the force model produced for one state.
#[derive(Debug, Clone)]
pub struct ForceEvaluation {
    pub forces: ForceSet,
    pub mass: MassProperties,
    /// [N]
    pub thrust: f64,
    pub conditions: FlightConditions,
    pub drag_coefficient: f64,
    pub acceleration: Vector3<f64>,
}

/// Point-mass force model for one integration step.
///
/// The rocket is assumed to weathercock instantly: off the rod its axis
/// follows the relative wind, so aerodynamic forces reduce to axial drag.
pub struct FlightModel<'a> {
    pub rocket: &'a Rocket,
    pub motor: &'a ThrustCurveMotor,
    pub environment: &'a EnvironmentModel,
    pub aerodynamics: &'a mut dyn AerodynamicEvaluator,
    pub mass: &'a mut dyn MassEvaluator,
    pub launch_altitude: f64,
    /// Ignition time of the motor, if ignited
    pub ignition_time: Option<f64>,
    /// Rocket axis at the start of the step
    pub axis: Vector3<f64>,
    /// Rod direction while the rocket is still guided by it
    pub rod: Option<Vector3<f64>>,
    /// Before liftoff the rocket rests on the rod and cannot slide backwards
    pub liftoff: bool,
    pub deployed: &'a [ComponentId],
}

impl<'a> FlightModel<'a> {
    pub fn evaluate(&mut self, t: f64, position: &Vector3<f64>, velocity: &Vector3<f64>) -> ForceEvaluation {
        let mut forces = ForceSet::new();

        let burn_time = self.ignition_time.map_or(-1.0, |ignition| t - ignition);
        let thrust = self.motor.thrust_at(burn_time);
        let mass = self.mass.properties(self.rocket, Some(self.motor), burn_time);

        let altitude = self.launch_altitude + position.z;
        let atmosphere = self.environment.atmosphere(altitude);
        let wind = self.environment.get_wind(position, t);
        let relative_velocity = velocity - wind;
        let airspeed = relative_velocity.norm();

        let mut conditions = FlightConditions::new(self.rocket);
        conditions.set_air_data(airspeed, &atmosphere);

        let axis = match self.rod {
            Some(rod) => rod,
            None => self.axis,
        };
        forces.add(ForceCategory::Propulsive, thrust * axis);

        let drag_coefficient = self.aerodynamics.drag_coefficient(self.rocket, &conditions);
        let half_rho_v = 0.5 * atmosphere.density * airspeed;
        forces.add(
            ForceCategory::Aerodynamic,
            -half_rho_v * drag_coefficient * conditions.reference_area * relative_velocity,
        );
        if !self.deployed.is_empty() {
            let drag_area = self.aerodynamics.recovery_drag_area(self.rocket, self.deployed);
            forces.add(ForceCategory::Recovery, -half_rho_v * drag_area * relative_velocity);
        }

        let gravity = self.environment.gravity(altitude);
        forces.add(
            ForceCategory::Gravitational,
            Vector3::new(0.0, 0.0, -gravity * mass.mass),
        );

        let mut acceleration = forces.net() / mass.mass;
        if let Some(rod) = self.rod {
            // Guided: only the component along the rod survives
            let along = acceleration.dot(&rod);
            acceleration = if !self.liftoff && along <= 0.0 && velocity.dot(&rod) <= 0.0 {
                Vector3::zeros()
            } else {
                along * rod
            };
        }

        ForceEvaluation {
            forces,
            mass,
            thrust,
            conditions,
            drag_coefficient,
            acceleration,
        }
    }

    pub fn acceleration(&mut self, t: f64, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
        self.evaluate(t, position, velocity).acceleration
    }
}
