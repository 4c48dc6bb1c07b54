use std::f64::consts::PI;

use tracing::trace;

use crate::components::{ComponentKind, Rocket, ThrustCurveMotor};
use crate::systems::cache::{CacheValidity, CachedEvaluator, CounterDomain};

/// Mass, CG and longitudinal moment of inertia of the rocket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    /// [kg]
    pub mass: f64,
    /// Axial CG position aft of the nose tip [m]
    pub cg_x: f64,
    /// Pitch/yaw moment of inertia about the CG [kg·m²]
    pub longitudinal_inertia: f64,
}

/// Mass evaluator consumed by the simulator and the stability domain.
pub trait MassEvaluator: CachedEvaluator + Send {
    /// Properties of the structure without any motor.
    fn structure(&mut self, rocket: &Rocket) -> MassProperties;

    /// Properties including `motor`, `burn_time` seconds after its ignition.
    /// Negative burn times mean the motor has not ignited yet.
    fn properties(
        &mut self,
        rocket: &Rocket,
        motor: Option<&ThrustCurveMotor>,
        burn_time: f64,
    ) -> MassProperties;
}

/// First and second axial moments of a set of point masses.
#[derive(Debug, Clone, Copy, Default)]
struct MassMoments {
    mass: f64,
    /// Σ m·x
    first: f64,
    /// Σ m·x²
    second: f64,
    /// Σ m·L²/12, own inertia of slender parts
    own: f64,
}

impl MassMoments {
    fn add(&mut self, mass: f64, x: f64, length: f64) {
        self.mass += mass;
        self.first += mass * x;
        self.second += mass * x * x;
        self.own += mass * length * length / 12.0;
    }

    fn properties(&self) -> MassProperties {
        if self.mass <= 0.0 {
            return MassProperties {
                mass: 0.0,
                cg_x: 0.0,
                longitudinal_inertia: 0.0,
            };
        }
        let cg_x = self.first / self.mass;
        // Parallel axis theorem about the CG
        let longitudinal_inertia = (self.second - self.mass * cg_x * cg_x).max(0.0) + self.own;
        MassProperties {
            mass: self.mass,
            cg_x,
            longitudinal_inertia,
        }
    }
}

/// Component build-up mass model with a cached dry structure.
#[derive(Debug, Default)]
pub struct MassCalculator {
    validity: CacheValidity,
    structure: Option<MassMoments>,
    /// Aft end of the motor mount, where the motor sits flush
    mount_aft_x: Option<f64>,
}

impl MassCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    fn moments(&mut self, rocket: &Rocket) -> MassMoments {
        self.check_cache(rocket);
        if let Some(moments) = self.structure {
            return moments;
        }
        let moments = structure_moments(rocket);
        self.structure = Some(moments);
        self.mount_aft_x = rocket.motor_mount().map(|(_, _, aft_x)| aft_x);
        moments
    }
}

impl CachedEvaluator for MassCalculator {
    fn domain(&self) -> CounterDomain {
        CounterDomain::Mass
    }

    fn validity(&self) -> &CacheValidity {
        &self.validity
    }

    fn validity_mut(&mut self) -> &mut CacheValidity {
        &mut self.validity
    }

    fn void_cache(&mut self) {
        trace!("Voiding mass cache");
        self.structure = None;
        self.mount_aft_x = None;
    }
}

impl MassEvaluator for MassCalculator {
    fn structure(&mut self, rocket: &Rocket) -> MassProperties {
        self.moments(rocket).properties()
    }

    fn properties(
        &mut self,
        rocket: &Rocket,
        motor: Option<&ThrustCurveMotor>,
        burn_time: f64,
    ) -> MassProperties {
        let mut moments = self.moments(rocket);
        if let (Some(motor), Some(aft_x)) = (motor, self.mount_aft_x) {
            let mass = if burn_time < 0.0 {
                motor.launch_mass
            } else {
                motor.mass_at(burn_time)
            };
            moments.add(mass, aft_x - 0.5 * motor.length, motor.length);
        }
        moments.properties()
    }
}

fn structure_moments(rocket: &Rocket) -> MassMoments {
    let mut moments = MassMoments::default();

    for placed in rocket.components() {
        let component = placed.component;
        match component.kind() {
            ComponentKind::NoseCone(nose) => {
                let r = nose.aft_radius;
                let l = nose.length;
                let shell = PI * r * (r * r + l * l).sqrt() * nose.thickness;
                let solid = nose.shape.volume_fraction() * PI * r * r * l;
                let mass = nose.density * shell.min(solid);
                moments.add(mass, placed.x + nose.shape.cg_fraction() * l, l);
            }
            ComponentKind::BodyTube(tube) => {
                let outer = tube.outer_radius;
                let inner = (outer - tube.thickness).max(0.0);
                let mass = tube.density * PI * (outer * outer - inner * inner) * tube.length;
                moments.add(mass, placed.x + 0.5 * tube.length, tube.length);
            }
            ComponentKind::FinSet(fins) => {
                let cr = fins.root_chord;
                let ct = fins.tip_chord;
                let mass = fins.fin_count as f64 * fins.planform_area() * fins.thickness * fins.density;
                // Chordwise centroid of the trapezoid
                let centroid = ((cr * cr + cr * ct + ct * ct) + fins.sweep * (cr + 2.0 * ct))
                    / (3.0 * (cr + ct));
                moments.add(mass, placed.x + centroid, cr);
            }
            ComponentKind::Parachute(chute) => {
                let length = component.length();
                moments.add(chute.mass, placed.x + 0.5 * length, length);
            }
            ComponentKind::MassObject(object) => {
                moments.add(object.mass, placed.x + 0.5 * object.length, object.length);
            }
        }
    }

    moments
}
