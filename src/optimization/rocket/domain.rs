use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::components::{Rocket, ThrustCurveProvider};
use crate::resources::SimulationOptions;
use crate::systems::{
    AerodynamicEvaluator, BarrowmanCalculator, FlightConditions, MassCalculator, MassEvaluator,
};

/// Admissible region of the design space.
pub trait SimulationDomain: Send + Sync {
    /// Signed distance from the admissible region. Non-positive means inside,
    /// NaN means far outside.
    fn distance(
        &self,
        rocket: &Rocket,
        options: &SimulationOptions,
        provider: &dyn ThrustCurveProvider,
    ) -> f64;
}

/// Every design is admissible.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityDomain;

impl SimulationDomain for IdentityDomain {
    fn distance(&self, _: &Rocket, _: &SimulationOptions, _: &dyn ThrustCurveProvider) -> f64 {
        -1.0
    }
}

/// Static stability margin bounds [calibers].
///
/// Uses the worst-case CP over all roll angles against the launch CG, with
/// the motor loaded but not ignited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityDomain {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl StabilityDomain {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Stability margin of the design at launch, NaN when it cannot be computed.
    pub fn stability(rocket: &Rocket, provider: &dyn ThrustCurveProvider) -> f64 {
        let mut aerodynamics = BarrowmanCalculator::new();
        let mut mass = MassCalculator::new();

        let mut conditions = FlightConditions::new(rocket);
        let cp = aerodynamics.worst_cp(rocket, &mut conditions);
        if !cp.is_defined() {
            return f64::NAN;
        }

        let motor = rocket
            .motor_mount()
            .and_then(|(_, config, _)| provider.motor(&config.digest));
        let cg = mass.properties(rocket, motor, -1.0).cg_x;

        let caliber = 2.0 * rocket.reference_radius();
        if !(caliber > 0.0) {
            return f64::NAN;
        }
        (cp.x - cg) / caliber
    }
}

impl SimulationDomain for StabilityDomain {
    fn distance(
        &self,
        rocket: &Rocket,
        _options: &SimulationOptions,
        provider: &dyn ThrustCurveProvider,
    ) -> f64 {
        if self.min.is_none() && self.max.is_none() {
            return 0.0;
        }
        let stability = Self::stability(rocket, provider);
        if !stability.is_finite() {
            return f64::NAN;
        }
        trace!("Design stability {:.3} cal", stability);

        let below = self.min.map_or(f64::NEG_INFINITY, |min| min - stability);
        let above = self.max.map_or(f64::NEG_INFINITY, |max| stability - max);
        below.max(above)
    }
}

/// Domain selection as written in problem files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DomainConfig {
    #[default]
    Identity,
    Stability {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

impl DomainConfig {
    pub fn build(&self) -> Box<dyn SimulationDomain> {
        match *self {
            Self::Identity => Box::new(IdentityDomain),
            Self::Stability { min, max } => Box::new(StabilityDomain::new(min, max)),
        }
    }
}
