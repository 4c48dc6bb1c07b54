use serde::{Deserialize, Serialize};
use std::fmt;

use crate::simulation::{
    ApogeeEndListener, CoastToApogeeListener, FlightData, FlightDataType, FlightEventType,
    GroundHitEndListener, ListenerChain,
};

/// Scalar extracted from a finished simulation.
pub trait OptimizableParameter: Send + Sync {
    fn name(&self) -> &str;

    fn unit(&self) -> &str;

    /// System listeners the simulation needs to produce this value, e.g. to
    /// stop as soon as the value is known.
    fn listeners(&self) -> ListenerChain {
        ListenerChain::new()
    }

    /// NaN when the flight never produced the value.
    fn compute_value(&self, data: &FlightData) -> f64;
}

/// Built-in flight parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightParameter {
    MaximumAltitude,
    MaximumVelocity,
    MaximumAcceleration,
    LandingDistance,
    DeploymentVelocity,
    GroundHitVelocity,
    FlightTime,
    /// Stability margin when leaving the launch rod [cal]
    StabilityAtRodClearance,
}

impl fmt::Display for FlightParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl OptimizableParameter for FlightParameter {
    fn name(&self) -> &str {
        match self {
            Self::MaximumAltitude => "Maximum altitude",
            Self::MaximumVelocity => "Maximum velocity",
            Self::MaximumAcceleration => "Maximum acceleration",
            Self::LandingDistance => "Landing distance",
            Self::DeploymentVelocity => "Deployment velocity",
            Self::GroundHitVelocity => "Ground hit velocity",
            Self::FlightTime => "Total flight time",
            Self::StabilityAtRodClearance => "Stability at launch rod clearance",
        }
    }

    fn unit(&self) -> &str {
        match self {
            Self::MaximumAltitude | Self::LandingDistance => "m",
            Self::MaximumVelocity | Self::DeploymentVelocity | Self::GroundHitVelocity => "m/s",
            Self::MaximumAcceleration => "m/s²",
            Self::FlightTime => "s",
            Self::StabilityAtRodClearance => "cal",
        }
    }

    fn listeners(&self) -> ListenerChain {
        match self {
            // A late deployment must not cut the ascent short
            Self::MaximumAltitude => ListenerChain::new().with(CoastToApogeeListener),
            Self::MaximumVelocity | Self::MaximumAcceleration | Self::StabilityAtRodClearance => {
                ListenerChain::new().with(ApogeeEndListener)
            }
            Self::LandingDistance | Self::GroundHitVelocity | Self::FlightTime => {
                ListenerChain::new().with(GroundHitEndListener)
            }
            Self::DeploymentVelocity => ListenerChain::new(),
        }
    }

    fn compute_value(&self, data: &FlightData) -> f64 {
        match self {
            Self::MaximumAltitude => data.max_altitude(),
            Self::MaximumVelocity => data.max_velocity(),
            Self::MaximumAcceleration => data.max_acceleration(),
            Self::LandingDistance => data.landing_distance(),
            Self::DeploymentVelocity => data.deployment_velocity(),
            Self::GroundHitVelocity => data.ground_hit_velocity(),
            Self::FlightTime => data.flight_time(),
            Self::StabilityAtRodClearance => data
                .branch()
                .and_then(|b| {
                    let cleared = b.first_event(FlightEventType::LaunchrodCleared)?;
                    b.value_at(FlightDataType::StabilityMargin, cleared.time)
                })
                .unwrap_or(f64::NAN),
        }
    }
}
