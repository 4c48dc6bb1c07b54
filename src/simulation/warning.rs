use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem::discriminant;

use crate::simulation::FlightEventType;

/// Non-fatal anomaly observed during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// A user listener skipped, suppressed or modified part of the simulation
    ListenersAffected,
    RecoveryDeploymentWhileBurning,
    RecoveryLaunchRod,
    RecoveryHighSpeed { speed: f64 },
    LowLaunchRodVelocity { velocity: f64 },
    EventAfterLanding { event: FlightEventType },
    LargeAngleOfAttack { degrees: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListenersAffected => write!(f, "Listeners modified the flight simulation"),
            Self::RecoveryDeploymentWhileBurning => {
                write!(f, "Recovery device opened while motor still burning")
            }
            Self::RecoveryLaunchRod => write!(f, "Recovery device deployed while on the launch guide"),
            Self::RecoveryHighSpeed { speed } => {
                write!(f, "Recovery device deployment at high speed ({:.1} m/s)", speed)
            }
            Self::LowLaunchRodVelocity { velocity } => {
                write!(f, "Too low launch rod clearance velocity ({:.1} m/s)", velocity)
            }
            Self::EventAfterLanding { event } => write!(f, "Flight event {} occurred after landing", event),
            Self::LargeAngleOfAttack { degrees } => {
                write!(f, "Large angle of attack encountered ({:.1}°)", degrees)
            }
        }
    }
}

impl Warning {
    /// Whether `self` should replace an existing warning of the same kind.
    fn supersedes(&self, other: &Warning) -> bool {
        match (self, other) {
            (Self::RecoveryHighSpeed { speed: a }, Self::RecoveryHighSpeed { speed: b }) => a > b,
            (Self::LowLaunchRodVelocity { velocity: a }, Self::LowLaunchRodVelocity { velocity: b }) => {
                a < b
            }
            (Self::LargeAngleOfAttack { degrees: a }, Self::LargeAngleOfAttack { degrees: b }) => a > b,
            _ => false,
        }
    }
}

/// Warnings deduplicated by kind; the most severe instance of each kind is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarningSet {
    warnings: Vec<Warning>,
}

impl WarningSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning. Returns `true` if the set changed.
    pub fn add(&mut self, warning: Warning) -> bool {
        let existing = self.warnings.iter_mut().find(|w| match (&**w, &warning) {
            (Warning::EventAfterLanding { event: a }, Warning::EventAfterLanding { event: b }) => a == b,
            (a, b) => discriminant(a) == discriminant(b),
        });
        match existing {
            Some(existing) => {
                if warning.supersedes(existing) {
                    *existing = warning;
                    true
                } else {
                    false
                }
            }
            None => {
                self.warnings.push(warning);
                true
            }
        }
    }

    pub fn contains(&self, warning: &Warning) -> bool {
        self.warnings
            .iter()
            .any(|w| discriminant(w) == discriminant(warning))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }
}
