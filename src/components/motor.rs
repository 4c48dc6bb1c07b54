use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::components::DesignError;
use crate::utils::interpolate;

/// Content digest identifying one specific motor.
///
/// Computed with BLAKE3 over every field that influences the motor's physics, so
/// two motors with the same designation but different curves never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MotorDigest(String);

impl MotorDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MotorDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell motors apart in logs
        let short: String = self.0.chars().take(12).collect();
        f.write_str(&short)
    }
}

/// A solid motor described by a sampled thrust curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrustCurveMotor {
    pub designation: String,
    pub manufacturer: String,
    /// Motor casing diameter [m]
    pub diameter: f64,
    /// Motor casing length [m]
    pub length: f64,
    /// Total mass before ignition [kg]
    pub launch_mass: f64,
    /// Total mass after burnout [kg]
    pub burnout_mass: f64,
    /// Sample times [s], strictly increasing, starting at zero
    pub time: Vec<f64>,
    /// Thrust at each sample time [N]
    pub thrust: Vec<f64>,
}

impl ThrustCurveMotor {
    /// Create a validated motor.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        designation: impl Into<String>,
        manufacturer: impl Into<String>,
        diameter: f64,
        length: f64,
        launch_mass: f64,
        burnout_mass: f64,
        time: Vec<f64>,
        thrust: Vec<f64>,
    ) -> Result<Self, DesignError> {
        let motor = Self {
            designation: designation.into(),
            manufacturer: manufacturer.into(),
            diameter,
            length,
            launch_mass,
            burnout_mass,
            time,
            thrust,
        };
        motor.validate()?;
        Ok(motor)
    }

    pub fn validate(&self) -> Result<(), DesignError> {
        let invalid = |msg: &str| {
            Err(DesignError::InvalidMotor {
                designation: self.designation.clone(),
                reason: msg.to_string(),
            })
        };

        if self.time.len() != self.thrust.len() || self.time.len() < 2 {
            return invalid("thrust curve needs at least two matching time/thrust samples");
        }
        if self.time[0].abs() > f64::EPSILON {
            return invalid("thrust curve must start at t = 0");
        }
        if self.time.windows(2).any(|w| w[1] <= w[0]) {
            return invalid("thrust curve times must be strictly increasing");
        }
        if self.thrust.iter().any(|&f| !f.is_finite() || f < 0.0) {
            return invalid("thrust values must be finite and non-negative");
        }
        if !(self.launch_mass > 0.0 && self.burnout_mass > 0.0 && self.burnout_mass <= self.launch_mass)
        {
            return invalid("masses must satisfy 0 < burnout mass <= launch mass");
        }
        if self.diameter <= 0.0 || self.length <= 0.0 {
            return invalid("motor dimensions must be positive");
        }
        Ok(())
    }

    /// BLAKE3 digest of the physical content of the motor.
    pub fn digest(&self) -> MotorDigest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.designation.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.manufacturer.as_bytes());
        hasher.update(&[0]);
        for value in [self.diameter, self.length, self.launch_mass, self.burnout_mass] {
            hasher.update(&value.to_le_bytes());
        }
        for (t, f) in self.time.iter().zip(&self.thrust) {
            hasher.update(&t.to_le_bytes());
            hasher.update(&f.to_le_bytes());
        }
        MotorDigest(hasher.finalize().to_hex().to_string())
    }

    /// Time of the last thrust sample [s].
    pub fn burn_time(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }

    /// Thrust at `t` seconds after ignition [N]. Zero outside the burn.
    pub fn thrust_at(&self, t: f64) -> f64 {
        if t < 0.0 || t > self.burn_time() {
            return 0.0;
        }
        interpolate(&self.time, &self.thrust, t)
    }

    /// Impulse delivered between ignition and `t` [N·s] (trapezoidal rule).
    pub fn impulse_until(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        let mut impulse = 0.0;
        for i in 1..self.time.len() {
            let (t0, t1) = (self.time[i - 1], self.time[i]);
            if t <= t0 {
                break;
            }
            let end = t.min(t1);
            let f0 = self.thrust[i - 1];
            let f_end = self.thrust_at(end);
            impulse += 0.5 * (f0 + f_end) * (end - t0);
        }
        impulse
    }

    pub fn total_impulse(&self) -> f64 {
        self.impulse_until(self.burn_time())
    }

    /// Mass at `t` seconds after ignition; propellant burns in proportion to impulse.
    pub fn mass_at(&self, t: f64) -> f64 {
        let total = self.total_impulse();
        if total <= 0.0 {
            return self.launch_mass;
        }
        let fraction = (self.impulse_until(t) / total).clamp(0.0, 1.0);
        self.launch_mass - fraction * (self.launch_mass - self.burnout_mass)
    }

    pub fn average_thrust(&self) -> f64 {
        let burn = self.burn_time();
        if burn <= 0.0 {
            0.0
        } else {
            self.total_impulse() / burn
        }
    }
}

/// Thrust-vs-time source keyed by motor digest.
///
/// Providers are read-only once built and are shared between concurrent runs.
pub trait ThrustCurveProvider: Send + Sync {
    fn motor(&self, digest: &MotorDigest) -> Option<&ThrustCurveMotor>;

    /// Thrust of the motor `t` seconds after ignition, `None` for unknown digests.
    fn thrust(&self, digest: &MotorDigest, t: f64) -> Option<f64> {
        self.motor(digest).map(|m| m.thrust_at(t))
    }
}

/// In-memory motor registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MotorDatabase {
    motors: HashMap<MotorDigest, ThrustCurveMotor>,
}

impl MotorDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a motor and return its digest. Registering the same motor twice is a no-op.
    pub fn register(&mut self, motor: ThrustCurveMotor) -> Result<MotorDigest, DesignError> {
        motor.validate()?;
        let digest = motor.digest();
        self.motors.entry(digest.clone()).or_insert(motor);
        Ok(digest)
    }

    pub fn len(&self) -> usize {
        self.motors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }

    pub fn find_by_designation(&self, designation: &str) -> Option<(&MotorDigest, &ThrustCurveMotor)> {
        self.motors
            .iter()
            .find(|(_, m)| m.designation.eq_ignore_ascii_case(designation))
    }
}

impl ThrustCurveProvider for MotorDatabase {
    fn motor(&self, digest: &MotorDigest) -> Option<&ThrustCurveMotor> {
        self.motors.get(digest)
    }
}

/// Motor selection of a motor mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorConfiguration {
    pub digest: MotorDigest,
    /// Delay from launch to ignition [s]
    #[serde(default)]
    pub ignition_delay: f64,
}

impl MotorConfiguration {
    pub fn new(digest: MotorDigest) -> Self {
        Self {
            digest,
            ignition_delay: 0.0,
        }
    }
}
