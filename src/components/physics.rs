use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A force acting on the rocket, expressed in the launch-site frame [N].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Force {
    pub vector: Vector3<f64>,
    pub category: ForceCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceCategory {
    Aerodynamic,
    Propulsive,
    Gravitational,
    Recovery,
}

/// Forces gathered for one derivative evaluation.
#[derive(Debug, Clone, Default)]
pub struct ForceSet {
    forces: Vec<Force>,
}

impl ForceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: ForceCategory, vector: Vector3<f64>) {
        self.forces.push(Force { vector, category });
    }

    pub fn net(&self) -> Vector3<f64> {
        self.forces.iter().map(|f| f.vector).sum()
    }

    pub fn net_of(&self, category: ForceCategory) -> Vector3<f64> {
        self.forces
            .iter()
            .filter(|f| f.category == category)
            .map(|f| f.vector)
            .sum()
    }

    pub fn clear(&mut self) {
        self.forces.clear();
    }
}
