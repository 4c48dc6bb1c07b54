use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Kinematic state of the rocket in the launch-site frame.
///
/// The frame is east-north-up with its origin at the foot of the launch rod.
/// The rocket's longitudinal axis is the body x-axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialState {
    /// Position relative to the launch site [m]
    pub position: Vector3<f64>,

    /// Linear velocity [m/s]
    pub velocity: Vector3<f64>,

    /// Attitude quaternion (rotation from body to launch-site frame)
    pub attitude: UnitQuaternion<f64>,

    /// Angular velocity in body frame [rad/s]
    pub angular_velocity: Vector3<f64>,
}

impl Default for SpatialState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            attitude: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl SpatialState {
    /// State of a rocket resting on a rod pointing along `rod_direction`.
    pub fn on_rod(rod_direction: &Vector3<f64>) -> Self {
        let mut state = Self::default();
        state.align_with(rod_direction);
        state
    }

    /// Unit vector along the rocket's longitudinal axis.
    pub fn axis(&self) -> Vector3<f64> {
        self.attitude * Vector3::x()
    }

    /// Point the rocket's axis along `direction`. Zero-length directions are ignored.
    pub fn align_with(&mut self, direction: &Vector3<f64>) {
        if direction.norm() < 1e-9 {
            return;
        }
        let target = direction.normalize();
        self.attitude = UnitQuaternion::rotation_between(&Vector3::x(), &target)
            // Anti-parallel: rotate half a turn about the vertical
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::PI));
    }

    pub fn height(&self) -> f64 {
        self.position.z
    }

    pub fn vertical_velocity(&self) -> f64 {
        self.velocity.z
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Horizontal distance from the launch site [m]
    pub fn lateral_distance(&self) -> f64 {
        self.position.xy().norm()
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.velocity.iter().all(|v| v.is_finite())
            && self.angular_velocity.iter().all(|v| v.is_finite())
            && self.attitude.coords.iter().all(|v| v.is_finite())
    }
}
