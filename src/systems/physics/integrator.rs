use nalgebra::Vector3;

use crate::components::SpatialState;

/// Time derivatives of the translational state.
#[derive(Debug, Clone, Copy)]
pub struct StateDerivatives {
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
}

/// Advance `spatial` by one classical fourth-order Runge-Kutta step.
///
/// # Arguments
/// - `spatial`: State at time `t`, updated in place.
/// - `t`: Current simulation time (seconds).
/// - `dt`: Step length (seconds).
/// - `acceleration`: Acceleration as a function of time, position and velocity.
///
/// Attitude is not integrated here; the caller aligns it with the flight path.
pub fn rk4_step<F>(spatial: &mut SpatialState, t: f64, dt: f64, mut acceleration: F)
where
    F: FnMut(f64, &Vector3<f64>, &Vector3<f64>) -> Vector3<f64>,
{
    let initial_position = spatial.position;
    let initial_velocity = spatial.velocity;

    let mut derivatives = |time: f64, position: &Vector3<f64>, velocity: &Vector3<f64>| {
        StateDerivatives {
            velocity: *velocity,
            acceleration: acceleration(time, position, velocity),
        }
    };

    let k1 = derivatives(t, &initial_position, &initial_velocity);

    let k2_position = initial_position + k1.velocity * (dt / 2.0);
    let k2_velocity = initial_velocity + k1.acceleration * (dt / 2.0);
    let k2 = derivatives(t + dt / 2.0, &k2_position, &k2_velocity);

    let k3_position = initial_position + k2.velocity * (dt / 2.0);
    let k3_velocity = initial_velocity + k2.acceleration * (dt / 2.0);
    let k3 = derivatives(t + dt / 2.0, &k3_position, &k3_velocity);

    let k4_position = initial_position + k3.velocity * dt;
    let k4_velocity = initial_velocity + k3.acceleration * dt;
    let k4 = derivatives(t + dt, &k4_position, &k4_velocity);

    // Weighted average of the four slopes
    spatial.position = initial_position
        + (dt / 6.0) * (k1.velocity + 2.0 * k2.velocity + 2.0 * k3.velocity + k4.velocity);
    spatial.velocity = initial_velocity
        + (dt / 6.0)
            * (k1.acceleration + 2.0 * k2.acceleration + 2.0 * k3.acceleration + k4.acceleration);
}

/// Length of the next step.
///
/// # Arguments
/// - `t`: Current simulation time.
/// - `base`: Preferred step for the current flight phase.
/// - `min`: Shortest step ever taken.
/// - `next_event`: Time of the next queued event, if any.
///
/// The step is clipped so it ends on the next event, but never below `min`.
pub fn limited_time_step(t: f64, base: f64, min: f64, next_event: Option<f64>) -> f64 {
    let step = match next_event {
        Some(event_time) if event_time > t => base.min(event_time - t),
        _ => base,
    };
    step.max(min)
}
