mod integrator;

pub use integrator::{limited_time_step, rk4_step, StateDerivatives};
