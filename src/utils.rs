use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Tolerance used for "effectively zero" comparisons throughout the crate.
pub const EPSILON: f64 = 1e-8;

/// A shareable cancellation flag.
///
/// Cloning an `Interrupt` yields a handle to the same flag, so a flag raised by
/// one thread is observed by every clone. The simulation polls it once per step
/// through [`crate::simulation::InterruptListener`], and the function cache uses
/// one per pending point so that an abort can reach a computation in flight.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Idempotent.
    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Lower the flag again so the handle can be reused.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Linear interpolation of `y(x)` over sorted sample points.
///
/// Values outside the sampled range are clamped to the first/last sample.
/// Returns `0.0` for empty input.
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }

    // First index with xs[i] > x
    let upper = xs[..n].partition_point(|&v| v <= x);
    let lower = upper - 1;
    let span = xs[upper] - xs[lower];
    if span.abs() < EPSILON {
        return ys[upper];
    }
    let fraction = (x - xs[lower]) / span;
    ys[lower] + fraction * (ys[upper] - ys[lower])
}
