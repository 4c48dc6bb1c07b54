use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use tracing::trace;

use crate::components::{ComponentId, ComponentKind, Rocket};
use crate::systems::aerodynamics::FlightConditions;
use crate::systems::cache::{CacheValidity, CachedEvaluator, CounterDomain};
use crate::utils::EPSILON;

/// Number of roll angles sampled by the worst-case CP search.
pub const ROLL_SAMPLES: usize = 360;

/// Center of pressure and the normal-force slope it is weighted by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterOfPressure {
    /// Axial position aft of the nose tip [m]; NaN when no component produces lift
    pub x: f64,
    /// Total normal force coefficient slope [1/rad]
    pub weight: f64,
}

impl CenterOfPressure {
    pub fn undefined() -> Self {
        Self {
            x: f64::NAN,
            weight: 0.0,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.x.is_finite() && self.weight > EPSILON
    }
}

/// Aerodynamic evaluator consumed by the simulator and the stability domain.
pub trait AerodynamicEvaluator: CachedEvaluator + Send {
    /// CP at the given conditions, including the roll angle `theta`.
    fn cp(&mut self, rocket: &Rocket, conditions: &FlightConditions) -> CenterOfPressure;

    /// Axial drag coefficient, referenced to `conditions.reference_area`.
    fn drag_coefficient(&mut self, rocket: &Rocket, conditions: &FlightConditions) -> f64;

    /// Combined `Cd·A` of the given deployed recovery devices [m²].
    fn recovery_drag_area(&mut self, rocket: &Rocket, deployed: &[ComponentId]) -> f64;

    /// Most unstable (most forward) CP over every roll angle.
    ///
    /// Samples `theta` at [`ROLL_SAMPLES`] equally spaced angles over `[0, 2π)`
    /// and ignores samples whose weight does not exceed [`EPSILON`]. The winning
    /// roll angle is written into `conditions.theta`; when no sample qualifies
    /// `theta` is left unchanged and the result is undefined.
    fn worst_cp(&mut self, rocket: &Rocket, conditions: &mut FlightConditions) -> CenterOfPressure {
        let mut sample = conditions.clone();
        let mut worst: Option<(f64, CenterOfPressure)> = None;

        for i in 0..ROLL_SAMPLES {
            sample.theta = TAU * i as f64 / ROLL_SAMPLES as f64;
            let cp = self.cp(rocket, &sample);
            if cp.weight <= EPSILON || !cp.x.is_finite() {
                continue;
            }
            if worst.map_or(true, |(_, best)| cp.x < best.x) {
                worst = Some((sample.theta, cp));
            }
        }

        match worst {
            Some((theta, cp)) => {
                conditions.theta = theta;
                cp
            }
            None => CenterOfPressure::undefined(),
        }
    }
}

#[derive(Debug, Clone)]
enum LiftingSurface {
    Nose {
        cn_alpha: f64,
        cp_x: f64,
    },
    Fins {
        /// Slope of one fin normal to the flow, incompressible
        fin_slope: f64,
        fin_count: u32,
        cp_x: f64,
    },
}

/// Geometry sums feeding the drag estimate.
#[derive(Debug, Clone, Default)]
struct DragGeometry {
    length: f64,
    fineness: f64,
    body_wetted_area: f64,
    fin_wetted_area: f64,
    fin_thickness_ratio: f64,
    fin_base_area: f64,
    nose_pressure: f64,
    base_area_ratio: f64,
}

#[derive(Debug, Clone, Default)]
struct AeroCache {
    surfaces: Vec<LiftingSurface>,
    drag: DragGeometry,
    recovery: HashMap<ComponentId, f64>,
}

/// Barrowman-method CP and a component build-up drag estimate.
#[derive(Debug, Default)]
pub struct BarrowmanCalculator {
    validity: CacheValidity,
    cache: Option<AeroCache>,
}

impl BarrowmanCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    fn cache(&mut self, rocket: &Rocket) -> &AeroCache {
        self.check_cache(rocket);
        self.cache.get_or_insert_with(|| build_cache(rocket))
    }
}

impl CachedEvaluator for BarrowmanCalculator {
    fn domain(&self) -> CounterDomain {
        CounterDomain::Aerodynamic
    }

    fn validity(&self) -> &CacheValidity {
        &self.validity
    }

    fn validity_mut(&mut self) -> &mut CacheValidity {
        &mut self.validity
    }

    fn void_cache(&mut self) {
        trace!("Voiding aerodynamic cache");
        self.cache = None;
    }
}

impl AerodynamicEvaluator for BarrowmanCalculator {
    fn cp(&mut self, rocket: &Rocket, conditions: &FlightConditions) -> CenterOfPressure {
        let beta = compressibility_factor(conditions.mach);
        let cache = self.cache(rocket);

        let mut moment = 0.0;
        let mut weight = 0.0;
        for surface in &cache.surfaces {
            let (cn_alpha, cp_x) = match surface {
                LiftingSurface::Nose { cn_alpha, cp_x } => (*cn_alpha, *cp_x),
                LiftingSurface::Fins {
                    fin_slope,
                    fin_count,
                    cp_x,
                } => (
                    fin_slope * roll_factor(*fin_count, conditions.theta) / beta,
                    *cp_x,
                ),
            };
            moment += cn_alpha * cp_x;
            weight += cn_alpha;
        }

        if weight.abs() <= EPSILON {
            return CenterOfPressure {
                x: f64::NAN,
                weight,
            };
        }
        CenterOfPressure {
            x: moment / weight,
            weight,
        }
    }

    fn drag_coefficient(&mut self, rocket: &Rocket, conditions: &FlightConditions) -> f64 {
        let reference_area = conditions.reference_area;
        let mach = conditions.mach;
        if reference_area <= 0.0 {
            return 0.0;
        }
        let geometry = &self.cache(rocket).drag;
        let reynolds =
            conditions.velocity * geometry.length / conditions.kinematic_viscosity.max(EPSILON);

        // Turbulent flat plate, floored at Re = 1e4
        let mut cf = 0.074 / reynolds.max(1.0e4).powf(0.2);
        if mach < 1.0 {
            cf *= 1.0 - 0.1 * mach * mach;
        }

        let body_friction = (1.0 + 0.5 / geometry.fineness.max(1.0)) * geometry.body_wetted_area;
        let fin_friction = (1.0 + 2.0 * geometry.fin_thickness_ratio) * geometry.fin_wetted_area;
        let friction = cf * (body_friction + fin_friction) / reference_area;

        let base = 0.12 + 0.13 * mach * mach;
        let base_drag = base * geometry.base_area_ratio;
        let fin_base_drag = base * geometry.fin_base_area / reference_area;

        friction + geometry.nose_pressure + base_drag + fin_base_drag
    }

    fn recovery_drag_area(&mut self, rocket: &Rocket, deployed: &[ComponentId]) -> f64 {
        let cache = self.cache(rocket);
        deployed
            .iter()
            .filter_map(|id| cache.recovery.get(id))
            .sum()
    }
}

/// Sum of `sin²(θ + 2πi/n)` over the fins of a set.
///
/// Equals `n/2` for three or more fins regardless of `theta`.
fn roll_factor(fin_count: u32, theta: f64) -> f64 {
    let n = fin_count as f64;
    (0..fin_count)
        .map(|i| (theta + TAU * i as f64 / n).sin().powi(2))
        .sum()
}

/// Prandtl-Glauert factor, limited near Mach 1.
fn compressibility_factor(mach: f64) -> f64 {
    (1.0 - mach * mach).max(0.3 * 0.3).sqrt()
}

fn build_cache(rocket: &Rocket) -> AeroCache {
    let reference_radius = rocket.reference_radius();
    let reference_area = rocket.reference_area();
    let reference_diameter = 2.0 * reference_radius;

    let mut cache = AeroCache::default();
    let mut last_body_radius = 0.0;

    for placed in rocket.components() {
        let component = placed.component;
        match component.kind() {
            ComponentKind::NoseCone(nose) => {
                let area_ratio = if reference_radius > 0.0 {
                    (nose.aft_radius / reference_radius).powi(2)
                } else {
                    0.0
                };
                cache.surfaces.push(LiftingSurface::Nose {
                    cn_alpha: 2.0 * area_ratio,
                    cp_x: placed.x + nose.shape.cp_fraction() * nose.length,
                });
                cache.drag.body_wetted_area += nose_wetted_area(nose.length, nose.aft_radius);
                cache.drag.nose_pressure += nose.shape.pressure_drag() * area_ratio;
                last_body_radius = nose.aft_radius;
            }
            ComponentKind::BodyTube(tube) => {
                cache.drag.body_wetted_area += TAU * tube.outer_radius * tube.length;
                last_body_radius = tube.outer_radius;
            }
            ComponentKind::FinSet(fins) if fins.fin_count > 0 && reference_diameter > 0.0 => {
                let r = placed.body_radius;
                let s = fins.height;
                let interference = 1.0 + r / (s + r);
                let chord_sum = fins.root_chord + fins.tip_chord;
                let mid_chord = fins.mid_chord_span();

                // Barrowman: 4n(s/d)² / (1 + sqrt(1 + (2 l_m / (c_r + c_t))²)), per fin
                let fin_slope = interference * 8.0 * (s / reference_diameter).powi(2)
                    / (1.0 + (1.0 + (2.0 * mid_chord / chord_sum).powi(2)).sqrt());

                let cr = fins.root_chord;
                let ct = fins.tip_chord;
                let cp_offset = fins.sweep / 3.0 * (cr + 2.0 * ct) / chord_sum
                    + (chord_sum - cr * ct / chord_sum) / 6.0;

                cache.surfaces.push(LiftingSurface::Fins {
                    fin_slope,
                    fin_count: fins.fin_count,
                    cp_x: placed.x + cp_offset,
                });

                let n = fins.fin_count as f64;
                cache.drag.fin_wetted_area += 2.0 * n * fins.planform_area();
                cache.drag.fin_thickness_ratio = fins.thickness / (0.5 * chord_sum).max(EPSILON);
                cache.drag.fin_base_area += n * fins.thickness * fins.height;
            }
            ComponentKind::Parachute(chute) => {
                cache.recovery.insert(component.id(), chute.drag_area());
            }
            _ => {}
        }
    }

    cache.drag.length = rocket.length();
    cache.drag.fineness = if reference_diameter > 0.0 {
        cache.drag.length / reference_diameter
    } else {
        0.0
    };
    cache.drag.base_area_ratio = if reference_area > 0.0 {
        PI * last_body_radius * last_body_radius / reference_area
    } else {
        0.0
    };

    cache
}

/// Lateral area of the equivalent cone.
fn nose_wetted_area(length: f64, radius: f64) -> f64 {
    PI * radius * (radius * radius + length * length).sqrt()
}
