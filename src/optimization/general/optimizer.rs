use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::optimization::general::{
    FunctionCache, OptimizationController, OptimizationError, Point, Result,
};

const INITIAL_STEP: f64 = 0.5;

/// Past this many steps an unbounded controller is probably a mistake.
const STEP_COUNT_WARNING: usize = 1000;

/// How often a speculatively aborted point is resubmitted before giving up on it.
const MAX_RESUBMITS: usize = 3;

/// Derivative-free minimizer over the unit hypercube.
pub trait FunctionOptimizer {
    /// Minimize from `initial` until `controller` returns `false`.
    /// Returns the best point found.
    fn optimize(
        &mut self,
        initial: Point,
        controller: &mut dyn OptimizationController,
    ) -> Result<Point>;

    fn optimum_point(&self) -> Option<&Point>;

    /// Value at the optimum point, NaN before the first evaluation.
    fn optimum_value(&self) -> f64;
}

/// Counters describing how a search progressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStatistics {
    pub steps: usize,
    pub reflections: usize,
    pub expansions: usize,
    pub coordinate_searches: usize,
    pub contractions: usize,
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} steps: {} reflections, {} expansions, {} coordinate searches, {} contractions",
            self.steps, self.reflections, self.expansions, self.coordinate_searches, self.contractions
        )
    }
}

/// Parallel multidirectional search (Dennis and Torczon).
///
/// The simplex starts as a square pattern of step 0.5 around the initial
/// point. Each step reflects every vertex through the best one; a successful
/// reflection may be expanded, a failed one falls back to a coordinate search
/// around the best vertex and then to halving the simplex. All candidate
/// sets are submitted to the cache together and the unneeded ones aborted.
pub struct MultidirectionalSearchOptimizer {
    cache: Arc<dyn FunctionCache>,
    use_expansion: bool,
    use_coordinate_search: bool,
    statistics: SearchStatistics,
    optimum: Option<(Point, f64)>,
}

impl MultidirectionalSearchOptimizer {
    pub fn new(cache: Arc<dyn FunctionCache>) -> Self {
        Self {
            cache,
            use_expansion: true,
            use_coordinate_search: true,
            statistics: SearchStatistics::default(),
            optimum: None,
        }
    }

    pub fn with_expansion(mut self, enabled: bool) -> Self {
        self.use_expansion = enabled;
        self
    }

    pub fn with_coordinate_search(mut self, enabled: bool) -> Self {
        self.use_coordinate_search = enabled;
        self
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    pub fn cache(&self) -> &Arc<dyn FunctionCache> {
        &self.cache
    }

    fn evaluate(&self, points: &[Point]) -> Result<Vec<f64>> {
        self.cache.compute_all(points);
        points.iter().map(|p| self.wait_value(p)).collect()
    }

    /// Value of a point, resubmitting it if an earlier abort got to it first.
    /// Points that cannot be evaluated count as NaN.
    fn wait_value(&self, point: &Point) -> Result<f64> {
        let mut resubmits = 0;
        loop {
            match self.cache.wait_for(point) {
                Ok(value) => return Ok(value),
                Err(OptimizationError::Aborted) if resubmits < MAX_RESUBMITS => {
                    resubmits += 1;
                    self.cache.compute(point);
                }
                Err(OptimizationError::Aborted) => return Ok(f64::NAN),
                Err(err) if err.is_evaluation_failure() => {
                    warn!("Could not evaluate {}: {}", point, err);
                    return Ok(f64::NAN);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn abort(&self, points: &[Point]) {
        self.cache.abort_points(points);
    }
}

impl FunctionOptimizer for MultidirectionalSearchOptimizer {
    fn optimize(
        &mut self,
        initial: Point,
        controller: &mut dyn OptimizationController,
    ) -> Result<Point> {
        let dim = initial.dim();
        if dim == 0 {
            return Err(OptimizationError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        debug!("Starting multidirectional search from {}", initial);
        self.statistics = SearchStatistics::default();

        let mut simplex = vec![initial.clone()];
        for i in 0..dim {
            let c = initial[i];
            let moved = if c + INITIAL_STEP <= 1.0 {
                c + INITIAL_STEP
            } else {
                c - INITIAL_STEP
            };
            simplex.push(initial.with(i, moved));
        }
        let mut values = self.evaluate(&simplex)?;
        sort_simplex(&mut simplex, &mut values);
        self.optimum = Some((simplex[0].clone(), values[0]));

        loop {
            let center = simplex[0].clone();
            let center_value = values[0];
            let step = simplex_size(&simplex);
            let vertices = &simplex[1..];

            let reflection: Vec<Point> = vertices.iter().map(|p| &(&center * 2.0) - p).collect();
            let expansion: Vec<Point> = if self.use_expansion {
                vertices.iter().map(|p| &(&center * 3.0) - &(p * 2.0)).collect()
            } else {
                Vec::new()
            };
            let coordinate: Vec<Point> = if self.use_coordinate_search {
                (0..dim)
                    .flat_map(|i| {
                        [
                            center.with(i, center[i] + step),
                            center.with(i, center[i] - step),
                        ]
                    })
                    .collect()
            } else {
                Vec::new()
            };
            let contraction: Vec<Point> = vertices
                .iter()
                .map(|p| &center + &(&(p - &center) * 0.5))
                .collect();

            // Speculative: every candidate set runs while the first is judged
            self.cache.compute_all(&reflection);
            self.cache.compute_all(&expansion);
            self.cache.compute_all(&coordinate);
            self.cache.compute_all(&contraction);

            let reflection_values = self.evaluate(&reflection)?;
            let new_vertices = if best(&reflection_values) < center_value {
                self.abort(&coordinate);
                self.abort(&contraction);
                let expansion_values = if self.use_expansion {
                    self.evaluate(&expansion)?
                } else {
                    Vec::new()
                };
                if !expansion_values.is_empty() && best(&expansion_values) < best(&reflection_values) {
                    self.statistics.expansions += 1;
                    Move::Vertices(expansion, expansion_values)
                } else {
                    self.abort(&expansion);
                    self.statistics.reflections += 1;
                    Move::Vertices(reflection, reflection_values)
                }
            } else {
                self.abort(&expansion);
                let coordinate_values = self.evaluate(&coordinate)?;
                match best_index(&coordinate_values).filter(|&i| coordinate_values[i] < center_value) {
                    Some(i) => {
                        self.abort(&contraction);
                        self.statistics.coordinate_searches += 1;
                        // Translate the whole simplex onto the better point
                        let moved = &coordinate[i];
                        let offset = moved - &center;
                        let translated: Vec<Point> = vertices.iter().map(|p| p + &offset).collect();
                        let mut translated_values = self.evaluate(&translated)?;
                        let mut points = vec![moved.clone()];
                        points.extend(translated);
                        let mut point_values = vec![coordinate_values[i]];
                        point_values.append(&mut translated_values);
                        Move::Simplex(points, point_values)
                    }
                    None => {
                        self.statistics.contractions += 1;
                        let contraction_values = self.evaluate(&contraction)?;
                        Move::Vertices(contraction, contraction_values)
                    }
                }
            };

            let (mut next, mut next_values) = match new_vertices {
                Move::Vertices(points, point_values) => {
                    let mut next = vec![center.clone()];
                    let mut next_values = vec![center_value];
                    next.extend(points);
                    next_values.extend(point_values);
                    (next, next_values)
                }
                Move::Simplex(points, point_values) => (points, point_values),
            };
            sort_simplex(&mut next, &mut next_values);
            simplex = next;
            values = next_values;

            self.statistics.steps += 1;
            if self.statistics.steps == STEP_COUNT_WARNING {
                warn!(
                    "Optimization has taken {} steps, check the controller",
                    STEP_COUNT_WARNING
                );
            }

            self.optimum = Some((simplex[0].clone(), values[0]));
            let step_size = simplex_size(&simplex);
            debug!(
                "Step {}: {} -> {} (value {:.6}, step {:.2e})",
                self.statistics.steps, center, simplex[0], values[0], step_size
            );
            if !controller.step_taken(&center, center_value, &simplex[0], values[0], step_size) {
                break;
            }
        }

        info!("Optimization finished: {}", self.statistics);
        Ok(simplex[0].clone())
    }

    fn optimum_point(&self) -> Option<&Point> {
        self.optimum.as_ref().map(|(p, _)| p)
    }

    fn optimum_value(&self) -> f64 {
        self.optimum.as_ref().map_or(f64::NAN, |(_, v)| *v)
    }
}

/// Outcome of one search step.
enum Move {
    /// New vertices to combine with the current best one
    Vertices(Vec<Point>, Vec<f64>),
    /// A complete replacement simplex
    Simplex(Vec<Point>, Vec<f64>),
}

/// Ascending, NaN last.
fn compare_values(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn sort_simplex(points: &mut Vec<Point>, values: &mut Vec<f64>) {
    let mut pairs: Vec<(Point, f64)> = points.drain(..).zip(values.drain(..)).collect();
    // Stable: on ties the earlier vertex, i.e. the old center, stays first
    pairs.sort_by(|a, b| compare_values(a.1, b.1));
    for (p, v) in pairs {
        points.push(p);
        values.push(v);
    }
}

fn best_index(values: &[f64]) -> Option<usize> {
    (0..values.len()).min_by(|&a, &b| compare_values(values[a], values[b]))
}

fn best(values: &[f64]) -> f64 {
    best_index(values).map_or(f64::NAN, |i| values[i])
}

/// Largest distance from the best vertex to any other.
fn simplex_size(simplex: &[Point]) -> f64 {
    simplex[1..]
        .iter()
        .map(|p| p.distance(&simplex[0]))
        .fold(0.0, f64::max)
}
