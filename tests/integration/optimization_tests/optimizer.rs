use rocketopt::optimization::{
    DefaultOptimizationController, Function, FunctionCache, FunctionOptimizer,
    MultidirectionalSearchOptimizer, ParallelExecutorCache, Point,
};
use std::sync::Arc;

fn optimum(dim: usize) -> Point {
    Point::new((0..dim).map(|i| 0.3 + 0.05 * i as f64).collect())
}

fn optimizer_for(function: Arc<dyn Function>) -> MultidirectionalSearchOptimizer {
    let cache: Arc<dyn FunctionCache> =
        Arc::new(ParallelExecutorCache::new(function, 4).expect("thread pool"));
    MultidirectionalSearchOptimizer::new(cache)
}

#[test]
fn test_converges_in_one_to_ten_dimensions() {
    for dim in 1..=10 {
        let target = optimum(dim);
        let objective = target.clone();
        let function: Arc<dyn Function> =
            Arc::new(move |p: &Point| (p - &objective).length2());

        let mut optimizer = optimizer_for(function);
        let mut controller = DefaultOptimizationController::new(500, 1e-4);
        let result = optimizer
            .optimize(Point::filled(dim, 0.5), &mut controller)
            .expect("optimization runs");

        assert!(
            result.distance(&target) < 0.01,
            "dim {}: ended at {}, optimum {}",
            dim,
            result,
            target
        );
        assert!(controller.steps() < 500, "dim {} needed {} steps", dim, controller.steps());
        assert!(optimizer.optimum_value() < 1e-4);
    }
}

#[test]
fn test_controller_veto_stops_search() {
    let function: Arc<dyn Function> = Arc::new(|p: &Point| (p[0] - 0.9).powi(2));
    let mut optimizer = optimizer_for(function);
    let mut calls = 0;
    let mut controller = |_: &Point, _: f64, _: &Point, _: f64, _: f64| {
        calls += 1;
        calls < 3
    };

    optimizer
        .optimize(Point::new(vec![0.1]), &mut controller)
        .expect("optimization runs");
    assert_eq!(calls, 3);
    assert_eq!(optimizer.statistics().steps, 3);
}

#[test]
fn test_unevaluable_region_avoided() {
    // NaN on the right half: the search must settle on the left boundary minimum
    let function: Arc<dyn Function> = Arc::new(|p: &Point| {
        if p[0] > 0.6 {
            f64::NAN
        } else {
            (p[0] - 0.8).powi(2)
        }
    });
    let mut optimizer = optimizer_for(function);
    let mut controller = DefaultOptimizationController::new(200, 1e-4);

    let result = optimizer
        .optimize(Point::new(vec![0.2]), &mut controller)
        .expect("optimization runs");
    assert!(result[0] <= 0.6);
    assert!((result[0] - 0.6).abs() < 0.01, "ended at {}", result);
}
