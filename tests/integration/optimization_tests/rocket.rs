use rocketopt::{
    components::{ComponentAttribute, Rocket},
    optimization::{
        ChannelObserver, ComponentModifier, DefaultOptimizationController, FlightParameter,
        Function, FunctionCache, FunctionOptimizer, IdentityDomain, MaximizationGoal,
        MultidirectionalSearchOptimizer, OptimizationError, ParallelExecutorCache, Point,
        RocketOptimizationFunction, SimulationDomain, SimulationModifier, StabilityDomain,
    },
    simulation::{
        HookOutcome, HookResult, ListenerChain, ListenerError, SimulationListener,
        SimulationStatus,
    },
    utils::Interrupt,
};
use std::sync::Arc;

use crate::common::{test_motor_database, test_options, test_rocket};

fn fin_height_function(domain: Box<dyn SimulationDomain>) -> RocketOptimizationFunction {
    let (database, digest) = test_motor_database();
    let rocket = test_rocket(&digest);
    let fins = rocket.find_by_name("Fins").expect("fins").id();
    let modifier = ComponentModifier::new(fins, ComponentAttribute::Height, "Fin height", 0.02, 0.08);

    RocketOptimizationFunction::new(
        rocket,
        test_options(),
        database,
        vec![Box::new(modifier) as Box<dyn SimulationModifier>],
        Box::new(FlightParameter::MaximumAltitude),
        Box::new(MaximizationGoal),
        domain,
    )
}

fn fin_height(rocket: &Rocket) -> f64 {
    let fins = rocket.find_by_name("Fins").expect("fins").id();
    rocket
        .attribute(fins, ComponentAttribute::Height)
        .expect("fin height")
}

#[test]
fn test_evaluation_maximizes_altitude() -> Result<(), OptimizationError> {
    let function = fin_height_function(Box::new(IdentityDomain));
    let value = function.evaluate(&Point::new(vec![0.5]), &Interrupt::new())?;
    assert!(value.is_finite());
    assert!(value < -20.0, "negated apogee expected, got {}", value);

    // The prototype is never modified
    let start = function.current_point()?;
    assert!((start[0] - 1.0 / 3.0).abs() < 1e-12);
    let design = function.design_at(&Point::new(vec![0.5]))?;
    assert!((fin_height(&design) - 0.05).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_points_outside_cube_or_domain() -> Result<(), OptimizationError> {
    let function = fin_height_function(Box::new(IdentityDomain));
    assert_eq!(
        function.evaluate(&Point::new(vec![1.2]), &Interrupt::new())?,
        f64::INFINITY
    );
    assert!(matches!(
        function.evaluate(&Point::new(vec![0.5, 0.5]), &Interrupt::new()),
        Err(OptimizationError::DimensionMismatch {
            expected: 1,
            actual: 2
        })
    ));

    let picky = fin_height_function(Box::new(StabilityDomain::new(Some(100.0), None)));
    let value = picky.evaluate(&Point::new(vec![0.5]), &Interrupt::new())?;
    assert!(value > 1e10, "penalty expected, got {}", value);
    Ok(())
}

#[test]
fn test_raised_interrupt_aborts_evaluation() {
    let function = fin_height_function(Box::new(IdentityDomain));
    let interrupt = Interrupt::new();
    interrupt.raise();
    assert!(matches!(
        function.evaluate(&Point::new(vec![0.5]), &interrupt),
        Err(OptimizationError::Aborted)
    ));
}

#[test]
fn test_observer_receives_records() -> Result<(), OptimizationError> {
    let (observer, records) = ChannelObserver::new();
    let function = fin_height_function(Box::new(IdentityDomain)).with_observer(Box::new(observer));

    let value = function.evaluate(&Point::new(vec![0.25]), &Interrupt::new())?;
    let record = records.try_recv().expect("one record");
    assert_eq!(record.point, vec![0.25]);
    assert!((record.modifier_values[0] - 0.035).abs() < 1e-12);
    assert_eq!(record.goal_value, value);
    assert_eq!(record.parameter_value, -value);
    Ok(())
}

/// Fails every run once the rocket is moving.
#[derive(Debug, Clone)]
struct Broken;

impl SimulationListener for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn post_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        if status.step_count() > 3 {
            return Err(ListenerError::Failed("broken listener".into()));
        }
        Ok(HookOutcome::Continue)
    }
}

#[test]
fn test_listener_failure_recorded_per_point() -> Result<(), OptimizationError> {
    let function = fin_height_function(Box::new(IdentityDomain))
        .with_listeners(ListenerChain::new().with(Broken));
    let cache = ParallelExecutorCache::new(Arc::new(function), 2)?;

    let inside = Point::new(vec![0.5]);
    let outside = Point::new(vec![1.5]);
    cache.compute_all(&[inside.clone(), outside.clone()]);

    let err = cache.wait_for(&inside).expect_err("simulation fails");
    assert!(matches!(err, OptimizationError::Simulation(_)));
    assert!(err.is_evaluation_failure());
    // Points that never reach the simulator are unaffected
    assert_eq!(cache.wait_for(&outside)?, f64::INFINITY);
    Ok(())
}

#[test]
fn test_short_optimization_never_worsens() -> Result<(), OptimizationError> {
    let function = Arc::new(fin_height_function(Box::new(StabilityDomain::new(Some(1.0), None))));
    let start = function.current_point()?;
    let start_value = function.evaluate(&start, &Interrupt::new())?;

    let cache: Arc<dyn FunctionCache> =
        Arc::new(ParallelExecutorCache::new(Arc::clone(&function) as Arc<dyn Function>, 4)?);
    let mut optimizer = MultidirectionalSearchOptimizer::new(cache);
    let mut controller = DefaultOptimizationController::new(4, 1e-3);

    let optimum = optimizer.optimize(start, &mut controller)?;
    assert!(optimum.is_in_unit_cube());
    assert!(optimizer.optimum_value() <= start_value);
    Ok(())
}
