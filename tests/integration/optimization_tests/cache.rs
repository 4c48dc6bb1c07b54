use rocketopt::{
    optimization::{
        AbortOutcome, Function, FunctionCache, OptimizationError, ParallelExecutorCache, Point,
    },
    utils::Interrupt,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Sum of squares that counts its evaluations per call.
struct CountingFunction {
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingFunction {
    fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }
}

impl Function for CountingFunction {
    fn evaluate(&self, point: &Point, _interrupt: &Interrupt) -> Result<f64, OptimizationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        Ok(point.coords().iter().map(|c| c * c).sum())
    }
}

#[test]
fn test_duplicate_compute_evaluates_once() -> Result<(), OptimizationError> {
    let function = Arc::new(CountingFunction::new(Duration::from_millis(20)));
    let cache = ParallelExecutorCache::new(function.clone(), 4)?;
    let p = Point::new(vec![0.5, 0.25]);

    cache.compute(&p);
    cache.compute(&p);
    assert_eq!(cache.wait_for(&p)?, 0.3125);
    cache.compute(&p);
    assert_eq!(cache.wait_for(&p)?, 0.3125);

    assert_eq!(function.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.evaluation_count(), 1);
    Ok(())
}

#[test]
fn test_concurrent_submitters_share_evaluation() -> Result<(), OptimizationError> {
    let function = Arc::new(CountingFunction::new(Duration::from_millis(20)));
    let cache = Arc::new(ParallelExecutorCache::new(function.clone(), 4)?);
    let p = Point::new(vec![0.1, 0.2, 0.3]);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            let p = p.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.compute(&p);
                cache.wait_for(&p)
            })
        })
        .collect();

    for handle in handles {
        let value = handle.join().expect("submitter thread")?;
        assert!((value - 0.14).abs() < 1e-12);
    }
    assert_eq!(function.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_abort_after_completion_keeps_value() -> Result<(), OptimizationError> {
    let function = Arc::new(CountingFunction::new(Duration::ZERO));
    let cache = ParallelExecutorCache::new(function, 2)?;
    let p = Point::new(vec![0.5]);

    cache.compute(&p);
    assert_eq!(cache.wait_for(&p)?, 0.25);

    assert_eq!(cache.abort(&p), AbortOutcome::AlreadyComputed);
    assert_eq!(cache.wait_for(&p)?, 0.25);
    assert_eq!(cache.value(&p)?, 0.25);
    Ok(())
}

#[test]
fn test_abort_unknown_point() -> Result<(), OptimizationError> {
    let cache = ParallelExecutorCache::new(Arc::new(CountingFunction::new(Duration::ZERO)), 1)?;
    assert_eq!(cache.abort(&Point::new(vec![0.7])), AbortOutcome::NotQueued);
    assert!(matches!(
        cache.value(&Point::new(vec![0.7])),
        Err(OptimizationError::NotComputed)
    ));
    Ok(())
}

#[test]
fn test_abort_in_flight_still_caches_result() -> Result<(), OptimizationError> {
    // Ignores its interrupt, so the result arrives regardless
    let function = Arc::new(CountingFunction::new(Duration::from_millis(100)));
    let cache = ParallelExecutorCache::new(function.clone(), 1)?;
    let p = Point::new(vec![0.5]);

    cache.compute(&p);
    while function.calls.load(Ordering::SeqCst) == 0 {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(cache.abort(&p), AbortOutcome::AbortRequested);
    assert_eq!(cache.wait_for(&p)?, 0.25);
    assert_eq!(function.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_abort_all_cancels_queued_points_only() -> Result<(), OptimizationError> {
    let function = Arc::new(CountingFunction::new(Duration::from_millis(100)));
    let cache = ParallelExecutorCache::new(function.clone(), 1)?;
    let running = Point::new(vec![0.5]);
    let queued: Vec<Point> = (1..4).map(|i| Point::new(vec![i as f64 / 10.0])).collect();

    cache.compute(&running);
    while function.calls.load(Ordering::SeqCst) == 0 {
        thread::sleep(Duration::from_millis(1));
    }
    cache.compute_all(&queued);
    cache.abort_all();

    assert_eq!(cache.wait_for(&running)?, 0.25);
    for p in &queued {
        assert!(matches!(cache.wait_for(p), Err(OptimizationError::Aborted)));
        assert!(matches!(cache.value(p), Err(OptimizationError::Aborted)));
    }
    assert_eq!(cache.evaluation_count(), 1);
    assert_eq!(function.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_failure_stays_local_to_point()-> Result<(), OptimizationError> {
    let function = |p: &Point| {
        if p[0] > 0.9 {
            panic!("diverged");
        }
        p[0]
    };
    let cache = ParallelExecutorCache::new(Arc::new(function), 2)?;
    let bad = Point::new(vec![0.95]);
    let good = Point::new(vec![0.5]);

    cache.compute_all(&[bad.clone(), good.clone()]);
    assert!(matches!(cache.wait_for(&bad), Err(OptimizationError::Panicked(_))));
    assert_eq!(cache.wait_for(&good)?, 0.5);

    // The pool keeps serving new points
    let other = Point::new(vec![0.1]);
    cache.compute(&other);
    assert_eq!(cache.wait_for(&other)?, 0.1);
    Ok(())
}
