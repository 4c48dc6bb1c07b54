use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use crate::optimization::general::{Function, OptimizationError, Point, Result};
use crate::utils::Interrupt;

/// How often an interruptible wait re-checks its interrupt flag.
const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of an abort request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortOutcome {
    /// The point had not started and will not be computed.
    Aborted,
    /// The point is being computed; its interrupt was raised. A value it still
    /// produces is kept.
    AbortRequested,
    /// The point already reached a result, which is retained.
    AlreadyComputed,
    /// The point was never submitted.
    NotQueued,
}

/// Deduplicating, cancellable evaluation of a [`Function`].
pub trait FunctionCache: Send + Sync {
    /// Queue `point` for evaluation. Points already pending, computing or
    /// done are left alone; aborted points are queued again.
    fn compute(&self, point: &Point);

    fn compute_all(&self, points: &[Point]) {
        for point in points {
            self.compute(point);
        }
    }

    /// Block until `point` reaches a terminal state.
    fn wait_for(&self, point: &Point) -> Result<f64>;

    fn wait_for_all(&self, points: &[Point]) -> Result<Vec<f64>> {
        points.iter().map(|p| self.wait_for(p)).collect()
    }

    /// Like [`FunctionCache::wait_for`], but gives up with
    /// [`OptimizationError::Interrupted`] once `interrupt` is raised. The
    /// computation itself carries on.
    fn wait_for_interruptible(&self, point: &Point, interrupt: &Interrupt) -> Result<f64>;

    fn abort(&self, point: &Point) -> AbortOutcome;

    fn abort_points(&self, points: &[Point]) -> Vec<AbortOutcome> {
        points.iter().map(|p| self.abort(p)).collect()
    }

    /// Abort every point that has not started yet.
    fn abort_all(&self);

    /// Value of a computed point, without blocking.
    fn value(&self, point: &Point) -> Result<f64>;

    /// Number of evaluations started so far.
    fn evaluation_count(&self) -> usize;
}

#[derive(Debug, Clone)]
enum EntryState {
    Pending,
    Computing,
    Done(f64),
    Aborted,
    Failed(OptimizationError),
}

#[derive(Debug)]
struct Entry {
    state: EntryState,
    interrupt: Interrupt,
}

#[derive(Debug, Default)]
struct Shared {
    entries: Mutex<HashMap<Point, Entry>>,
    changed: Condvar,
    evaluations: AtomicUsize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, HashMap<Point, Entry>> {
        // A panicking evaluation never holds the lock, but stay usable regardless
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Worker body for one point.
    fn run(&self, function: &dyn Function, point: Point) {
        let interrupt = {
            let mut entries = self.lock();
            match entries.get_mut(&point) {
                Some(entry) if matches!(entry.state, EntryState::Pending) => {
                    entry.state = EntryState::Computing;
                    entry.interrupt.clone()
                }
                // Aborted before a worker picked it up
                _ => return,
            }
        };

        self.evaluations.fetch_add(1, Ordering::SeqCst);
        trace!("Evaluating {}", point);
        let result = catch_unwind(AssertUnwindSafe(|| function.evaluate(&point, &interrupt)));

        let state = match result {
            Ok(Ok(value)) => EntryState::Done(value),
            Ok(Err(OptimizationError::Aborted)) => EntryState::Aborted,
            Ok(Err(err)) => {
                debug!("Evaluation of {} failed: {}", point, err);
                EntryState::Failed(err)
            }
            Err(panic) => EntryState::Failed(OptimizationError::Panicked(panic_message(&*panic))),
        };

        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(&point) {
            entry.state = state;
        }
        drop(entries);
        self.changed.notify_all();
    }

    fn wait(&self, point: &Point, interrupt: Option<&Interrupt>) -> Result<f64> {
        let mut entries = self.lock();
        loop {
            match entries.get(point).map(|e| &e.state) {
                None => return Err(OptimizationError::NotComputed),
                Some(EntryState::Done(value)) => return Ok(*value),
                Some(EntryState::Aborted) => return Err(OptimizationError::Aborted),
                Some(EntryState::Failed(err)) => return Err(err.clone()),
                Some(EntryState::Pending) | Some(EntryState::Computing) => {}
            }

            entries = match interrupt {
                None => self
                    .changed
                    .wait(entries)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(interrupt) => {
                    if interrupt.is_raised() {
                        return Err(OptimizationError::Interrupted);
                    }
                    self.changed
                        .wait_timeout(entries, INTERRUPT_POLL_INTERVAL)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// [`FunctionCache`] evaluating points on a bounded rayon pool.
///
/// Points start in submission order. At most one worker ever computes a given
/// point, and a finished result is never discarded by an abort.
pub struct ParallelExecutorCache {
    function: Arc<dyn Function>,
    pool: ThreadPool,
    shared: Arc<Shared>,
}

impl ParallelExecutorCache {
    /// # Arguments
    /// - `function`: Function to evaluate.
    /// - `threads`: Worker count; 0 uses one worker per available core.
    pub fn new(function: Arc<dyn Function>, threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("evaluator-{}", i))
            .build()
            .map_err(|e| OptimizationError::Pool(e.to_string()))?;
        debug!("Function cache using {} worker threads", pool.current_num_threads());

        Ok(Self {
            function,
            pool,
            shared: Arc::new(Shared::default()),
        })
    }

    pub fn function(&self) -> &Arc<dyn Function> {
        &self.function
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl FunctionCache for ParallelExecutorCache {
    fn compute(&self, point: &Point) {
        let mut entries = self.shared.lock();
        let queue = match entries.get(point) {
            None => true,
            Some(entry) => matches!(entry.state, EntryState::Aborted),
        };
        if !queue {
            return;
        }
        entries.insert(
            point.clone(),
            Entry {
                state: EntryState::Pending,
                interrupt: Interrupt::new(),
            },
        );
        drop(entries);

        let shared = Arc::clone(&self.shared);
        let function = Arc::clone(&self.function);
        let point = point.clone();
        self.pool.spawn_fifo(move || shared.run(function.as_ref(), point));
    }

    fn wait_for(&self, point: &Point) -> Result<f64> {
        self.shared.wait(point, None)
    }

    fn wait_for_interruptible(&self, point: &Point, interrupt: &Interrupt) -> Result<f64> {
        self.shared.wait(point, Some(interrupt))
    }

    fn abort(&self, point: &Point) -> AbortOutcome {
        let mut entries = self.shared.lock();
        let Some(entry) = entries.get_mut(point) else {
            return AbortOutcome::NotQueued;
        };
        let outcome = match entry.state {
            EntryState::Pending => {
                entry.state = EntryState::Aborted;
                AbortOutcome::Aborted
            }
            EntryState::Computing => {
                entry.interrupt.raise();
                AbortOutcome::AbortRequested
            }
            EntryState::Aborted => AbortOutcome::Aborted,
            EntryState::Done(_) | EntryState::Failed(_) => AbortOutcome::AlreadyComputed,
        };
        drop(entries);
        self.shared.changed.notify_all();
        outcome
    }

    fn abort_all(&self) {
        let mut entries = self.shared.lock();
        let mut aborted = 0;
        for entry in entries.values_mut() {
            if matches!(entry.state, EntryState::Pending) {
                entry.state = EntryState::Aborted;
                aborted += 1;
            }
        }
        drop(entries);
        if aborted > 0 {
            debug!("Aborted {} queued evaluations", aborted);
        }
        self.shared.changed.notify_all();
    }

    fn value(&self, point: &Point) -> Result<f64> {
        match self.shared.lock().get(point).map(|e| e.state.clone()) {
            Some(EntryState::Done(value)) => Ok(value),
            Some(EntryState::Failed(err)) => Err(err),
            Some(EntryState::Aborted) => Err(OptimizationError::Aborted),
            _ => Err(OptimizationError::NotComputed),
        }
    }

    fn evaluation_count(&self) -> usize {
        self.shared.evaluations.load(Ordering::SeqCst)
    }
}

impl Drop for ParallelExecutorCache {
    /// Queued work is dropped; running evaluations finish on their own.
    fn drop(&mut self) {
        self.abort_all();
    }
}
