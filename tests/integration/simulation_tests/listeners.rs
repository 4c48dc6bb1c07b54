use pretty_assertions::assert_eq;
use rocketopt::{
    simulation::{
        ApogeeEndListener, FlightEvent, FlightEventType, HookOutcome, HookResult, InterruptListener,
        ListenerChain, ListenerError, SimulationError, SimulationListener, SimulationStatus,
        Warning,
    },
    utils::Interrupt,
};
use nalgebra::Vector3;
use std::sync::{Arc, Mutex};

use crate::common::test_simulator;

/// What a recording listener saw, shared with the test through clones.
#[derive(Debug, Default)]
struct Journal {
    starts: usize,
    ends: usize,
    end_error: Option<String>,
    /// (step, time) at every pre_step
    pre_steps: Vec<(u64, f64)>,
    /// (step, time) at every post_step
    post_steps: Vec<(u64, f64)>,
    /// (step, event) for every dispatched event
    events: Vec<(u64, FlightEventType)>,
}

type SharedJournal = Arc<Mutex<Journal>>;

/// Skips the physics of one step and queues a marker event during it.
#[derive(Debug, Clone)]
struct SkipStep {
    step: u64,
    journal: SharedJournal,
}

impl SimulationListener for SkipStep {
    fn name(&self) -> &str {
        "skip_step"
    }

    fn start_simulation(&mut self, _status: &mut SimulationStatus) -> Result<(), ListenerError> {
        self.journal.lock().unwrap().starts += 1;
        Ok(())
    }

    fn pre_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        self.journal
            .lock()
            .unwrap()
            .pre_steps
            .push((status.step_count(), status.time()));
        if status.step_count() == self.step {
            status.add_event(FlightEvent::new(FlightEventType::Exception, status.time()));
            return Ok(HookOutcome::Skip);
        }
        Ok(HookOutcome::Continue)
    }

    fn post_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        self.journal
            .lock()
            .unwrap()
            .post_steps
            .push((status.step_count(), status.time()));
        Ok(HookOutcome::Continue)
    }

    fn handle_flight_event(&mut self, status: &mut SimulationStatus, event: &FlightEvent) -> HookResult {
        self.journal
            .lock()
            .unwrap()
            .events
            .push((status.step_count(), event.event_type));
        Ok(HookOutcome::Continue)
    }

    fn end_simulation(&mut self, _status: &mut SimulationStatus, error: Option<&SimulationError>) {
        let mut journal = self.journal.lock().unwrap();
        journal.ends += 1;
        journal.end_error = error.map(|e| e.to_string());
    }
}

#[test]
fn test_pre_step_skip_keeps_post_step_and_events() {
    let journal = SharedJournal::default();
    let chain = ListenerChain::new().with(SkipStep {
        step: 5,
        journal: Arc::clone(&journal),
    });

    let data = test_simulator().simulate(chain).expect("flight succeeds");
    let journal = journal.lock().unwrap();

    let pre = journal.pre_steps.iter().find(|(s, _)| *s == 5).expect("pre_step 5");
    let post = journal.post_steps.iter().find(|(s, _)| *s == 5).expect("post_step 5");
    // No physics update happened during the skipped step
    assert_eq!(pre.1, post.1);
    let next = journal.pre_steps.iter().find(|(s, _)| *s == 6).expect("pre_step 6");
    assert_eq!(next.1, pre.1);

    assert!(journal
        .events
        .contains(&(5, FlightEventType::Exception)));
    assert!(data.warnings.contains(&Warning::ListenersAffected));

    assert_eq!(journal.starts, 1);
    assert_eq!(journal.ends, 1);
    assert_eq!(journal.end_error, None);
}

/// Suppresses the default handling of apogee.
#[derive(Debug, Clone)]
struct SuppressApogee;

impl SimulationListener for SuppressApogee {
    fn name(&self) -> &str {
        "suppress_apogee"
    }

    fn handle_flight_event(&mut self, _status: &mut SimulationStatus, event: &FlightEvent) -> HookResult {
        if event.event_type == FlightEventType::Apogee {
            return Ok(HookOutcome::Skip);
        }
        Ok(HookOutcome::Continue)
    }
}

#[test]
fn test_apogee_end_listener_stops_at_apogee() {
    let data = test_simulator()
        .simulate(ListenerChain::new().with(ApogeeEndListener))
        .expect("flight succeeds");
    let branch = data.branch().expect("one branch");

    assert_eq!(
        branch.event_types(),
        vec![
            FlightEventType::Ignition,
            FlightEventType::LaunchrodCleared,
            FlightEventType::Burnout,
            FlightEventType::Apogee,
            FlightEventType::SimulationEnd,
        ]
    );
    assert!(!data.warnings.contains(&Warning::ListenersAffected));
}

#[test]
fn test_suppressed_apogee_disables_termination() {
    let chain = ListenerChain::new()
        .with(SuppressApogee)
        .with(ApogeeEndListener);
    let data = test_simulator().simulate(chain).expect("flight succeeds");
    let branch = data.branch().expect("one branch");

    // No apogee handling means no deployment either: a ballistic descent
    assert_eq!(
        branch.event_types(),
        vec![
            FlightEventType::Ignition,
            FlightEventType::LaunchrodCleared,
            FlightEventType::Burnout,
            FlightEventType::GroundHit,
            FlightEventType::SimulationEnd,
        ]
    );
    assert!(data.warnings.contains(&Warning::ListenersAffected));
}

/// Fails once the rocket is airborne for a while.
#[derive(Debug, Clone)]
struct FailingSensor {
    after: f64,
    journal: SharedJournal,
}

impl SimulationListener for FailingSensor {
    fn name(&self) -> &str {
        "failing_sensor"
    }

    fn post_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        if status.time() > self.after {
            return Err(ListenerError::Failed("sensor fault".into()));
        }
        Ok(HookOutcome::Continue)
    }

    fn end_simulation(&mut self, _status: &mut SimulationStatus, error: Option<&SimulationError>) {
        let mut journal = self.journal.lock().unwrap();
        journal.ends += 1;
        journal.end_error = error.map(|e| e.to_string());
    }
}

#[test]
fn test_failing_listener_is_calculation_error() {
    let journal = SharedJournal::default();
    let chain = ListenerChain::new().with(FailingSensor {
        after: 0.5,
        journal: Arc::clone(&journal),
    });

    let err = test_simulator().simulate(chain).expect_err("listener failure");
    assert!(!err.is_cancelled());
    match &err {
        SimulationError::Calculation { message, data } => {
            assert!(message.contains("sensor fault"));
            let branch = data.branch().expect("partial branch");
            assert!(!branch.is_empty());
            assert_eq!(
                branch.events().last().map(|e| e.event_type),
                Some(FlightEventType::Exception)
            );
            assert!(branch.first_event(FlightEventType::Ignition).is_some());
        }
        other => panic!("expected a calculation error, got {:?}", other),
    }

    let journal = journal.lock().unwrap();
    assert_eq!(journal.ends, 1);
    assert!(journal.end_error.as_deref().unwrap_or("").contains("sensor fault"));
}

/// Raises a shared interrupt at a given step.
#[derive(Debug, Clone)]
struct RaiseAt {
    step: u64,
    interrupt: Interrupt,
}

impl SimulationListener for RaiseAt {
    fn name(&self) -> &str {
        "raise_at"
    }

    fn post_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        if status.step_count() == self.step {
            self.interrupt.raise();
        }
        Ok(HookOutcome::Continue)
    }
}

#[test]
fn test_interrupt_cancels_run() {
    let interrupt = Interrupt::new();
    let chain = ListenerChain::new()
        .with(InterruptListener::new(interrupt.clone()))
        .with(RaiseAt {
            step: 10,
            interrupt: interrupt.clone(),
        });

    let err = test_simulator().simulate(chain).expect_err("cancelled");
    assert!(err.is_cancelled());
    let data = err.flight_data().expect("partial data");
    // Initial sample plus ten steps
    assert_eq!(data.branch().map(|b| b.len()), Some(11));
}

#[test]
fn test_raised_interrupt_cancels_before_first_step() {
    let interrupt = Interrupt::new();
    interrupt.raise();
    let err = test_simulator()
        .simulate(ListenerChain::new().with(InterruptListener::new(interrupt)))
        .expect_err("cancelled");
    assert!(matches!(err, SimulationError::Cancelled { .. }));
}

/// Ends the run gracefully after a number of steps.
#[derive(Debug, Clone)]
struct AbortAt {
    step: u64,
}

impl SimulationListener for AbortAt {
    fn name(&self) -> &str {
        "abort_at"
    }

    fn post_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        if status.step_count() >= self.step {
            return Ok(HookOutcome::Abort);
        }
        Ok(HookOutcome::Continue)
    }
}

#[test]
fn test_abort_ends_run_with_results() {
    let data = test_simulator()
        .simulate(ListenerChain::new().with(AbortAt { step: 20 }))
        .expect("aborted runs keep their results");
    let branch = data.branch().expect("one branch");

    assert_eq!(branch.len(), 21);
    assert_eq!(
        branch.events().last().map(|e| e.event_type),
        Some(FlightEventType::SimulationEnd)
    );
    assert!(branch.first_event(FlightEventType::Apogee).is_none());
    assert!(data.warnings.contains(&Warning::ListenersAffected));
}

/// Moves the rocket itself from a given time on, skipping the physics update.
#[derive(Debug, Clone)]
struct TakeOver {
    from: f64,
    sink_rate: f64,
    corrupt: bool,
}

impl SimulationListener for TakeOver {
    fn name(&self) -> &str {
        "take_over"
    }

    fn pre_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        if status.time() < self.from {
            return Ok(HookOutcome::Continue);
        }
        let dt = 0.01;
        let mut spatial = status.spatial().clone();
        spatial.velocity = Vector3::new(0.0, 0.0, -self.sink_rate);
        spatial.position.z -= self.sink_rate * dt;
        if self.corrupt {
            spatial.position.z = f64::NAN;
        }
        status.set_spatial(spatial);
        status.set_time(status.time() + dt);
        Ok(HookOutcome::Skip)
    }
}

#[test]
fn test_skipped_steps_still_detect_crossings() {
    let chain = ListenerChain::new().with(TakeOver {
        from: 1.0,
        sink_rate: 500.0,
        corrupt: false,
    });
    let data = test_simulator().simulate(chain).expect("flight succeeds");
    let branch = data.branch().expect("one branch");

    let apogee = branch.first_event(FlightEventType::Apogee).expect("apogee");
    let ground_hit = branch
        .first_event(FlightEventType::GroundHit)
        .expect("ground hit");
    assert!(apogee.time <= ground_hit.time);
    assert!(ground_hit.time < 1.5, "ground hit at {}", ground_hit.time);
    assert_eq!(
        branch.events().last().map(|e| e.event_type),
        Some(FlightEventType::SimulationEnd)
    );
    assert!(branch.events().last().map_or(f64::INFINITY, |e| e.time) < 10.0);
}

#[test]
fn test_skipped_steps_still_check_bounds() {
    let chain = ListenerChain::new().with(TakeOver {
        from: 1.0,
        sink_rate: 5.0,
        corrupt: true,
    });
    let err = test_simulator().simulate(chain).expect_err("diverged state");
    match &err {
        SimulationError::Calculation { message, .. } => {
            assert!(message.contains("Non-finite"), "unexpected message {}", message)
        }
        other => panic!("expected a calculation error, got {:?}", other),
    }
}

/// Skips every step from a given time on without advancing the clock.
#[derive(Debug, Clone)]
struct FreezeTime {
    from: f64,
}

impl SimulationListener for FreezeTime {
    fn name(&self) -> &str {
        "freeze_time"
    }

    fn pre_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        if status.time() >= self.from {
            return Ok(HookOutcome::Skip);
        }
        Ok(HookOutcome::Continue)
    }
}

#[test]
fn test_frozen_clock_fails_run() {
    let err = test_simulator()
        .simulate(ListenerChain::new().with(FreezeTime { from: 0.5 }))
        .expect_err("stalled run");
    match &err {
        SimulationError::Calculation { message, .. } => {
            assert!(message.contains("stopped advancing"), "unexpected message {}", message)
        }
        other => panic!("expected a calculation error, got {:?}", other),
    }
}
