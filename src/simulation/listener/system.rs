use tracing::{debug, info};

use super::{HookOutcome, HookResult, SimulationListener};
use crate::simulation::{FlightEvent, FlightEventType, ListenerError, SimulationStatus};
use crate::utils::Interrupt;

/// Ends the run when apogee is reached.
#[derive(Debug, Clone, Default)]
pub struct ApogeeEndListener;

impl SimulationListener for ApogeeEndListener {
    fn name(&self) -> &str {
        "apogee_end"
    }

    fn is_system_listener(&self) -> bool {
        true
    }

    fn handle_flight_event(&mut self, status: &mut SimulationStatus, event: &FlightEvent) -> HookResult {
        if event.event_type == FlightEventType::Apogee {
            status.add_event(FlightEvent::new(FlightEventType::SimulationEnd, event.time));
        }
        Ok(HookOutcome::Continue)
    }
}

/// Ends the run on ground hit without waiting for the queue to drain.
#[derive(Debug, Clone, Default)]
pub struct GroundHitEndListener;

impl SimulationListener for GroundHitEndListener {
    fn name(&self) -> &str {
        "ground_hit_end"
    }

    fn is_system_listener(&self) -> bool {
        true
    }

    fn handle_flight_event(&mut self, status: &mut SimulationStatus, event: &FlightEvent) -> HookResult {
        if event.event_type == FlightEventType::GroundHit {
            status.add_event(FlightEvent::new(FlightEventType::SimulationEnd, event.time));
        }
        Ok(HookOutcome::Continue)
    }
}

/// Polls a shared interrupt flag at start and before every step.
#[derive(Debug, Clone)]
pub struct InterruptListener {
    interrupt: Interrupt,
}

impl InterruptListener {
    pub fn new(interrupt: Interrupt) -> Self {
        Self { interrupt }
    }

    fn poll(&self, status: &SimulationStatus) -> Result<(), ListenerError> {
        if self.interrupt.is_raised() {
            info!("Simulation interrupted at t = {:.3} s", status.time());
            return Err(ListenerError::Cancelled);
        }
        Ok(())
    }
}

impl SimulationListener for InterruptListener {
    fn name(&self) -> &str {
        "interrupt"
    }

    fn is_system_listener(&self) -> bool {
        true
    }

    fn start_simulation(&mut self, status: &mut SimulationStatus) -> Result<(), ListenerError> {
        self.poll(status)
    }

    fn pre_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        self.poll(status)?;
        Ok(HookOutcome::Continue)
    }
}

/// Keeps recovery devices stowed and ends the run at apogee.
///
/// Used when only the ascent matters, so a deployment delay shorter than the
/// coast phase cannot cut the flight short.
#[derive(Debug, Clone, Default)]
pub struct CoastToApogeeListener;

impl SimulationListener for CoastToApogeeListener {
    fn name(&self) -> &str {
        "coast_to_apogee"
    }

    fn is_system_listener(&self) -> bool {
        true
    }

    fn handle_flight_event(&mut self, status: &mut SimulationStatus, event: &FlightEvent) -> HookResult {
        match event.event_type {
            FlightEventType::RecoveryDeviceDeployment => {
                debug!("Recovery deployment suppressed before apogee");
                Ok(HookOutcome::Skip)
            }
            FlightEventType::Apogee => {
                status.add_event(FlightEvent::new(FlightEventType::SimulationEnd, event.time));
                Ok(HookOutcome::Continue)
            }
            _ => Ok(HookOutcome::Continue),
        }
    }
}
