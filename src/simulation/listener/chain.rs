use tracing::debug;

use super::{HookOutcome, HookResult, SimulationListener};
use crate::simulation::{FlightEvent, ListenerError, SimulationError, SimulationStatus, Warning};

/// Ordered listeners fired around every simulation step.
///
/// Hooks run in chain order. `pre_step` and `handle_flight_event` stop at the
/// first listener returning something other than [`HookOutcome::Continue`];
/// the remaining listeners are not consulted for that call.
#[derive(Debug, Clone, Default)]
pub struct ListenerChain {
    listeners: Vec<Box<dyn SimulationListener>>,
}

impl ListenerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<L: SimulationListener + 'static>(mut self, listener: L) -> Self {
        self.push(listener);
        self
    }

    pub fn push<L: SimulationListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    pub fn push_boxed(&mut self, listener: Box<dyn SimulationListener>) {
        self.listeners.push(listener);
    }

    /// Append clones of every listener of `other`.
    pub fn extend_from(&mut self, other: &ListenerChain) {
        self.listeners.extend(other.listeners.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    pub fn fire_start(&mut self, status: &mut SimulationStatus) -> Result<(), ListenerError> {
        for listener in &mut self.listeners {
            let mod_id = status.mod_id();
            listener.start_simulation(status)?;
            note_effect(&**listener, status, mod_id, HookOutcome::Continue);
        }
        Ok(())
    }

    pub fn fire_pre_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        for listener in &mut self.listeners {
            let mod_id = status.mod_id();
            let outcome = listener.pre_step(status)?;
            note_effect(&**listener, status, mod_id, outcome);
            if outcome != HookOutcome::Continue {
                debug!("{} returned {:?} from pre_step", listener.name(), outcome);
                return Ok(outcome);
            }
        }
        Ok(HookOutcome::Continue)
    }

    pub fn fire_post_step(&mut self, status: &mut SimulationStatus) -> HookResult {
        for listener in &mut self.listeners {
            let mod_id = status.mod_id();
            let outcome = match listener.post_step(status)? {
                HookOutcome::Skip => HookOutcome::Continue,
                outcome => outcome,
            };
            note_effect(&**listener, status, mod_id, outcome);
            if outcome == HookOutcome::Abort {
                debug!("{} aborted the run from post_step", listener.name());
                return Ok(outcome);
            }
        }
        Ok(HookOutcome::Continue)
    }

    pub fn fire_flight_event(
        &mut self,
        status: &mut SimulationStatus,
        event: &FlightEvent,
    ) -> HookResult {
        for listener in &mut self.listeners {
            let mod_id = status.mod_id();
            let outcome = listener.handle_flight_event(status, event)?;
            note_effect(&**listener, status, mod_id, outcome);
            if outcome != HookOutcome::Continue {
                debug!(
                    "{} returned {:?} for {} at {:.3} s",
                    listener.name(),
                    outcome,
                    event.event_type,
                    event.time
                );
                return Ok(outcome);
            }
        }
        Ok(HookOutcome::Continue)
    }

    /// Every listener is notified, regardless of how the run ended.
    pub fn fire_end(&mut self, status: &mut SimulationStatus, error: Option<&SimulationError>) {
        for listener in &mut self.listeners {
            listener.end_simulation(status, error);
        }
    }
}

fn note_effect(
    listener: &dyn SimulationListener,
    status: &mut SimulationStatus,
    mod_id: u64,
    outcome: HookOutcome,
) {
    if listener.is_system_listener() {
        return;
    }
    if outcome != HookOutcome::Continue || status.mod_id() != mod_id {
        status.add_warning(Warning::ListenersAffected);
    }
}
