mod chain;
mod system;

pub use chain::ListenerChain;
pub use system::{ApogeeEndListener, CoastToApogeeListener, GroundHitEndListener, InterruptListener};

use crate::simulation::{FlightEvent, ListenerError, SimulationError, SimulationStatus};

/// Result of a listener hook.
///
/// - `Continue`: proceed with default behaviour.
/// - `Skip`: for `pre_step`, skip the physics update of this step; for
///   `handle_flight_event`, suppress the default handling of the event.
/// - `Abort`: end the run gracefully at the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookOutcome {
    #[default]
    Continue,
    Skip,
    Abort,
}

pub type HookResult = Result<HookOutcome, ListenerError>;

/// Hook set attached to a simulation run. Every hook has a no-op default.
///
/// Listeners are cloned for every run, so a single configured chain can be
/// replayed by many concurrent simulations without sharing state.
pub trait SimulationListener: ListenerClone + Send + Sync {
    fn name(&self) -> &str;

    /// System listeners implement internal control flow and never cause
    /// [`Warning::ListenersAffected`](crate::simulation::Warning::ListenersAffected).
    fn is_system_listener(&self) -> bool {
        false
    }

    fn start_simulation(&mut self, _status: &mut SimulationStatus) -> Result<(), ListenerError> {
        Ok(())
    }

    fn pre_step(&mut self, _status: &mut SimulationStatus) -> HookResult {
        Ok(HookOutcome::Continue)
    }

    /// `Skip` has no meaning after a step and is treated as `Continue`.
    fn post_step(&mut self, _status: &mut SimulationStatus) -> HookResult {
        Ok(HookOutcome::Continue)
    }

    fn handle_flight_event(
        &mut self,
        _status: &mut SimulationStatus,
        _event: &FlightEvent,
    ) -> HookResult {
        Ok(HookOutcome::Continue)
    }

    /// Called exactly once per started run, also when the run failed.
    fn end_simulation(&mut self, _status: &mut SimulationStatus, _error: Option<&SimulationError>) {}
}

/// Object-safe cloning for boxed listeners.
pub trait ListenerClone {
    fn clone_box(&self) -> Box<dyn SimulationListener>;
}

impl<T> ListenerClone for T
where
    T: SimulationListener + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn SimulationListener> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn SimulationListener> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl std::fmt::Debug for dyn SimulationListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationListener")
            .field("name", &self.name())
            .field("system", &self.is_system_listener())
            .finish()
    }
}
