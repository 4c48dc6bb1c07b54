use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::components::ComponentId;

/// Events closer together than this are treated as simultaneous [s].
pub const EVENT_TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightEventType {
    Ignition,
    LaunchrodCleared,
    Burnout,
    Apogee,
    RecoveryDeviceDeployment,
    GroundHit,
    SimulationEnd,
    Exception,
}

impl fmt::Display for FlightEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ignition => "IGNITION",
            Self::LaunchrodCleared => "LAUNCHROD_CLEARED",
            Self::Burnout => "BURNOUT",
            Self::Apogee => "APOGEE",
            Self::RecoveryDeviceDeployment => "RECOVERY_DEVICE_DEPLOYMENT",
            Self::GroundHit => "GROUND_HIT",
            Self::SimulationEnd => "SIMULATION_END",
            Self::Exception => "EXCEPTION",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightEvent {
    pub event_type: FlightEventType,
    /// [s]
    pub time: f64,
    /// Component the event concerns, e.g. the deployed parachute
    #[serde(default)]
    pub source: Option<ComponentId>,
}

impl FlightEvent {
    pub fn new(event_type: FlightEventType, time: f64) -> Self {
        Self {
            event_type,
            time,
            source: None,
        }
    }

    pub fn with_source(event_type: FlightEventType, time: f64, source: ComponentId) -> Self {
        Self {
            event_type,
            time,
            source: Some(source),
        }
    }
}

/// Time-ordered queue of pending events.
///
/// Events within [`EVENT_TIME_EPSILON`] of each other count as simultaneous and
/// leave the queue in the order they were inserted.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<FlightEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: FlightEvent) {
        // Behind every event that is not strictly later than the new one
        let index = self
            .events
            .iter()
            .position(|e| e.time > event.time + EVENT_TIME_EPSILON)
            .unwrap_or(self.events.len());
        self.events.insert(index, event);
    }

    pub fn peek(&self) -> Option<&FlightEvent> {
        self.events.front()
    }

    pub fn pop(&mut self) -> Option<FlightEvent> {
        self.events.pop_front()
    }

    /// Pop the next event if it is due at `time`.
    pub fn pop_due(&mut self, time: f64) -> Option<FlightEvent> {
        match self.events.front() {
            Some(event) if event.time <= time + EVENT_TIME_EPSILON => self.events.pop_front(),
            _ => None,
        }
    }

    pub fn next_time(&self) -> Option<f64> {
        self.events.front().map(|e| e.time)
    }

    pub fn contains(&self, event_type: FlightEventType) -> bool {
        self.events.iter().any(|e| e.event_type == event_type)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlightEvent> {
        self.events.iter()
    }
}
