use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;
use tracing::trace;

/// Outcome of one objective evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    /// Normalized point that was evaluated
    pub point: Vec<f64>,
    /// Attribute values the modifiers wrote
    pub modifier_values: Vec<f64>,
    /// NaN when the point was outside the domain or the flight did not produce it
    pub parameter_value: f64,
    /// Value handed to the optimizer
    pub goal_value: f64,
    pub domain_distance: f64,
}

/// Receives a record for every completed evaluation, from worker threads.
pub trait EvaluationObserver: Send + Sync {
    fn evaluated(&self, record: EvaluationRecord);
}

/// Forwards records over a channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: Sender<EvaluationRecord>,
}

impl ChannelObserver {
    pub fn new() -> (Self, Receiver<EvaluationRecord>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl EvaluationObserver for ChannelObserver {
    fn evaluated(&self, record: EvaluationRecord) {
        if self.sender.send(record).is_err() {
            trace!("Evaluation record dropped, receiver gone");
        }
    }
}
