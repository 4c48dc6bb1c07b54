#![allow(dead_code)]

mod assertions;
mod fixtures;

// Re-export
pub use assertions::{assert_channels_consistent, assert_events_in_time_order, assert_flight_finite};
pub use fixtures::*;
