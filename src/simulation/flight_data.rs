use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::simulation::{FlightEvent, FlightEventType, Warning};
use crate::utils::interpolate;

/// Recorded flight quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightDataType {
    /// [s]
    Time,
    /// Height above the launch site [m]
    Altitude,
    /// East of the launch site [m]
    PositionX,
    /// North of the launch site [m]
    PositionY,
    LateralDistance,
    VerticalVelocity,
    TotalVelocity,
    TotalAcceleration,
    /// [N]
    Thrust,
    /// [kg]
    Mass,
    /// Aft of the nose tip [m]
    CgLocation,
    CpLocation,
    /// Calibers
    StabilityMargin,
    MachNumber,
    DragCoefficient,
}

impl FlightDataType {
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Time => "s",
            Self::Altitude
            | Self::PositionX
            | Self::PositionY
            | Self::LateralDistance
            | Self::CgLocation
            | Self::CpLocation => "m",
            Self::VerticalVelocity | Self::TotalVelocity => "m/s",
            Self::TotalAcceleration => "m/s²",
            Self::Thrust => "N",
            Self::Mass => "kg",
            Self::StabilityMargin => "cal",
            Self::MachNumber | Self::DragCoefficient => "",
        }
    }
}

/// One simulated trajectory: equally long channels plus the events handled on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightDataBranch {
    pub name: String,
    channels: BTreeMap<FlightDataType, Vec<f64>>,
    events: Vec<FlightEvent>,
}

impl FlightDataBranch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Append one sample row. Channels missing from `values` get NaN.
    pub fn add_point(&mut self, values: &[(FlightDataType, f64)]) {
        let rows = self.len();
        for &(data_type, _) in values {
            self.channels
                .entry(data_type)
                .or_insert_with(|| vec![f64::NAN; rows]);
        }
        for (data_type, channel) in self.channels.iter_mut() {
            let value = values
                .iter()
                .find(|(t, _)| t == data_type)
                .map_or(f64::NAN, |(_, v)| *v);
            channel.push(value);
        }
    }

    pub fn add_event(&mut self, event: FlightEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[FlightEvent] {
        &self.events
    }

    pub fn event_types(&self) -> Vec<FlightEventType> {
        self.events.iter().map(|e| e.event_type).collect()
    }

    pub fn first_event(&self, event_type: FlightEventType) -> Option<&FlightEvent> {
        self.events.iter().find(|e| e.event_type == event_type)
    }

    pub fn get(&self, data_type: FlightDataType) -> Option<&[f64]> {
        self.channels.get(&data_type).map(|c| c.as_slice())
    }

    pub fn len(&self) -> usize {
        self.channels.values().next().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self, data_type: FlightDataType) -> Option<f64> {
        self.get(data_type).and_then(|c| c.last().copied())
    }

    /// Largest finite value of a channel.
    pub fn max(&self, data_type: FlightDataType) -> Option<f64> {
        self.get(data_type)?
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }

    /// Channel value at `time`, linearly interpolated between samples.
    pub fn value_at(&self, data_type: FlightDataType, time: f64) -> Option<f64> {
        let times = self.get(FlightDataType::Time)?;
        let values = self.get(data_type)?;
        if times.is_empty() {
            return None;
        }
        Some(interpolate(times, values, time))
    }
}

/// Output of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightData {
    pub branches: Vec<FlightDataBranch>,
    pub warnings: Vec<Warning>,
}

impl FlightData {
    pub fn new(branch: FlightDataBranch, warnings: Vec<Warning>) -> Self {
        Self {
            branches: vec![branch],
            warnings,
        }
    }

    pub fn branch(&self) -> Option<&FlightDataBranch> {
        self.branches.first()
    }

    fn branch_max(&self, data_type: FlightDataType) -> f64 {
        self.branch().and_then(|b| b.max(data_type)).unwrap_or(f64::NAN)
    }

    fn value_at_event(&self, data_type: FlightDataType, event_type: FlightEventType) -> f64 {
        self.branch()
            .and_then(|b| {
                let event = b.first_event(event_type)?;
                b.value_at(data_type, event.time)
            })
            .unwrap_or(f64::NAN)
    }

    pub fn max_altitude(&self) -> f64 {
        self.branch_max(FlightDataType::Altitude)
    }

    pub fn max_velocity(&self) -> f64 {
        self.branch_max(FlightDataType::TotalVelocity)
    }

    pub fn max_acceleration(&self) -> f64 {
        self.branch_max(FlightDataType::TotalAcceleration)
    }

    pub fn time_to_apogee(&self) -> f64 {
        self.branch()
            .and_then(|b| b.first_event(FlightEventType::Apogee))
            .map_or(f64::NAN, |e| e.time)
    }

    pub fn flight_time(&self) -> f64 {
        self.branch()
            .and_then(|b| {
                b.first_event(FlightEventType::GroundHit)
                    .map(|e| e.time)
                    .or_else(|| b.last(FlightDataType::Time))
            })
            .unwrap_or(f64::NAN)
    }

    pub fn ground_hit_velocity(&self) -> f64 {
        self.value_at_event(FlightDataType::TotalVelocity, FlightEventType::GroundHit)
    }

    pub fn deployment_velocity(&self) -> f64 {
        self.value_at_event(
            FlightDataType::TotalVelocity,
            FlightEventType::RecoveryDeviceDeployment,
        )
    }

    /// Lateral distance at ground hit, or at the last sample if the rocket never landed.
    pub fn landing_distance(&self) -> f64 {
        let at_ground_hit =
            self.value_at_event(FlightDataType::LateralDistance, FlightEventType::GroundHit);
        if at_ground_hit.is_finite() {
            return at_ground_hit;
        }
        self.branch()
            .and_then(|b| b.last(FlightDataType::LateralDistance))
            .unwrap_or(f64::NAN)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
