use rocketopt::simulation::{FlightData, FlightDataBranch, FlightDataType};

/// Assert that every channel has one value per recorded time sample
#[track_caller]
pub fn assert_channels_consistent(branch: &FlightDataBranch) {
    let samples = branch
        .get(FlightDataType::Time)
        .expect("time channel recorded")
        .len();
    assert!(samples > 0, "No samples recorded");
    for data_type in [
        FlightDataType::Altitude,
        FlightDataType::TotalVelocity,
        FlightDataType::TotalAcceleration,
        FlightDataType::Mass,
        FlightDataType::Thrust,
    ] {
        let channel = branch
            .get(data_type)
            .unwrap_or_else(|| panic!("{:?} channel missing", data_type));
        assert_eq!(channel.len(), samples, "{:?} channel length", data_type);
    }
}

/// Assert that recorded events never go back in time
#[track_caller]
pub fn assert_events_in_time_order(branch: &FlightDataBranch) {
    for pair in branch.events().windows(2) {
        assert!(
            pair[1].time >= pair[0].time - 1e-9,
            "{} at {} recorded after {} at {}",
            pair[1].event_type,
            pair[1].time,
            pair[0].event_type,
            pair[0].time
        );
    }
}

/// Assert that the state channels stay finite and the rocket mass positive
#[track_caller]
pub fn assert_flight_finite(data: &FlightData) {
    let branch = data.branch().expect("one branch");
    for data_type in [
        FlightDataType::Time,
        FlightDataType::Altitude,
        FlightDataType::TotalVelocity,
    ] {
        let channel = branch.get(data_type).expect("channel recorded");
        assert!(
            channel.iter().all(|v| v.is_finite()),
            "{:?} contains non-finite values",
            data_type
        );
    }
    let mass = branch.get(FlightDataType::Mass).expect("mass channel");
    assert!(mass.iter().all(|&m| m > 0.0), "Mass must be positive");
}
