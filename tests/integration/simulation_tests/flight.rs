use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use rocketopt::{
    components::MotorDatabase,
    simulation::{
        FlightDataType, FlightEventType, ListenerChain, SimulationError, Simulator, Warning,
    },
};
use std::sync::Arc;

use crate::common::{
    assert_channels_consistent, assert_events_in_time_order, assert_flight_finite,
    test_motor_database, test_options, test_rocket, test_simulator, unpowered_rocket,
};

#[test]
fn test_standard_flight_event_sequence() {
    let data = test_simulator()
        .simulate(ListenerChain::new())
        .expect("flight succeeds");
    let branch = data.branch().expect("one branch");

    assert_eq!(
        branch.event_types(),
        vec![
            FlightEventType::Ignition,
            FlightEventType::LaunchrodCleared,
            FlightEventType::Burnout,
            FlightEventType::Apogee,
            FlightEventType::RecoveryDeviceDeployment,
            FlightEventType::GroundHit,
            FlightEventType::SimulationEnd,
        ]
    );

    let apogee = branch
        .first_event(FlightEventType::Apogee)
        .expect("apogee event");
    let apogee_altitude = branch
        .value_at(FlightDataType::Altitude, apogee.time)
        .expect("altitude channel");
    assert_relative_eq!(apogee_altitude, data.max_altitude(), epsilon = 1e-9);
    assert!(data.max_altitude() > 20.0, "apogee {} m", data.max_altitude());
}

#[test]
fn test_flight_data_consistent() {
    let data = test_simulator()
        .simulate(ListenerChain::new())
        .expect("flight succeeds");
    let branch = data.branch().expect("one branch");

    assert_channels_consistent(branch);
    assert_events_in_time_order(branch);
    assert_flight_finite(&data);

    assert!(data.flight_time() > data.time_to_apogee());
    // Still air, vertical rod
    assert!(data.landing_distance() < 1.0);
    // Under the parachute
    assert!(data.ground_hit_velocity() < 10.0);

    let mass = branch.get(FlightDataType::Mass).expect("mass channel");
    assert!(mass.first() > mass.last(), "propellant must burn");
}

#[test]
fn test_repeated_runs_identical() {
    let mut simulator = test_simulator();
    let first = simulator.simulate(ListenerChain::new()).expect("first run");
    let second = simulator.simulate(ListenerChain::new()).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn test_no_motor_is_launch_error() {
    let (database, _) = test_motor_database();
    let mut simulator = Simulator::new(unpowered_rocket(), test_options(), database);

    let result = simulator.simulate(ListenerChain::new());
    match result {
        Err(err @ SimulationError::Launch(_)) => {
            assert!(err.flight_data().is_none());
            assert!(!err.is_cancelled());
        }
        other => panic!("expected a launch error, got {:?}", other),
    }
}

#[test]
fn test_unknown_motor_is_launch_error() {
    let (_, digest) = test_motor_database();
    let mut simulator = Simulator::new(
        test_rocket(&digest),
        test_options(),
        Arc::new(MotorDatabase::new()),
    );
    assert!(matches!(
        simulator.simulate(ListenerChain::new()),
        Err(SimulationError::Launch(_))
    ));
}

#[test]
fn test_time_limit_ends_run() {
    let (database, digest) = test_motor_database();
    let mut options = test_options();
    options.max_simulation_time = 1.0;
    let mut simulator = Simulator::new(test_rocket(&digest), options, database);

    let data = simulator.simulate(ListenerChain::new()).expect("run ends cleanly");
    let branch = data.branch().expect("one branch");
    let last = branch.events().last().expect("events recorded");
    assert_eq!(last.event_type, FlightEventType::SimulationEnd);
    assert!(last.time >= 1.0 && last.time < 1.02, "ended at {}", last.time);
    assert!(branch.first_event(FlightEventType::Apogee).is_none());
}

#[test]
fn test_short_rod_warns_low_velocity() {
    let (database, digest) = test_motor_database();
    let mut options = test_options();
    options.launch_rod_length = 0.05;
    let mut simulator = Simulator::new(test_rocket(&digest), options, database);

    let data = simulator.simulate(ListenerChain::new()).expect("flight succeeds");
    assert!(data
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::LowLaunchRodVelocity { .. })));
    assert!(!data.warnings.contains(&Warning::ListenersAffected));
}

#[test]
fn test_extras_recorded() {
    let data = test_simulator()
        .simulate(ListenerChain::new())
        .expect("flight succeeds");
    let branch = data.branch().expect("one branch");
    let stability = branch
        .value_at(FlightDataType::StabilityMargin, 0.0)
        .expect("stability channel");
    assert!(stability > 0.0, "test rocket must be stable, got {}", stability);
}
