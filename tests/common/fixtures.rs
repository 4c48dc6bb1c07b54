use rocketopt::{
    components::{
        BodyTube, DeployEvent, MotorConfiguration, MotorDatabase, MotorDigest, NoseCone, NoseShape,
        Parachute, Rocket, RocketComponent, ThrustCurveMotor, TrapezoidFinSet,
    },
    resources::SimulationOptions,
    simulation::Simulator,
};
use std::sync::Arc;

/// Roughly a C6: ~9 N·s over 1.86 s
pub fn test_motor() -> ThrustCurveMotor {
    ThrustCurveMotor::new(
        "C6",
        "Test",
        0.018,
        0.07,
        0.024,
        0.0125,
        vec![
            0.0, 0.046, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8, 1.86,
        ],
        vec![
            0.0, 1.5, 6.0, 14.1, 11.5, 5.5, 4.9, 4.7, 4.6, 4.6, 4.5, 4.5, 4.5, 4.5, 0.0,
        ],
    )
    .expect("valid test motor")
}

/// Motor database holding [`test_motor`] and the motor's digest.
pub fn test_motor_database() -> (Arc<MotorDatabase>, MotorDigest) {
    let mut database = MotorDatabase::new();
    let digest = database.register(test_motor()).expect("registered");
    (Arc::new(database), digest)
}

pub fn nose_cone() -> RocketComponent {
    RocketComponent::nose_cone(
        "Nose",
        NoseCone {
            shape: NoseShape::Conical,
            length: 0.12,
            aft_radius: 0.0125,
            thickness: 0.002,
            density: 700.0,
        },
    )
}

pub fn fins() -> RocketComponent {
    RocketComponent::fin_set(
        "Fins",
        TrapezoidFinSet {
            fin_count: 3,
            root_chord: 0.05,
            tip_chord: 0.03,
            height: 0.04,
            sweep: 0.02,
            thickness: 0.002,
            density: 700.0,
        },
    )
    .at_position(0.35)
}

pub fn parachute() -> RocketComponent {
    RocketComponent::parachute(
        "Chute",
        Parachute {
            diameter: 0.3,
            drag_coefficient: 0.8,
            mass: 0.01,
            deploy_event: DeployEvent::Apogee,
            deploy_delay: 0.0,
        },
    )
    .at_position(0.05)
}

pub fn body_tube(motor: Option<MotorConfiguration>) -> RocketComponent {
    RocketComponent::body_tube(
        "Body",
        BodyTube {
            length: 0.4,
            outer_radius: 0.0125,
            thickness: 0.0005,
            density: 700.0,
            motor,
        },
    )
}

/// Single-stage, single-motor rocket with fins and an apogee parachute.
pub fn test_rocket(digest: &MotorDigest) -> Rocket {
    let body = body_tube(Some(MotorConfiguration::new(digest.clone())))
        .with_child(fins())
        .with_child(parachute());
    Rocket::new("Test rocket")
        .with_component(nose_cone())
        .and_then(|r| r.with_component(body))
        .expect("valid test rocket")
}

/// Same airframe without a motor.
pub fn unpowered_rocket() -> Rocket {
    let body = body_tube(None).with_child(fins()).with_child(parachute());
    Rocket::new("Glider")
        .with_component(nose_cone())
        .and_then(|r| r.with_component(body))
        .expect("valid test rocket")
}

/// Fins-free rocket, axisymmetric in every respect.
pub fn axisymmetric_rocket() -> Rocket {
    Rocket::new("Body of revolution")
        .with_component(nose_cone())
        .and_then(|r| r.with_component(body_tube(None)))
        .expect("valid test rocket")
}

/// Still-air standard atmosphere, 1 m vertical rod.
pub fn test_options() -> SimulationOptions {
    SimulationOptions::default()
}

pub fn test_simulator() -> Simulator {
    let (database, digest) = test_motor_database();
    Simulator::new(test_rocket(&digest), test_options(), database)
}
