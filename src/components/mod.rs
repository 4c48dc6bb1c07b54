pub mod component;
pub mod error;
pub mod motor;
pub mod physics;
pub mod rocket;
pub mod spatial;

pub use component::{
    BodyTube, ComponentAttribute, ComponentId, ComponentKind, DeployEvent, MassObject, NoseCone,
    NoseShape, Parachute, RocketComponent, TrapezoidFinSet,
};
pub use error::DesignError;
pub use motor::{
    MotorConfiguration, MotorDatabase, MotorDigest, ThrustCurveMotor, ThrustCurveProvider,
};
pub use physics::{Force, ForceCategory, ForceSet};
pub use rocket::{ChangeScope, ModificationCounters, PlacedComponent, Rocket};
pub use spatial::SpatialState;
