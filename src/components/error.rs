use thiserror::Error;

use crate::components::{ComponentAttribute, ComponentId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignError {
    #[error("Unknown component: {0}")]
    UnknownComponent(ComponentId),
    #[error("Attribute {attribute:?} is not applicable to component '{component}'")]
    AttributeNotApplicable {
        component: String,
        attribute: ComponentAttribute,
    },
    #[error("Invalid value {value} for {attribute:?}: {reason}")]
    InvalidValue {
        attribute: ComponentAttribute,
        value: f64,
        reason: String,
    },
    #[error("Invalid component placement: {0}")]
    InvalidPlacement(String),
    #[error("Invalid motor '{designation}': {reason}")]
    InvalidMotor { designation: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DesignError>;
