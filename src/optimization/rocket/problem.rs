use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::components::{ComponentAttribute, MotorConfiguration, MotorDatabase, Rocket, ThrustCurveMotor};
use crate::optimization::rocket::{
    default_modifiers, ComponentModifier, DomainConfig, FlightParameter, GoalConfig,
    RocketOptimizationFunction, SimulationModifier,
};
use crate::resources::errors::{ConfigError, Result};
use crate::resources::{OptimizationConfig, SimulationOptions};

/// Motor to load into a motor mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorSelection {
    /// Name of the body tube acting as motor mount
    pub mount: String,
    pub designation: String,
    #[serde(default)]
    pub ignition_delay: f64,
}

/// One optimized attribute. Missing bounds fall back to the defaults of
/// [`default_modifiers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierConfig {
    pub component: String,
    pub attribute: ComponentAttribute,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Complete optimization problem as stored in a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationProblem {
    pub rocket: Rocket,
    pub motors: Vec<ThrustCurveMotor>,
    #[serde(default)]
    pub motor: Option<MotorSelection>,
    pub parameter: FlightParameter,
    pub goal: GoalConfig,
    #[serde(default)]
    pub domain: DomainConfig,
    /// Empty means every modifiable attribute with default bounds
    #[serde(default)]
    pub modifiers: Vec<ModifierConfig>,
    #[serde(default)]
    pub simulation: SimulationOptions,
    #[serde(default)]
    pub optimization: OptimizationConfig,
}

impl OptimizationProblem {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let problem: Self = serde_yaml::from_reader(file)?;
        problem.validate()?;
        Ok(problem)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.optimization.validate()?;
        if self.motors.is_empty() {
            return Err(ConfigError::Validation("at least one motor is required".into()));
        }
        for motor in &self.motors {
            motor
                .validate()
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
        if let Some(selection) = &self.motor {
            if !self
                .motors
                .iter()
                .any(|m| m.designation.eq_ignore_ascii_case(&selection.designation))
            {
                return Err(ConfigError::Validation(format!(
                    "motor '{}' is not in the motor list",
                    selection.designation
                )));
            }
        }
        for modifier in &self.modifiers {
            if self.rocket.find_by_name(&modifier.component).is_none() {
                return Err(ConfigError::Validation(format!(
                    "unknown component '{}'",
                    modifier.component
                )));
            }
            if let (Some(min), Some(max)) = (modifier.min, modifier.max) {
                if !(min <= max) {
                    return Err(ConfigError::Validation(format!(
                        "modifier bounds of '{}' must satisfy min <= max",
                        modifier.component
                    )));
                }
            }
        }
        Ok(())
    }

    /// Register the motors, load the selected motor and assemble the objective.
    pub fn build(&self) -> Result<RocketOptimizationFunction> {
        let design = |e: crate::components::DesignError| ConfigError::Validation(e.to_string());

        let mut database = MotorDatabase::new();
        for motor in &self.motors {
            database.register(motor.clone()).map_err(design)?;
        }

        let mut rocket = self.rocket.clone();
        if let Some(selection) = &self.motor {
            let mount = rocket
                .find_by_name(&selection.mount)
                .map(|c| c.id())
                .ok_or_else(|| ConfigError::Validation(format!("unknown motor mount '{}'", selection.mount)))?;
            let (digest, _) = database
                .find_by_designation(&selection.designation)
                .ok_or_else(|| ConfigError::Validation(format!("unknown motor '{}'", selection.designation)))?;
            let configuration = MotorConfiguration {
                digest: digest.clone(),
                ignition_delay: selection.ignition_delay,
            };
            rocket.set_motor(mount, Some(configuration)).map_err(design)?;
        }

        let modifiers: Vec<Box<dyn SimulationModifier>> = if self.modifiers.is_empty() {
            default_modifiers(&rocket)
                .into_iter()
                .map(|m| Box::new(m) as Box<dyn SimulationModifier>)
                .collect()
        } else {
            let mut modifiers: Vec<Box<dyn SimulationModifier>> = Vec::new();
            for config in &self.modifiers {
                modifiers.push(Box::new(build_modifier(&rocket, config)?));
            }
            modifiers
        };
        if modifiers.is_empty() {
            return Err(ConfigError::Validation("nothing to optimize".into()));
        }
        info!(
            "Optimizing {} of '{}' over {} attributes",
            self.parameter,
            rocket.name,
            modifiers.len()
        );

        Ok(RocketOptimizationFunction::new(
            rocket,
            self.simulation.clone(),
            Arc::new(database),
            modifiers,
            Box::new(self.parameter),
            self.goal.build(),
            self.domain.build(),
        ))
    }
}

fn build_modifier(rocket: &Rocket, config: &ModifierConfig) -> Result<ComponentModifier> {
    let design = |e: crate::components::DesignError| ConfigError::Validation(e.to_string());
    let id = rocket
        .find_by_name(&config.component)
        .map(|c| c.id())
        .ok_or_else(|| ConfigError::Validation(format!("unknown component '{}'", config.component)))?;

    if let (Some(min), Some(max)) = (config.min, config.max) {
        // Fails early for attributes the component does not have
        rocket.attribute(id, config.attribute).map_err(design)?;
        let name = format!("{} {:?}", config.component, config.attribute);
        return Ok(ComponentModifier::new(id, config.attribute, name, min, max));
    }

    let defaults = ComponentModifier::with_default_bounds(rocket, id, config.attribute)
        .map_err(design)?
        .ok_or_else(|| {
            ConfigError::Validation(format!(
                "{:?} of '{}' needs explicit bounds",
                config.attribute, config.component
            ))
        })?;
    let min = config.min.unwrap_or(defaults.min);
    let max = config.max.unwrap_or(defaults.max);
    Ok(ComponentModifier::new(id, config.attribute, defaults.name, min, max))
}
