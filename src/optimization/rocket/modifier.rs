use serde::Serialize;
use tracing::warn;

use crate::components::{ComponentAttribute, ComponentId, DesignError, ModificationCounters, Rocket};

/// Maps a normalized `[0, 1]` value onto a design attribute.
pub trait SimulationModifier: Send + Sync {
    fn name(&self) -> &str;

    fn unit(&self) -> &str;

    fn min(&self) -> f64;

    fn max(&self) -> f64;

    fn current_value(&self, rocket: &Rocket) -> Result<f64, DesignError>;

    /// Current value mapped into `[0, 1]`, clamped when the design lies outside the bounds.
    fn current_scaled(&self, rocket: &Rocket) -> Result<f64, DesignError> {
        let value = self.current_value(rocket)?;
        let range = self.max() - self.min();
        if range.abs() < f64::EPSILON {
            return Ok(0.0);
        }
        Ok(((value - self.min()) / range).clamp(0.0, 1.0))
    }

    /// Write `min + scaled·(max − min)`; scaled values outside `[0, 1]` are clamped.
    fn modify(&self, rocket: &mut Rocket, scaled: f64) -> Result<ModificationCounters, DesignError>;
}

/// Modifier of one attribute of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentModifier {
    pub component: ComponentId,
    pub attribute: ComponentAttribute,
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl ComponentModifier {
    pub fn new(
        component: ComponentId,
        attribute: ComponentAttribute,
        name: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            component,
            attribute,
            name: name.into(),
            min,
            max,
        }
    }

    /// Modifier with the default bounds for the attribute's current value.
    /// `None` when the attribute has no meaningful range.
    pub fn with_default_bounds(
        rocket: &Rocket,
        component: ComponentId,
        attribute: ComponentAttribute,
    ) -> Result<Option<Self>, DesignError> {
        let placed = rocket
            .components()
            .find(|p| p.component.id() == component)
            .ok_or(DesignError::UnknownComponent(component))?;
        let value = rocket.attribute(component, attribute)?;
        let name = format!("{} {:?}", placed.component.name(), attribute);

        let bounds = match attribute {
            ComponentAttribute::Position => Some((0.0, placed.parent_length)),
            ComponentAttribute::DeployDelay | ComponentAttribute::IgnitionDelay => Some((0.0, 10.0)),
            _ if value == 0.0 => None,
            _ => Some((value / 2.0, value * 2.0)),
        };
        Ok(bounds.map(|(min, max)| Self::new(component, attribute, name, min, max)))
    }
}

impl SimulationModifier for ComponentModifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn unit(&self) -> &str {
        self.attribute.unit()
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn current_value(&self, rocket: &Rocket) -> Result<f64, DesignError> {
        rocket.attribute(self.component, self.attribute)
    }

    fn modify(&self, rocket: &mut Rocket, scaled: f64) -> Result<ModificationCounters, DesignError> {
        if scaled.is_nan() {
            return Err(DesignError::InvalidValue {
                attribute: self.attribute,
                value: scaled,
                reason: "scaled value is NaN".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&scaled) {
            warn!("Scaled value {} of '{}' clamped to [0, 1]", scaled, self.name);
        }
        let value = self.min + scaled.clamp(0.0, 1.0) * (self.max - self.min);
        rocket.set_attribute(self.component, self.attribute, value)
    }
}

/// Every modifiable attribute of the design, depth-first, with default bounds.
pub fn default_modifiers(rocket: &Rocket) -> Vec<ComponentModifier> {
    let mut modifiers = Vec::new();
    for placed in rocket.components() {
        let component = placed.component;
        for attribute in component.attributes() {
            match ComponentModifier::with_default_bounds(rocket, component.id(), attribute) {
                Ok(Some(modifier)) => modifiers.push(modifier),
                Ok(None) => {}
                Err(e) => warn!("Skipping {:?} of '{}': {}", attribute, component.name(), e),
            }
        }
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BodyTube, MassObject, RocketComponent};
    use approx::assert_relative_eq;

    fn rocket() -> (Rocket, ComponentId, ComponentId) {
        let ballast = RocketComponent::mass_object(
            "Ballast",
            MassObject {
                mass: 0.05,
                length: 0.02,
            },
        )
        .at_position(0.1);
        let ballast_id = ballast.id();
        let tube = RocketComponent::body_tube(
            "Body",
            BodyTube {
                length: 0.4,
                outer_radius: 0.0125,
                thickness: 0.0,
                density: 1000.0,
                motor: None,
            },
        )
        .with_child(ballast);
        let tube_id = tube.id();
        (Rocket::new("Test").with_component(tube).unwrap(), tube_id, ballast_id)
    }

    #[test]
    fn test_modify_maps_and_clamps() {
        let (mut rocket, tube, _) = rocket();
        let modifier = ComponentModifier::new(tube, ComponentAttribute::Length, "Body length", 0.2, 0.6);

        modifier.modify(&mut rocket, 0.25).unwrap();
        assert_relative_eq!(modifier.current_value(&rocket).unwrap(), 0.3);
        assert_relative_eq!(modifier.current_scaled(&rocket).unwrap(), 0.25);

        modifier.modify(&mut rocket, 1.5).unwrap();
        assert_relative_eq!(modifier.current_value(&rocket).unwrap(), 0.6);
        modifier.modify(&mut rocket, -0.5).unwrap();
        assert_relative_eq!(modifier.current_value(&rocket).unwrap(), 0.2);

        assert!(modifier.modify(&mut rocket, f64::NAN).is_err());
    }

    #[test]
    fn test_modify_bumps_counters() {
        let (mut rocket, tube, ballast) = rocket();
        let before = rocket.counters();

        let length = ComponentModifier::new(tube, ComponentAttribute::Length, "Body length", 0.2, 0.6);
        let after = length.modify(&mut rocket, 0.5).unwrap();
        assert_ne!(after.aerodynamic, before.aerodynamic);
        assert_ne!(after.mass, before.mass);
        assert_eq!(after.tree, before.tree);

        let mass = ComponentModifier::new(ballast, ComponentAttribute::Mass, "Ballast", 0.0, 0.1);
        let after_mass = mass.modify(&mut rocket, 0.5).unwrap();
        assert_ne!(after_mass.mass, after.mass);
        assert_eq!(after_mass.aerodynamic, after.aerodynamic);
    }

    #[test]
    fn test_default_modifiers() {
        let (rocket, _, _) = rocket();
        let modifiers = default_modifiers(&rocket);
        let names: Vec<&str> = modifiers.iter().map(|m| m.name()).collect();
        // Zero thickness has no default range
        assert_eq!(
            names,
            vec!["Body Length", "Body Radius", "Ballast Mass", "Ballast Position"]
        );
        assert_relative_eq!(modifiers[0].min, 0.2);
        assert_relative_eq!(modifiers[0].max, 0.8);
        assert_relative_eq!(modifiers[3].max, 0.4);
    }
}
