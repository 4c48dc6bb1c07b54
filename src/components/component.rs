use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::components::motor::MotorConfiguration;
use crate::components::rocket::ChangeScope;
use crate::components::DesignError;

/// Stable identity of a component, preserved across rocket clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(Uuid);

impl ComponentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scalar design attribute addressable by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentAttribute {
    Length,
    /// Outer radius (aft radius for nose cones)
    Radius,
    Thickness,
    RootChord,
    TipChord,
    Height,
    Sweep,
    /// Axial offset of the fore end relative to the parent's fore end
    Position,
    Diameter,
    DragCoefficient,
    Mass,
    DeployDelay,
    DeployAltitude,
    IgnitionDelay,
}

impl ComponentAttribute {
    /// Physical unit of the attribute, used in logs and evaluation records.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::DragCoefficient => "",
            Self::Mass => "kg",
            Self::DeployDelay | Self::IgnitionDelay => "s",
            _ => "m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoseShape {
    Conical,
    Ogive,
    Ellipsoid,
    Parabolic,
}

impl NoseShape {
    /// CP location as a fraction of nose length, from the tip.
    pub fn cp_fraction(&self) -> f64 {
        match self {
            Self::Conical => 2.0 / 3.0,
            Self::Ogive => 0.466,
            Self::Ellipsoid | Self::Parabolic => 0.5,
        }
    }

    /// Volume fraction of the enclosing cylinder, used for solid noses.
    pub fn volume_fraction(&self) -> f64 {
        match self {
            Self::Conical => 1.0 / 3.0,
            Self::Ogive => 0.53,
            Self::Ellipsoid => 2.0 / 3.0,
            Self::Parabolic => 0.5,
        }
    }

    /// CG of a thin shell as a fraction of nose length, from the tip.
    pub fn cg_fraction(&self) -> f64 {
        match self {
            Self::Conical => 2.0 / 3.0,
            Self::Ogive => 0.6,
            Self::Ellipsoid => 0.55,
            Self::Parabolic => 0.6,
        }
    }

    /// Nose pressure drag coefficient at subsonic speeds.
    pub fn pressure_drag(&self) -> f64 {
        match self {
            Self::Conical => 0.03,
            Self::Ogive => 0.01,
            Self::Ellipsoid => 0.005,
            Self::Parabolic => 0.008,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoseCone {
    pub shape: NoseShape,
    pub length: f64,
    pub aft_radius: f64,
    pub thickness: f64,
    /// Material density [kg/m³]
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyTube {
    pub length: f64,
    pub outer_radius: f64,
    pub thickness: f64,
    pub density: f64,
    /// Motor carried by this tube, if it is a motor mount
    #[serde(default)]
    pub motor: Option<MotorConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidFinSet {
    pub fin_count: u32,
    pub root_chord: f64,
    pub tip_chord: f64,
    /// Semi-span [m]
    pub height: f64,
    /// Leading edge sweep length [m]
    pub sweep: f64,
    pub thickness: f64,
    pub density: f64,
}

impl TrapezoidFinSet {
    /// Planform area of one fin [m²]
    pub fn planform_area(&self) -> f64 {
        0.5 * (self.root_chord + self.tip_chord) * self.height
    }

    /// Mid-chord line length
    pub fn mid_chord_span(&self) -> f64 {
        let dx = self.sweep + 0.5 * (self.tip_chord - self.root_chord);
        (self.height * self.height + dx * dx).sqrt()
    }
}

/// When a recovery device opens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeployEvent {
    Apogee,
    /// Below the given altitude above the launch site while descending [m]
    Altitude(f64),
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parachute {
    pub diameter: f64,
    pub drag_coefficient: f64,
    pub mass: f64,
    pub deploy_event: DeployEvent,
    #[serde(default)]
    pub deploy_delay: f64,
}

impl Parachute {
    pub fn drag_area(&self) -> f64 {
        self.drag_coefficient * std::f64::consts::PI * 0.25 * self.diameter * self.diameter
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassObject {
    pub mass: f64,
    /// Axial extent used for CG placement [m]
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentKind {
    NoseCone(NoseCone),
    BodyTube(BodyTube),
    FinSet(TrapezoidFinSet),
    Parachute(Parachute),
    MassObject(MassObject),
}

impl ComponentKind {
    /// External body components stack along the rocket axis; the rest attach inside one.
    pub fn is_body(&self) -> bool {
        matches!(self, Self::NoseCone(_) | Self::BodyTube(_))
    }
}

/// A node of the rocket design tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocketComponent {
    #[serde(default)]
    pub(crate) id: ComponentId,
    pub(crate) name: String,
    /// Axial offset from the parent's fore end, ignored for body components
    #[serde(default)]
    pub(crate) position: f64,
    pub(crate) kind: ComponentKind,
    #[serde(default)]
    pub(crate) children: Vec<RocketComponent>,
}

impl RocketComponent {
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: ComponentId::new(),
            name: name.into(),
            position: 0.0,
            kind,
            children: Vec::new(),
        }
    }

    pub fn nose_cone(name: impl Into<String>, nose: NoseCone) -> Self {
        Self::new(name, ComponentKind::NoseCone(nose))
    }

    pub fn body_tube(name: impl Into<String>, tube: BodyTube) -> Self {
        Self::new(name, ComponentKind::BodyTube(tube))
    }

    pub fn fin_set(name: impl Into<String>, fins: TrapezoidFinSet) -> Self {
        Self::new(name, ComponentKind::FinSet(fins))
    }

    pub fn parachute(name: impl Into<String>, chute: Parachute) -> Self {
        Self::new(name, ComponentKind::Parachute(chute))
    }

    pub fn mass_object(name: impl Into<String>, mass: MassObject) -> Self {
        Self::new(name, ComponentKind::MassObject(mass))
    }

    pub fn at_position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }

    pub fn with_child(mut self, child: RocketComponent) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    pub fn children(&self) -> &[RocketComponent] {
        &self.children
    }

    /// Axial length occupied by the component.
    pub fn length(&self) -> f64 {
        match &self.kind {
            ComponentKind::NoseCone(n) => n.length,
            ComponentKind::BodyTube(b) => b.length,
            ComponentKind::FinSet(f) => f.root_chord,
            ComponentKind::Parachute(p) => p.diameter.min(0.1),
            ComponentKind::MassObject(m) => m.length,
        }
    }

    /// Outer radius of body components, zero for inner ones.
    pub fn outer_radius(&self) -> f64 {
        match &self.kind {
            ComponentKind::NoseCone(n) => n.aft_radius,
            ComponentKind::BodyTube(b) => b.outer_radius,
            _ => 0.0,
        }
    }

    pub fn motor(&self) -> Option<&MotorConfiguration> {
        match &self.kind {
            ComponentKind::BodyTube(b) => b.motor.as_ref(),
            _ => None,
        }
    }

    /// Attributes that can be read and written on this component.
    pub fn attributes(&self) -> Vec<ComponentAttribute> {
        use ComponentAttribute::*;
        match &self.kind {
            ComponentKind::NoseCone(_) => vec![Length, Radius, Thickness],
            ComponentKind::BodyTube(b) => {
                let mut attrs = vec![Length, Radius, Thickness];
                if b.motor.is_some() {
                    attrs.push(IgnitionDelay);
                }
                attrs
            }
            ComponentKind::FinSet(_) => {
                vec![RootChord, TipChord, Height, Sweep, Thickness, Position]
            }
            ComponentKind::Parachute(p) => {
                let mut attrs = vec![Diameter, DragCoefficient, Mass, Position, DeployDelay];
                if matches!(p.deploy_event, DeployEvent::Altitude(_)) {
                    attrs.push(DeployAltitude);
                }
                attrs
            }
            ComponentKind::MassObject(_) => vec![Mass, Position],
        }
    }

    pub fn attribute(&self, attribute: ComponentAttribute) -> Option<f64> {
        use ComponentAttribute::*;
        if attribute == Position {
            return (!self.kind.is_body()).then_some(self.position);
        }
        match (&self.kind, attribute) {
            (ComponentKind::NoseCone(n), Length) => Some(n.length),
            (ComponentKind::NoseCone(n), Radius) => Some(n.aft_radius),
            (ComponentKind::NoseCone(n), Thickness) => Some(n.thickness),
            (ComponentKind::BodyTube(b), Length) => Some(b.length),
            (ComponentKind::BodyTube(b), Radius) => Some(b.outer_radius),
            (ComponentKind::BodyTube(b), Thickness) => Some(b.thickness),
            (ComponentKind::BodyTube(b), IgnitionDelay) => b.motor.as_ref().map(|m| m.ignition_delay),
            (ComponentKind::FinSet(f), RootChord) => Some(f.root_chord),
            (ComponentKind::FinSet(f), TipChord) => Some(f.tip_chord),
            (ComponentKind::FinSet(f), Height) => Some(f.height),
            (ComponentKind::FinSet(f), Sweep) => Some(f.sweep),
            (ComponentKind::FinSet(f), Thickness) => Some(f.thickness),
            (ComponentKind::Parachute(p), Diameter) => Some(p.diameter),
            (ComponentKind::Parachute(p), DragCoefficient) => Some(p.drag_coefficient),
            (ComponentKind::Parachute(p), Mass) => Some(p.mass),
            (ComponentKind::Parachute(p), DeployDelay) => Some(p.deploy_delay),
            (ComponentKind::Parachute(p), DeployAltitude) => match p.deploy_event {
                DeployEvent::Altitude(h) => Some(h),
                _ => None,
            },
            (ComponentKind::MassObject(m), Mass) => Some(m.mass),
            _ => None,
        }
    }

    /// Write an attribute and report which parts of the design it touched.
    pub(crate) fn set_attribute(
        &mut self,
        attribute: ComponentAttribute,
        value: f64,
    ) -> Result<ChangeScope, DesignError> {
        use ComponentAttribute::*;

        if self.attribute(attribute).is_none() {
            return Err(DesignError::AttributeNotApplicable {
                component: self.name.clone(),
                attribute,
            });
        }
        validate_value(attribute, value)?;

        if attribute == Position {
            self.position = value;
            return Ok(match self.kind {
                ComponentKind::FinSet(_) => ChangeScope::GEOMETRY,
                _ => ChangeScope::MASS,
            });
        }

        let scope = match (&mut self.kind, attribute) {
            (ComponentKind::NoseCone(n), Length) => {
                n.length = value;
                ChangeScope::GEOMETRY
            }
            (ComponentKind::NoseCone(n), Radius) => {
                n.aft_radius = value;
                ChangeScope::GEOMETRY
            }
            (ComponentKind::NoseCone(n), Thickness) => {
                n.thickness = value;
                ChangeScope::MASS
            }
            (ComponentKind::BodyTube(b), Length) => {
                b.length = value;
                ChangeScope::GEOMETRY
            }
            (ComponentKind::BodyTube(b), Radius) => {
                b.outer_radius = value;
                ChangeScope::GEOMETRY
            }
            (ComponentKind::BodyTube(b), Thickness) => {
                b.thickness = value;
                ChangeScope::MASS
            }
            (ComponentKind::BodyTube(b), IgnitionDelay) => {
                if let Some(motor) = b.motor.as_mut() {
                    motor.ignition_delay = value;
                }
                ChangeScope::TREE
            }
            (ComponentKind::FinSet(f), RootChord) => {
                f.root_chord = value;
                ChangeScope::GEOMETRY
            }
            (ComponentKind::FinSet(f), TipChord) => {
                f.tip_chord = value;
                ChangeScope::GEOMETRY
            }
            (ComponentKind::FinSet(f), Height) => {
                f.height = value;
                ChangeScope::GEOMETRY
            }
            (ComponentKind::FinSet(f), Sweep) => {
                f.sweep = value;
                ChangeScope::GEOMETRY
            }
            (ComponentKind::FinSet(f), Thickness) => {
                f.thickness = value;
                ChangeScope::GEOMETRY
            }
            (ComponentKind::Parachute(p), Diameter) => {
                p.diameter = value;
                ChangeScope::AERODYNAMIC
            }
            (ComponentKind::Parachute(p), DragCoefficient) => {
                p.drag_coefficient = value;
                ChangeScope::AERODYNAMIC
            }
            (ComponentKind::Parachute(p), Mass) => {
                p.mass = value;
                ChangeScope::MASS
            }
            (ComponentKind::Parachute(p), DeployDelay) => {
                p.deploy_delay = value;
                ChangeScope::TREE
            }
            (ComponentKind::Parachute(p), DeployAltitude) => {
                p.deploy_event = DeployEvent::Altitude(value);
                ChangeScope::TREE
            }
            (ComponentKind::MassObject(m), Mass) => {
                m.mass = value;
                ChangeScope::MASS
            }
            _ => {
                return Err(DesignError::AttributeNotApplicable {
                    component: self.name.clone(),
                    attribute,
                })
            }
        };
        Ok(scope)
    }

    pub(crate) fn find(&self, id: ComponentId) -> Option<&RocketComponent> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: ComponentId) -> Option<&mut RocketComponent> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }
}

fn validate_value(attribute: ComponentAttribute, value: f64) -> Result<(), DesignError> {
    use ComponentAttribute::*;

    let invalid = |reason: &str| DesignError::InvalidValue {
        attribute,
        value,
        reason: reason.to_string(),
    };

    if !value.is_finite() {
        return Err(invalid("value must be finite"));
    }
    match attribute {
        Length | Radius | RootChord | Height | Diameter => {
            if value <= 0.0 {
                return Err(invalid("must be positive"));
            }
        }
        Sweep => {}
        _ => {
            if value < 0.0 {
                return Err(invalid("must not be negative"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fins() -> RocketComponent {
        RocketComponent::fin_set(
            "Fins",
            TrapezoidFinSet {
                fin_count: 3,
                root_chord: 0.05,
                tip_chord: 0.03,
                height: 0.04,
                sweep: 0.02,
                thickness: 0.002,
                density: 680.0,
            },
        )
        .at_position(0.35)
    }

    #[test]
    fn test_fin_geometry() {
        if let ComponentKind::FinSet(f) = fins().kind() {
            assert!((f.planform_area() - 0.0016).abs() < 1e-12);
            assert!((f.mid_chord_span() - (0.04f64.powi(2) + 0.01f64.powi(2)).sqrt()).abs() < 1e-12);
        } else {
            panic!("expected fin set");
        }
    }

    #[test]
    fn test_set_attribute_scope() {
        let mut fins = fins();
        let scope = fins.set_attribute(ComponentAttribute::Height, 0.05).unwrap();
        assert_eq!(scope, ChangeScope::GEOMETRY);
        assert_eq!(fins.attribute(ComponentAttribute::Height), Some(0.05));

        let scope = fins.set_attribute(ComponentAttribute::Position, 0.3).unwrap();
        assert_eq!(scope, ChangeScope::GEOMETRY);
    }

    #[test]
    fn test_invalid_attribute_rejected() {
        let mut fins = fins();
        assert!(matches!(
            fins.set_attribute(ComponentAttribute::Mass, 1.0),
            Err(DesignError::AttributeNotApplicable { .. })
        ));
        assert!(matches!(
            fins.set_attribute(ComponentAttribute::Height, -1.0),
            Err(DesignError::InvalidValue { .. })
        ));
        assert!(matches!(
            fins.set_attribute(ComponentAttribute::RootChord, f64::NAN),
            Err(DesignError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_body_components_have_no_position() {
        let nose = RocketComponent::nose_cone(
            "Nose",
            NoseCone {
                shape: NoseShape::Ogive,
                length: 0.1,
                aft_radius: 0.0125,
                thickness: 0.002,
                density: 1000.0,
            },
        );
        assert_eq!(nose.attribute(ComponentAttribute::Position), None);
        assert!(!nose.attributes().contains(&ComponentAttribute::Position));
    }
}
