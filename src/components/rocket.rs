use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::components::component::{ComponentAttribute, ComponentId, ComponentKind, Parachute};
use crate::components::motor::MotorConfiguration;
use crate::components::{DesignError, RocketComponent};

// Process-wide sequence so counters stay unique across diverging clones.
static NEXT_MODIFICATION_ID: AtomicU64 = AtomicU64::new(1);

fn next_modification_id() -> u64 {
    NEXT_MODIFICATION_ID.fetch_add(1, Ordering::Relaxed)
}

/// Which counters a mutation bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeScope {
    pub tree: bool,
    pub aerodynamic: bool,
    pub mass: bool,
}

impl ChangeScope {
    pub const TREE: Self = Self {
        tree: true,
        aerodynamic: false,
        mass: false,
    };
    pub const AERODYNAMIC: Self = Self {
        tree: false,
        aerodynamic: true,
        mass: false,
    };
    pub const MASS: Self = Self {
        tree: false,
        aerodynamic: false,
        mass: true,
    };
    /// Shape changes move both the aerodynamics and the mass distribution.
    pub const GEOMETRY: Self = Self {
        tree: false,
        aerodynamic: true,
        mass: true,
    };
    pub const ALL: Self = Self {
        tree: true,
        aerodynamic: true,
        mass: true,
    };
}

/// Versioned triple describing the current state of a design.
///
/// Each counter only ever increases. Caches compare the full triple (or the
/// part of it their domain depends on) to decide whether they are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModificationCounters {
    pub tree: u64,
    pub aerodynamic: u64,
    pub mass: u64,
}

impl ModificationCounters {
    pub fn fresh() -> Self {
        let id = next_modification_id();
        Self {
            tree: id,
            aerodynamic: id,
            mass: id,
        }
    }

    pub fn bump(&mut self, scope: ChangeScope) {
        let id = next_modification_id();
        if scope.tree {
            self.tree = id;
        }
        if scope.aerodynamic {
            self.aerodynamic = id;
        }
        if scope.mass {
            self.mass = id;
        }
    }
}

impl Default for ModificationCounters {
    fn default() -> Self {
        Self::fresh()
    }
}

/// A component together with its resolved placement in the rocket.
#[derive(Debug, Clone, Copy)]
pub struct PlacedComponent<'a> {
    pub component: &'a RocketComponent,
    /// Axial position of the fore end, measured aft from the nose tip [m]
    pub x: f64,
    /// Tree depth, 0 for body components
    pub depth: usize,
    /// Outer radius of the enclosing body component (own radius for body components)
    pub body_radius: f64,
    /// Length of the parent, or of the component itself for body components
    pub parent_length: f64,
}

/// A single-stage rocket design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rocket {
    pub name: String,
    /// Body components from nose to tail
    components: Vec<RocketComponent>,
    #[serde(skip)]
    counters: ModificationCounters,
}

impl Rocket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            counters: ModificationCounters::fresh(),
        }
    }

    /// Builder-style variant of [`Rocket::add_component`] for body components.
    pub fn with_component(mut self, component: RocketComponent) -> Result<Self, DesignError> {
        self.add_component(None, component)?;
        Ok(self)
    }

    pub fn counters(&self) -> ModificationCounters {
        self.counters
    }

    pub fn body_components(&self) -> &[RocketComponent] {
        &self.components
    }

    /// Depth-first enumeration of every component with its resolved placement.
    pub fn components(&self) -> impl Iterator<Item = PlacedComponent<'_>> {
        let mut placed = Vec::new();
        let mut x = 0.0;
        for body in &self.components {
            let radius = body.outer_radius();
            placed.push(PlacedComponent {
                component: body,
                x,
                depth: 0,
                body_radius: radius,
                parent_length: body.length(),
            });
            collect_children(body, x, radius, 1, &mut placed);
            x += body.length();
        }
        placed.into_iter()
    }

    pub fn find(&self, id: ComponentId) -> Option<&RocketComponent> {
        self.components.iter().find_map(|c| c.find(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RocketComponent> {
        self.components()
            .map(|p| p.component)
            .find(|c| c.name() == name)
    }

    pub fn attribute(&self, id: ComponentId, attribute: ComponentAttribute) -> Result<f64, DesignError> {
        let component = self.find(id).ok_or(DesignError::UnknownComponent(id))?;
        component
            .attribute(attribute)
            .ok_or_else(|| DesignError::AttributeNotApplicable {
                component: component.name().to_string(),
                attribute,
            })
    }

    /// Write a component attribute, returning the bumped counters.
    pub fn set_attribute(
        &mut self,
        id: ComponentId,
        attribute: ComponentAttribute,
        value: f64,
    ) -> Result<ModificationCounters, DesignError> {
        let component = self
            .components
            .iter_mut()
            .find_map(|c| c.find_mut(id))
            .ok_or(DesignError::UnknownComponent(id))?;
        let scope = component.set_attribute(attribute, value)?;
        self.counters.bump(scope);
        Ok(self.counters)
    }

    /// Attach a component. `None` appends a body component to the tail of the
    /// rocket, otherwise the component goes inside the given body tube.
    pub fn add_component(
        &mut self,
        parent: Option<ComponentId>,
        component: RocketComponent,
    ) -> Result<ModificationCounters, DesignError> {
        match parent {
            None => {
                if !component.kind().is_body() {
                    return Err(DesignError::InvalidPlacement(format!(
                        "'{}' must be placed inside a body tube",
                        component.name()
                    )));
                }
                self.components.push(component);
            }
            Some(parent_id) => {
                if component.kind().is_body() {
                    return Err(DesignError::InvalidPlacement(format!(
                        "body component '{}' cannot be nested",
                        component.name()
                    )));
                }
                let parent = self
                    .components
                    .iter_mut()
                    .find_map(|c| c.find_mut(parent_id))
                    .ok_or(DesignError::UnknownComponent(parent_id))?;
                if !matches!(parent.kind, ComponentKind::BodyTube(_)) {
                    return Err(DesignError::InvalidPlacement(format!(
                        "'{}' cannot hold child components",
                        parent.name()
                    )));
                }
                parent.children.push(component);
            }
        }
        self.counters.bump(ChangeScope::ALL);
        Ok(self.counters)
    }

    pub fn remove_component(&mut self, id: ComponentId) -> Result<RocketComponent, DesignError> {
        let removed = remove_from(&mut self.components, id).ok_or(DesignError::UnknownComponent(id))?;
        self.counters.bump(ChangeScope::ALL);
        Ok(removed)
    }

    /// Put a motor into a body tube (or clear it with `None`).
    pub fn set_motor(
        &mut self,
        mount: ComponentId,
        motor: Option<MotorConfiguration>,
    ) -> Result<ModificationCounters, DesignError> {
        let component = self
            .components
            .iter_mut()
            .find_map(|c| c.find_mut(mount))
            .ok_or(DesignError::UnknownComponent(mount))?;
        match &mut component.kind {
            ComponentKind::BodyTube(tube) => tube.motor = motor,
            _ => {
                return Err(DesignError::InvalidPlacement(format!(
                    "'{}' is not a motor mount",
                    component.name
                )))
            }
        }
        self.counters.bump(ChangeScope::ALL);
        Ok(self.counters)
    }

    /// The motor mount, its motor configuration and the mount's aft end position.
    pub fn motor_mount(&self) -> Option<(&RocketComponent, &MotorConfiguration, f64)> {
        self.components().find_map(|p| {
            p.component
                .motor()
                .map(|m| (p.component, m, p.x + p.component.length()))
        })
    }

    pub fn recovery_devices(&self) -> impl Iterator<Item = (ComponentId, &Parachute)> {
        self.components().filter_map(|p| match p.component.kind() {
            ComponentKind::Parachute(chute) => Some((p.component.id(), chute)),
            _ => None,
        })
    }

    /// Total length of the body [m]
    pub fn length(&self) -> f64 {
        self.components.iter().map(|c| c.length()).sum()
    }

    /// Largest body radius, used as reference length/2 [m]
    pub fn reference_radius(&self) -> f64 {
        self.components
            .iter()
            .map(|c| c.outer_radius())
            .fold(0.0, f64::max)
    }

    pub fn reference_area(&self) -> f64 {
        let r = self.reference_radius();
        std::f64::consts::PI * r * r
    }
}

fn collect_children<'a>(
    parent: &'a RocketComponent,
    parent_x: f64,
    body_radius: f64,
    depth: usize,
    out: &mut Vec<PlacedComponent<'a>>,
) {
    for child in parent.children() {
        let x = parent_x + child.position();
        out.push(PlacedComponent {
            component: child,
            x,
            depth,
            body_radius,
            parent_length: parent.length(),
        });
        collect_children(child, x, body_radius, depth + 1, out);
    }
}

fn remove_from(list: &mut Vec<RocketComponent>, id: ComponentId) -> Option<RocketComponent> {
    if let Some(index) = list.iter().position(|c| c.id() == id) {
        return Some(list.remove(index));
    }
    list.iter_mut().find_map(|c| remove_from(&mut c.children, id))
}
