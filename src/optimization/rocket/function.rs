use std::sync::Arc;

use tracing::{debug, trace};

use crate::components::{Rocket, ThrustCurveProvider};
use crate::optimization::general::{Function, OptimizationError, Point, Result};
use crate::optimization::rocket::{
    EvaluationObserver, EvaluationRecord, OptimizableParameter, OptimizationGoal,
    SimulationDomain, SimulationModifier,
};
use crate::resources::SimulationOptions;
use crate::simulation::{InterruptListener, ListenerChain, Simulator};
use crate::utils::Interrupt;

/// Value of points inside the cube but outside the domain, scaled by `1 + distance`.
pub const OUTSIDE_DOMAIN_PENALTY: f64 = 1e10;

/// Objective built from a prototype design, modifiers, a flight parameter and a goal.
///
/// Every evaluation works on its own copy of the prototype with fresh
/// evaluators and a fresh listener chain, so evaluations can run concurrently.
pub struct RocketOptimizationFunction {
    rocket: Rocket,
    options: SimulationOptions,
    provider: Arc<dyn ThrustCurveProvider>,
    modifiers: Vec<Box<dyn SimulationModifier>>,
    parameter: Box<dyn OptimizableParameter>,
    goal: Box<dyn OptimizationGoal>,
    domain: Box<dyn SimulationDomain>,
    listeners: ListenerChain,
    observer: Option<Box<dyn EvaluationObserver>>,
}

impl RocketOptimizationFunction {
    pub fn new(
        rocket: Rocket,
        options: SimulationOptions,
        provider: Arc<dyn ThrustCurveProvider>,
        modifiers: Vec<Box<dyn SimulationModifier>>,
        parameter: Box<dyn OptimizableParameter>,
        goal: Box<dyn OptimizationGoal>,
        domain: Box<dyn SimulationDomain>,
    ) -> Self {
        Self {
            rocket,
            options,
            provider,
            modifiers,
            parameter,
            goal,
            domain,
            listeners: ListenerChain::new(),
            observer: None,
        }
    }

    /// Prototype listeners cloned into every simulation.
    pub fn with_listeners(mut self, listeners: ListenerChain) -> Self {
        self.listeners = listeners;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn EvaluationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn dimensions(&self) -> usize {
        self.modifiers.len()
    }

    pub fn modifiers(&self) -> &[Box<dyn SimulationModifier>] {
        &self.modifiers
    }

    pub fn parameter(&self) -> &dyn OptimizableParameter {
        self.parameter.as_ref()
    }

    /// Normalized position of the prototype design, the natural start point.
    pub fn current_point(&self) -> Result<Point> {
        let coords = self
            .modifiers
            .iter()
            .map(|m| m.current_scaled(&self.rocket))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Point::new(coords))
    }

    /// The prototype design with `point` applied.
    pub fn design_at(&self, point: &Point) -> Result<Rocket> {
        if point.dim() != self.modifiers.len() {
            return Err(OptimizationError::DimensionMismatch {
                expected: self.modifiers.len(),
                actual: point.dim(),
            });
        }
        let mut rocket = self.rocket.clone();
        for (modifier, &scaled) in self.modifiers.iter().zip(point.coords()) {
            modifier.modify(&mut rocket, scaled)?;
        }
        Ok(rocket)
    }

    fn record(&self, point: &Point, rocket: &Rocket, parameter_value: f64, goal_value: f64, distance: f64) {
        let Some(observer) = &self.observer else {
            return;
        };
        let modifier_values = self
            .modifiers
            .iter()
            .map(|m| m.current_value(rocket).unwrap_or(f64::NAN))
            .collect();
        observer.evaluated(EvaluationRecord {
            point: point.coords().to_vec(),
            modifier_values,
            parameter_value,
            goal_value,
            domain_distance: distance,
        });
    }
}

impl Function for RocketOptimizationFunction {
    fn evaluate(&self, point: &Point, interrupt: &Interrupt) -> Result<f64> {
        if point.dim() != self.modifiers.len() {
            return Err(OptimizationError::DimensionMismatch {
                expected: self.modifiers.len(),
                actual: point.dim(),
            });
        }
        if !point.is_in_unit_cube() {
            trace!("Point {} outside the unit cube", point);
            return Ok(f64::INFINITY);
        }
        if interrupt.is_raised() {
            return Err(OptimizationError::Aborted);
        }

        let rocket = self.design_at(point)?;

        let distance = self
            .domain
            .distance(&rocket, &self.options, self.provider.as_ref());
        if distance.is_nan() {
            debug!("Point {} far outside the domain", point);
            self.record(point, &rocket, f64::NAN, f64::INFINITY, distance);
            return Ok(f64::INFINITY);
        }
        if distance > 0.0 {
            let penalty = OUTSIDE_DOMAIN_PENALTY * (1.0 + distance);
            debug!("Point {} outside the domain by {:.4}", point, distance);
            self.record(point, &rocket, f64::NAN, penalty, distance);
            return Ok(penalty);
        }

        let mut listeners = ListenerChain::new().with(InterruptListener::new(interrupt.clone()));
        listeners.extend_from(&self.listeners);
        listeners.extend_from(&self.parameter.listeners());

        let mut simulator = Simulator::new(rocket.clone(), self.options.clone(), Arc::clone(&self.provider));
        let data = match simulator.simulate(listeners) {
            Ok(data) => data,
            Err(e) if e.is_cancelled() => return Err(OptimizationError::Aborted),
            Err(e) => {
                debug!("Simulation of point {} failed: {}", point, e);
                return Err(OptimizationError::Simulation(e));
            }
        };

        let value = self.parameter.compute_value(&data);
        let goal_value = self.goal.minimization_parameter(value);
        debug!(
            "Point {}: {} = {:.4} {}, goal value {:.4}",
            point,
            self.parameter.name(),
            value,
            self.parameter.unit(),
            goal_value
        );
        self.record(point, &rocket, value, goal_value, distance);
        Ok(goal_value)
    }
}
