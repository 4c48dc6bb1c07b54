use std::sync::Arc;

use nalgebra::Vector3;
use tracing::{debug, error, info, trace, warn};

use crate::components::{
    ComponentId, DeployEvent, Rocket, SpatialState, ThrustCurveMotor, ThrustCurveProvider,
};
use crate::resources::{EnvironmentModel, SimulationOptions};
use crate::simulation::forces::FlightModel;
use crate::simulation::listener::{HookOutcome, ListenerChain};
use crate::simulation::{
    FlightData, FlightDataType, FlightEvent, FlightEventType, ListenerError, SimulationError,
    SimulationStatus, Warning,
};
use crate::systems::{
    limited_time_step, rk4_step, AerodynamicEvaluator, BarrowmanCalculator, MassCalculator,
    MassEvaluator,
};
use crate::utils::EPSILON;

/// Bounds beyond which the state is treated as diverged.
const MAX_SPEED: f64 = 5000.0;
const MAX_ALTITUDE: f64 = 100_000.0;

const MIN_LAUNCH_ROD_VELOCITY: f64 = 10.0;
const MAX_DEPLOYMENT_SPEED: f64 = 20.0;
const MIN_DEPLOYMENT_DELAY: f64 = 0.001;
const MAX_ANGLE_OF_ATTACK: f64 = 17.5;
/// Consecutive skipped steps without time advancing before the run is failed.
const MAX_STALLED_STEPS: u32 = 10_000;

/// Why a run stopped early.
#[derive(Debug)]
enum Failure {
    Launch(String),
    Calculation(String),
    Cancelled,
}

impl From<ListenerError> for Failure {
    fn from(err: ListenerError) -> Self {
        match err {
            ListenerError::Cancelled => Failure::Cancelled,
            ListenerError::Failed(message) => Failure::Calculation(message),
        }
    }
}

type StepResult = std::result::Result<(), Failure>;

/// Event-driven single-stage flight simulator.
///
/// Owns its evaluators; a simulator is meant to serve one run at a time.
pub struct Simulator {
    rocket: Rocket,
    options: SimulationOptions,
    provider: Arc<dyn ThrustCurveProvider>,
    aerodynamics: Box<dyn AerodynamicEvaluator>,
    mass: Box<dyn MassEvaluator>,
}

impl Simulator {
    pub fn new(rocket: Rocket, options: SimulationOptions, provider: Arc<dyn ThrustCurveProvider>) -> Self {
        Self {
            rocket,
            options,
            provider,
            aerodynamics: Box::new(BarrowmanCalculator::new()),
            mass: Box::new(MassCalculator::new()),
        }
    }

    /// Replace the default evaluators.
    pub fn with_evaluators(
        mut self,
        aerodynamics: Box<dyn AerodynamicEvaluator>,
        mass: Box<dyn MassEvaluator>,
    ) -> Self {
        self.aerodynamics = aerodynamics;
        self.mass = mass;
        self
    }

    pub fn rocket(&self) -> &Rocket {
        &self.rocket
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Run one flight. The simulator works on a private copy of the rocket, so
    /// listeners may modify the design without touching the caller's.
    ///
    /// Listeners are notified of the end of the run exactly once, whether it
    /// succeeded or not. Launch errors detected before the run starts are
    /// returned without involving the listeners.
    pub fn simulate(&mut self, mut listeners: ListenerChain) -> Result<FlightData, SimulationError> {
        let provider = Arc::clone(&self.provider);
        let (ignition_delay, motor) = self.launch_motor(provider.as_ref())?;

        info!(
            "Simulating '{}' with motor {} ({:.1} N·s)",
            self.rocket.name,
            motor.designation,
            motor.total_impulse()
        );

        let rod = self.options.rod_direction();
        let environment = EnvironmentModel::new(&self.options.environment);
        let mut status = SimulationStatus::new(self.rocket.clone(), SpatialState::on_rod(&rod));
        status.add_event(FlightEvent::new(FlightEventType::Ignition, ignition_delay));

        match self.run(&mut status, &mut listeners, &environment, motor) {
            Ok(()) => {
                listeners.fire_end(&mut status, None);
                for warning in status.warnings().iter() {
                    warn!("{}", warning);
                }
                let (branch, warnings) = status.into_parts();
                let data = FlightData::new(branch, warnings.into_vec());
                info!(
                    "Simulation finished: apogee {:.1} m at {:.2} s, flight time {:.2} s",
                    data.max_altitude(),
                    data.time_to_apogee(),
                    data.flight_time()
                );
                Ok(data)
            }
            Err(failure) => {
                let error = into_error(failure, &status);
                match &error {
                    SimulationError::Cancelled { .. } => {
                        debug!("Simulation cancelled at {:.3} s", status.time())
                    }
                    other => warn!("{}", other),
                }
                listeners.fire_end(&mut status, Some(&error));
                Err(error)
            }
        }
    }

    fn launch_motor<'p>(
        &self,
        provider: &'p dyn ThrustCurveProvider,
    ) -> Result<(f64, &'p ThrustCurveMotor), SimulationError> {
        let (_, config, _) = self
            .rocket
            .motor_mount()
            .ok_or_else(|| SimulationError::Launch("No motors defined in the simulation".into()))?;
        let motor = provider.motor(&config.digest).ok_or_else(|| {
            SimulationError::Launch(format!("Unknown motor digest {}", config.digest))
        })?;
        Ok((config.ignition_delay, motor))
    }

    fn run(
        &mut self,
        status: &mut SimulationStatus,
        listeners: &mut ListenerChain,
        environment: &EnvironmentModel,
        motor: &ThrustCurveMotor,
    ) -> StepResult {
        listeners.fire_start(status)?;
        self.record(status, environment, motor);
        self.handle_events(status, listeners, motor)?;

        let mut stalled = 0;
        while !status.is_ended() {
            if status.is_landed() && status.event_queue().is_empty() {
                status.add_event(FlightEvent::new(FlightEventType::SimulationEnd, status.time()));
                self.handle_events(status, listeners, motor)?;
                if !status.is_ended() {
                    end_now(status);
                }
                continue;
            }

            if !status.is_motor_ignited() {
                // Nothing moves before ignition
                match status.event_queue().next_time() {
                    Some(next) => {
                        if next > status.time() {
                            status.set_time(next);
                        }
                        self.handle_events(status, listeners, motor)?;
                        continue;
                    }
                    None => return Err(Failure::Launch("Motor never ignited".into())),
                }
            }

            if status.time() >= self.options.max_simulation_time {
                error!(
                    "Simulation reached the time limit of {} s",
                    self.options.max_simulation_time
                );
                status.add_event(FlightEvent::new(FlightEventType::SimulationEnd, status.time()));
                self.handle_events(status, listeners, motor)?;
                if !status.is_ended() {
                    end_now(status);
                }
                continue;
            }

            status.increment_step();
            let previous = status.spatial().clone();
            let previous_time = status.time();
            match listeners.fire_pre_step(status)? {
                HookOutcome::Abort => {
                    end_now(status);
                    break;
                }
                HookOutcome::Skip => {
                    // The listener may have moved the state itself
                    status.update_max_altitude();
                    if status.time() > previous_time {
                        stalled = 0;
                    } else {
                        stalled += 1;
                        if stalled > MAX_STALLED_STEPS {
                            return Err(Failure::Calculation(format!(
                                "Simulation time stopped advancing at {:.3} s",
                                status.time()
                            )));
                        }
                    }
                }
                HookOutcome::Continue => {
                    stalled = 0;
                    self.step(status, environment, motor);
                    self.record(status, environment, motor);
                }
            }

            if listeners.fire_post_step(status)? == HookOutcome::Abort {
                end_now(status);
                break;
            }

            check_bounds(status)?;
            self.detect_events(status, &previous);
            self.handle_events(status, listeners, motor)?;
        }

        Ok(())
    }

    /// Advance the state by one event-limited RK4 step.
    fn step(&mut self, status: &mut SimulationStatus, environment: &EnvironmentModel, motor: &ThrustCurveMotor) {
        let t = status.time();
        let base = if status.deployed_devices().is_empty() {
            self.options.time_step
        } else {
            self.options.descent_time_step
        };
        let dt = limited_time_step(
            t,
            base,
            self.options.min_time_step,
            status.event_queue().next_time(),
        );

        let rod = (!status.is_launch_rod_cleared()).then(|| self.options.rod_direction());
        let start_axis = status.spatial().axis();
        let mut spatial = status.spatial().clone();

        {
            let mut model = FlightModel {
                rocket: status.rocket(),
                motor,
                environment,
                aerodynamics: &mut *self.aerodynamics,
                mass: &mut *self.mass,
                launch_altitude: self.options.launch_altitude,
                ignition_time: status.ignition_time(),
                axis: start_axis,
                rod,
                liftoff: status.is_liftoff(),
                deployed: status.deployed_devices(),
            };
            rk4_step(&mut spatial, t, dt, |time, position, velocity| {
                model.acceleration(time, position, velocity)
            });
        }

        if rod.is_none() {
            let relative_velocity = spatial.velocity - environment.get_wind(&spatial.position, t + dt);
            let aoa = angle_between(&start_axis, &relative_velocity).to_degrees();
            if aoa > MAX_ANGLE_OF_ATTACK && !status.is_apogee_reached() {
                status.add_warning(Warning::LargeAngleOfAttack { degrees: aoa });
            }
            spatial.align_with(&relative_velocity);
        }
        spatial.angular_velocity = Vector3::zeros();

        status.set_spatial(spatial);
        status.set_time(t + dt);
        status.update_max_altitude();
    }

    /// Append one sample of every channel at the current state.
    fn record(&mut self, status: &mut SimulationStatus, environment: &EnvironmentModel, motor: &ThrustCurveMotor) {
        let t = status.time();
        let spatial = status.spatial().clone();
        let rod = (!status.is_launch_rod_cleared()).then(|| self.options.rod_direction());

        let evaluation = {
            let mut model = FlightModel {
                rocket: status.rocket(),
                motor,
                environment,
                aerodynamics: &mut *self.aerodynamics,
                mass: &mut *self.mass,
                launch_altitude: self.options.launch_altitude,
                ignition_time: status.ignition_time(),
                axis: spatial.axis(),
                rod,
                liftoff: status.is_liftoff(),
                deployed: status.deployed_devices(),
            };
            model.evaluate(t, &spatial.position, &spatial.velocity)
        };

        let mut values = vec![
            (FlightDataType::Time, t),
            (FlightDataType::Altitude, spatial.height()),
            (FlightDataType::PositionX, spatial.position.x),
            (FlightDataType::PositionY, spatial.position.y),
            (FlightDataType::LateralDistance, spatial.lateral_distance()),
            (FlightDataType::VerticalVelocity, spatial.vertical_velocity()),
            (FlightDataType::TotalVelocity, spatial.speed()),
            (FlightDataType::TotalAcceleration, evaluation.acceleration.norm()),
            (FlightDataType::Thrust, evaluation.thrust),
            (FlightDataType::Mass, evaluation.mass.mass),
        ];

        if self.options.calculate_extras {
            let cp = self.aerodynamics.cp(status.rocket(), &evaluation.conditions);
            let cg = evaluation.mass.cg_x;
            let reference_length = evaluation.conditions.reference_length;
            let stability = if cp.is_defined() && reference_length > EPSILON {
                (cp.x - cg) / reference_length
            } else {
                f64::NAN
            };
            values.extend([
                (FlightDataType::CgLocation, cg),
                (FlightDataType::CpLocation, cp.x),
                (FlightDataType::StabilityMargin, stability),
                (FlightDataType::MachNumber, evaluation.conditions.mach),
                (FlightDataType::DragCoefficient, evaluation.drag_coefficient),
            ]);
        }

        status.flight_data_mut().add_point(&values);
    }

    /// Queue the events caused by the last step.
    fn detect_events(&self, status: &mut SimulationStatus, previous: &SpatialState) {
        let t = status.time();
        let rod = self.options.rod_direction();

        if !status.is_liftoff() && status.spatial().velocity.dot(&rod) > EPSILON {
            debug!("Liftoff at {:.3} s", t);
            status.set_liftoff(true);
        }

        if status.is_liftoff()
            && !status.is_launch_rod_cleared()
            && status.spatial().position.norm() > self.options.launch_rod_length
        {
            status.set_launch_rod_cleared(true);
            status.add_event(FlightEvent::new(FlightEventType::LaunchrodCleared, t));
        }

        if status.is_liftoff()
            && !status.is_apogee_reached()
            && previous.vertical_velocity() > 0.0
            && status.spatial().vertical_velocity() <= 0.0
        {
            status.set_apogee_reached(true);
            let apogee_time = status.max_altitude_time();
            status.add_event(FlightEvent::new(FlightEventType::Apogee, apogee_time));
        }

        if status.is_apogee_reached() {
            let height = status.spatial().height();
            let due: Vec<(ComponentId, f64)> = status
                .rocket()
                .recovery_devices()
                .filter_map(|(id, chute)| match chute.deploy_event {
                    DeployEvent::Altitude(altitude) if height <= altitude => Some((id, chute.deploy_delay)),
                    _ => None,
                })
                .filter(|(id, _)| !status.is_deployment_scheduled(*id))
                .collect();
            for (id, delay) in due {
                queue_deployment(status, id, t, delay);
            }
        }

        if status.is_liftoff()
            && !status.is_landed()
            && status.spatial().height() < 0.0
            && !status.event_queue().contains(FlightEventType::GroundHit)
        {
            status.add_event(FlightEvent::new(FlightEventType::GroundHit, t));
        }
    }

    /// Dispatch every due event to the listeners, then apply default handling.
    fn handle_events(
        &mut self,
        status: &mut SimulationStatus,
        listeners: &mut ListenerChain,
        motor: &ThrustCurveMotor,
    ) -> StepResult {
        while !status.is_ended() {
            let now = status.time();
            let Some(event) = status.event_queue_mut().pop_due(now) else {
                break;
            };

            if status.is_landed() && event.event_type != FlightEventType::SimulationEnd {
                status.add_warning(Warning::EventAfterLanding {
                    event: event.event_type,
                });
            }

            trace!("Dispatching {} at {:.4} s", event.event_type, event.time);
            match listeners.fire_flight_event(status, &event)? {
                HookOutcome::Skip => continue,
                HookOutcome::Abort => {
                    end_now(status);
                    break;
                }
                HookOutcome::Continue => {}
            }

            status.flight_data_mut().add_event(event.clone());
            self.default_handling(status, &event, motor)?;
        }
        Ok(())
    }

    fn default_handling(
        &mut self,
        status: &mut SimulationStatus,
        event: &FlightEvent,
        motor: &ThrustCurveMotor,
    ) -> StepResult {
        match event.event_type {
            FlightEventType::Ignition => {
                debug!("Motor {} ignited at {:.3} s", motor.designation, event.time);
                status.set_ignition_time(Some(event.time));
                status.add_event(FlightEvent::new(
                    FlightEventType::Burnout,
                    event.time + motor.burn_time(),
                ));
            }
            FlightEventType::LaunchrodCleared => {
                let velocity = status.spatial().speed();
                if velocity < MIN_LAUNCH_ROD_VELOCITY {
                    status.add_warning(Warning::LowLaunchRodVelocity { velocity });
                }
            }
            FlightEventType::Burnout => {
                if !status.is_liftoff() {
                    return Err(Failure::Launch("Motor burnt out without liftoff".into()));
                }
                status.set_burnout_time(Some(event.time));
            }
            FlightEventType::Apogee => {
                let devices: Vec<(ComponentId, f64)> = status
                    .rocket()
                    .recovery_devices()
                    .filter(|(_, chute)| chute.deploy_event == DeployEvent::Apogee)
                    .map(|(id, chute)| (id, chute.deploy_delay))
                    .collect();
                for (id, delay) in devices {
                    if !status.is_deployment_scheduled(id) {
                        queue_deployment(status, id, event.time, delay);
                    }
                }
            }
            FlightEventType::RecoveryDeviceDeployment => {
                if let Some(id) = event.source {
                    if status.is_motor_burning() {
                        status.add_warning(Warning::RecoveryDeploymentWhileBurning);
                    }
                    if !status.is_launch_rod_cleared() {
                        status.add_warning(Warning::RecoveryLaunchRod);
                    }
                    let speed = status.spatial().speed();
                    if speed > MAX_DEPLOYMENT_SPEED {
                        status.add_warning(Warning::RecoveryHighSpeed { speed });
                    }
                    debug!("Recovery device deployed at {:.3} s, {:.1} m/s", event.time, speed);
                    status.add_deployed_device(id);
                }
            }
            FlightEventType::GroundHit => {
                debug!("Ground hit at {:.3} s", event.time);
                status.set_landed(true);
            }
            FlightEventType::SimulationEnd => {
                status.set_ended();
            }
            FlightEventType::Exception => {}
        }
        Ok(())
    }
}

fn queue_deployment(status: &mut SimulationStatus, id: ComponentId, time: f64, delay: f64) {
    status.mark_deployment_scheduled(id);
    status.add_event(FlightEvent::with_source(
        FlightEventType::RecoveryDeviceDeployment,
        time + delay.max(MIN_DEPLOYMENT_DELAY),
        id,
    ));
}

/// End the run at the current time without consulting the listeners again.
fn end_now(status: &mut SimulationStatus) {
    let event = FlightEvent::new(FlightEventType::SimulationEnd, status.time());
    status.flight_data_mut().add_event(event);
    status.set_ended();
}

fn check_bounds(status: &SimulationStatus) -> StepResult {
    let spatial = status.spatial();
    if !spatial.is_finite() {
        return Err(Failure::Calculation(format!(
            "Non-finite state at {:.3} s",
            status.time()
        )));
    }
    if spatial.speed() > MAX_SPEED {
        return Err(Failure::Calculation(format!(
            "Velocity {:.0} m/s exceeds {} m/s",
            spatial.speed(),
            MAX_SPEED
        )));
    }
    if spatial.height() > MAX_ALTITUDE {
        return Err(Failure::Calculation(format!(
            "Altitude {:.0} m exceeds {} m",
            spatial.height(),
            MAX_ALTITUDE
        )));
    }
    Ok(())
}

fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let norms = a.norm() * b.norm();
    if norms < EPSILON {
        return 0.0;
    }
    (a.dot(b) / norms).clamp(-1.0, 1.0).acos()
}

fn into_error(failure: Failure, status: &SimulationStatus) -> SimulationError {
    let partial = || {
        let mut branch = status.flight_data().clone();
        branch.add_event(FlightEvent::new(FlightEventType::Exception, status.time()));
        Box::new(FlightData::new(branch, status.warnings().clone().into_vec()))
    };
    match failure {
        Failure::Launch(message) => SimulationError::Launch(message),
        Failure::Calculation(message) => SimulationError::Calculation {
            message,
            data: partial(),
        },
        Failure::Cancelled => SimulationError::Cancelled { data: partial() },
    }
}
