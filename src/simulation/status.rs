use crate::components::{ComponentId, Rocket, SpatialState};
use crate::simulation::{EventQueue, FlightDataBranch, FlightEvent, Warning, WarningSet};

/// Mutable state of one simulation run.
///
/// Every setter bumps the modification id, which the listener chain compares
/// around each hook to detect listeners that changed the run.
#[derive(Debug, Clone)]
pub struct SimulationStatus {
    rocket: Rocket,
    time: f64,
    spatial: SpatialState,
    step_count: u64,
    mod_id: u64,

    liftoff: bool,
    launch_rod_cleared: bool,
    apogee_reached: bool,
    landed: bool,
    ignition_time: Option<f64>,
    burnout_time: Option<f64>,

    deployed_devices: Vec<ComponentId>,
    /// Devices whose deployment is already queued
    pending_devices: Vec<ComponentId>,

    warnings: WarningSet,
    event_queue: EventQueue,
    flight_data: FlightDataBranch,

    max_altitude: f64,
    max_altitude_time: f64,
    ended: bool,
}

impl SimulationStatus {
    pub fn new(rocket: Rocket, spatial: SpatialState) -> Self {
        let branch = FlightDataBranch::new(rocket.name.clone());
        Self {
            rocket,
            time: 0.0,
            spatial,
            step_count: 0,
            mod_id: 0,
            liftoff: false,
            launch_rod_cleared: false,
            apogee_reached: false,
            landed: false,
            ignition_time: None,
            burnout_time: None,
            deployed_devices: Vec::new(),
            pending_devices: Vec::new(),
            warnings: WarningSet::new(),
            event_queue: EventQueue::new(),
            flight_data: branch,
            max_altitude: 0.0,
            max_altitude_time: 0.0,
            ended: false,
        }
    }

    fn modified(&mut self) {
        self.mod_id += 1;
    }

    pub fn mod_id(&self) -> u64 {
        self.mod_id
    }

    // --- Design ---

    pub fn rocket(&self) -> &Rocket {
        &self.rocket
    }

    /// Mutable access to this run's private copy of the design.
    pub fn rocket_mut(&mut self) -> &mut Rocket {
        self.modified();
        &mut self.rocket
    }

    // --- Kinematics ---

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
        self.modified();
    }

    pub fn spatial(&self) -> &SpatialState {
        &self.spatial
    }

    pub fn set_spatial(&mut self, spatial: SpatialState) {
        self.spatial = spatial;
        self.modified();
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub(crate) fn increment_step(&mut self) {
        self.step_count += 1;
    }

    // --- Flight phase ---

    pub fn is_liftoff(&self) -> bool {
        self.liftoff
    }

    pub fn set_liftoff(&mut self, liftoff: bool) {
        self.liftoff = liftoff;
        self.modified();
    }

    pub fn is_launch_rod_cleared(&self) -> bool {
        self.launch_rod_cleared
    }

    pub fn set_launch_rod_cleared(&mut self, cleared: bool) {
        self.launch_rod_cleared = cleared;
        self.modified();
    }

    pub fn is_apogee_reached(&self) -> bool {
        self.apogee_reached
    }

    pub fn set_apogee_reached(&mut self, reached: bool) {
        self.apogee_reached = reached;
        self.modified();
    }

    pub fn is_landed(&self) -> bool {
        self.landed
    }

    pub fn set_landed(&mut self, landed: bool) {
        self.landed = landed;
        self.modified();
    }

    pub fn ignition_time(&self) -> Option<f64> {
        self.ignition_time
    }

    pub fn set_ignition_time(&mut self, time: Option<f64>) {
        self.ignition_time = time;
        self.modified();
    }

    pub fn burnout_time(&self) -> Option<f64> {
        self.burnout_time
    }

    pub fn set_burnout_time(&mut self, time: Option<f64>) {
        self.burnout_time = time;
        self.modified();
    }

    pub fn is_motor_ignited(&self) -> bool {
        self.ignition_time.is_some()
    }

    /// Ignited and not yet burnt out.
    pub fn is_motor_burning(&self) -> bool {
        self.ignition_time.is_some() && self.burnout_time.is_none()
    }

    // --- Recovery ---

    pub fn deployed_devices(&self) -> &[ComponentId] {
        &self.deployed_devices
    }

    pub fn add_deployed_device(&mut self, id: ComponentId) {
        if !self.deployed_devices.contains(&id) {
            self.deployed_devices.push(id);
        }
        self.pending_devices.retain(|d| *d != id);
        self.modified();
    }

    pub fn is_deployment_scheduled(&self, id: ComponentId) -> bool {
        self.pending_devices.contains(&id) || self.deployed_devices.contains(&id)
    }

    pub(crate) fn mark_deployment_scheduled(&mut self, id: ComponentId) {
        if !self.pending_devices.contains(&id) {
            self.pending_devices.push(id);
        }
    }

    // --- Events ---

    pub fn event_queue(&self) -> &EventQueue {
        &self.event_queue
    }

    /// Queue an event for dispatch.
    pub fn add_event(&mut self, event: FlightEvent) {
        self.event_queue.push(event);
        self.modified();
    }

    pub(crate) fn event_queue_mut(&mut self) -> &mut EventQueue {
        &mut self.event_queue
    }

    pub fn flight_data(&self) -> &FlightDataBranch {
        &self.flight_data
    }

    pub(crate) fn flight_data_mut(&mut self) -> &mut FlightDataBranch {
        &mut self.flight_data
    }

    // --- Warnings ---

    pub fn warnings(&self) -> &WarningSet {
        &self.warnings
    }

    /// Warnings never count as modifications.
    pub fn add_warning(&mut self, warning: Warning) {
        self.warnings.add(warning);
    }

    // --- Extremes ---

    pub fn max_altitude(&self) -> f64 {
        self.max_altitude
    }

    pub fn max_altitude_time(&self) -> f64 {
        self.max_altitude_time
    }

    pub(crate) fn update_max_altitude(&mut self) {
        if self.spatial.height() > self.max_altitude {
            self.max_altitude = self.spatial.height();
            self.max_altitude_time = self.time;
        }
    }

    // --- Termination ---

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub(crate) fn set_ended(&mut self) {
        self.ended = true;
    }

    pub(crate) fn into_parts(self) -> (FlightDataBranch, WarningSet) {
        (self.flight_data, self.warnings)
    }
}
