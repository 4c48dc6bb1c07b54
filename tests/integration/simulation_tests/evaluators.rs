use approx::assert_relative_eq;
use rocketopt::{
    components::{ComponentAttribute, ComponentId, Rocket},
    systems::{
        AerodynamicEvaluator, BarrowmanCalculator, CacheValidity, CachedEvaluator,
        CenterOfPressure, CounterDomain, FlightConditions, MassCalculator, MassEvaluator,
        ROLL_SAMPLES,
    },
};
use std::f64::consts::TAU;

use crate::common::{axisymmetric_rocket, test_motor, test_motor_database, test_rocket};

/// Barrowman calculator that counts how often its cache is voided.
#[derive(Debug, Default)]
struct CountingAerodynamics {
    inner: BarrowmanCalculator,
    validity: CacheValidity,
    voids: usize,
}

impl CachedEvaluator for CountingAerodynamics {
    fn domain(&self) -> CounterDomain {
        CounterDomain::Aerodynamic
    }

    fn validity(&self) -> &CacheValidity {
        &self.validity
    }

    fn validity_mut(&mut self) -> &mut CacheValidity {
        &mut self.validity
    }

    fn void_cache(&mut self) {
        self.voids += 1;
        self.inner.void_cache();
    }
}

impl AerodynamicEvaluator for CountingAerodynamics {
    fn cp(&mut self, rocket: &Rocket, conditions: &FlightConditions) -> CenterOfPressure {
        self.check_cache(rocket);
        self.inner.cp(rocket, conditions)
    }

    fn drag_coefficient(&mut self, rocket: &Rocket, conditions: &FlightConditions) -> f64 {
        self.check_cache(rocket);
        self.inner.drag_coefficient(rocket, conditions)
    }

    fn recovery_drag_area(&mut self, rocket: &Rocket, deployed: &[ComponentId]) -> f64 {
        self.check_cache(rocket);
        self.inner.recovery_drag_area(rocket, deployed)
    }
}

fn component_id(rocket: &Rocket, name: &str) -> ComponentId {
    rocket.find_by_name(name).expect("component exists").id()
}

#[test]
fn test_repeated_calls_bit_identical() {
    let (_, digest) = test_motor_database();
    let rocket = test_rocket(&digest);
    let mut conditions = FlightConditions::new(&rocket);
    conditions.velocity = 50.0;
    conditions.theta = 0.3;

    let mut aerodynamics = BarrowmanCalculator::new();
    let cp = aerodynamics.cp(&rocket, &conditions);
    let cd = aerodynamics.drag_coefficient(&rocket, &conditions);
    for _ in 0..5 {
        assert_eq!(aerodynamics.cp(&rocket, &conditions).x.to_bits(), cp.x.to_bits());
        assert_eq!(
            aerodynamics.drag_coefficient(&rocket, &conditions).to_bits(),
            cd.to_bits()
        );
    }

    let motor = test_motor();
    let mut mass = MassCalculator::new();
    let properties = mass.properties(&rocket, Some(&motor), 0.5);
    for _ in 0..5 {
        let again = mass.properties(&rocket, Some(&motor), 0.5);
        assert_eq!(again.mass.to_bits(), properties.mass.to_bits());
        assert_eq!(again.cg_x.to_bits(), properties.cg_x.to_bits());
    }
}

#[test]
fn test_mutation_forces_cache_miss() {
    let (_, digest) = test_motor_database();
    let mut rocket = test_rocket(&digest);
    let conditions = FlightConditions::new(&rocket);
    let mut aerodynamics = CountingAerodynamics::default();

    let before = aerodynamics.cp(&rocket, &conditions);
    assert_eq!(aerodynamics.voids, 1);
    aerodynamics.cp(&rocket, &conditions);
    assert_eq!(aerodynamics.voids, 1);

    let fins = component_id(&rocket, "Fins");
    rocket
        .set_attribute(fins, ComponentAttribute::Height, 0.06)
        .expect("fin height");
    let after = aerodynamics.cp(&rocket, &conditions);
    assert_eq!(aerodynamics.voids, 2);
    assert!(after.x > before.x, "bigger fins move the CP aft");

    // Mass-only changes leave the aerodynamic cache alone
    let chute = component_id(&rocket, "Chute");
    rocket
        .set_attribute(chute, ComponentAttribute::Mass, 0.02)
        .expect("parachute mass");
    aerodynamics.cp(&rocket, &conditions);
    assert_eq!(aerodynamics.voids, 2);

    // Structural changes invalidate every domain
    rocket
        .set_attribute(chute, ComponentAttribute::DeployDelay, 1.0)
        .expect("deploy delay");
    aerodynamics.cp(&rocket, &conditions);
    assert_eq!(aerodynamics.voids, 3);
}

#[test]
fn test_clone_shares_cache_validity() {
    let (_, digest) = test_motor_database();
    let rocket = test_rocket(&digest);
    let conditions = FlightConditions::new(&rocket);
    let mut aerodynamics = CountingAerodynamics::default();

    aerodynamics.cp(&rocket, &conditions);
    let copy = rocket.clone();
    aerodynamics.cp(&copy, &conditions);
    assert_eq!(aerodynamics.voids, 1);

    // Diverging copies never reuse each other's counters
    let mut a = rocket.clone();
    let mut b = rocket.clone();
    let fins = component_id(&rocket, "Fins");
    a.set_attribute(fins, ComponentAttribute::Height, 0.05).expect("a");
    b.set_attribute(fins, ComponentAttribute::Height, 0.07).expect("b");
    assert_ne!(a.counters(), b.counters());
}

#[test]
fn test_axisymmetric_cp_independent_of_roll() {
    let rocket = axisymmetric_rocket();
    let mut aerodynamics = BarrowmanCalculator::new();
    let mut conditions = FlightConditions::new(&rocket);

    conditions.theta = 0.0;
    let reference = aerodynamics.cp(&rocket, &conditions);
    // Conical nose: CP at two thirds of the nose length
    assert_relative_eq!(reference.x, 2.0 / 3.0 * 0.12, epsilon = 1e-6);

    for i in 0..ROLL_SAMPLES {
        conditions.theta = TAU * i as f64 / ROLL_SAMPLES as f64;
        let cp = aerodynamics.cp(&rocket, &conditions);
        assert_eq!(cp.x.to_bits(), reference.x.to_bits(), "theta = {}", conditions.theta);
        assert_eq!(cp.weight.to_bits(), reference.weight.to_bits());
    }

    let worst = aerodynamics.worst_cp(&rocket, &mut conditions);
    assert_relative_eq!(worst.x, reference.x, epsilon = 1e-12);
}

#[test]
fn test_worst_cp_is_most_forward() {
    let (_, digest) = test_motor_database();
    let rocket = test_rocket(&digest);
    let mut aerodynamics = BarrowmanCalculator::new();
    let mut conditions = FlightConditions::new(&rocket);

    let worst = aerodynamics.worst_cp(&rocket, &mut conditions);
    assert!(worst.is_defined());
    let at_worst = aerodynamics.cp(&rocket, &conditions);
    assert_eq!(at_worst.x.to_bits(), worst.x.to_bits());

    for i in 0..36 {
        conditions.theta = TAU * i as f64 / 36.0;
        assert!(aerodynamics.cp(&rocket, &conditions).x >= worst.x - 1e-12);
    }
}
