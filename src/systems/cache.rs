use crate::components::{ModificationCounters, Rocket};

/// Which counters, besides the tree counter, an evaluator's cache depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterDomain {
    Aerodynamic,
    Mass,
}

impl CounterDomain {
    fn key(&self, counters: &ModificationCounters) -> (u64, u64) {
        match self {
            Self::Aerodynamic => (counters.tree, counters.aerodynamic),
            Self::Mass => (counters.tree, counters.mass),
        }
    }
}

/// The counters a cache was last filled against.
///
/// The full triple is stored; only the domain's pair is compared.
#[derive(Debug, Clone, Default)]
pub struct CacheValidity {
    observed: Option<ModificationCounters>,
}

impl CacheValidity {
    pub fn is_valid_for(&self, counters: &ModificationCounters, domain: CounterDomain) -> bool {
        self.observed
            .map_or(false, |observed| domain.key(&observed) == domain.key(counters))
    }

    pub fn observe(&mut self, counters: ModificationCounters) {
        self.observed = Some(counters);
    }

    pub fn observed(&self) -> Option<ModificationCounters> {
        self.observed
    }

    pub fn invalidate(&mut self) {
        self.observed = None;
    }
}

/// Memoizing evaluator keyed on a design's modification counters.
///
/// Implementors call [`CachedEvaluator::check_cache`] at the top of every
/// method that reads memoized values. One instance serves one simulation run;
/// instances are not meant to be shared between concurrent runs.
pub trait CachedEvaluator {
    fn domain(&self) -> CounterDomain;

    fn validity(&self) -> &CacheValidity;

    fn validity_mut(&mut self) -> &mut CacheValidity;

    /// Discard memoized values. Called whenever the tracked counters change.
    fn void_cache(&mut self);

    /// Compare the design's counters to the last observed ones and void the
    /// cache on mismatch. Returns `true` when the cache was voided.
    fn check_cache(&mut self, rocket: &Rocket) -> bool {
        let counters = rocket.counters();
        let domain = self.domain();
        if self.validity().is_valid_for(&counters, domain) {
            return false;
        }
        self.void_cache();
        self.validity_mut().observe(counters);
        true
    }
}
