//! Aggregate event rates.

use super::state::EpidemicState;

/// Running totals of the infection and recovery rates.
///
/// Tracks the integer pressure (sum of infected-neighbor counts over the
/// at-risk set) and the infected count, and derives the float rates from
/// them on demand. Updates are exact, so the ledger never drifts from a
/// full recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLedger {
    transmission_rate: f64,
    recovery_rate: f64,
    pressure: u64,
    infected: usize,
}

impl RateLedger {
    /// Computes the ledger from scratch for `state`.
    pub fn from_state(state: &EpidemicState, recovery_rate: f64) -> Self {
        Self {
            transmission_rate: state.transmission_rate(),
            recovery_rate,
            pressure: state.pressure(),
            infected: state.infected_count(),
        }
    }

    /// Returns τ × pressure.
    pub fn total_infection_rate(&self) -> f64 {
        self.transmission_rate * self.pressure as f64
    }

    /// Returns γ × infected count.
    pub fn total_recovery_rate(&self) -> f64 {
        self.recovery_rate * self.infected as f64
    }

    /// Returns the sum of both totals.
    pub fn total_rate(&self) -> f64 {
        self.total_infection_rate() + self.total_recovery_rate()
    }

    /// Returns the tracked pressure.
    pub fn pressure(&self) -> u64 {
        self.pressure
    }

    /// Returns the tracked infected count.
    pub fn infected(&self) -> usize {
        self.infected
    }

    /// Returns the recovery rate (γ).
    pub fn recovery_rate(&self) -> f64 {
        self.recovery_rate
    }

    /// Returns true if the integer counters match a full recount of `state`.
    pub fn matches(&self, state: &EpidemicState) -> bool {
        self.pressure == state.pressure() && self.infected == state.infected_count()
    }

    /// Sums per-node cached rates of `state` the slow way.
    ///
    /// Returns `(total_infection_rate, total_recovery_rate)`.
    pub fn recompute(state: &EpidemicState, recovery_rate: f64) -> (f64, f64) {
        let infection = state
            .at_risk()
            .iter()
            .filter_map(|entry| state.infection_rate_of(entry.node))
            .sum();
        let recovery = recovery_rate * state.infected_count() as f64;
        (infection, recovery)
    }

    pub(super) fn add_pressure(&mut self, amount: u64) {
        self.pressure += amount;
    }

    pub(super) fn remove_pressure(&mut self, amount: u64) {
        self.pressure -= amount;
    }

    pub(super) fn add_infected(&mut self) {
        self.infected += 1;
    }

    pub(super) fn remove_infected(&mut self) {
        self.infected -= 1;
    }
}
