//! Gillespie event selection.

use super::clock::SimulationRng;
use super::events::{EpidemicEvent, EventKind};
use super::ledger::RateLedger;
use super::state::EpidemicState;

/// Draws the waiting time to the next event.
///
/// Exponential with parameter `total_rate`. Callers must only ask when
/// `total_rate > 0`.
pub fn waiting_time(rng: &mut SimulationRng, total_rate: f64) -> f64 {
    rng.exponential(total_rate)
}

/// Chooses the class of the next event.
///
/// Draws `R` uniform in `[0, total_rate)`; recovery when
/// `R < total_recovery_rate`, infection otherwise. Falls back to recovery
/// if infection is chosen with an empty at-risk set, which only rounding
/// can cause.
pub fn choose_kind(rng: &mut SimulationRng, ledger: &RateLedger, state: &EpidemicState) -> EventKind {
    let r = rng.unit() * ledger.total_rate();
    if r < ledger.total_recovery_rate() || state.at_risk_count() == 0 {
        EventKind::Recovery
    } else {
        EventKind::Infection
    }
}

/// Chooses a uniformly random infected node.
pub fn choose_recovery_target(
    rng: &mut SimulationRng,
    state: &EpidemicState,
) -> Option<EpidemicEvent> {
    let index = rng.index_below(state.infected_count())?;
    Some(EpidemicEvent::recovery(state.infected()[index]))
}

/// Chooses an at-risk node with probability proportional to its rate.
///
/// Walks the arena accumulating infected-neighbor counts against
/// `U × pressure`. If rounding leaves the running sum short of the draw,
/// the last entry wins.
pub fn choose_infection_target(
    rng: &mut SimulationRng,
    state: &EpidemicState,
    ledger: &RateLedger,
) -> Option<EpidemicEvent> {
    let entries = state.at_risk();
    let last = entries.last()?;
    let target = rng.unit() * ledger.pressure() as f64;

    let mut cumulative = 0.0;
    for entry in entries {
        cumulative += f64::from(entry.infected_neighbors);
        if target < cumulative {
            return Some(EpidemicEvent::infection(entry.node));
        }
    }
    Some(EpidemicEvent::infection(last.node))
}

/// Chooses the next event: class, then target.
pub fn choose_event(
    rng: &mut SimulationRng,
    state: &EpidemicState,
    ledger: &RateLedger,
) -> Option<EpidemicEvent> {
    match choose_kind(rng, ledger, state) {
        EventKind::Recovery => choose_recovery_target(rng, state),
        EventKind::Infection => choose_infection_target(rng, state, ledger),
    }
}
