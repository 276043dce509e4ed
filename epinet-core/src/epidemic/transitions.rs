//! State transition engine.
//!
//! Applies one event to the state and repairs the at-risk counts and ledger
//! for the mutated node and its direct neighbors only. Work is
//! O(degree(node)).

use tracing::trace;

use super::events::{EpidemicEvent, EventKind};
use super::ledger::RateLedger;
use super::simulation::SimulationError;
use super::state::EpidemicState;
use crate::graph::{ContactNetwork, NodeId};

/// Applies `event` to `state` and `ledger`.
///
/// # Errors
///
/// - `SimulationError::InvalidTransition` - The target is in the wrong set
pub fn apply<G>(
    graph: &G,
    state: &mut EpidemicState,
    ledger: &mut RateLedger,
    event: EpidemicEvent,
) -> Result<(), SimulationError>
where
    G: ContactNetwork + ?Sized,
{
    match event.kind {
        EventKind::Infection => apply_infection(graph, state, ledger, event.node),
        EventKind::Recovery => apply_recovery(graph, state, ledger, event.node),
    }
}

/// Moves an at-risk node into the infected set.
///
/// Every non-infected neighbor gains one infected neighbor and becomes or
/// stays at risk.
///
/// # Errors
///
/// - `SimulationError::InvalidTransition` - `node` is not at risk
pub fn apply_infection<G>(
    graph: &G,
    state: &mut EpidemicState,
    ledger: &mut RateLedger,
    node: NodeId,
) -> Result<(), SimulationError>
where
    G: ContactNetwork + ?Sized,
{
    let Some(count) = state.at_risk_mut().remove(node) else {
        let reason = if state.is_infected(node) {
            "node is already infected"
        } else {
            "node has no infected neighbors"
        };
        return Err(SimulationError::InvalidTransition {
            node,
            reason: reason.to_string(),
        });
    };
    ledger.remove_pressure(u64::from(count));

    state.infected_set_mut().insert(node);
    ledger.add_infected();

    for &neighbor in graph.neighbors(node) {
        if state.is_infected(neighbor) {
            continue;
        }
        state.at_risk_mut().increment(neighbor);
        ledger.add_pressure(1);
    }

    trace!(node = %node, pressure = ledger.pressure(), "Applied infection");
    Ok(())
}

/// Removes an infected node from the infected set.
///
/// Every non-infected neighbor loses one infected neighbor and leaves the
/// at-risk set when its count reaches zero. The recovered node itself is
/// susceptible again and joins the at-risk set right away if any neighbor is
/// still infected, so the at-risk set always holds every non-infected node
/// with an infected neighbor.
///
/// # Errors
///
/// - `SimulationError::InvalidTransition` - `node` is not infected
pub fn apply_recovery<G>(
    graph: &G,
    state: &mut EpidemicState,
    ledger: &mut RateLedger,
    node: NodeId,
) -> Result<(), SimulationError>
where
    G: ContactNetwork + ?Sized,
{
    if !state.infected_set_mut().remove(node) {
        return Err(SimulationError::InvalidTransition {
            node,
            reason: "node is not infected".to_string(),
        });
    }
    ledger.remove_infected();

    let mut infected_neighbors = 0u32;
    for &neighbor in graph.neighbors(node) {
        if state.is_infected(neighbor) {
            infected_neighbors += 1;
        } else if state.at_risk_mut().decrement(neighbor).is_some() {
            ledger.remove_pressure(1);
        }
    }

    if infected_neighbors > 0 {
        state.at_risk_mut().set(node, infected_neighbors);
        ledger.add_pressure(u64::from(infected_neighbors));
    }

    trace!(node = %node, pressure = ledger.pressure(), "Applied recovery");
    Ok(())
}
