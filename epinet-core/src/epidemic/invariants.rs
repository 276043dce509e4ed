//! Invariant checking framework for epidemic runs.

use std::fmt;

use super::ledger::RateLedger;
use super::state::EpidemicState;
use crate::graph::{ContactNetwork, NodeId};

/// Violation of a simulation invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: String,
    /// Detailed description of the violation
    pub description: String,
    /// Simulated time at which the violation was detected
    pub time: f64,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invariant '{}' violated at t={:.6}: {}",
            self.invariant, self.time, self.description
        )
    }
}

/// Everything an invariant may inspect after an event.
pub struct InvariantContext<'a> {
    /// Contact graph of the run
    pub graph: &'a dyn ContactNetwork,
    /// Current infection state
    pub state: &'a EpidemicState,
    /// Current rate ledger
    pub ledger: &'a RateLedger,
    /// Current simulated time
    pub time: f64,
}

impl InvariantContext<'_> {
    fn violation(&self, invariant: &dyn Invariant, description: String) -> InvariantViolation {
        InvariantViolation {
            invariant: invariant.name().to_string(),
            description,
            time: self.time,
        }
    }
}

/// Trait for checking simulation invariants.
pub trait Invariant: Send + Sync {
    /// Checks if invariant holds for the current context.
    ///
    /// # Errors
    /// Returns `InvariantViolation` if the invariant condition is not met.
    fn check(&self, context: &InvariantContext<'_>) -> Result<(), InvariantViolation>;

    /// Returns name of this invariant.
    fn name(&self) -> &str;
}

/// Ledger totals agree with a recomputation from per-node rates.
pub struct LedgerConsistencyInvariant {
    tolerance: f64,
}

impl LedgerConsistencyInvariant {
    /// Creates invariant with the given relative tolerance.
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for LedgerConsistencyInvariant {
    fn default() -> Self {
        Self::new(1e-9)
    }
}

impl Invariant for LedgerConsistencyInvariant {
    fn check(&self, context: &InvariantContext<'_>) -> Result<(), InvariantViolation> {
        let ledger = context.ledger;
        if !ledger.matches(context.state) {
            return Err(context.violation(
                self,
                format!(
                    "Ledger counts pressure={} infected={}, state has pressure={} infected={}",
                    ledger.pressure(),
                    ledger.infected(),
                    context.state.pressure(),
                    context.state.infected_count()
                ),
            ));
        }

        let (infection, recovery) = RateLedger::recompute(context.state, ledger.recovery_rate());
        let expected = infection + recovery;
        let actual = ledger.total_rate();
        if (expected - actual).abs() > self.tolerance * expected.abs().max(1.0) {
            return Err(context.violation(
                self,
                format!("Total rate {actual} differs from recomputed {expected}"),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "LedgerConsistency"
    }
}

/// Every at-risk entry matches a recount of its neighbors, and every exposed
/// susceptible node is at risk.
///
/// Full scan of the graph; meant for tests and debugging runs.
pub struct AtRiskConsistencyInvariant;

impl Invariant for AtRiskConsistencyInvariant {
    fn check(&self, context: &InvariantContext<'_>) -> Result<(), InvariantViolation> {
        let state = context.state;
        for index in 0..context.graph.node_count() as u32 {
            let node = NodeId(index);
            if state.is_infected(node) {
                continue;
            }
            let expected = context
                .graph
                .neighbors(node)
                .iter()
                .filter(|&&neighbor| state.is_infected(neighbor))
                .count() as u32;
            let cached = state.infected_neighbors_of(node).unwrap_or(0);
            if cached != expected {
                return Err(context.violation(
                    self,
                    format!(
                        "Node {node} caches {cached} infected neighbors, recount gives {expected}"
                    ),
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "AtRiskConsistency"
    }
}

/// Infected and at-risk sets never overlap.
pub struct DisjointSetsInvariant;

impl Invariant for DisjointSetsInvariant {
    fn check(&self, context: &InvariantContext<'_>) -> Result<(), InvariantViolation> {
        if let Some(&node) = context
            .state
            .infected()
            .iter()
            .find(|&&node| context.state.is_at_risk(node))
        {
            return Err(context.violation(
                self,
                format!("Node {node} is both infected and at risk"),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "DisjointSets"
    }
}
