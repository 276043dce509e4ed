//! Exact stochastic epidemic simulation on contact networks.
//!
//! Implements the Gillespie direct method: the waiting time to the next event
//! is exponential in the total rate, and the event is chosen with probability
//! proportional to its rate. Rates are kept incrementally so that one event
//! costs O(degree) work.

pub mod arena;
pub mod clock;
pub mod ensemble;
pub mod events;
pub mod invariants;
pub mod ledger;
pub mod sampler;
pub mod simulation;
pub mod state;
pub mod trajectory;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use arena::{AtRiskArena, AtRiskEntry, NodeSet};
pub use clock::{ClockAdvance, SimulationClock, SimulationRng};
pub use ensemble::simulate_ensemble;
pub use events::{EpidemicEvent, EventKind};
pub use invariants::{
    AtRiskConsistencyInvariant, DisjointSetsInvariant, Invariant, InvariantContext,
    InvariantViolation, LedgerConsistencyInvariant,
};
pub use ledger::RateLedger;
pub use simulation::{
    EpidemicSimulation, MAX_INVARIANT_VIOLATIONS, SimulationError, SimulationReport,
    StepOutcome, Termination, gillespie_step, run_simulation,
};
pub use state::{EpidemicState, SimulationMetrics};
pub use trajectory::{Trajectory, TrajectoryPoint};
