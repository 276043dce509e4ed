//! Gillespie simulation engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::clock::{ClockAdvance, SimulationClock, SimulationRng};
use super::events::EpidemicEvent;
use super::invariants::{Invariant, InvariantContext};
use super::ledger::RateLedger;
use super::sampler;
use super::state::{EpidemicState, SimulationMetrics};
use super::trajectory::Trajectory;
use super::transitions;
use crate::config::SimulationConfig;
use crate::graph::{ContactNetwork, NodeId};

/// Maximum number of invariant violations before stopping simulation.
pub const MAX_INVARIANT_VIOLATIONS: usize = 10;

/// Errors that can occur during simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A rate is negative or not finite
    #[error("Invalid {name}: {value} (must be finite and non-negative)")]
    InvalidRate {
        /// Name of the offending rate
        name: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Horizon is not finite and positive
    #[error("Invalid horizon: {horizon} (must be finite and positive)")]
    InvalidHorizon {
        /// Rejected horizon
        horizon: f64,
    },

    /// No initially infected node was given
    #[error("Initial infected set is empty")]
    EmptyInitialInfection,

    /// An initially infected node is not in the graph
    #[error("Initial infected node {node} out of range for {node_count} nodes")]
    NodeOutOfRange {
        /// Offending node
        node: NodeId,
        /// Number of nodes in the graph
        node_count: usize,
    },

    /// An event targeted a node in the wrong compartment
    #[error("Invalid transition for node {node}: {reason}")]
    InvalidTransition {
        /// Targeted node
        node: NodeId,
        /// Why the transition cannot apply
        reason: String,
    },

    /// Too many invariant violations occurred
    #[error("Too many invariant violations: {count}")]
    TooManyInvariantViolations {
        /// Number of violations that occurred
        count: usize,
    },
}

/// Why a run stopped. Both reasons are normal outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The next event would have happened after the horizon
    HorizonReached,
    /// The total rate is zero, so no further event can happen
    Extinguished,
}

/// Result of one Gillespie step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// An event was applied at the contained time
    Applied {
        /// The applied event
        event: EpidemicEvent,
        /// Simulated time of the event
        time: f64,
    },
    /// The run is over
    Terminated(Termination),
}

/// Performs one Gillespie step on the given run components.
///
/// Draws the waiting time, stops if it would pass the horizon, otherwise
/// samples the event and applies it. The clock does not move when the step
/// terminates.
///
/// # Errors
///
/// - `SimulationError::InvalidTransition` - The sampled event does not apply,
///   which means the state was corrupted
pub fn gillespie_step<G>(
    graph: &G,
    state: &mut EpidemicState,
    ledger: &mut RateLedger,
    clock: &mut SimulationClock,
    rng: &mut SimulationRng,
) -> Result<StepOutcome, SimulationError>
where
    G: ContactNetwork + ?Sized,
{
    let total_rate = ledger.total_rate();
    if total_rate <= 0.0 {
        return Ok(StepOutcome::Terminated(Termination::Extinguished));
    }

    let delay = sampler::waiting_time(rng, total_rate);
    let time = match clock.try_advance(delay) {
        ClockAdvance::Advanced(time) => time,
        ClockAdvance::PastHorizon(_) => {
            return Ok(StepOutcome::Terminated(Termination::HorizonReached));
        }
    };

    let Some(event) = sampler::choose_event(rng, state, ledger) else {
        return Ok(StepOutcome::Terminated(Termination::Extinguished));
    };
    transitions::apply(graph, state, ledger, event)?;

    Ok(StepOutcome::Applied { event, time })
}

/// Result of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Seed used for reproduction
    pub seed: u64,
    /// Why the run stopped
    pub termination: Termination,
    /// Time of the last applied event, zero if none
    pub final_time: f64,
    /// Total events applied
    pub event_count: u64,
    /// Recorded counts
    pub trajectory: Trajectory,
    /// Collected metrics
    pub metrics: SimulationMetrics,
}

impl SimulationReport {
    /// Infected count of the last record.
    pub fn final_infected(&self) -> usize {
        self.trajectory.last().map_or(0, |p| p.infected)
    }

    /// Generates human-readable summary.
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Simulation Report (seed: {})\n", self.seed));
        summary.push_str(&format!("Termination: {:?}\n", self.termination));
        summary.push_str(&format!("Final time: {:.6}\n", self.final_time));
        summary.push_str(&format!("Events processed: {}\n", self.event_count));
        summary.push_str(&format!("  Infections: {}\n", self.metrics.infections()));
        summary.push_str(&format!("  Recoveries: {}\n", self.metrics.recoveries()));
        summary.push_str(&format!("Peak infected: {}\n", self.metrics.peak_infected));
        summary.push_str(&format!("Final infected: {}\n", self.final_infected()));

        if !self.metrics.invariant_violations.is_empty() {
            summary.push_str("\nInvariant violations:\n");
            for violation in &self.metrics.invariant_violations {
                summary.push_str(&format!("  - {violation}\n"));
            }
        }

        summary
    }
}

/// One epidemic run over a borrowed contact graph.
///
/// Owns its state, ledger, clock, RNG and trajectory exclusively. The graph
/// is only read, so many simulations may share it across threads.
pub struct EpidemicSimulation<'g, G: ContactNetwork> {
    graph: &'g G,
    config: SimulationConfig,
    state: EpidemicState,
    ledger: RateLedger,
    clock: SimulationClock,
    rng: SimulationRng,
    trajectory: Trajectory,
    metrics: SimulationMetrics,
    invariants: Vec<Arc<dyn Invariant>>,
    termination: Option<Termination>,
}

impl<'g, G: ContactNetwork> EpidemicSimulation<'g, G> {
    /// Creates a simulation and records the initial state at time zero.
    ///
    /// Uses `config.deterministic_seed` if set, otherwise a fresh seed.
    ///
    /// # Errors
    /// - `SimulationError::InvalidRate` - A rate is negative or not finite
    /// - `SimulationError::InvalidHorizon` - Horizon is not finite and positive
    /// - `SimulationError::EmptyInitialInfection` - `initial` is empty
    /// - `SimulationError::NodeOutOfRange` - An initial node is not in the graph
    pub fn new(
        graph: &'g G,
        config: SimulationConfig,
        initial: &[NodeId],
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let state = EpidemicState::from_initial(graph, config.transmission_rate, initial)?;
        let ledger = RateLedger::from_state(&state, config.recovery_rate);
        let rng = match config.deterministic_seed {
            Some(seed) => SimulationRng::from_seed(seed),
            None => SimulationRng::from_entropy(),
        };

        let mut trajectory = Trajectory::new();
        trajectory.record(0.0, state.susceptible_count(), state.infected_count());
        let mut metrics = SimulationMetrics::new();
        metrics.update_peak_infected(state.infected_count());

        Ok(Self {
            graph,
            clock: SimulationClock::new(config.horizon),
            config,
            state,
            ledger,
            rng,
            trajectory,
            metrics,
            invariants: Vec::new(),
            termination: None,
        })
    }

    /// Returns the seed used for this simulation.
    pub fn simulation_seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Returns current simulated time.
    pub fn simulation_time(&self) -> f64 {
        self.clock.now()
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the current infection state.
    pub fn state(&self) -> &EpidemicState {
        &self.state
    }

    /// Returns the current rate ledger.
    pub fn ledger(&self) -> &RateLedger {
        &self.ledger
    }

    /// Returns the trajectory recorded so far.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Returns metrics collected so far.
    pub fn metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    /// Returns the termination reason once the run is over.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Adds an invariant to check after every applied event.
    pub fn add_invariant(&mut self, invariant: Arc<dyn Invariant>) {
        self.invariants.push(invariant);
    }

    /// Advances the run by one event.
    ///
    /// After termination every call returns the same `Terminated` outcome.
    ///
    /// # Errors
    /// - `SimulationError::InvalidTransition` - State was corrupted
    /// - `SimulationError::TooManyInvariantViolations` - Too many invariant violations
    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        if let Some(termination) = self.termination {
            return Ok(StepOutcome::Terminated(termination));
        }

        let outcome = gillespie_step(
            self.graph,
            &mut self.state,
            &mut self.ledger,
            &mut self.clock,
            &mut self.rng,
        )?;

        match outcome {
            StepOutcome::Applied { event, time } => {
                trace!(time, %event, total_rate = self.ledger.total_rate(), "Event applied");
                self.trajectory.record(
                    time,
                    self.state.susceptible_count(),
                    self.state.infected_count(),
                );
                self.metrics.record_event(event.kind);
                self.metrics
                    .update_peak_infected(self.state.infected_count());
                self.check_invariants()?;
            }
            StepOutcome::Terminated(termination) => {
                debug!(
                    ?termination,
                    time = self.clock.now(),
                    events = self.metrics.events_processed,
                    infected = self.state.infected_count(),
                    "Simulation terminated"
                );
                self.termination = Some(termination);
            }
        }

        Ok(outcome)
    }

    /// Runs until the horizon or until no event can happen.
    ///
    /// # Errors
    /// - `SimulationError::InvalidTransition` - State was corrupted
    /// - `SimulationError::TooManyInvariantViolations` - Too many invariant violations
    pub fn run(mut self) -> Result<SimulationReport, SimulationError> {
        debug!(
            seed = self.rng.seed(),
            nodes = self.state.node_count(),
            infected = self.state.infected_count(),
            transmission_rate = self.config.transmission_rate,
            recovery_rate = self.config.recovery_rate,
            horizon = self.config.horizon,
            "Starting epidemic simulation"
        );

        let termination = loop {
            if let StepOutcome::Terminated(termination) = self.step()? {
                break termination;
            }
        };

        Ok(SimulationReport {
            seed: self.rng.seed(),
            termination,
            final_time: self.clock.now(),
            event_count: self.metrics.events_processed,
            trajectory: self.trajectory,
            metrics: self.metrics,
        })
    }

    /// Checks all invariants.
    fn check_invariants(&mut self) -> Result<(), SimulationError> {
        let context = InvariantContext {
            graph: self.graph,
            state: &self.state,
            ledger: &self.ledger,
            time: self.clock.now(),
        };
        for invariant in &self.invariants {
            if let Err(violation) = invariant.check(&context) {
                warn!(%violation, "Invariant violated");
                self.metrics.record_invariant_violation(violation);

                if self.metrics.invariant_violations.len() >= MAX_INVARIANT_VIOLATIONS {
                    return Err(SimulationError::TooManyInvariantViolations {
                        count: self.metrics.invariant_violations.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Validates the configuration and runs one simulation to completion.
///
/// # Errors
/// Any error of [`EpidemicSimulation::new`] or [`EpidemicSimulation::run`].
pub fn run_simulation<G: ContactNetwork>(
    graph: &G,
    config: SimulationConfig,
    initial: &[NodeId],
) -> Result<SimulationReport, SimulationError> {
    EpidemicSimulation::new(graph, config, initial)?.run()
}
