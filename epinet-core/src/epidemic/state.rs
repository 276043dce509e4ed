//! Infection state and run metrics.

use std::collections::HashMap;

use tracing::debug;

use super::arena::{AtRiskArena, AtRiskEntry, NodeSet};
use super::events::EventKind;
use super::invariants::InvariantViolation;
use super::simulation::SimulationError;
use crate::graph::{ContactNetwork, NodeId};

/// Mutable infection state of one run.
///
/// Holds the infected set and the at-risk arena. There is no recovered
/// compartment: a recovered node is susceptible again and can be reinfected,
/// so the process is SIS-like and `susceptible + infected == node_count`.
///
/// Invariants maintained by the transition engine:
/// - `infected` and the at-risk set are disjoint
/// - a node is at risk iff it is not infected and has an infected neighbor
/// - every at-risk entry stores its exact infected-neighbor count
#[derive(Debug, Clone)]
pub struct EpidemicState {
    node_count: usize,
    transmission_rate: f64,
    infected: NodeSet,
    at_risk: AtRiskArena,
}

impl EpidemicState {
    /// Builds the initial state from a graph and an initial infected set.
    ///
    /// Duplicate ids collapse. Every non-infected node counts its infected
    /// neighbors by scanning its adjacency range; nodes with a positive count
    /// become at risk. This is the only pass over the whole graph.
    ///
    /// # Errors
    ///
    /// - `SimulationError::EmptyInitialInfection` - `initial` is empty
    /// - `SimulationError::NodeOutOfRange` - An id is not below `node_count`
    pub fn from_initial<G>(
        graph: &G,
        transmission_rate: f64,
        initial: &[NodeId],
    ) -> Result<Self, SimulationError>
    where
        G: ContactNetwork + ?Sized,
    {
        if initial.is_empty() {
            return Err(SimulationError::EmptyInitialInfection);
        }

        let node_count = graph.node_count();
        let mut infected = NodeSet::with_node_count(node_count);
        for &node in initial {
            if node.index() >= node_count {
                return Err(SimulationError::NodeOutOfRange { node, node_count });
            }
            infected.insert(node);
        }

        let mut at_risk = AtRiskArena::with_node_count(node_count);
        for index in 0..node_count as u32 {
            let node = NodeId(index);
            if infected.contains(node) {
                continue;
            }
            let count = graph
                .neighbors(node)
                .iter()
                .filter(|&&neighbor| infected.contains(neighbor))
                .count() as u32;
            at_risk.set(node, count);
        }

        debug!(
            node_count,
            infected = infected.len(),
            at_risk = at_risk.len(),
            "Initialized epidemic state"
        );

        Ok(Self {
            node_count,
            transmission_rate,
            infected,
            at_risk,
        })
    }

    /// Returns the number of nodes in the underlying graph.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the per-neighbor transmission rate (τ).
    pub fn transmission_rate(&self) -> f64 {
        self.transmission_rate
    }

    /// Returns the infected nodes in slot order.
    pub fn infected(&self) -> &[NodeId] {
        self.infected.as_slice()
    }

    /// Returns the number of infected nodes.
    pub fn infected_count(&self) -> usize {
        self.infected.len()
    }

    /// Returns `node_count - infected_count`.
    pub fn susceptible_count(&self) -> usize {
        self.node_count - self.infected.len()
    }

    /// Returns true if `node` is infected.
    pub fn is_infected(&self, node: NodeId) -> bool {
        self.infected.contains(node)
    }

    /// Returns true if `node` is at risk.
    pub fn is_at_risk(&self, node: NodeId) -> bool {
        self.at_risk.contains(node)
    }

    /// Returns the at-risk entries in slot order.
    pub fn at_risk(&self) -> &[AtRiskEntry] {
        self.at_risk.entries()
    }

    /// Returns the number of at-risk nodes.
    pub fn at_risk_count(&self) -> usize {
        self.at_risk.len()
    }

    /// Returns the infected-neighbor count of an at-risk node.
    pub fn infected_neighbors_of(&self, node: NodeId) -> Option<u32> {
        self.at_risk.infected_neighbors(node)
    }

    /// Returns `τ × infected neighbors` for an at-risk node.
    pub fn infection_rate_of(&self, node: NodeId) -> Option<f64> {
        self.infected_neighbors_of(node)
            .map(|count| self.transmission_rate * f64::from(count))
    }

    /// Sum of infected-neighbor counts over the at-risk set, by full scan.
    pub fn pressure(&self) -> u64 {
        self.at_risk
            .entries()
            .iter()
            .map(|entry| u64::from(entry.infected_neighbors))
            .sum()
    }

    pub(super) fn infected_set_mut(&mut self) -> &mut NodeSet {
        &mut self.infected
    }

    pub(super) fn at_risk_mut(&mut self) -> &mut AtRiskArena {
        &mut self.at_risk
    }
}

/// Metrics collected during a simulation run.
#[derive(Debug, Clone, Default)]
pub struct SimulationMetrics {
    /// Total events applied
    pub events_processed: u64,
    /// Events applied, by kind
    pub events_by_kind: HashMap<EventKind, u64>,
    /// Largest infected count observed, including the initial state
    pub peak_infected: usize,
    /// Invariant violations detected
    pub invariant_violations: Vec<InvariantViolation>,
}

impl SimulationMetrics {
    /// Creates new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an applied event.
    pub fn record_event(&mut self, kind: EventKind) {
        self.events_processed += 1;
        *self.events_by_kind.entry(kind).or_insert(0) += 1;
    }

    /// Tracks the largest infected count.
    pub fn update_peak_infected(&mut self, infected: usize) {
        self.peak_infected = self.peak_infected.max(infected);
    }

    /// Records an invariant violation.
    pub fn record_invariant_violation(&mut self, violation: InvariantViolation) {
        self.invariant_violations.push(violation);
    }

    /// Returns the number of applied events of `kind`.
    pub fn count(&self, kind: EventKind) -> u64 {
        self.events_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Returns the number of applied infections.
    pub fn infections(&self) -> u64 {
        self.count(EventKind::Infection)
    }

    /// Returns the number of applied recoveries.
    pub fn recoveries(&self) -> u64 {
        self.count(EventKind::Recovery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CsrGraph;

    fn star() -> CsrGraph {
        CsrGraph::from_edges(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap()
    }

    #[test]
    fn test_from_initial_marks_neighbors_at_risk() {
        let state = EpidemicState::from_initial(&star(), 0.5, &[NodeId(0)]).unwrap();

        assert_eq!(state.infected_count(), 1);
        assert_eq!(state.susceptible_count(), 4);
        assert_eq!(state.at_risk_count(), 4);
        for leaf in 1..5 {
            assert_eq!(state.infected_neighbors_of(NodeId(leaf)), Some(1));
            assert_eq!(state.infection_rate_of(NodeId(leaf)), Some(0.5));
        }
        assert_eq!(state.infection_rate_of(NodeId(0)), None);
        assert_eq!(state.pressure(), 4);
    }

    #[test]
    fn test_from_initial_counts_multiple_infected_neighbors() {
        let state =
            EpidemicState::from_initial(&star(), 1.0, &[NodeId(1), NodeId(2), NodeId(3)])
                .unwrap();

        assert_eq!(state.at_risk_count(), 1);
        assert_eq!(state.infected_neighbors_of(NodeId(0)), Some(3));
        assert!(!state.is_at_risk(NodeId(4)));
    }

    #[test]
    fn test_from_initial_collapses_duplicates() {
        let state =
            EpidemicState::from_initial(&star(), 1.0, &[NodeId(2), NodeId(2), NodeId(2)])
                .unwrap();
        assert_eq!(state.infected_count(), 1);
        assert_eq!(state.infected_neighbors_of(NodeId(0)), Some(1));
    }

    #[test]
    fn test_from_initial_rejects_invalid_input() {
        assert!(matches!(
            EpidemicState::from_initial(&star(), 1.0, &[]),
            Err(SimulationError::EmptyInitialInfection)
        ));
        assert!(matches!(
            EpidemicState::from_initial(&star(), 1.0, &[NodeId(1), NodeId(5)]),
            Err(SimulationError::NodeOutOfRange {
                node: NodeId(5),
                node_count: 5
            })
        ));
    }

    #[test]
    fn test_metrics_record_events() {
        let mut metrics = SimulationMetrics::new();
        metrics.record_event(EventKind::Infection);
        metrics.record_event(EventKind::Infection);
        metrics.record_event(EventKind::Recovery);
        metrics.update_peak_infected(3);
        metrics.update_peak_infected(2);

        assert_eq!(metrics.events_processed, 3);
        assert_eq!(metrics.infections(), 2);
        assert_eq!(metrics.recoveries(), 1);
        assert_eq!(metrics.peak_infected, 3);
    }
}
