//! End-to-end tests for the epidemic simulation engine.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use crate::config::SimulationConfig;
use crate::epidemic::{
    AtRiskConsistencyInvariant, DisjointSetsInvariant, EpidemicSimulation, EpidemicState,
    EventKind, Invariant, InvariantContext, InvariantViolation, LedgerConsistencyInvariant,
    MAX_INVARIANT_VIOLATIONS, RateLedger, SimulationClock, SimulationError, SimulationRng,
    StepOutcome, Termination, gillespie_step, run_simulation,
};
use crate::graph::{ContactNetwork, CsrGraph, NodeId};

/// Builds a simple graph, dropping self-loops and repeated pairs.
fn simple_graph(node_count: usize, pairs: &[(u32, u32)]) -> CsrGraph {
    let mut seen = HashSet::new();
    let edges: Vec<(u32, u32)> = pairs
        .iter()
        .map(|&(a, b)| (a % node_count as u32, b % node_count as u32))
        .filter(|&(a, b)| a != b && seen.insert((a.min(b), a.max(b))))
        .collect();
    CsrGraph::from_edges(node_count, &edges).unwrap()
}

fn ids(nodes: &[u32]) -> Vec<NodeId> {
    nodes.iter().copied().map(NodeId).collect()
}

#[test]
fn test_simulation_reproducibility() {
    let graph = simple_graph(40, &(0..120).map(|i| (i * 7, i * 13 + 1)).collect::<Vec<_>>());
    let config = SimulationConfig::new(0.4, 0.2, 30.0).with_seed(12345);

    let report1 = run_simulation(&graph, config.clone(), &ids(&[0, 1])).unwrap();
    let report2 = run_simulation(&graph, config, &ids(&[0, 1])).unwrap();

    assert_eq!(report1.event_count, report2.event_count);
    assert_eq!(report1.trajectory, report2.trajectory);
    assert_eq!(report1.seed, 12345);
    assert_eq!(report1.seed, report2.seed);
}

#[test]
fn test_zero_transmission_dies_out() {
    let graph = CsrGraph::complete(5);
    let config = SimulationConfig::new(0.0, 1.0, 1e6).with_seed(7);

    let report = run_simulation(&graph, config, &ids(&[0, 2, 4])).unwrap();

    assert_eq!(report.termination, Termination::Extinguished);
    assert_eq!(report.event_count, 3);
    assert_eq!(report.metrics.recoveries(), 3);
    assert_eq!(report.metrics.infections(), 0);
    assert_eq!(report.final_infected(), 0);
}

#[test]
fn test_triangle_saturates_in_two_events() {
    let graph = CsrGraph::complete(3);
    let config = SimulationConfig::new(1.0, 0.0, 1e6).with_seed(1);

    let report = run_simulation(&graph, config, &ids(&[0])).unwrap();

    assert_eq!(report.termination, Termination::Extinguished);
    assert_eq!(report.event_count, 2);
    assert_eq!(report.trajectory.infected_counts(), vec![1, 2, 3]);
    assert_eq!(report.final_infected(), 3);
}

#[test]
fn test_isolated_node_recovers_once() {
    let graph = CsrGraph::empty(1);
    let config = SimulationConfig::new(0.5, 0.8, 1e6).with_seed(3);

    let report = run_simulation(&graph, config, &ids(&[0])).unwrap();

    assert_eq!(report.event_count, 1);
    assert_eq!(report.metrics.recoveries(), 1);
    assert_eq!(report.trajectory.len(), 2);
    assert_eq!(report.final_infected(), 0);
    assert_eq!(report.termination, Termination::Extinguished);
}

#[test]
fn test_horizon_stops_endemic_run() {
    let graph = CsrGraph::complete(30);
    let config = SimulationConfig::new(2.0, 0.1, 5.0).with_seed(11);

    let report = run_simulation(&graph, config, &ids(&[0])).unwrap();

    assert_eq!(report.termination, Termination::HorizonReached);
    assert!(report.final_time <= 5.0);
    assert!(report.trajectory.iter().all(|p| p.time <= 5.0));
    assert!(report.final_infected() > 0);
}

#[test]
fn test_zero_rates_terminate_immediately() {
    let graph = CsrGraph::complete(4);
    let config = SimulationConfig::new(0.0, 0.0, 10.0).with_seed(5);

    let report = run_simulation(&graph, config, &ids(&[1])).unwrap();

    assert_eq!(report.termination, Termination::Extinguished);
    assert_eq!(report.event_count, 0);
    assert_eq!(report.trajectory.len(), 1);
    assert_eq!(report.final_time, 0.0);
}

#[test]
fn test_trajectory_starts_at_zero_and_conserves_nodes() {
    let graph = simple_graph(60, &(0..200).map(|i| (i * 3, i * 11 + 5)).collect::<Vec<_>>());
    let config = SimulationConfig::new(0.3, 0.2, 40.0).with_seed(99);

    let report = run_simulation(&graph, config, &ids(&[3, 9, 27])).unwrap();
    let first = report.trajectory.first().unwrap();

    assert_eq!(first.time, 0.0);
    assert_eq!(first.infected, 3);
    assert_eq!(report.trajectory.event_count() as u64, report.event_count);
    for pair in report.trajectory.points().windows(2) {
        assert!(pair[0].time <= pair[1].time);
    }
    for point in &report.trajectory {
        assert_eq!(point.susceptible + point.infected, 60);
    }
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let graph = CsrGraph::complete(4);

    let result = EpidemicSimulation::new(&graph, SimulationConfig::new(-1.0, 0.1, 1.0), &ids(&[0]));
    assert!(matches!(result, Err(SimulationError::InvalidRate { .. })));

    let result = EpidemicSimulation::new(&graph, SimulationConfig::new(0.1, 0.1, 0.0), &ids(&[0]));
    assert!(matches!(result, Err(SimulationError::InvalidHorizon { .. })));

    let result = EpidemicSimulation::new(&graph, SimulationConfig::default(), &[]);
    assert!(matches!(result, Err(SimulationError::EmptyInitialInfection)));

    let result = EpidemicSimulation::new(&graph, SimulationConfig::default(), &ids(&[4]));
    assert!(matches!(
        result,
        Err(SimulationError::NodeOutOfRange { node_count: 4, .. })
    ));
}

#[test]
fn test_step_after_termination_is_stable() {
    let graph = CsrGraph::empty(1);
    let config = SimulationConfig::new(0.0, 1.0, 1e6).with_seed(2);
    let mut sim = EpidemicSimulation::new(&graph, config, &ids(&[0])).unwrap();

    assert!(matches!(
        sim.step().unwrap(),
        StepOutcome::Applied { event, .. } if event.kind == EventKind::Recovery
    ));
    assert_eq!(
        sim.step().unwrap(),
        StepOutcome::Terminated(Termination::Extinguished)
    );
    assert_eq!(
        sim.step().unwrap(),
        StepOutcome::Terminated(Termination::Extinguished)
    );
    assert_eq!(sim.termination(), Some(Termination::Extinguished));
    assert_eq!(sim.trajectory().len(), 2);
}

#[test]
fn test_builtin_invariants_hold_during_run() {
    let graph = simple_graph(50, &(0..150).map(|i| (i * 5, i * 17 + 2)).collect::<Vec<_>>());
    let config = SimulationConfig::new(0.5, 0.3, 25.0).with_seed(2024);
    let mut sim = EpidemicSimulation::new(&graph, config, &ids(&[0, 10, 20])).unwrap();

    sim.add_invariant(Arc::new(LedgerConsistencyInvariant::default()));
    sim.add_invariant(Arc::new(AtRiskConsistencyInvariant));
    sim.add_invariant(Arc::new(DisjointSetsInvariant));

    let report = sim.run().unwrap();
    assert!(report.event_count > 0);
    assert!(report.metrics.invariant_violations.is_empty());
}

struct AlwaysViolated;

impl Invariant for AlwaysViolated {
    fn check(&self, context: &InvariantContext<'_>) -> Result<(), InvariantViolation> {
        Err(InvariantViolation {
            invariant: self.name().to_string(),
            description: "always fails".to_string(),
            time: context.time,
        })
    }

    fn name(&self) -> &str {
        "AlwaysViolated"
    }
}

#[test]
fn test_too_many_invariant_violations() {
    // Pure spreading on K30 applies exactly 29 events, enough to hit the cap.
    let graph = CsrGraph::complete(30);
    let config = SimulationConfig::new(1.0, 0.0, 1e6).with_seed(8);
    let mut sim = EpidemicSimulation::new(&graph, config, &ids(&[0])).unwrap();
    sim.add_invariant(Arc::new(AlwaysViolated));

    let result = sim.run();
    assert!(matches!(
        result,
        Err(SimulationError::TooManyInvariantViolations { count }) if count == MAX_INVARIANT_VIOLATIONS
    ));
}

#[test]
fn test_event_touches_only_node_and_neighbors() {
    let graph = simple_graph(40, &(0..120).map(|i| (i * 3, i * 7 + 1)).collect::<Vec<_>>());
    let mut state = EpidemicState::from_initial(&graph, 0.6, &ids(&[0, 5, 9])).unwrap();
    let mut ledger = RateLedger::from_state(&state, 0.4);
    let mut clock = SimulationClock::new(1e6);
    let mut rng = SimulationRng::from_seed(31);

    for _ in 0..200 {
        let before: Vec<(bool, Option<u32>)> = (0..40)
            .map(|i| {
                let node = NodeId(i);
                (state.is_infected(node), state.infected_neighbors_of(node))
            })
            .collect();

        let outcome =
            gillespie_step(&graph, &mut state, &mut ledger, &mut clock, &mut rng).unwrap();
        let StepOutcome::Applied { event, .. } = outcome else {
            break;
        };

        let mut allowed: HashSet<NodeId> = graph.neighbors(event.node).iter().copied().collect();
        allowed.insert(event.node);
        for (i, previous) in before.iter().enumerate() {
            let node = NodeId(i as u32);
            let current = (state.is_infected(node), state.infected_neighbors_of(node));
            if current != *previous {
                assert!(allowed.contains(&node), "{event} changed distant node {node}");
            }
        }
    }
}

proptest! {
    #[test]
    fn ledger_matches_recomputation(
        node_count in 2usize..30,
        pairs in prop::collection::vec((0u32..30, 0u32..30), 0..80),
        tau in 0f64..2.0,
        gamma in 0f64..2.0,
        seed in any::<u64>(),
    ) {
        let graph = simple_graph(node_count, &pairs);
        let mut state = EpidemicState::from_initial(&graph, tau, &[NodeId(0)]).unwrap();
        let mut ledger = RateLedger::from_state(&state, gamma);
        let mut clock = SimulationClock::new(20.0);
        let mut rng = SimulationRng::from_seed(seed);

        for _ in 0..300 {
            let outcome = gillespie_step(&graph, &mut state, &mut ledger, &mut clock, &mut rng).unwrap();
            prop_assert!(ledger.matches(&state));

            let (infection, recovery) = RateLedger::recompute(&state, gamma);
            let expected = infection + recovery;
            prop_assert!((ledger.total_rate() - expected).abs() <= 1e-9 * expected.max(1.0));
            prop_assert_eq!(state.susceptible_count() + state.infected_count(), node_count);

            if let StepOutcome::Terminated(_) = outcome {
                break;
            }
        }
    }

    #[test]
    fn trajectory_is_monotone_and_bounded(
        node_count in 1usize..25,
        pairs in prop::collection::vec((0u32..25, 0u32..25), 0..60),
        tau in 0f64..3.0,
        gamma in 0.01f64..2.0,
        horizon in 0.1f64..15.0,
        seed in any::<u64>(),
    ) {
        let graph = simple_graph(node_count, &pairs);
        let config = SimulationConfig::new(tau, gamma, horizon).with_seed(seed);
        let report = run_simulation(&graph, config, &[NodeId(0)]).unwrap();

        prop_assert_eq!(report.trajectory.first().map(|p| p.time), Some(0.0));
        for pair in report.trajectory.points().windows(2) {
            prop_assert!(pair[0].time <= pair[1].time);
        }
        for point in &report.trajectory {
            prop_assert!(point.time <= horizon);
            prop_assert_eq!(point.susceptible + point.infected, node_count);
        }
    }
}
