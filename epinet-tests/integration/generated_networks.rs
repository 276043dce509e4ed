//! Simulations over networks from every generator.

use std::sync::Arc;

use epinet_core::epidemic::{
    AtRiskConsistencyInvariant, DisjointSetsInvariant, EpidemicSimulation,
    LedgerConsistencyInvariant,
};
use epinet_core::graph::{ContactNetwork, NodeId};
use epinet_core::{SimulationConfig, Termination, run_simulation, simulate_ensemble};
use epinet_network::NetworkSpec;
use proptest::prelude::*;

fn specs(nodes: usize) -> Vec<NetworkSpec> {
    vec![
        NetworkSpec::BarabasiAlbert {
            nodes,
            initial_nodes: 5,
            edges_per_node: 2,
        },
        NetworkSpec::ErdosRenyi {
            nodes,
            probability: 0.1,
        },
        NetworkSpec::RandomRegular { nodes, degree: 4 },
    ]
}

#[test]
fn test_invariants_hold_on_every_generator() {
    for spec in specs(80) {
        let graph = spec.generate(5).unwrap();
        let config = SimulationConfig::new(0.4, 0.2, 20.0).with_seed(17);
        let mut sim = EpidemicSimulation::new(&graph, config, &[NodeId(0), NodeId(1)]).unwrap();
        sim.add_invariant(Arc::new(LedgerConsistencyInvariant::default()));
        sim.add_invariant(Arc::new(AtRiskConsistencyInvariant));
        sim.add_invariant(Arc::new(DisjointSetsInvariant));

        let report = sim.run().unwrap();
        assert!(
            report.metrics.invariant_violations.is_empty(),
            "{spec}: {:?}",
            report.metrics.invariant_violations
        );
        for point in &report.trajectory {
            assert_eq!(point.susceptible + point.infected, 80);
        }
    }
}

#[test]
fn test_pure_spread_saturates_connected_graph() {
    // A random 4-regular graph is connected with overwhelming probability,
    // and without recovery every node ends up infected.
    let graph = NetworkSpec::RandomRegular {
        nodes: 100,
        degree: 4,
    }
    .generate(3)
    .unwrap();
    let config = SimulationConfig::new(1.0, 0.0, 1e9).with_seed(4);

    let report = run_simulation(&graph, config, &[NodeId(0)]).unwrap();

    assert_eq!(report.termination, Termination::Extinguished);
    assert_eq!(report.final_infected(), graph.node_count());
    assert_eq!(report.event_count, 99);
    assert_eq!(report.metrics.recoveries(), 0);
}

#[test]
fn test_ensemble_over_generated_network() {
    let graph = NetworkSpec::ErdosRenyi {
        nodes: 60,
        probability: 0.08,
    }
    .generate(21)
    .unwrap();
    let config = SimulationConfig::new(0.3, 0.2, 15.0);

    let reports = simulate_ensemble(&graph, &config, &[NodeId(0)], 16, 1_000);
    assert_eq!(reports.len(), 16);

    let reports: Vec<_> = reports.into_iter().map(Result::unwrap).collect();
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.seed, 1_000 + i as u64);
    }
    let distinct_lengths: std::collections::HashSet<usize> =
        reports.iter().map(|r| r.trajectory.len()).collect();
    assert!(distinct_lengths.len() > 1, "replicas should differ");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ledger_stays_exact_on_generated_networks(
        network_seed in any::<u64>(),
        sim_seed in any::<u64>(),
        tau in 0.05f64..1.0,
        gamma in 0.05f64..1.0,
    ) {
        for spec in specs(40) {
            let graph = spec.generate(network_seed).unwrap();
            let config = SimulationConfig::new(tau, gamma, 10.0).with_seed(sim_seed);
            let mut sim = EpidemicSimulation::new(&graph, config, &[NodeId(0)]).unwrap();
            sim.add_invariant(Arc::new(LedgerConsistencyInvariant::default()));

            let report = sim.run().unwrap();
            prop_assert!(report.metrics.invariant_violations.is_empty());
            prop_assert!(report.final_time <= 10.0);
        }
    }
}
