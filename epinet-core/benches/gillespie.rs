use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use epinet_core::graph::{CsrGraph, NodeId};
use epinet_core::{SimulationConfig, run_simulation};

/// Ring lattice where every node links to its `k` nearest neighbors on each side.
fn ring_lattice(node_count: u32, k: u32) -> CsrGraph {
    let edges: Vec<(u32, u32)> = (0..node_count)
        .flat_map(|i| (1..=k).map(move |j| (i, (i + j) % node_count)))
        .collect();
    CsrGraph::from_edges(node_count as usize, &edges).unwrap()
}

fn bench_endemic_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("gillespie_run");
    for node_count in [1_000u32, 10_000] {
        let graph = ring_lattice(node_count, 3);
        let config = SimulationConfig::new(0.5, 0.4, 10.0).with_seed(42);
        let initial: Vec<NodeId> = (0..10).map(|i| NodeId(i * node_count / 10)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(node_count), &graph, |b, graph| {
            b.iter(|| run_simulation(black_box(graph), config.clone(), &initial).unwrap());
        });
    }
    group.finish();
}

fn bench_initialization(c: &mut Criterion) {
    let graph = ring_lattice(50_000, 5);
    let config = SimulationConfig::new(0.5, 0.4, 1e-9).with_seed(1);

    c.bench_function("initialize_50k", |b| {
        b.iter(|| run_simulation(black_box(&graph), config.clone(), &[NodeId(0)]).unwrap());
    });
}

criterion_group!(benches, bench_endemic_run, bench_initialization);
criterion_main!(benches);
