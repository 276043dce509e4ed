//! Parallel replicas of one epidemic configuration.

use rayon::prelude::*;
use tracing::debug;

use super::simulation::{SimulationError, SimulationReport, run_simulation};
use crate::config::SimulationConfig;
use crate::graph::{ContactNetwork, NodeId};

/// Runs `replicas` independent simulations over a shared graph.
///
/// Replica `i` is seeded with `base_seed.wrapping_add(i)`, so the ensemble
/// is reproducible regardless of thread scheduling. Any seed in `config` is
/// replaced. Results are returned in replica order.
pub fn simulate_ensemble<G>(
    graph: &G,
    config: &SimulationConfig,
    initial: &[NodeId],
    replicas: usize,
    base_seed: u64,
) -> Vec<Result<SimulationReport, SimulationError>>
where
    G: ContactNetwork,
{
    debug!(replicas, base_seed, "Starting ensemble");

    (0..replicas)
        .into_par_iter()
        .map(|replica| {
            let config = config.clone().with_seed(base_seed.wrapping_add(replica as u64));
            run_simulation(graph, config, initial)
        })
        .collect()
}
