//! Barabási–Albert preferential attachment.

use epinet_core::CsrGraph;
use rand::Rng;

use crate::NetworkError;

/// Generates a Barabási–Albert graph.
///
/// Starts from a complete graph on `initial_nodes` (m0) nodes. Every further
/// node attaches to `edges_per_node` (m) distinct existing nodes, each drawn
/// with probability proportional to its current degree. While no existing
/// node has an edge yet, targets are drawn uniformly.
///
/// # Errors
///
/// - `NetworkError::InvalidParameters` - `nodes == 0`, `m0` outside `1..=nodes`
///   or `m > m0`
pub fn barabasi_albert<R: Rng + ?Sized>(
    nodes: usize,
    initial_nodes: usize,
    edges_per_node: usize,
    rng: &mut R,
) -> Result<CsrGraph, NetworkError> {
    if nodes == 0 {
        return Err(NetworkError::invalid("node count must be positive"));
    }
    if initial_nodes == 0 || initial_nodes > nodes {
        return Err(NetworkError::invalid(format!(
            "initial complete graph size must be in 1..={nodes}, got {initial_nodes}"
        )));
    }
    if edges_per_node > initial_nodes {
        return Err(NetworkError::invalid(format!(
            "edges per new node ({edges_per_node}) must not exceed initial graph size ({initial_nodes})"
        )));
    }

    let capacity = initial_nodes * (initial_nodes - 1) / 2 + edges_per_node * (nodes - initial_nodes);
    let mut edges: Vec<(u32, u32)> = Vec::with_capacity(capacity);
    // Every edge endpoint appears once, so sampling an entry uniformly is
    // sampling a node proportionally to its degree.
    let mut endpoints: Vec<u32> = Vec::with_capacity(2 * capacity);
    let mut connected = vec![false; nodes];
    let mut connected_count = 0usize;

    for a in 0..initial_nodes as u32 {
        for b in (a + 1)..initial_nodes as u32 {
            edges.push((a, b));
            endpoints.extend([a, b]);
        }
    }
    if initial_nodes > 1 {
        connected[..initial_nodes].fill(true);
        connected_count = initial_nodes;
    }

    let mut targets: Vec<u32> = Vec::with_capacity(edges_per_node);
    for new_node in initial_nodes..nodes {
        targets.clear();
        let uniform = connected_count == 0;
        let available = if uniform { new_node } else { connected_count };
        let wanted = edges_per_node.min(available);

        while targets.len() < wanted {
            let candidate = if uniform {
                rng.random_range(0..new_node) as u32
            } else {
                endpoints[rng.random_range(0..endpoints.len())]
            };
            if !targets.contains(&candidate) {
                targets.push(candidate);
            }
        }

        for &target in &targets {
            edges.push((new_node as u32, target));
            endpoints.extend([new_node as u32, target]);
            for node in [new_node, target as usize] {
                if !connected[node] {
                    connected[node] = true;
                    connected_count += 1;
                }
            }
        }
    }

    Ok(CsrGraph::from_edges(nodes, &edges)?)
}
