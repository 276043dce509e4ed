//! Erdős–Rényi random graphs.

use epinet_core::CsrGraph;
use rand::Rng;

use crate::NetworkError;

/// Generates a G(n, p) graph: each unordered pair is linked independently
/// with probability `probability`.
///
/// # Errors
///
/// - `NetworkError::InvalidParameters` - `nodes == 0` or `probability` outside `[0, 1]`
pub fn erdos_renyi<R: Rng + ?Sized>(
    nodes: usize,
    probability: f64,
    rng: &mut R,
) -> Result<CsrGraph, NetworkError> {
    if nodes == 0 {
        return Err(NetworkError::invalid("node count must be positive"));
    }
    if !(0.0..=1.0).contains(&probability) {
        return Err(NetworkError::invalid(format!(
            "edge probability must be in [0, 1], got {probability}"
        )));
    }

    let mut edges = Vec::new();
    for a in 0..nodes as u32 {
        for b in (a + 1)..nodes as u32 {
            if rng.random::<f64>() < probability {
                edges.push((a, b));
            }
        }
    }

    Ok(CsrGraph::from_edges(nodes, &edges)?)
}
