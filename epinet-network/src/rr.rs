//! Random regular graphs via the configuration model.

use std::collections::HashSet;

use epinet_core::CsrGraph;
use rand::Rng;
use tracing::trace;

use crate::NetworkError;

/// Maximum number of pairing attempts before giving up.
pub const MAX_ATTEMPTS: usize = 1000;

/// Draws per stub pair before an attempt is declared stuck.
const MAX_PAIR_DRAWS: usize = 100;

/// Generates a random `degree`-regular graph on `nodes` nodes.
///
/// Each node gets `degree` stubs. Stubs are paired off by drawing two at
/// random; a draw that would create a self-loop or repeat an edge is
/// discarded and redrawn. An attempt that gets stuck starts over with a fresh
/// stub list, up to [`MAX_ATTEMPTS`] times.
///
/// # Errors
///
/// - `NetworkError::InvalidParameters` - `degree >= nodes` or `nodes * degree` is odd
/// - `NetworkError::GenerationFailed` - No simple pairing was found
pub fn random_regular<R: Rng + ?Sized>(
    nodes: usize,
    degree: usize,
    rng: &mut R,
) -> Result<CsrGraph, NetworkError> {
    if degree >= nodes {
        return Err(NetworkError::invalid(format!(
            "degree ({degree}) must be smaller than node count ({nodes})"
        )));
    }
    if (nodes * degree) % 2 != 0 {
        return Err(NetworkError::invalid(format!(
            "nodes * degree must be even, got {nodes} * {degree}"
        )));
    }

    let edge_count = nodes * degree / 2;
    let mut stubs: Vec<u32> = Vec::with_capacity(nodes * degree);
    let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(edge_count);
    let mut edges: Vec<(u32, u32)> = Vec::with_capacity(edge_count);

    for attempt in 1..=MAX_ATTEMPTS {
        stubs.clear();
        stubs.extend((0..nodes as u32).flat_map(|node| std::iter::repeat_n(node, degree)));
        seen.clear();
        edges.clear();

        if pair_stubs(rng, &mut stubs, &mut seen, &mut edges) {
            trace!(attempt, nodes, degree, "Random regular pairing accepted");
            return Ok(CsrGraph::from_edges(nodes, &edges)?);
        }
    }

    Err(NetworkError::GenerationFailed {
        attempts: MAX_ATTEMPTS,
    })
}

/// Pairs all stubs into simple edges. Returns false if the attempt got stuck.
fn pair_stubs<R: Rng + ?Sized>(
    rng: &mut R,
    stubs: &mut Vec<u32>,
    seen: &mut HashSet<(u32, u32)>,
    edges: &mut Vec<(u32, u32)>,
) -> bool {
    while stubs.len() >= 2 {
        let paired = (0..MAX_PAIR_DRAWS).any(|_| {
            let i = rng.random_range(0..stubs.len());
            let j = rng.random_range(0..stubs.len());
            let (u, v) = (stubs[i], stubs[j]);
            if i == j || u == v || !seen.insert((u.min(v), u.max(v))) {
                return false;
            }
            edges.push((u, v));
            stubs.swap_remove(i.max(j));
            stubs.swap_remove(i.min(j));
            true
        });
        if !paired {
            return false;
        }
    }
    true
}
