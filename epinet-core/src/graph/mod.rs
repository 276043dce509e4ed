//! Contact graph consumed by the epidemic core.
//!
//! The simulator only needs two things from a graph: how many nodes it has
//! and the neighbor range of each node. [`ContactNetwork`] captures that seam;
//! [`CsrGraph`] is the compressed-adjacency implementation produced by the
//! network generators.

mod csr;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use csr::{CsrGraph, GraphStats};

/// Identifier of a node in a contact graph.
///
/// Valid identifiers for a graph with `n` nodes are `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Creates a node identifier from its zero-based index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the identifier as a `usize` suitable for indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only adjacency structure with O(1) neighbor lookup.
///
/// Implementations must be undirected: if `j` is a neighbor of `i`, then `i`
/// is a neighbor of `j`. Self-loops and duplicate entries are not allowed.
/// The simulator does not re-check these properties on every run.
pub trait ContactNetwork: Send + Sync {
    /// Returns the number of nodes, fixed for the graph's lifetime.
    fn node_count(&self) -> usize;

    /// Returns the neighbors of `node`.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `node` is not below [`node_count`](Self::node_count).
    fn neighbors(&self, node: NodeId) -> &[NodeId];

    /// Returns the number of neighbors of `node`.
    fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Returns true if `node` is a valid identifier for this graph.
    fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }
}

/// Errors raised while building or checking a contact graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge endpoint or neighbor entry referenced a node outside the graph
    #[error("Node {node} out of range for graph with {node_count} nodes")]
    NodeOutOfRange {
        /// Offending node identifier
        node: u32,
        /// Number of nodes in the graph
        node_count: usize,
    },

    /// Offsets array does not describe valid neighbor ranges
    #[error("Malformed adjacency offsets: {reason}")]
    MalformedOffsets {
        /// Description of the inconsistency
        reason: String,
    },

    /// A node lists itself as a neighbor
    #[error("Self-loop on node {node}")]
    SelfLoop {
        /// Node with the self-loop
        node: NodeId,
    },

    /// A neighbor appears more than once in a node's range
    #[error("Duplicate edge {from} - {to}")]
    DuplicateEdge {
        /// Node whose range holds the duplicate
        from: NodeId,
        /// Repeated neighbor
        to: NodeId,
    },

    /// `from` lists `to` as a neighbor but `to` does not list `from`
    #[error("Edge {from} - {to} is not mirrored")]
    AsymmetricEdge {
        /// Node holding the forward entry
        from: NodeId,
        /// Node missing the reverse entry
        to: NodeId,
    },
}
