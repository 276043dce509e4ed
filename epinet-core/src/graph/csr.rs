//! Compressed sparse row adjacency.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ContactNetwork, GraphError, NodeId};

/// Immutable undirected graph in compressed sparse row form.
///
/// Neighbors of node `i` occupy `neighbors[offsets[i]..offsets[i + 1]]`.
/// Range bounds never change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrGraph {
    offsets: Vec<usize>,
    neighbors: Vec<NodeId>,
}

impl CsrGraph {
    /// Builds a graph from an undirected edge list.
    ///
    /// Each `(a, b)` pair is stored in both endpoints' ranges, in input order.
    /// Self-loops and repeated pairs are kept as given; use
    /// [`check_simple`](Self::check_simple) to reject them.
    ///
    /// # Errors
    ///
    /// - `GraphError::NodeOutOfRange` - An endpoint is not below `node_count`
    pub fn from_edges(node_count: usize, edges: &[(u32, u32)]) -> Result<Self, GraphError> {
        let mut degrees = vec![0usize; node_count];
        for &(a, b) in edges {
            for endpoint in [a, b] {
                if endpoint as usize >= node_count {
                    return Err(GraphError::NodeOutOfRange {
                        node: endpoint,
                        node_count,
                    });
                }
            }
            degrees[a as usize] += 1;
            degrees[b as usize] += 1;
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        for degree in &degrees {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + degree);
        }

        let mut cursor: Vec<usize> = offsets[..node_count].to_vec();
        let mut neighbors = vec![NodeId(0); offsets[node_count]];
        for &(a, b) in edges {
            neighbors[cursor[a as usize]] = NodeId(b);
            cursor[a as usize] += 1;
            neighbors[cursor[b as usize]] = NodeId(a);
            cursor[b as usize] += 1;
        }

        Ok(Self { offsets, neighbors })
    }

    /// Builds a graph from raw CSR arrays.
    ///
    /// `offsets` must have `node_count + 1` non-decreasing entries starting at
    /// zero and ending at `neighbors.len()`.
    ///
    /// # Errors
    ///
    /// - `GraphError::MalformedOffsets` - Offsets do not describe valid ranges
    /// - `GraphError::NodeOutOfRange` - A neighbor entry is not a valid node
    pub fn from_parts(offsets: Vec<usize>, neighbors: Vec<NodeId>) -> Result<Self, GraphError> {
        let Some(&first) = offsets.first() else {
            return Err(GraphError::MalformedOffsets {
                reason: "offsets must contain at least one entry".to_string(),
            });
        };
        if first != 0 {
            return Err(GraphError::MalformedOffsets {
                reason: format!("first offset is {first}, expected 0"),
            });
        }
        if let Some(window) = offsets.windows(2).find(|w| w[0] > w[1]) {
            return Err(GraphError::MalformedOffsets {
                reason: format!("offsets decrease from {} to {}", window[0], window[1]),
            });
        }
        let last = offsets[offsets.len() - 1];
        if last != neighbors.len() {
            return Err(GraphError::MalformedOffsets {
                reason: format!(
                    "last offset is {last} but {} neighbor entries were given",
                    neighbors.len()
                ),
            });
        }

        let node_count = offsets.len() - 1;
        if let Some(bad) = neighbors.iter().find(|n| n.index() >= node_count) {
            return Err(GraphError::NodeOutOfRange {
                node: bad.0,
                node_count,
            });
        }

        Ok(Self { offsets, neighbors })
    }

    /// Builds a graph with `node_count` nodes and no edges.
    pub fn empty(node_count: usize) -> Self {
        Self {
            offsets: vec![0; node_count + 1],
            neighbors: Vec::new(),
        }
    }

    /// Builds the complete graph on `node_count` nodes.
    pub fn complete(node_count: usize) -> Self {
        let degree = node_count.saturating_sub(1);
        let offsets = (0..=node_count).map(|i| i * degree).collect();
        let neighbors = (0..node_count as u32)
            .flat_map(|a| (0..node_count as u32).filter(move |&b| b != a).map(NodeId))
            .collect();
        Self { offsets, neighbors }
    }

    /// Returns the number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.len() / 2
    }

    /// Iterates over all node identifiers.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count() as u32).map(NodeId)
    }

    /// Checks that the graph is undirected with no self-loops or duplicates.
    ///
    /// This is a full scan meant for generators and tests; the simulator
    /// trusts its input.
    ///
    /// # Errors
    ///
    /// - `GraphError::SelfLoop` - A node lists itself
    /// - `GraphError::DuplicateEdge` - A neighbor appears twice in one range
    /// - `GraphError::AsymmetricEdge` - An entry has no reverse entry
    pub fn check_simple(&self) -> Result<(), GraphError> {
        for node in self.nodes() {
            let range = self.neighbors(node);
            if range.contains(&node) {
                return Err(GraphError::SelfLoop { node });
            }
            let mut sorted = range.to_vec();
            sorted.sort_unstable();
            for pair in sorted.windows(2) {
                if pair[0] == pair[1] {
                    return Err(GraphError::DuplicateEdge {
                        from: node,
                        to: pair[0],
                    });
                }
            }
            for &neighbor in range {
                if !self.neighbors(neighbor).contains(&node) {
                    return Err(GraphError::AsymmetricEdge {
                        from: node,
                        to: neighbor,
                    });
                }
            }
        }
        Ok(())
    }

    /// Computes degree statistics for the graph.
    pub fn stats(&self) -> GraphStats {
        let node_count = self.node_count();
        let (min_degree, max_degree) = self
            .nodes()
            .map(|n| self.degree(n))
            .fold((usize::MAX, 0), |(lo, hi), d| (lo.min(d), hi.max(d)));

        GraphStats {
            node_count,
            edge_count: self.edge_count(),
            min_degree: if node_count == 0 { 0 } else { min_degree },
            max_degree,
            mean_degree: if node_count == 0 {
                0.0
            } else {
                self.neighbors.len() as f64 / node_count as f64
            },
        }
    }
}

impl ContactNetwork for CsrGraph {
    fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        let i = node.index();
        &self.neighbors[self.offsets[i]..self.offsets[i + 1]]
    }

    fn degree(&self, node: NodeId) -> usize {
        let i = node.index();
        self.offsets[i + 1] - self.offsets[i]
    }
}

/// Degree summary of a contact graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of nodes
    pub node_count: usize,
    /// Number of undirected edges
    pub edge_count: usize,
    /// Smallest node degree (0 for an empty graph)
    pub min_degree: usize,
    /// Largest node degree
    pub max_degree: usize,
    /// Mean node degree
    pub mean_degree: f64,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes: {}", self.node_count)?;
        writeln!(f, "Edges: {}", self.edge_count)?;
        writeln!(f, "Max degree: {}", self.max_degree)?;
        writeln!(f, "Min degree: {}", self.min_degree)?;
        write!(f, "Mean degree: {:.4}", self.mean_degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> CsrGraph {
        CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap()
    }

    #[test]
    fn test_from_edges_builds_mirrored_ranges() {
        let graph = path_graph();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(NodeId(0)), &[NodeId(1)]);
        assert_eq!(graph.neighbors(NodeId(1)), &[NodeId(0), NodeId(2)]);
        assert_eq!(graph.neighbors(NodeId(3)), &[NodeId(2)]);
        assert!(graph.check_simple().is_ok());
    }

    #[test]
    fn test_from_edges_rejects_out_of_range_endpoint() {
        let result = CsrGraph::from_edges(3, &[(0, 1), (1, 3)]);
        assert_eq!(
            result,
            Err(GraphError::NodeOutOfRange {
                node: 3,
                node_count: 3
            })
        );
    }

    #[test]
    fn test_from_parts_validates_offsets() {
        assert!(matches!(
            CsrGraph::from_parts(vec![], vec![]),
            Err(GraphError::MalformedOffsets { .. })
        ));
        assert!(matches!(
            CsrGraph::from_parts(vec![1, 1], vec![NodeId(0)]),
            Err(GraphError::MalformedOffsets { .. })
        ));
        assert!(matches!(
            CsrGraph::from_parts(vec![0, 2, 1], vec![NodeId(1), NodeId(0)]),
            Err(GraphError::MalformedOffsets { .. })
        ));
        assert!(matches!(
            CsrGraph::from_parts(vec![0, 1, 2], vec![NodeId(1), NodeId(5)]),
            Err(GraphError::NodeOutOfRange { node: 5, .. })
        ));

        let graph = CsrGraph::from_parts(vec![0, 1, 2], vec![NodeId(1), NodeId(0)]).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_check_simple_detects_defects() {
        let self_loop = CsrGraph::from_edges(2, &[(1, 1)]).unwrap();
        assert_eq!(
            self_loop.check_simple(),
            Err(GraphError::SelfLoop { node: NodeId(1) })
        );

        let duplicate = CsrGraph::from_edges(2, &[(0, 1), (0, 1)]).unwrap();
        assert!(matches!(
            duplicate.check_simple(),
            Err(GraphError::DuplicateEdge { .. })
        ));

        let one_way = CsrGraph::from_parts(vec![0, 1, 1], vec![NodeId(1)]).unwrap();
        assert_eq!(
            one_way.check_simple(),
            Err(GraphError::AsymmetricEdge {
                from: NodeId(0),
                to: NodeId(1)
            })
        );
    }

    #[test]
    fn test_complete_graph_degrees() {
        let graph = CsrGraph::complete(5);
        assert_eq!(graph.edge_count(), 10);
        assert!(graph.nodes().all(|n| graph.degree(n) == 4));
        assert!(graph.check_simple().is_ok());
    }

    #[test]
    fn test_stats() {
        let stats = path_graph().stats();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.min_degree, 1);
        assert_eq!(stats.max_degree, 2);
        assert!((stats.mean_degree - 1.5).abs() < 1e-12);

        let empty = CsrGraph::empty(0).stats();
        assert_eq!(empty.min_degree, 0);
        assert_eq!(empty.mean_degree, 0.0);
    }
}
