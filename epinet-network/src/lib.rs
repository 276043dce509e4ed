//! Epinet Network - random contact network generators
//!
//! Builds [`CsrGraph`] instances from three random graph models:
//! preferential attachment (Barabási–Albert), independent edges
//! (Erdős–Rényi) and random regular graphs (configuration model).
//! Every generator is driven by a caller-supplied RNG; [`NetworkSpec`]
//! wraps them behind a seed for reproducible construction.
#![warn(missing_docs)]

pub mod ba;
pub mod er;
pub mod rr;

use std::fmt;
use std::str::FromStr;

use epinet_core::{ContactNetwork, CsrGraph, EpinetError, GraphError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use ba::barabasi_albert;
pub use er::erdos_renyi;
pub use rr::{MAX_ATTEMPTS, random_regular};

/// Errors raised by network generators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    /// Generator parameters are out of their valid range
    #[error("Invalid network parameters: {reason}")]
    InvalidParameters {
        /// Which constraint was violated
        reason: String,
    },

    /// Random construction did not produce a simple graph in time
    #[error("Network generation failed after {attempts} attempts")]
    GenerationFailed {
        /// Number of attempts made
        attempts: usize,
    },

    /// Generated edges could not be assembled into a graph
    #[error("Graph assembly failed: {0}")]
    Graph(#[from] GraphError),
}

impl NetworkError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        NetworkError::InvalidParameters {
            reason: reason.into(),
        }
    }
}

impl From<NetworkError> for EpinetError {
    fn from(error: NetworkError) -> Self {
        match error {
            NetworkError::Graph(e) => EpinetError::Graph(e),
            other => EpinetError::Network {
                reason: other.to_string(),
            },
        }
    }
}

/// Random graph model.
///
/// Numeric codes follow the order BA = 0, ER = 1, RR = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NetworkKind {
    /// Barabási–Albert preferential attachment
    Ba,
    /// Erdős–Rényi independent edges
    Er,
    /// Random regular graph
    Rr,
}

impl NetworkKind {
    /// All kinds in code order.
    pub const ALL: [NetworkKind; 3] = [NetworkKind::Ba, NetworkKind::Er, NetworkKind::Rr];

    /// Returns the numeric code of this kind.
    pub fn code(self) -> u8 {
        match self {
            NetworkKind::Ba => 0,
            NetworkKind::Er => 1,
            NetworkKind::Rr => 2,
        }
    }

    /// Looks up a kind by numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Returns the short upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkKind::Ba => "BA",
            NetworkKind::Er => "ER",
            NetworkKind::Rr => "RR",
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkKind {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BA" | "0" => Ok(NetworkKind::Ba),
            "ER" | "1" => Ok(NetworkKind::Er),
            "RR" | "2" => Ok(NetworkKind::Rr),
            _ => Err(NetworkError::invalid(format!("unknown network type: {s}"))),
        }
    }
}

/// Fully parameterized network model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetworkSpec {
    /// Barabási–Albert graph grown from a complete seed graph
    BarabasiAlbert {
        /// Total number of nodes
        nodes: usize,
        /// Size of the initial complete graph (m0)
        initial_nodes: usize,
        /// Edges added with each new node (m)
        edges_per_node: usize,
    },
    /// Erdős–Rényi G(n, p) graph
    ErdosRenyi {
        /// Number of nodes
        nodes: usize,
        /// Independent edge probability
        probability: f64,
    },
    /// Random k-regular graph
    RandomRegular {
        /// Number of nodes
        nodes: usize,
        /// Degree of every node
        degree: usize,
    },
}

impl NetworkSpec {
    /// Returns the model kind.
    pub fn kind(&self) -> NetworkKind {
        match self {
            NetworkSpec::BarabasiAlbert { .. } => NetworkKind::Ba,
            NetworkSpec::ErdosRenyi { .. } => NetworkKind::Er,
            NetworkSpec::RandomRegular { .. } => NetworkKind::Rr,
        }
    }

    /// Returns the number of nodes the generated graph will have.
    pub fn node_count(&self) -> usize {
        match *self {
            NetworkSpec::BarabasiAlbert { nodes, .. }
            | NetworkSpec::ErdosRenyi { nodes, .. }
            | NetworkSpec::RandomRegular { nodes, .. } => nodes,
        }
    }

    /// Generates the graph with a ChaCha8 RNG seeded from `seed`.
    ///
    /// # Errors
    ///
    /// - `NetworkError::InvalidParameters` - Parameters out of range for the model
    /// - `NetworkError::GenerationFailed` - Random regular construction gave up
    pub fn generate(&self, seed: u64) -> Result<CsrGraph, NetworkError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph = match *self {
            NetworkSpec::BarabasiAlbert {
                nodes,
                initial_nodes,
                edges_per_node,
            } => barabasi_albert(nodes, initial_nodes, edges_per_node, &mut rng)?,
            NetworkSpec::ErdosRenyi { nodes, probability } => {
                erdos_renyi(nodes, probability, &mut rng)?
            }
            NetworkSpec::RandomRegular { nodes, degree } => {
                random_regular(nodes, degree, &mut rng)?
            }
        };

        debug!(
            kind = %self.kind(),
            seed,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Generated network"
        );
        Ok(graph)
    }
}

impl fmt::Display for NetworkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkSpec::BarabasiAlbert {
                nodes,
                initial_nodes,
                edges_per_node,
            } => write!(f, "BA(n={nodes}, m0={initial_nodes}, m={edges_per_node})"),
            NetworkSpec::ErdosRenyi { nodes, probability } => {
                write!(f, "ER(n={nodes}, p={probability})")
            }
            NetworkSpec::RandomRegular { nodes, degree } => {
                write!(f, "RR(n={nodes}, k={degree})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_kind_codes_and_parsing() {
        for kind in NetworkKind::ALL {
            assert_eq!(NetworkKind::from_code(kind.code()), Some(kind));
            assert_eq!(kind.as_str().parse::<NetworkKind>(), Ok(kind));
        }
        assert_eq!("er".parse::<NetworkKind>(), Ok(NetworkKind::Er));
        assert_eq!("2".parse::<NetworkKind>(), Ok(NetworkKind::Rr));
        assert!("ws".parse::<NetworkKind>().is_err());
        assert_eq!(NetworkKind::from_code(3), None);
    }

    #[test]
    fn test_spec_generate_is_deterministic() {
        let spec = NetworkSpec::ErdosRenyi {
            nodes: 50,
            probability: 0.1,
        };
        assert_eq!(spec.generate(7).unwrap(), spec.generate(7).unwrap());
        assert_eq!(spec.kind(), NetworkKind::Er);
        assert_eq!(spec.node_count(), 50);
    }

    #[test]
    fn test_spec_generate_each_kind() {
        let specs = [
            NetworkSpec::BarabasiAlbert {
                nodes: 40,
                initial_nodes: 5,
                edges_per_node: 2,
            },
            NetworkSpec::ErdosRenyi {
                nodes: 40,
                probability: 0.2,
            },
            NetworkSpec::RandomRegular {
                nodes: 40,
                degree: 4,
            },
        ];
        for spec in specs {
            let graph = spec.generate(11).unwrap();
            assert_eq!(graph.node_count(), 40);
            assert!(graph.check_simple().is_ok(), "{spec} is not simple");
        }
    }

    #[test]
    fn test_spec_serde_tagging() {
        let spec: NetworkSpec =
            serde_json::from_str(r#"{"type":"random_regular","nodes":10,"degree":3}"#).unwrap();
        assert_eq!(spec, NetworkSpec::RandomRegular { nodes: 10, degree: 3 });
        assert_eq!(spec.to_string(), "RR(n=10, k=3)");
    }

    #[test]
    fn test_error_converts_to_umbrella() {
        let error: EpinetError = NetworkError::GenerationFailed { attempts: 1000 }.into();
        assert!(matches!(error, EpinetError::Network { .. }));
        assert!(error.is_user_error());
    }

    proptest! {
        #[test]
        fn generated_graphs_are_simple(
            nodes in 3usize..60,
            probability in 0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let specs = [
                NetworkSpec::BarabasiAlbert { nodes, initial_nodes: 3, edges_per_node: 2 },
                NetworkSpec::ErdosRenyi { nodes, probability },
                NetworkSpec::RandomRegular { nodes, degree: 2 },
            ];
            for spec in specs {
                let graph = spec.generate(seed).unwrap();
                prop_assert_eq!(graph.node_count(), nodes);
                prop_assert!(graph.check_simple().is_ok());
            }
        }
    }
}
