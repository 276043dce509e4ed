//! Epinet Core - exact stochastic epidemic simulation on contact networks
//!
//! This crate provides the contact graph adapter, the event-driven
//! Gillespie simulator with incremental rate bookkeeping, run configuration,
//! and shared tracing setup. Network generation and persistence live in
//! sibling crates.
#![warn(missing_docs)]

pub mod config;
pub mod epidemic;
pub mod graph;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::SimulationConfig;
pub use epidemic::{
    EpidemicSimulation, SimulationError, SimulationReport, Termination, Trajectory,
    TrajectoryPoint, run_simulation, simulate_ensemble,
};
pub use graph::{ContactNetwork, CsrGraph, GraphError, GraphStats, NodeId};

/// Errors that can bubble up from any epinet subsystem.
#[derive(Debug, thiserror::Error)]
pub enum EpinetError {
    /// Graph construction or validation failed
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Simulation setup or run failed
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// Network generation failed
    #[error("Network generation error: {reason}")]
    Network {
        /// Generator failure description
        reason: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {reason}")]
    Configuration {
        /// What is wrong with the configuration
        reason: String,
    },

    /// Output could not be encoded
    #[error("Serialization error: {reason}")]
    Serialization {
        /// Encoder failure description
        reason: String,
    },

    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EpinetError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            EpinetError::Simulation(e) => match e {
                SimulationError::InvalidRate { name, value } => {
                    format!("Invalid {name} {value}: rates must be finite and non-negative")
                }
                SimulationError::InvalidHorizon { horizon } => {
                    format!("Invalid time horizon {horizon}: must be finite and positive")
                }
                SimulationError::EmptyInitialInfection => {
                    "At least one initially infected node is required".to_string()
                }
                SimulationError::NodeOutOfRange { node, node_count } => {
                    format!("Node {node} does not exist in a network of {node_count} nodes")
                }
                _ => "Simulation error occurred".to_string(),
            },
            EpinetError::Graph(_) => "Invalid contact network".to_string(),
            EpinetError::Network { reason } => format!("Could not generate network: {reason}"),
            EpinetError::Configuration { reason } => format!("Configuration error: {reason}"),
            EpinetError::Serialization { .. } => "Could not encode output".to_string(),
            EpinetError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            EpinetError::Configuration { .. }
                | EpinetError::Network { .. }
                | EpinetError::Simulation(
                    SimulationError::InvalidRate { .. }
                        | SimulationError::InvalidHorizon { .. }
                        | SimulationError::EmptyInitialInfection
                        | SimulationError::NodeOutOfRange { .. }
                )
        )
    }
}

/// Result alias over [`EpinetError`].
pub type Result<T> = std::result::Result<T, EpinetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_classified() {
        let error: EpinetError = SimulationError::EmptyInitialInfection.into();
        assert!(error.is_user_error());
        assert!(error.user_message().contains("initially infected"));

        let error: EpinetError = SimulationError::TooManyInvariantViolations { count: 10 }.into();
        assert!(!error.is_user_error());

        let error = EpinetError::Configuration {
            reason: "missing sizes".to_string(),
        };
        assert!(error.is_user_error());
        assert_eq!(error.user_message(), "Configuration error: missing sizes");
    }
}
