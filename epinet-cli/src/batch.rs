//! Parameter sweeps over networks and epidemic rates.
//!
//! A sweep is the cartesian product of network kinds, sizes, transmission
//! rates, recovery rates and initial infection counts, repeated
//! `samples_per_config` times. Every run gets a 1-based id in sweep order;
//! the id seeds the network, the initial infected set and the simulation, so
//! any single run can be reproduced in isolation.

use std::path::Path;
use std::time::Instant;

use epinet_core::graph::NodeId;
use epinet_core::{EpinetError, SimulationConfig, SimulationError, run_simulation};
use epinet_network::{NetworkError, NetworkKind, NetworkSpec};
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::summary::RunSummary;

/// Errors that can occur while configuring or running a sweep.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Sweep configuration is unusable
    #[error("Invalid sweep configuration: {reason}")]
    InvalidSweep {
        /// What is wrong with the configuration
        reason: String,
    },

    /// Sweep file is not valid TOML for a sweep
    #[error("Failed to parse sweep configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Network generation failed for a run
    #[error("Run {run_id}: {source}")]
    Network {
        /// Failing run
        run_id: u64,
        /// Generator error
        source: NetworkError,
    },

    /// Simulation failed for a run
    #[error("Run {run_id}: {source}")]
    Simulation {
        /// Failing run
        run_id: u64,
        /// Simulation error
        source: SimulationError,
    },

    /// Output could not be encoded
    #[error("Failed to encode {file}: {reason}")]
    Serialization {
        /// File being written
        file: &'static str,
        /// Encoder failure description
        reason: String,
    },

    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BatchError> for EpinetError {
    fn from(error: BatchError) -> Self {
        match error {
            BatchError::InvalidSweep { .. } | BatchError::Parse(_) => EpinetError::Configuration {
                reason: error.to_string(),
            },
            BatchError::Network { source, .. } => source.into(),
            BatchError::Simulation { source, .. } => EpinetError::Simulation(source),
            BatchError::Serialization { .. } => EpinetError::Serialization {
                reason: error.to_string(),
            },
            BatchError::Io(e) => EpinetError::Io(e),
        }
    }
}

/// Sweep parameters.
///
/// Missing fields in a TOML file take the default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Network models to sweep
    pub network_types: Vec<NetworkKind>,
    /// Node counts to sweep
    pub network_sizes: Vec<usize>,
    /// BA initial complete graph size (m0)
    pub ba_m0: usize,
    /// BA edges per new node (m)
    pub ba_m: usize,
    /// Candidate ER edge probabilities
    pub er_probabilities: Vec<f64>,
    /// Candidate RR degrees
    pub rr_degrees: Vec<usize>,
    /// Transmission rates (τ) to sweep
    pub transmission_rates: Vec<f64>,
    /// Recovery rates (γ) to sweep
    pub recovery_rates: Vec<f64>,
    /// Initial infected counts to sweep
    pub initial_infections: Vec<usize>,
    /// Horizon of every run
    pub max_time: f64,
    /// Repetitions of each parameter combination
    pub samples_per_config: usize,
    /// Seed for picking ER probabilities and RR degrees from their lists
    pub parameter_seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            network_types: NetworkKind::ALL.to_vec(),
            network_sizes: vec![50, 100, 200],
            ba_m0: 5,
            ba_m: 2,
            er_probabilities: vec![0.05, 0.1, 0.15],
            rr_degrees: vec![3, 4, 6],
            transmission_rates: vec![0.2, 0.3, 0.4, 0.5],
            recovery_rates: vec![0.1, 0.15, 0.2, 0.25],
            initial_infections: vec![1, 2, 3, 5],
            max_time: 50.0,
            samples_per_config: 10,
            parameter_seed: 42,
        }
    }
}

impl SweepConfig {
    /// Parses and validates a sweep from TOML text.
    ///
    /// # Errors
    /// - `BatchError::Parse` - Text is not a valid sweep
    /// - `BatchError::InvalidSweep` - Values are out of range
    pub fn from_toml_str(text: &str) -> Result<Self, BatchError> {
        let config: SweepConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a sweep from a TOML file.
    ///
    /// # Errors
    /// - `BatchError::Io` - File cannot be read
    /// - `BatchError::Parse` - File is not a valid sweep
    /// - `BatchError::InvalidSweep` - Values are out of range
    pub fn load(path: &Path) -> Result<Self, BatchError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that every run of the sweep can be set up.
    ///
    /// # Errors
    /// - `BatchError::InvalidSweep` - A list is empty or a value is out of range
    pub fn validate(&self) -> Result<(), BatchError> {
        let empty = [
            ("network_types", self.network_types.is_empty()),
            ("network_sizes", self.network_sizes.is_empty()),
            ("transmission_rates", self.transmission_rates.is_empty()),
            ("recovery_rates", self.recovery_rates.is_empty()),
            ("initial_infections", self.initial_infections.is_empty()),
            (
                "er_probabilities",
                self.er_probabilities.is_empty() && self.network_types.contains(&NetworkKind::Er),
            ),
            (
                "rr_degrees",
                self.rr_degrees.is_empty() && self.network_types.contains(&NetworkKind::Rr),
            ),
        ];
        if let Some((name, _)) = empty.iter().find(|(_, is_empty)| *is_empty) {
            return Err(invalid(format!("{name} must not be empty")));
        }
        if self.samples_per_config == 0 {
            return Err(invalid("samples_per_config must be positive"));
        }

        let smallest = self.network_sizes.iter().copied().min().unwrap_or(0);
        if let Some(&count) = self.initial_infections.iter().find(|&&c| c == 0 || c > smallest) {
            return Err(invalid(format!(
                "initial infection count {count} must be in 1..={smallest}"
            )));
        }

        for &tau in &self.transmission_rates {
            for &gamma in &self.recovery_rates {
                SimulationConfig::new(tau, gamma, self.max_time)
                    .validate()
                    .map_err(|e| invalid(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Returns the total number of runs in the sweep.
    pub fn run_count(&self) -> usize {
        self.network_types.len()
            * self.network_sizes.len()
            * self.transmission_rates.len()
            * self.recovery_rates.len()
            * self.initial_infections.len()
            * self.samples_per_config
    }

    /// Expands the sweep into run plans in run-id order.
    pub fn plans(&self) -> Vec<RunPlan> {
        let mut plans = Vec::with_capacity(self.run_count());
        let mut run_id = 0u64;
        for &network_type in &self.network_types {
            for &network_size in &self.network_sizes {
                for &transmission_rate in &self.transmission_rates {
                    for &recovery_rate in &self.recovery_rates {
                        for &initial_infections in &self.initial_infections {
                            for sample in 1..=self.samples_per_config {
                                run_id += 1;
                                plans.push(RunPlan {
                                    run_id,
                                    network_type,
                                    network_size,
                                    transmission_rate,
                                    recovery_rate,
                                    initial_infections,
                                    sample,
                                });
                            }
                        }
                    }
                }
            }
        }
        plans
    }

    /// Builds the network model for a kind and size.
    ///
    /// ER probability and RR degree are drawn from their lists with a fresh
    /// RNG seeded by `parameter_seed`, so every run of a sweep uses the same
    /// pick.
    pub fn network_spec(&self, kind: NetworkKind, nodes: usize) -> NetworkSpec {
        let mut rng = ChaCha8Rng::seed_from_u64(self.parameter_seed);
        match kind {
            NetworkKind::Ba => NetworkSpec::BarabasiAlbert {
                nodes,
                initial_nodes: self.ba_m0,
                edges_per_node: self.ba_m,
            },
            NetworkKind::Er => NetworkSpec::ErdosRenyi {
                nodes,
                probability: self.er_probabilities.choose(&mut rng).copied().unwrap_or(0.0),
            },
            NetworkKind::Rr => NetworkSpec::RandomRegular {
                nodes,
                degree: self.rr_degrees.choose(&mut rng).copied().unwrap_or(0),
            },
        }
    }
}

fn invalid(reason: impl Into<String>) -> BatchError {
    BatchError::InvalidSweep {
        reason: reason.into(),
    }
}

/// One point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunPlan {
    /// 1-based run identifier, also the seed of the run
    pub run_id: u64,
    /// Network model
    pub network_type: NetworkKind,
    /// Node count
    pub network_size: usize,
    /// Transmission rate (τ)
    pub transmission_rate: f64,
    /// Recovery rate (γ)
    pub recovery_rate: f64,
    /// Number of initially infected nodes
    pub initial_infections: usize,
    /// 1-based repetition index within the parameter combination
    pub sample: usize,
}

/// Outcome of one run, one row of `results.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run identifier
    pub run_id: u64,
    /// Transmission rate (τ)
    pub transmission_rate: f64,
    /// Recovery rate (γ)
    pub recovery_rate: f64,
    /// Network model
    pub network_type: NetworkKind,
    /// Node count
    pub network_size: usize,
    /// Number of initially infected nodes
    pub initial_infections: usize,
    /// Horizon of the run
    pub max_time: f64,
    /// Trajectory statistics
    pub summary: RunSummary,
    /// Wall-clock seconds spent generating the network and simulating
    pub simulation_time: f64,
}

/// Picks `count` distinct nodes out of `node_count`, seeded by `seed`.
///
/// `count` is clamped to `node_count`.
pub fn choose_initial(node_count: usize, count: usize, seed: u64) -> Vec<NodeId> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, node_count, count.min(node_count))
        .into_iter()
        .map(|i| NodeId(i as u32))
        .collect()
}

/// Executes one planned run.
///
/// # Errors
/// - `BatchError::Network` - Network generation failed
/// - `BatchError::Simulation` - Simulation setup or run failed
pub fn execute_run(sweep: &SweepConfig, plan: &RunPlan) -> Result<RunRecord, BatchError> {
    let started = Instant::now();
    let run_id = plan.run_id;

    let graph = sweep
        .network_spec(plan.network_type, plan.network_size)
        .generate(run_id)
        .map_err(|source| BatchError::Network { run_id, source })?;
    let initial = choose_initial(plan.network_size, plan.initial_infections, run_id);
    let config = SimulationConfig::new(plan.transmission_rate, plan.recovery_rate, sweep.max_time)
        .with_seed(run_id);

    let report = run_simulation(&graph, config, &initial)
        .map_err(|source| BatchError::Simulation { run_id, source })?;
    let summary = RunSummary::from_trajectory(&report.trajectory);

    debug!(
        run_id,
        termination = ?report.termination,
        peak_infected = summary.peak_infected,
        events = summary.total_events,
        "Run finished"
    );

    Ok(RunRecord {
        run_id,
        transmission_rate: plan.transmission_rate,
        recovery_rate: plan.recovery_rate,
        network_type: plan.network_type,
        network_size: plan.network_size,
        initial_infections: plan.initial_infections,
        max_time: sweep.max_time,
        summary,
        simulation_time: started.elapsed().as_secs_f64(),
    })
}

/// Runs the whole sweep in parallel.
///
/// Results come back in run-id order regardless of scheduling. The first
/// failing run aborts the sweep.
///
/// # Errors
/// - `BatchError::InvalidSweep` - Configuration failed validation
/// - `BatchError::Network` / `BatchError::Simulation` - A run failed
pub fn run_sweep(sweep: &SweepConfig) -> Result<Vec<RunRecord>, BatchError> {
    sweep.validate()?;
    let plans = sweep.plans();
    info!(runs = plans.len(), "Starting sweep");

    let started = Instant::now();
    let records = plans
        .par_iter()
        .map(|plan| {
            info!(
                run_id = plan.run_id,
                network = %plan.network_type,
                nodes = plan.network_size,
                tau = plan.transmission_rate,
                gamma = plan.recovery_rate,
                initial = plan.initial_infections,
                sample = plan.sample,
                "Running"
            );
            execute_run(sweep, plan)
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        runs = records.len(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Sweep finished"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_sweep() -> SweepConfig {
        SweepConfig {
            network_types: vec![NetworkKind::Ba, NetworkKind::Rr],
            network_sizes: vec![20, 30],
            er_probabilities: vec![],
            rr_degrees: vec![4],
            transmission_rates: vec![0.3],
            recovery_rates: vec![0.1, 0.2],
            initial_infections: vec![1, 3],
            max_time: 5.0,
            samples_per_config: 2,
            ..SweepConfig::default()
        }
    }

    #[test]
    fn test_default_sweep_matches_reference_size() {
        let sweep = SweepConfig::default();
        assert!(sweep.validate().is_ok());
        assert_eq!(sweep.run_count(), 3 * 3 * 4 * 4 * 4 * 10);
    }

    #[test]
    fn test_plans_are_numbered_in_sweep_order() {
        let sweep = small_sweep();
        let plans = sweep.plans();

        assert_eq!(plans.len(), sweep.run_count());
        assert_eq!(plans.len(), 2 * 2 * 1 * 2 * 2 * 2);
        for (i, plan) in plans.iter().enumerate() {
            assert_eq!(plan.run_id, i as u64 + 1);
        }
        assert_eq!(plans[0].network_type, NetworkKind::Ba);
        assert_eq!(plans[0].sample, 1);
        assert_eq!(plans[1].sample, 2);
        assert_eq!(plans[2].initial_infections, 3);
        assert_eq!(plans.last().map(|p| p.network_type), Some(NetworkKind::Rr));
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let sweep = SweepConfig::from_toml_str(
            r#"
            network_types = ["ER"]
            network_sizes = [40]
            samples_per_config = 1
            "#,
        )
        .unwrap();

        assert_eq!(sweep.network_types, vec![NetworkKind::Er]);
        assert_eq!(sweep.network_sizes, vec![40]);
        assert_eq!(sweep.transmission_rates, vec![0.2, 0.3, 0.4, 0.5]);
        assert_eq!(sweep.max_time, 50.0);
    }

    #[test]
    fn test_validate_rejects_bad_sweeps() {
        let mut sweep = small_sweep();
        sweep.initial_infections = vec![25];
        assert!(matches!(sweep.validate(), Err(BatchError::InvalidSweep { .. })));

        let mut sweep = small_sweep();
        sweep.recovery_rates = vec![-0.1];
        assert!(matches!(sweep.validate(), Err(BatchError::InvalidSweep { .. })));

        let mut sweep = small_sweep();
        sweep.network_types.push(NetworkKind::Er);
        assert!(matches!(sweep.validate(), Err(BatchError::InvalidSweep { .. })));

        assert!(matches!(
            SweepConfig::from_toml_str("network_sizes = \"many\""),
            Err(BatchError::Parse(_))
        ));
    }

    #[test]
    fn test_network_spec_uses_fixed_pick() {
        let sweep = SweepConfig::default();
        let first = sweep.network_spec(NetworkKind::Rr, 100);
        let second = sweep.network_spec(NetworkKind::Rr, 100);
        assert_eq!(first, second);
        assert!(matches!(
            first,
            NetworkSpec::RandomRegular { nodes: 100, degree } if [3, 4, 6].contains(&degree)
        ));
    }

    #[test]
    fn test_choose_initial_is_distinct_and_seeded() {
        let a = choose_initial(50, 5, 17);
        let b = choose_initial(50, 5, 17);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
        assert!(a.iter().all(|n| n.index() < 50));
        assert_eq!(choose_initial(3, 10, 0).len(), 3);
    }

    #[test]
    fn test_run_sweep_is_ordered_and_reproducible() {
        let sweep = small_sweep();
        let first = run_sweep(&sweep).unwrap();
        let second = run_sweep(&sweep).unwrap();

        assert_eq!(first.len(), sweep.run_count());
        for (i, (a, b)) in first.iter().zip(&second).enumerate() {
            assert_eq!(a.run_id, i as u64 + 1);
            assert_eq!(a.summary, b.summary);
            assert!(a.summary.peak_infected >= a.initial_infections);
            assert!(a.summary.final_time <= sweep.max_time);
        }
    }

    #[test]
    fn test_batch_error_maps_to_umbrella() {
        let error: EpinetError = invalid("bad").into();
        assert!(error.is_user_error());

        let error: EpinetError = BatchError::Simulation {
            run_id: 3,
            source: SimulationError::EmptyInitialInfection,
        }
        .into();
        assert!(matches!(error, EpinetError::Simulation(_)));
    }
}
