//! CLI command implementations

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use epinet_core::graph::NodeId;
use epinet_core::{
    ContactNetwork, CsrGraph, EpinetError, Result, SimulationConfig, SimulationReport,
    Termination, TrajectoryPoint, run_simulation,
};
use epinet_network::{NetworkKind, NetworkSpec};
use serde::Serialize;
use tracing::info;

use crate::batch::{self, SweepConfig};
use crate::summary::RunSummary;
use crate::writer::{self, SystemStatus};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a network and run one simulation
    Run {
        #[command(flatten)]
        network: NetworkArgs,
        /// Transmission rate per infected neighbor (τ)
        #[arg(long, default_value = "0.3")]
        tau: f64,
        /// Recovery rate per infected node (γ)
        #[arg(long, default_value = "0.1")]
        gamma: f64,
        /// Simulated time horizon
        #[arg(long, default_value = "50.0")]
        max_time: f64,
        /// Number of initially infected nodes
        #[arg(short, long, default_value = "1")]
        initial: usize,
        /// Simulation seed; also picks the initial infected nodes
        #[arg(long)]
        seed: Option<u64>,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Run a parameter sweep and write params, results and status files
    Batch {
        /// Sweep configuration in TOML; defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = "data/sim1")]
        output: PathBuf,
        /// Override samples per parameter combination
        #[arg(long)]
        samples: Option<usize>,
    },
    /// Generate a network and print its statistics
    GraphInfo {
        #[command(flatten)]
        network: NetworkArgs,
        /// Also list every node's neighbors
        #[arg(long)]
        neighbors: bool,
    },
}

/// Network model selection shared by commands.
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// Network model: BA, ER or RR
    #[arg(short = 't', long = "network", default_value = "BA")]
    pub kind: NetworkKind,
    /// Number of nodes
    #[arg(short = 'n', long, default_value = "100")]
    pub nodes: usize,
    /// BA initial complete graph size
    #[arg(long, default_value = "5")]
    pub m0: usize,
    /// BA edges per new node
    #[arg(long, default_value = "2")]
    pub m: usize,
    /// ER edge probability
    #[arg(short, long, default_value = "0.1")]
    pub probability: f64,
    /// RR node degree
    #[arg(short = 'k', long, default_value = "4")]
    pub degree: usize,
    /// Seed of the network generator
    #[arg(long, default_value = "42")]
    pub network_seed: u64,
}

impl NetworkArgs {
    /// Builds the network model selected by the arguments.
    pub fn spec(&self) -> NetworkSpec {
        match self.kind {
            NetworkKind::Ba => NetworkSpec::BarabasiAlbert {
                nodes: self.nodes,
                initial_nodes: self.m0,
                edges_per_node: self.m,
            },
            NetworkKind::Er => NetworkSpec::ErdosRenyi {
                nodes: self.nodes,
                probability: self.probability,
            },
            NetworkKind::Rr => NetworkSpec::RandomRegular {
                nodes: self.nodes,
                degree: self.degree,
            },
        }
    }

    fn generate(&self) -> Result<CsrGraph> {
        let spec = self.spec();
        info!(network = %spec, seed = self.network_seed, "Generating network");
        Ok(spec.generate(self.network_seed)?)
    }
}

/// Output format of the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            network,
            tau,
            gamma,
            max_time,
            initial,
            seed,
            format,
        } => {
            let config = SimulationConfig {
                transmission_rate: tau,
                recovery_rate: gamma,
                horizon: max_time,
                deterministic_seed: seed,
            };
            run_single(&network, config, initial, format)
        }
        Commands::Batch {
            config,
            output,
            samples,
        } => run_batch(config.as_deref(), &output, samples),
        Commands::GraphInfo { network, neighbors } => show_graph_info(&network, neighbors),
    }
}

#[derive(Serialize)]
struct RunOutput<'a> {
    seed: u64,
    termination: Termination,
    summary: RunSummary,
    trajectory: &'a [TrajectoryPoint],
}

/// Generate a network and run one simulation
///
/// Initial infected nodes are drawn from the simulation seed, or from a
/// fresh seed when none is given.
///
/// # Errors
/// - `EpinetError::Network` - Network parameters are invalid
/// - `EpinetError::Simulation` - Rates, horizon or initial count are invalid
/// - `EpinetError::Serialization` - JSON output failed
pub fn run_single(
    network: &NetworkArgs,
    mut config: SimulationConfig,
    initial: usize,
    format: OutputFormat,
) -> Result<()> {
    let graph = network.generate()?;

    let seed = config.deterministic_seed.unwrap_or_else(rand::random);
    config.deterministic_seed = Some(seed);
    if initial > graph.node_count() {
        return Err(EpinetError::Configuration {
            reason: format!(
                "cannot infect {initial} nodes in a network of {}",
                graph.node_count()
            ),
        });
    }
    let initial_nodes = batch::choose_initial(graph.node_count(), initial, seed);

    let report = run_simulation(&graph, config, &initial_nodes)?;
    let summary = RunSummary::from_trajectory(&report.trajectory);

    match format {
        OutputFormat::Table => print_table(&report, &summary, &initial_nodes),
        OutputFormat::Json => {
            let output = RunOutput {
                seed: report.seed,
                termination: report.termination,
                summary,
                trajectory: report.trajectory.points(),
            };
            let json = serde_json::to_string_pretty(&output).map_err(|e| {
                EpinetError::Serialization {
                    reason: e.to_string(),
                }
            })?;
            println!("{json}");
        }
    }

    Ok(())
}

fn print_table(report: &SimulationReport, summary: &RunSummary, initial: &[NodeId]) {
    let initial: Vec<String> = initial.iter().map(ToString::to_string).collect();
    println!("Initial infected: {}", initial.join(", "));
    println!("{:>12} {:>12} {:>10}", "time", "susceptible", "infected");
    println!("{:-<36}", "");
    for point in &report.trajectory {
        println!(
            "{:>12.6} {:>12} {:>10}",
            point.time, point.susceptible, point.infected
        );
    }
    println!();
    println!("Seed: {}", report.seed);
    println!("Termination: {:?}", report.termination);
    println!("{summary}");
}

/// Run a parameter sweep and persist its outputs
///
/// # Errors
/// - `EpinetError::Configuration` - Sweep file is missing, malformed or invalid
/// - `EpinetError::Io` - Output files cannot be written
/// - Any run failure, converted from the batch error
pub fn run_batch(config: Option<&Path>, output: &Path, samples: Option<usize>) -> Result<()> {
    let mut sweep = match config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::default(),
    };
    if let Some(samples) = samples {
        sweep.samples_per_config = samples;
    }

    println!("Batch simulation: {} runs", sweep.run_count());
    writer::write_params(output, &sweep)?;

    let records = batch::run_sweep(&sweep)?;
    let results_path = writer::write_results(output, &records)?;
    writer::write_status(output, &SystemStatus::collect())?;

    println!(
        "Batch simulation complete: {} runs written to {}",
        records.len(),
        results_path.display()
    );
    Ok(())
}

/// Generate a network and print its statistics
///
/// # Errors
/// - `EpinetError::Network` - Network parameters are invalid
pub fn show_graph_info(network: &NetworkArgs, neighbors: bool) -> Result<()> {
    let graph = network.generate()?;

    println!("Network: {}", network.spec());
    println!("{}", graph.stats());

    if neighbors {
        println!();
        for node in graph.nodes() {
            let list: Vec<String> = graph.neighbors(node).iter().map(ToString::to_string).collect();
            println!("{node}: {}", list.join(" "));
        }
    }
    Ok(())
}
