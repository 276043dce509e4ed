//! Command-line interface and batch runner for epinet
//!
//! Generates contact networks, runs single simulations or whole parameter
//! sweeps, and writes sweep outputs to disk.

pub mod batch;
pub mod commands;
pub mod summary;
pub mod writer;

use std::path::PathBuf;

use clap::Parser;
use epinet_core::tracing_setup::CliLogLevel;

pub use commands::Commands;

/// Main CLI structure for epinet.
///
/// Defines global logging options and the subcommands.
#[derive(Parser)]
#[command(name = "epinet")]
#[command(about = "Exact stochastic epidemic simulation on contact networks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Console log level
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: CliLogLevel,

    /// Directory for the full trace log of the last run
    #[arg(long, global = true)]
    pub logs_dir: Option<PathBuf>,
}
