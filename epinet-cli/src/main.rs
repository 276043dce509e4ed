//! Epinet CLI - command-line entry point

use anyhow::Context;
use clap::Parser;
use epinet_cli::Cli;
use epinet_cli::commands;
use epinet_core::tracing_setup::init_tracing;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize logging")?;

    if let Err(error) = commands::handle_command(cli.command) {
        if error.is_user_error() {
            eprintln!("Error: {}", error.user_message());
            std::process::exit(2);
        }
        return Err(error.into());
    }

    Ok(())
}
