//! Persistence of sweep parameters, results and host status.
//!
//! A sweep directory holds three files:
//! - `params.json`: the sweep configuration
//! - `results.csv`: one row per run
//! - `status.json`: when and where the sweep ran

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::info;

use crate::batch::{BatchError, RunRecord, SweepConfig};

/// File name of the sweep parameters.
pub const PARAMS_FILE: &str = "params.json";
/// File name of the per-run results.
pub const RESULTS_FILE: &str = "results.csv";
/// File name of the host status.
pub const STATUS_FILE: &str = "status.json";

/// Column header of `results.csv`.
///
/// `total_events` counts applied events only. The initial record at t=0 is
/// not an event, so a run that never leaves its initial state writes 0 here;
/// tools expecting a count of trajectory records must add one.
pub const RESULTS_HEADER: &str = "run_id,transmission_rate,recovery_rate,network_type,network_size,initial_infections,max_time,max_infected,final_infected,peak_time,total_events,simulation_time";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Host information captured at the end of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Local time in RFC 3339 format
    pub timestamp: String,
    /// Version of this tool
    pub epinet_version: String,
    /// Operating system name
    pub os_name: String,
    /// Operating system version
    pub os_version: String,
    /// Logical CPUs available
    pub available_processors: usize,
    /// Total memory in MB
    pub total_memory_mb: u64,
    /// Used memory in MB
    pub used_memory_mb: u64,
    /// Free memory in MB
    pub free_memory_mb: u64,
}

impl SystemStatus {
    /// Captures the current host status.
    pub fn collect() -> Self {
        let mut system = System::new();
        system.refresh_memory();

        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            epinet_version: env!("CARGO_PKG_VERSION").to_string(),
            os_name: System::name().unwrap_or_else(|| "unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
            available_processors: num_cpus::get(),
            total_memory_mb: system.total_memory() / BYTES_PER_MB,
            used_memory_mb: system.used_memory() / BYTES_PER_MB,
            free_memory_mb: system.free_memory() / BYTES_PER_MB,
        }
    }
}

/// Writes `params.json`, creating `dir` if needed.
///
/// # Errors
/// - `BatchError::Io` - Directory or file cannot be written
/// - `BatchError::Serialization` - Encoding failed
pub fn write_params(dir: &Path, sweep: &SweepConfig) -> Result<PathBuf, BatchError> {
    write_json(dir, PARAMS_FILE, sweep)
}

/// Writes `status.json`, creating `dir` if needed.
///
/// # Errors
/// - `BatchError::Io` - Directory or file cannot be written
/// - `BatchError::Serialization` - Encoding failed
pub fn write_status(dir: &Path, status: &SystemStatus) -> Result<PathBuf, BatchError> {
    write_json(dir, STATUS_FILE, status)
}

/// Writes `results.csv`, creating `dir` if needed.
///
/// Floats use six decimals and the network type its numeric code.
///
/// # Errors
/// - `BatchError::Io` - Directory or file cannot be written
pub fn write_results(dir: &Path, records: &[RunRecord]) -> Result<PathBuf, BatchError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(RESULTS_FILE);
    let mut out = BufWriter::new(File::create(&path)?);

    writeln!(out, "{RESULTS_HEADER}")?;
    for record in records {
        writeln!(out, "{}", format_row(record))?;
    }
    out.flush()?;

    info!(path = %path.display(), rows = records.len(), "Wrote results");
    Ok(path)
}

/// Formats one record as a CSV row without trailing newline.
pub fn format_row(record: &RunRecord) -> String {
    let summary = &record.summary;
    format!(
        "{},{:.6},{:.6},{},{},{},{:.6},{},{},{:.6},{},{:.6}",
        record.run_id,
        record.transmission_rate,
        record.recovery_rate,
        record.network_type.code(),
        record.network_size,
        record.initial_infections,
        record.max_time,
        summary.peak_infected,
        summary.final_infected,
        summary.peak_time,
        summary.total_events,
        record.simulation_time,
    )
}

fn write_json<T: Serialize>(dir: &Path, file: &'static str, value: &T) -> Result<PathBuf, BatchError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file);
    let json = serde_json::to_string_pretty(value).map_err(|e| BatchError::Serialization {
        file,
        reason: e.to_string(),
    })?;
    fs::write(&path, json)?;

    info!(path = %path.display(), "Wrote {file}");
    Ok(path)
}
