//! Sweep configuration through result files.

use std::fs;

use epinet_cli::batch::{SweepConfig, run_sweep};
use epinet_cli::commands::run_batch;
use epinet_cli::writer::{PARAMS_FILE, RESULTS_FILE, RESULTS_HEADER, STATUS_FILE};
use tempfile::TempDir;

const SMALL_SWEEP: &str = r#"
network_types = ["BA", "ER", "RR"]
network_sizes = [30]
er_probabilities = [0.15]
rr_degrees = [4]
transmission_rates = [0.3, 0.5]
recovery_rates = [0.2]
initial_infections = [1, 2]
max_time = 10.0
samples_per_config = 2
"#;

#[test]
fn test_batch_writes_all_files() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("sweep.toml");
    fs::write(&config_path, SMALL_SWEEP).unwrap();
    let output = temp.path().join("out");

    run_batch(Some(&config_path), &output, None).unwrap();

    let results = fs::read_to_string(output.join(RESULTS_FILE)).unwrap();
    let lines: Vec<&str> = results.lines().collect();
    assert_eq!(lines[0], RESULTS_HEADER);
    assert_eq!(lines.len(), 1 + 3 * 2 * 2 * 2);

    for (i, line) in lines[1..].iter().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 12);
        assert_eq!(fields[0], (i + 1).to_string());
        assert_eq!(fields[4], "30");
        assert_eq!(fields[6], "10.000000");
    }
    // Network type codes in sweep order: 8 BA runs, then ER, then RR.
    assert!(lines[1].split(',').nth(3) == Some("0"));
    assert!(lines[9].split(',').nth(3) == Some("1"));
    assert!(lines[24].split(',').nth(3) == Some("2"));

    let params: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join(PARAMS_FILE)).unwrap()).unwrap();
    assert_eq!(params["samples_per_config"], 2);
    assert_eq!(params["network_types"][1], "ER");

    let status: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join(STATUS_FILE)).unwrap()).unwrap();
    assert!(status["available_processors"].as_u64().unwrap() >= 1);
}

#[test]
fn test_samples_override() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("sweep.toml");
    fs::write(&config_path, SMALL_SWEEP).unwrap();

    run_batch(Some(&config_path), temp.path(), Some(1)).unwrap();

    let results = fs::read_to_string(temp.path().join(RESULTS_FILE)).unwrap();
    assert_eq!(results.lines().count(), 1 + 3 * 2 * 2);
}

#[test]
fn test_sweep_runs_are_reproducible() {
    let sweep = SweepConfig::from_toml_str(SMALL_SWEEP).unwrap();

    let first = run_sweep(&sweep).unwrap();
    let second = run_sweep(&sweep).unwrap();

    let strip = |records: &[epinet_cli::batch::RunRecord]| {
        records
            .iter()
            .map(|r| (r.run_id, r.summary))
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&first), strip(&second));
}

#[test]
fn test_invalid_sweep_file_is_a_user_error() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("sweep.toml");
    fs::write(&config_path, "initial_infections = [0]").unwrap();

    let error = run_batch(Some(&config_path), temp.path(), None).unwrap_err();
    assert!(error.is_user_error());
    assert!(!temp.path().join(RESULTS_FILE).exists());
}
