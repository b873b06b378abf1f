//! Integration tests for the `run` command.
use powerfuel::cli::{RunOpts, handle_run_command};
use powerfuel::settings::Settings;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Get the path to the example model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/solar_hydrogen")
}

fn run_opts(output_dir: &Path) -> RunOpts {
    RunOpts {
        output_dir: Some(output_dir.to_path_buf()),
        overwrite: false,
        debug_model: Some(true),
    }
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("POWERFUEL_LOG_LEVEL", "off") };

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    handle_run_command(
        &get_model_dir(),
        &run_opts(&output_dir),
        Some(Settings::default()),
    )
    .unwrap();

    for file_name in [
        "annual_summary.csv",
        "capital_costs.csv",
        "annual_costs.csv",
        "cash_flow.csv",
        "cost_waterfall.csv",
        "results.toml",
        "metadata.toml",
        "debug_hourly_operation.csv",
        "powerfuel_info.log",
    ] {
        assert!(
            output_dir.join(file_name).is_file(),
            "Missing output file {file_name}"
        );
    }

    // The output folder is not empty now, so running again without --overwrite fails
    let err = handle_run_command(
        &get_model_dir(),
        &run_opts(&output_dir),
        Some(Settings::default()),
    )
    .unwrap_err();
    assert!(
        err.to_string()
            .starts_with("Failed to create output directory")
    );
}
