//! Integration tests for the `example run` command.
use powerfuel::cli::RunOpts;
use powerfuel::cli::example::handle_example_run_command;
use powerfuel::settings::Settings;
use std::fs;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("POWERFUEL_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        ..RunOpts::default()
    };
    handle_example_run_command("hybrid_ammonia", &opts, Some(Settings::default())).unwrap();

    let results = fs::read_to_string(tempdir.path().join("results.toml")).unwrap();
    let results: toml::Table = toml::from_str(&results).unwrap();
    assert_eq!(results["fuel"].as_str(), Some("ammonia"));
    assert!(!tempdir.path().join("debug_hourly_operation.csv").exists());
}
