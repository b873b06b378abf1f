//! Common routines for handling input data.
use crate::generation::{GenerationTrace, GenerationTraces, HOURS_PER_LEAP_YEAR, HOURS_PER_YEAR};
use crate::id::LocationID;
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// The file containing hourly solar capacity factors
const SOLAR_TRACES_FILE_NAME: &str = "solar_traces.csv";

/// The file containing hourly wind capacity factors
const WIND_TRACES_FILE_NAME: &str = "wind_traces.csv";

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read one location's hourly capacity factors from a trace file.
///
/// The header row lists location IDs and each subsequent row holds one hour's capacity factors.
fn read_trace_column(file_path: &Path, location: &LocationID) -> Result<GenerationTrace> {
    let mut reader = csv::Reader::from_path(file_path)?;
    let column = reader
        .headers()?
        .iter()
        .position(|header| header.trim() == &*location.0)
        .with_context(|| format!("Location {location} not found"))?;

    let mut values = Vec::new();
    for (hour, record) in reader.records().enumerate() {
        let record = record?;
        let field = record
            .get(column)
            .with_context(|| format!("Missing value for hour {hour}"))?;
        let value: f64 = field
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for hour {hour}: {field}"))?;
        ensure!(
            value.is_finite() && value >= 0.0,
            "Capacity factor for hour {hour} must be a finite number greater than or equal to zero"
        );
        values.push(value);
    }
    ensure!(!values.is_empty(), "Trace for location {location} is empty");

    let trace = GenerationTrace::new(values);
    if !trace.is_full_year() {
        warn!(
            "{} contains {} hours of data for {location} (expected {HOURS_PER_YEAR} or \
            {HOURS_PER_LEAP_YEAR})",
            file_path.display(),
            trace.len()
        );
    }

    Ok(trace)
}

/// Read the solar and wind traces for a location.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `location` - The location whose traces are read
pub fn read_traces(model_dir: &Path, location: &LocationID) -> Result<GenerationTraces> {
    let read = |file_name| {
        let file_path = model_dir.join(file_name);
        read_trace_column(&file_path, location).with_context(|| input_err_msg(&file_path))
    };
    let solar = read(SOLAR_TRACES_FILE_NAME)?;
    let wind = read(WIND_TRACES_FILE_NAME)?;

    Ok(GenerationTraces::new(solar, wind)?)
}
