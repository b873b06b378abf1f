//! Code for writing metadata about a run to file
use crate::id::LocationID;
use crate::fuel::Fuel;
use anyhow::Result;
use chrono::prelude::*;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Information about the program build via `built` crate
mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Get information about program version from git
fn get_git_hash() -> String {
    let Some(hash) = built_info::GIT_COMMIT_HASH_SHORT else {
        return "unknown".into();
    };

    if built_info::GIT_DIRTY == Some(true) {
        format!("{hash}-dirty")
    } else {
        hash.into()
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata,
    platform: PlatformMetadata,
}

/// Information about the model run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the model which was run
    model_path: &'a Path,
    /// Location whose generation traces were used
    location: &'a LocationID,
    /// The fuel produced
    fuel: String,
    /// The date and time on which the run started
    datetime: String,
}

/// Information about the program build
#[derive(Serialize)]
struct ProgramMetadata {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    is_debug: bool,
    rustc_version: &'static str,
    build_time_utc: &'static str,
    git_commit_hash: String,
}

impl Default for ProgramMetadata {
    fn default() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: get_git_hash(),
        }
    }
}

/// Information about the platform on which the program is running.
///
/// Fields are left empty if the platform cannot be queried.
#[derive(Serialize, Default)]
struct PlatformMetadata {
    sysname: String,
    release: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn new() -> Self {
        let Ok(info) = PlatformInfo::new() else {
            return Self::default();
        };

        Self {
            sysname: info.sysname().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        }
    }
}

/// Write metadata to the specified output path in TOML format
pub fn write_metadata(
    output_path: &Path,
    model_path: &Path,
    location: &LocationID,
    fuel: Fuel,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            model_path,
            location,
            fuel: fuel.to_string(),
            datetime: Local::now().to_rfc2822(),
        },
        program: ProgramMetadata::default(),
        platform: PlatformMetadata::new(),
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_metadata() {
        let dir = tempdir().unwrap();
        write_metadata(
            dir.path(),
            Path::new("demos/solar_hydrogen"),
            &"pilbara".into(),
            Fuel::Ammonia,
        )
        .unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        let table: toml::Table = toml::from_str(&contents).unwrap();
        let run = table["run"].as_table().unwrap();
        assert_eq!(run["location"].as_str(), Some("pilbara"));
        assert_eq!(run["fuel"].as_str(), Some("ammonia"));
        assert_eq!(
            table["program"]["name"].as_str(),
            Some(env!("CARGO_PKG_NAME"))
        );
    }
}
