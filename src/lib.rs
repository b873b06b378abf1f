//! Hourly dispatch and levelised cost model for renewable hydrogen and derived fuels.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod cost;
pub mod dispatch;
pub mod error;
pub mod finance;
pub mod fuel;
pub mod generation;
pub mod id;
pub mod input;
pub mod levelised;
pub mod log;
pub mod model;
pub mod operation;
pub mod output;
pub mod projection;
pub mod settings;
pub mod simulation;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the config dir for powerfuel.
///
/// Falls back to the current directory if the system config dir cannot be determined.
pub fn get_powerfuel_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("powerfuel");
    path
}
