//! The `settings` subcommands, for inspecting and editing the powerfuel settings file.
use crate::log::{LOG_LEVEL_ENV_VAR, log_level_from_env};
use crate::settings::{Settings, get_settings_file_path};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// Subcommands for settings
#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Open the settings file in a text editor, creating it first if needed
    Edit,
    /// Print the path the settings file is read from
    Path,
    /// Print a commented settings file containing the default values
    DumpDefault,
    /// Print the settings a model run will use, including environment overrides
    Show,
}

impl SettingsSubcommands {
    /// Execute the supplied settings subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::Edit => handle_edit_command()?,
            Self::Path => println!("{}", get_settings_file_path().display()),
            Self::DumpDefault => print!("{}", Settings::default_file_contents()),
            Self::Show => handle_show_command()?,
        }

        Ok(())
    }
}

/// Write the commented default settings to `file_path` unless a file is already there
fn ensure_settings_file_exists(file_path: &Path) -> Result<()> {
    if file_path.is_file() {
        return Ok(());
    }

    if let Some(dir_path) = file_path.parent() {
        fs::create_dir_all(dir_path)
            .with_context(|| format!("Failed to create directory: {}", dir_path.display()))?;
    }
    fs::write(file_path, Settings::default_file_contents())?;

    Ok(())
}

/// Check that the settings file can still be read
fn check_settings_file(file_path: &Path) -> Result<Settings> {
    Settings::load_from_path(file_path).with_context(|| {
        format!(
            "Settings file {} is invalid. Run `powerfuel settings edit` to fix it.",
            file_path.display()
        )
    })
}

/// Handle the `edit` command
fn handle_edit_command() -> Result<()> {
    let file_path = get_settings_file_path();
    ensure_settings_file_exists(&file_path)?;

    println!("Opening settings file for editing: {}", file_path.display());
    edit::edit_file(&file_path)?;

    // Catch mistakes now rather than on the next run
    check_settings_file(&file_path)?;
    println!("Settings saved");

    Ok(())
}

/// Handle the `show` command
fn handle_show_command() -> Result<()> {
    let file_path = get_settings_file_path();
    let settings = check_settings_file(&file_path)?;
    print!(
        "{}",
        describe_settings(&settings, &file_path, log_level_from_env().as_deref())
    );

    Ok(())
}

/// Describe the settings in effect, noting where the log level comes from
fn describe_settings(
    settings: &Settings,
    file_path: &Path,
    env_log_level: Option<&str>,
) -> String {
    let mut out = if file_path.is_file() {
        format!("# Read from {}\n", file_path.display())
    } else {
        format!("# No file at {}, using defaults\n", file_path.display())
    };

    match env_log_level {
        Some(level) => {
            let _ = writeln!(out, "log_level = \"{level}\" # from {LOG_LEVEL_ENV_VAR}");
        }
        None => {
            let _ = writeln!(out, "log_level = \"{}\"", settings.log_level);
        }
    }
    let _ = writeln!(out, "overwrite = {}", settings.overwrite);
    let _ = writeln!(out, "debug_model = {}", settings.debug_model);

    out
}
