//! Errors raised by the simulation engine.
use thiserror::Error;

/// An error raised while simulating a scenario.
///
/// Errors are never recovered from inside the engine; they are returned to the caller, which
/// decides how to report them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Invalid or contradictory sizing or parameter values
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A required parameter was not provided
    #[error("Missing required parameter: `{0}`")]
    MissingParameter(String),

    /// The battery duration is not one of the supported values
    #[error("Unsupported battery duration of {0} hours (must be one of 1, 2, 4 or 8)")]
    UnsupportedBatteryDuration(u32),

    /// The battery dispatch reached a state which no transition covers.
    ///
    /// This always indicates a bug in the engine.
    #[error(
        "Unhandled battery state at hour {hour} (state of charge: {state_of_charge}, spill: \
        {spill} MWh)"
    )]
    UnhandledBatteryState {
        /// The hour at which dispatch failed
        hour: usize,
        /// Battery state of charge at the start of the hour
        state_of_charge: f64,
        /// Surplus generation available in the hour
        spill: f64,
    },
}

impl EngineError {
    /// Create a [`EngineError::Configuration`] from anything printable
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Return early with a [`EngineError::Configuration`] if the condition does not hold
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::EngineError::Configuration(format!($($arg)+)));
        }
    };
}
pub(crate) use ensure_config;
