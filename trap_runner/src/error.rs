//! Error types for the runner.

use thiserror::Error;
use trap_common::config::ConfigError;
use trap_core::ModeError;

/// Errors that stop the runner before any unit executes.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration could not be loaded or validated.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// The requested fatal-error mode could not be installed.
    #[error("mode selection: {0}")]
    Mode(#[from] ModeError),
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
