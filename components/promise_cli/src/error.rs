//! Error types for the CLI

use async_runtime::RuntimeError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The event loop failed while running a scenario
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// File I/O error
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// No scenario with this name exists
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
