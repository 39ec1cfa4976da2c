//! Error types for the command-line front end.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] fsc_config::ConfigError),

    #[error("Control error: {0}")]
    Control(#[from] fsc_controls::ControlError),

    #[error("Failed to read trace file: {path}")]
    TraceRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid trace: {0}")]
    Trace(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
