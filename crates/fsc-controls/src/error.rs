//! Error types for controller construction and evaluation.

use fsc_core::FscError;
use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur when building or driving a controller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid construction-time argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Construction-time numeric check failed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] FscError),

    /// Evaluation input outside the controller's contract. State is left untouched.
    #[error("Invalid input: {what} = {value}")]
    InvalidInput { what: &'static str, value: f64 },

    /// A zone was asked about a channel it does not own.
    #[error("Unknown channel: {sensor}")]
    UnknownChannel { sensor: String },
}
