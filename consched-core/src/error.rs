//! Error types for the consched core.

use thiserror::Error;

/// Errors that can occur while syncing or querying a schedule.
#[derive(Error, Debug)]
pub enum SchedError {
    /// Local read/write failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote fetch failure (network, non-success response, undecodable body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A wire record could not be converted into an event.
    #[error("Transform error: {0}")]
    Transform(String),

    /// Invalid caller input, rejected before any I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Sync cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SchedError {
    /// Short machine-friendly name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            SchedError::Storage(_) => "storage",
            SchedError::Transport(_) => "transport",
            SchedError::Transform(_) => "transform",
            SchedError::Validation(_) => "validation",
            SchedError::Cancelled => "cancelled",
            SchedError::Config(_) => "config",
            SchedError::Serialization(_) => "serialization",
        }
    }
}

/// Result type alias for consched operations.
pub type SchedResult<T> = Result<T, SchedError>;
