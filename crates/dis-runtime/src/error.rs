//! Runtime errors

use thiserror::Error;

use dis_core::DisError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Dis(#[from] DisError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Telemetry(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
