//! Error types for the upgrader

use http::StatusCode;
use thiserror::Error;

/// Main error type for the upgrader
#[derive(Error, Debug)]
pub enum UpgradeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error calling {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid status code from {url}: {status} {description}")]
    RemoteStatus {
        url: String,
        status: StatusCode,
        description: String,
    },

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Payload error: {0}")]
    Payload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UpgradeError {
    /// Whether the error was raised before any remote call was attempted
    pub fn is_config(&self) -> bool {
        matches!(self, UpgradeError::Config(_))
    }
}

impl From<anyhow::Error> for UpgradeError {
    fn from(err: anyhow::Error) -> Self {
        UpgradeError::Internal(err.to_string())
    }
}
