//! Error types

use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Session failures surfaced to the user as a status message.
///
/// Neither variant is retried automatically; the user restarts the camera or
/// retries the model load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Could not start AR: {0}")]
    CameraUnavailable(String),
    #[error("Failed to load model {url}: {reason}")]
    AssetLoad { url: String, reason: String },
}

/// Errors reading a recorded tracking trace
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed trace line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
