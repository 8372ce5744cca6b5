//! Error types for the bridge framework.

use thiserror::Error;

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur in a bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parse error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Logging could not be initialized.
    #[error("Logging initialization failed: {0}")]
    Logging(String),

    /// The MQTT client object could not be created.
    #[error("MQTT client creation failed: {0}")]
    Client(String),

    /// The broker could not be reached or resolved.
    #[error("MQTT connection error: {0}")]
    Connection(String),

    /// Publishing error.
    #[error("Failed to publish to {topic}: {message}")]
    Publish { topic: String, message: String },

    /// Worker error.
    #[error("Worker error: {0}")]
    Worker(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    /// Create a worker error.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }
}

impl From<json5::Error> for BridgeError {
    fn from(err: json5::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

impl From<energenie_common::Error> for BridgeError {
    fn from(err: energenie_common::Error) -> Self {
        match err {
            energenie_common::Error::Config(msg) => Self::ConfigValidation(msg),
            energenie_common::Error::Resolve(msg) => Self::Connection(msg),
            energenie_common::Error::Client(e) => Self::Client(e.to_string()),
            energenie_common::Error::Io(e) => Self::Io(e),
        }
    }
}
