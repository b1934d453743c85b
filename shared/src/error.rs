//! Error types for the Oyasumi Ehon skill.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a skill request.
#[derive(Error, Debug)]
pub enum Error {
    /// Persistent attribute store error
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No registered handler accepted the request
    #[error("Unable to find a suitable request handler for {0}")]
    UnhandledRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
