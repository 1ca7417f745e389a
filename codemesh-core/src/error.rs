//! Error types for codemesh-core

use thiserror::Error;

/// Main error type for the codemesh-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Transport error (network failure, non-2xx status, empty reply)
    #[error("transport error: {0}")]
    Transport(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for codemesh-core
pub type Result<T> = std::result::Result<T, Error>;
