//! Error types for `tunbench`

use thiserror::Error;

/// Main error type for benchmark operations.
///
/// Everything below `Config` is contained inside the worker that hit it;
/// the coordinator only ever sees shortened sample sets.
#[derive(Error, Debug)]
pub enum BenchError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid input, detected before any request is issued
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tunnel establishment failed
    #[error("Dial {target} failed: {reason}")]
    Dial { target: String, reason: String },

    /// Request could not be sent or no response head arrived
    #[error("GET {url} error: {reason}")]
    Request { url: String, reason: String },

    /// Response body ended with anything other than a clean end-of-stream
    #[error("Read {url} response error: {reason}")]
    Transfer { url: String, reason: String },

    /// Request exceeded the configured deadline
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl BenchError {
    pub fn dial(target: impl Into<String>, reason: impl ToString) -> Self {
        BenchError::Dial {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    pub fn request(url: impl Into<String>, reason: impl ToString) -> Self {
        BenchError::Request {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn transfer(url: impl Into<String>, reason: impl ToString) -> Self {
        BenchError::Transfer {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BenchError>;
