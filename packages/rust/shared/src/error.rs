//! Error types for Volare.
//!
//! Library crates use [`VolareError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Maximum number of response-body characters kept in an [`VolareError::Api`] error.
const MAX_BODY_CHARS: usize = 500;

/// Top-level error type for all Volare operations.
#[derive(Debug, thiserror::Error)]
pub enum VolareError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport failure: connection refused, DNS, timeout, unreadable body.
    #[error("network error: {0}")]
    Network(String),

    /// The remote service answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The remote service answered successfully but the body had an unexpected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (out-of-range week, empty prompt, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VolareError>;

impl VolareError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Build an API error, truncating the response body so logs stay readable.
    pub fn api(endpoint: impl Into<String>, status: u16, body: &str) -> Self {
        Self::Api {
            endpoint: endpoint.into(),
            status,
            body: body.chars().take(MAX_BODY_CHARS).collect(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
