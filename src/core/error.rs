//! Error types for butterfly-alt library
//!
//! Distinguishes invariant violations (bad geometry, bad leg index) from
//! recoverable backend failures, which the fetcher absorbs per via-point.

use std::fmt;

/// Main error type for butterfly-alt operations
#[derive(Debug)]
pub enum Error {
    /// Coordinate, distance or bearing outside its valid domain
    InvalidGeometryInput(String),

    /// Transport failure or non-2xx status from the routing backend
    BackendRequestFailed(String),

    /// Backend answered, but the body is not a usable route response
    MalformedBackendResponse(String),

    /// Annotator asked for a leg the route does not have
    InvalidLegIndex { index: usize, legs: usize },

    /// Invalid request path, coordinate list or parameters
    InvalidInput(String),

    /// File I/O error
    IoError(std::io::Error),
}

impl Error {
    /// Whether this error is a per-lookup backend failure the fetcher may drop
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Error::BackendRequestFailed(_) | Error::MalformedBackendResponse(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidGeometryInput(msg) => {
                write!(f, "Invalid geometry input: {msg}")
            }
            Error::BackendRequestFailed(msg) => {
                write!(f, "Backend request failed: {msg}")
            }
            Error::MalformedBackendResponse(msg) => {
                write!(f, "Malformed backend response: {msg}")
            }
            Error::InvalidLegIndex { index, legs } => {
                write!(f, "Invalid leg index {index} for route with {legs} leg(s)")
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {msg}")
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {err}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::MalformedBackendResponse(err.to_string())
        } else if err.is_timeout() {
            Error::BackendRequestFailed(format!("timed out: {err}"))
        } else {
            Error::BackendRequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedBackendResponse(err.to_string())
    }
}

/// Convenience result type for butterfly-alt operations
pub type Result<T> = std::result::Result<T, Error>;
