//! Error taxonomy shared by the session store, HTTP adapter, and API calls.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is scoped to the operation that produced it. The core never
//! retries and never swallows errors; views decide how to display them.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Errors produced by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server rejected a login attempt.
    #[error("{message}")]
    Authentication { message: String },

    /// A non-2xx response from a data call.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// No response reached the client.
    #[error("network error: {0} (check your connection)")]
    Network(String),

    /// A protected action was attempted without a session token.
    #[error("login required to {action}")]
    UnauthenticatedAccess { action: &'static str },

    /// A 2xx response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// Input rejected before any request was issued.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A header value could not be encoded.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// HTTP status code carried by this error, if it came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure happened before any response was received.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
