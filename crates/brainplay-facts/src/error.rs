//! Lookup error types.

use thiserror::Error;

/// Errors that can occur when fetching a fact.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The service answered with a non-200 status.
    #[error("API error (HTTP {status})")]
    ApiError { status: u16 },

    /// The request timed out.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body could not be read.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}
