//! Error types shared by the loader and the existence synchronizer.
//!
//! Backends report failures through [`FetchError`], a small taxonomy that
//! separates "not found", "timed out" and everything else. Callers never have
//! to inspect an opaque error for an HTTP status.

use thiserror::Error;

/// HTTP status used by the query backend to flag a timed-out request.
pub const HTTP_REQUEST_TIMEOUT: u16 = 408;

/// HTTP status for an unknown data view.
pub const HTTP_NOT_FOUND: u16 = 404;

/// Errors surfaced by a data view source or an existence fetcher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The requested resource does not exist (deleted pattern, bad id).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend gave up before answering (HTTP 408).
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Network, decoding or any other backend failure.
    #[error("Fetch failed: {0}")]
    Generic(String),
}

impl FetchError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, context: &str) -> Self {
        match status {
            HTTP_REQUEST_TIMEOUT => FetchError::Timeout(context.to_string()),
            HTTP_NOT_FOUND => FetchError::NotFound(context.to_string()),
            other => FetchError::Generic(format!("HTTP {} from {}", other, context)),
        }
    }

    /// Whether this error should be reported as a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

/// Errors reported to [`LoaderEvents::on_error`](crate::loader::LoaderEvents::on_error).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoaderError {
    /// A pattern required by the editor could not be resolved.
    ///
    /// The underlying fetch error is intentionally not carried.
    #[error("Missing indexpatterns")]
    MissingIndexPatterns,
}
