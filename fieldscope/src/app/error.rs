//! Application error types.

use std::fmt;

use crate::config::ConfigError;
use crate::error::FetchError;

/// Errors that can occur while wiring or driving the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create the HTTP client.
    ClientCreation(FetchError),

    /// A backend request failed.
    Fetch(FetchError),

    /// Configuration error.
    Config(String),

    /// The requested index pattern is not loaded.
    PatternNotLoaded(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ClientCreation(e) => {
                write!(f, "Failed to create HTTP client: {}", e)
            }
            AppError::Fetch(e) => {
                write!(f, "Request failed: {}", e)
            }
            AppError::Config(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
            AppError::PatternNotLoaded(id) => {
                write!(f, "Index pattern '{}' is not loaded", id)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::ClientCreation(e) => Some(e),
            AppError::Fetch(e) => Some(e),
            AppError::Config(_) => None,
            AppError::PatternNotLoaded(_) => None,
        }
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::Fetch(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config("missing base url".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing base url"));
    }

    #[test]
    fn test_app_error_from_fetch_error() {
        let fetch_err = FetchError::Timeout("slow".to_string());
        let app_err: AppError = fetch_err.into();
        assert!(matches!(app_err, AppError::Fetch(_)));
        assert!(std::error::Error::source(&app_err).is_some());
    }

    #[test]
    fn test_pattern_not_loaded_display() {
        let err = AppError::PatternNotLoaded("abc".to_string());
        assert_eq!(err.to_string(), "Index pattern 'abc' is not loaded");
    }
}
