//! Application configuration for `FieldscopeApp`.
//!
//! `AppConfig` is the resolved view of the INI file plus any command-line
//! overrides. It is what the bootstrap code reads; nothing below it touches
//! the configuration file.

use std::time::Duration;

use crate::config::ConfigFile;
use crate::existence::DateRange;
use crate::http::DEFAULT_TIMEOUT_SECS;

/// Application configuration combining server and query settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Server base URL.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Optional API key sent as `Authorization: ApiKey ...`.
    pub api_key: Option<String>,

    /// Range used by existence queries.
    pub date_range: DateRange,

    /// Filter used by existence queries.
    pub dsl_query: serde_json::Value,
}

/// Query that matches everything.
pub fn match_all_query() -> serde_json::Value {
    serde_json::json!({
        "bool": { "must": [], "filter": [], "should": [], "must_not": [] }
    })
}

impl AppConfig {
    /// Create a config for a server with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
            date_range: DateRange::new(
                crate::config::DEFAULT_FROM_DATE,
                crate::config::DEFAULT_TO_DATE,
            ),
            dsl_query: match_all_query(),
        }
    }

    /// Create application config from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            base_url: config.server.base_url.clone(),
            timeout: Duration::from_secs(config.server.timeout_secs),
            api_key: config.server.api_key.clone(),
            date_range: DateRange::new(
                config.existence.from_date.clone(),
                config.existence.to_date.clone(),
            ),
            dsl_query: match_all_query(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the existence date range.
    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// Set the existence filter.
    pub fn with_dsl_query(mut self, dsl_query: serde_json::Value) -> Self {
        self.dsl_query = dsl_query;
        self
    }
}
