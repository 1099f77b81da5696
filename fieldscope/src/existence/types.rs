//! Request, response and state types for field existence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::source::BoxFuture;

/// Pattern id → field name → "has data in range".
pub type ExistingFieldsMap = BTreeMap<String, BTreeMap<String, bool>>;

/// Time range the existence query covers.
///
/// Bounds are passed through to the backend untouched, so anything it
/// understands (ISO timestamps, date math like `now-15m`) is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from_date: String,
    pub to_date: String,
}

impl DateRange {
    pub fn new(from_date: impl Into<String>, to_date: impl Into<String>) -> Self {
        Self {
            from_date: from_date.into(),
            to_date: to_date.into(),
        }
    }
}

/// Body of one existence request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistenceRequest {
    pub dsl_query: serde_json::Value,
    pub from_date: String,
    pub to_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_field_name: Option<String>,
}

/// Backend answer for one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingFieldsResponse {
    pub index_pattern_title: String,
    pub existing_field_names: Vec<String>,
}

/// Options passed alongside every state update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// When false, the sink may hold the update and apply it later, e.g. when
    /// the caller batches several updates into one render. The existence
    /// synchronizer always sends `true`.
    pub apply_immediately: bool,
}

/// Result of one existence sync, handed to the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistenceState {
    pub existing_fields: ExistingFieldsMap,
    pub is_first_existence_fetch: bool,
    pub existence_fetch_failed: bool,
    pub existence_fetch_timeout: bool,
}

impl ExistenceState {
    /// Whether `field` of pattern `id` is known to have data.
    pub fn field_exists(&self, id: &str, field: &str) -> bool {
        self.existing_fields
            .get(id)
            .and_then(|fields| fields.get(field))
            .copied()
            .unwrap_or(false)
    }
}

/// Query backend that reports which fields of a pattern have data.
pub trait ExistenceFetcher: Send + Sync {
    /// Fetch existing field names. `path` ends with the pattern title.
    fn fetch_json<'a>(
        &'a self,
        path: &'a str,
        body: &'a ExistenceRequest,
    ) -> BoxFuture<'a, Result<ExistingFieldsResponse, FetchError>>;
}

/// Receiver of existence updates.
///
/// An update with `apply_immediately: true` must be visible to readers once
/// the call returns and supersedes anything held back. Deferred updates are
/// applied in arrival order whenever the sink decides to flush them.
pub trait IndexPatternSink: Send + Sync {
    fn update_index_patterns(&self, state: ExistenceState, options: UpdateOptions);
}
