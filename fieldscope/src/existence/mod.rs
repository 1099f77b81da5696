//! Field existence synchronization.
//!
//! For every loaded pattern, ask the query backend which fields have at least
//! one document in the date range under the current filter, then hand one
//! combined [`ExistenceState`] to the sink.
//!
//! Errors fail open: when the batch fails, every known field is marked as
//! existing so the editor never hides fields the user expects to see. The two
//! flags on the state tell "backend error" apart from "backend too slow".

mod http;
mod types;

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::http::encode_path_segment;
use crate::index_pattern::IndexPattern;
use crate::loader::LoaderEvents;

pub use http::HttpExistenceFetcher;
pub use types::{
    DateRange, ExistenceFetcher, ExistenceRequest, ExistenceState, ExistingFieldsMap,
    ExistingFieldsResponse, IndexPatternSink, UpdateOptions,
};

/// Prefix of the existing-fields endpoint; the pattern title is appended.
pub const EXISTING_FIELDS_PATH: &str = "/api/lens/existing_fields";

/// Inputs of [`sync_existing_fields`].
pub struct SyncExistingFieldsArgs<'a> {
    pub date_range: &'a DateRange,
    pub fetcher: &'a dyn ExistenceFetcher,
    pub index_patterns: &'a [Arc<IndexPattern>],
    pub dsl_query: &'a serde_json::Value,
    pub current_index_pattern_title: &'a str,
    pub is_first_existence_fetch: bool,
    /// Prior map; entries for patterns not in this batch are kept.
    pub existing_fields: &'a ExistingFieldsMap,
    pub sink: &'a dyn IndexPatternSink,
    pub events: &'a dyn LoaderEvents,
}

/// Path of the existence request for one pattern.
///
/// The title is percent-encoded so that `#`, `?` and `/` stay in the final
/// segment.
pub fn existing_fields_path(title: &str) -> String {
    format!("{}/{}", EXISTING_FIELDS_PATH, encode_path_segment(title))
}

/// Fetch field existence for every pattern and publish one update.
///
/// All requests are issued at once and awaited together. The sink is called
/// exactly once with `apply_immediately: true`, whatever the outcome. The
/// returned state is the one given to the sink.
///
/// When several requests fail, the first failure in pattern order decides
/// between the "failed" and "timeout" flags.
pub async fn sync_existing_fields(args: SyncExistingFieldsArgs<'_>) -> ExistenceState {
    let requests: Vec<(String, ExistenceRequest)> = args
        .index_patterns
        .iter()
        .map(|pattern| {
            (
                existing_fields_path(&pattern.title),
                ExistenceRequest {
                    dsl_query: args.dsl_query.clone(),
                    from_date: args.date_range.from_date.clone(),
                    to_date: args.date_range.to_date.clone(),
                    time_field_name: pattern.time_field_name.clone(),
                },
            )
        })
        .collect();

    debug!(
        patterns = requests.len(),
        from = %args.date_range.from_date,
        to = %args.date_range.to_date,
        "Syncing existing fields"
    );

    let outcomes = join_all(
        requests
            .iter()
            .map(|(path, body)| args.fetcher.fetch_json(path, body)),
    )
    .await;

    let mut responses = Vec::with_capacity(outcomes.len());
    let mut first_error = None;
    for outcome in outcomes {
        match outcome {
            Ok(response) => responses.push(response),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(_) => {}
        }
    }

    let state = match first_error {
        None => {
            let no_data = responses
                .iter()
                .find(|r| r.index_pattern_title == args.current_index_pattern_title)
                .map(|r| r.existing_field_names.is_empty())
                .unwrap_or(false);

            if no_data {
                if args.is_first_existence_fetch {
                    debug!(
                        title = %args.current_index_pattern_title,
                        "No existing fields on first fetch, not reporting"
                    );
                } else {
                    info!(title = %args.current_index_pattern_title, "Current index pattern has no data");
                    args.events.on_no_data();
                }
            }

            let mut existing_fields = args.existing_fields.clone();
            for (pattern, response) in args.index_patterns.iter().zip(&responses) {
                existing_fields.insert(
                    pattern.id.clone(),
                    boolean_map(response.existing_field_names.iter().map(String::as_str)),
                );
            }

            ExistenceState {
                existing_fields,
                is_first_existence_fetch: false,
                existence_fetch_failed: false,
                existence_fetch_timeout: false,
            }
        }
        Some(e) => {
            let timeout = e.is_timeout();
            warn!(error = %e, timeout, "Existence fetch failed, marking all fields as existing");

            let mut existing_fields = args.existing_fields.clone();
            for pattern in args.index_patterns {
                existing_fields.insert(pattern.id.clone(), boolean_map(pattern.field_names()));
            }

            ExistenceState {
                existing_fields,
                is_first_existence_fetch: false,
                existence_fetch_failed: !timeout,
                existence_fetch_timeout: timeout,
            }
        }
    };

    args.sink.update_index_patterns(
        state.clone(),
        UpdateOptions {
            apply_immediately: true,
        },
    );
    state
}

fn boolean_map<'a>(names: impl Iterator<Item = &'a str>) -> BTreeMap<String, bool> {
    names.map(|name| (name.to_string(), true)).collect()
}
