//! Index pattern cache loader.
//!
//! The cache is a plain value: every function here takes the caller's
//! [`IndexPatternMap`] by reference and hands back a new map. Persisting the
//! result (for example into [`DataPanelState`](crate::state::DataPanelState))
//! is the caller's job.
//!
//! # Resolution order
//!
//! ```text
//! desired ids ──► cache hit? ──yes──► reuse (no fetch, no refresh signal)
//!                     │
//!                     no
//!                     ▼
//!               source.get(id)   (all misses concurrently)
//!                     │
//!         nothing resolved at all?
//!                     │
//!                    yes
//!                     ▼
//!   fallback ids, one at a time, stop at first success
//! ```

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{FetchError, LoaderError};
use crate::index_pattern::{convert_data_view, IndexPattern, IndexPatternMap, IndexPatternRef};
use crate::source::DataViewSource;

/// Observer for one-shot loader notifications.
///
/// All methods default to no-ops so implementors only override what they
/// care about.
pub trait LoaderEvents: Send + Sync {
    /// At least one pattern was fetched from the source.
    fn on_index_pattern_refresh(&self) {}

    /// The current pattern has no matching documents.
    fn on_no_data(&self) {}

    /// A required pattern could not be loaded.
    fn on_error(&self, _error: &LoaderError) {}
}

/// Events sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl LoaderEvents for NoopEvents {}

/// Load the desired patterns into a new cache.
///
/// Cache hits are reused as-is. Misses are fetched concurrently and the call
/// waits for all of them to settle. Failed fetches are skipped. If not a
/// single desired pattern could be resolved, `not_used_patterns` is tried in
/// order and the first one that loads is added alone.
///
/// `events.on_index_pattern_refresh()` fires exactly once, after every fetch
/// has settled, when at least one fetch happened.
///
/// The returned map holds only desired ids (plus the optional fallback);
/// entries of `cache` that were not asked for are not carried over.
pub async fn load_index_patterns<S: AsRef<str>>(
    cache: &IndexPatternMap,
    patterns: &[S],
    source: &dyn DataViewSource,
    not_used_patterns: Option<&[S]>,
    events: &dyn LoaderEvents,
) -> IndexPatternMap {
    let mut result = IndexPatternMap::new();
    let mut missing: Vec<&str> = Vec::new();

    for id in patterns.iter().map(AsRef::as_ref) {
        match cache.get(id) {
            Some(pattern) => {
                result.insert(id.to_string(), Arc::clone(pattern));
            }
            None if !missing.contains(&id) => missing.push(id),
            None => {}
        }
    }

    if missing.is_empty() {
        debug!(hits = result.len(), "All index patterns served from cache");
        return result;
    }

    debug!(missing = ?missing, hits = result.len(), "Fetching index patterns");

    let outcomes = join_all(
        missing
            .iter()
            .map(|id| async move { (*id, source.get(id).await) }),
    )
    .await;

    for (id, outcome) in outcomes {
        match outcome {
            Ok(raw) => {
                result.insert(id.to_string(), Arc::new(convert_data_view(raw)));
            }
            Err(e) => {
                // Already surfaced elsewhere; the fallback below covers the empty case.
                debug!(id = %id, error = %e, "Index pattern failed to load");
            }
        }
    }

    if result.is_empty() {
        if let Some(fallbacks) = not_used_patterns {
            if let Some((id, pattern)) = first_resolvable(fallbacks, source).await {
                info!(id = %id, "Using fallback index pattern");
                result.insert(id, pattern);
            } else {
                warn!(
                    tried = fallbacks.len(),
                    "No desired or fallback index pattern could be loaded"
                );
            }
        }
    }

    events.on_index_pattern_refresh();
    result
}

/// Walk the fallback list in order and return the first pattern that loads.
async fn first_resolvable<S: AsRef<str>>(
    fallbacks: &[S],
    source: &dyn DataViewSource,
) -> Option<(String, Arc<IndexPattern>)> {
    for id in fallbacks.iter().map(AsRef::as_ref) {
        match source.get(id).await {
            Ok(raw) => return Some((id.to_string(), Arc::new(convert_data_view(raw)))),
            Err(e) => debug!(id = %id, error = %e, "Fallback index pattern failed to load"),
        }
    }
    None
}

/// Load a single pattern the editor cannot work without.
///
/// Returns `Some({ id: pattern })` on success. On any failure reports
/// [`LoaderError::MissingIndexPatterns`] through `events.on_error` and
/// returns `None`; the underlying fetch error is dropped.
pub async fn ensure_index_pattern(
    id: &str,
    source: &dyn DataViewSource,
    events: &dyn LoaderEvents,
) -> Option<IndexPatternMap> {
    match source.get(id).await {
        Ok(raw) => {
            let mut map = IndexPatternMap::new();
            map.insert(id.to_string(), Arc::new(convert_data_view(raw)));
            Some(map)
        }
        Err(e) => {
            warn!(id = %id, error = %e, "Required index pattern is missing");
            events.on_error(&LoaderError::MissingIndexPatterns);
            None
        }
    }
}

/// List id/title summaries, sorted ascending by title.
pub async fn load_index_pattern_refs(
    source: &dyn DataViewSource,
) -> Result<Vec<IndexPatternRef>, FetchError> {
    let mut refs = source.get_ids_with_title().await?;
    refs.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(refs)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use proptest::prelude::*;

    use crate::index_pattern::{RawDataView, RawField};
    use crate::source::MockDataViewSource;

    /// Counts every notification it receives.
    #[derive(Default)]
    pub struct RecordingEvents {
        pub refreshes: AtomicUsize,
        pub no_data: AtomicUsize,
        pub errors: Mutex<Vec<LoaderError>>,
    }

    impl RecordingEvents {
        pub fn refresh_count(&self) -> usize {
            self.refreshes.load(Ordering::SeqCst)
        }

        pub fn no_data_count(&self) -> usize {
            self.no_data.load(Ordering::SeqCst)
        }
    }

    impl LoaderEvents for RecordingEvents {
        fn on_index_pattern_refresh(&self) {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_no_data(&self) {
            self.no_data.fetch_add(1, Ordering::SeqCst);
        }

        fn on_error(&self, error: &LoaderError) {
            self.errors.lock().push(error.clone());
        }
    }

    fn view(id: &str, title: &str) -> RawDataView {
        RawDataView::new(id, title)
            .with_time_field("timestamp")
            .with_field(RawField::new("timestamp", "date"))
            .with_field(RawField::new("bytes", "number"))
    }

    fn sample_source() -> MockDataViewSource {
        MockDataViewSource::new()
            .with_view(view("1", "my-fake-index-pattern"))
            .with_view(view("2", "my-fake-restricted-pattern"))
            .with_view(view("3", "my-compatible-pattern"))
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn cached(ids: &[&str]) -> IndexPatternMap {
        ids.iter()
            .map(|id| {
                (
                    id.to_string(),
                    Arc::new(convert_data_view(view(id, &format!("cached-{}", id)))),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_all_cached_does_not_fetch() {
        let source = sample_source();
        let events = RecordingEvents::default();
        let cache = cached(&["1", "2"]);

        let result =
            load_index_patterns(&cache, &ids(&["1", "2"]), &source, None, &events).await;

        assert_eq!(result, cache);
        assert_eq!(source.get_count(), 0);
        assert_eq!(events.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_cache_restricted_to_desired() {
        let source = sample_source();
        let cache = cached(&["1", "2"]);

        let result = load_index_patterns(&cache, &ids(&["1"]), &source, None, &NoopEvents).await;

        assert_eq!(result.len(), 1);
        assert!(Arc::ptr_eq(&result["1"], &cache["1"]));
        assert_eq!(source.get_count(), 0);
    }

    #[tokio::test]
    async fn test_loads_missing_patterns() {
        let source = sample_source();
        let events = RecordingEvents::default();
        let cache = cached(&["1"]);

        let result =
            load_index_patterns(&cache, &ids(&["1", "2", "3"]), &source, None, &events).await;

        assert_eq!(result.len(), 3);
        assert_eq!(result["1"].title, "cached-1");
        assert_eq!(result["2"].title, "my-fake-restricted-pattern");
        assert_eq!(result["3"].title, "my-compatible-pattern");

        let mut requested = source.requested();
        requested.sort();
        assert_eq!(requested, ids(&["2", "3"]));
        assert_eq!(events.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_does_not_mutate_input_cache() {
        let source = sample_source();
        let cache = cached(&["1"]);
        let before = cache.clone();

        let _ = load_index_patterns(&cache, &ids(&["1", "2"]), &source, None, &NoopEvents).await;

        assert_eq!(cache, before);
    }

    #[tokio::test]
    async fn test_loaded_patterns_are_converted() {
        let source = sample_source();
        let result = load_index_patterns(
            &IndexPatternMap::new(),
            &ids(&["1"]),
            &source,
            None,
            &NoopEvents,
        )
        .await;

        let pattern = &result["1"];
        assert!(pattern.get_field_by_name("___records___").is_some());
        assert_eq!(pattern.time_field_name.as_deref(), Some("timestamp"));
    }

    #[tokio::test]
    async fn test_duplicate_ids_fetched_once() {
        let source = sample_source();
        let result = load_index_patterns(
            &IndexPatternMap::new(),
            &ids(&["2", "2"]),
            &source,
            None,
            &NoopEvents,
        )
        .await;

        assert_eq!(result.len(), 1);
        assert_eq!(source.get_count(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_skips_failed_and_ignores_fallback() {
        let source = sample_source().failing("2", FetchError::Generic("boom".to_string()));
        let events = RecordingEvents::default();

        let result = load_index_patterns(
            &IndexPatternMap::new(),
            &ids(&["1", "2"]),
            &source,
            Some(&ids(&["3"])[..]),
            &events,
        )
        .await;

        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["1"]);
        assert!(!source.requested().contains(&"3".to_string()));
        assert_eq!(events.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_first_loadable_not_used_pattern() {
        let source = sample_source().failing("1", FetchError::Generic("boom".to_string()));
        let events = RecordingEvents::default();

        let result = load_index_patterns(
            &IndexPatternMap::new(),
            &ids(&["1", "deleted"]),
            &source,
            Some(&ids(&["also-deleted", "2", "3"])[..]),
            &events,
        )
        .await;

        assert_eq!(result.len(), 1);
        assert_eq!(result["2"].title, "my-fake-restricted-pattern");
        assert!(!source.requested().contains(&"3".to_string()));
        assert_eq!(events.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_fallback_exhausted_returns_empty() {
        let source = sample_source();

        let result = load_index_patterns(
            &IndexPatternMap::new(),
            &ids(&["deleted"]),
            &source,
            Some(&ids(&["gone", "also-gone"])[..]),
            &NoopEvents,
        )
        .await;

        assert!(result.is_empty());
        assert_eq!(source.requested(), ids(&["deleted", "gone", "also-gone"]));
    }

    #[tokio::test]
    async fn test_no_fallback_list_returns_empty() {
        let source = sample_source();
        let result = load_index_patterns(
            &IndexPatternMap::new(),
            &ids(&["deleted"]),
            &source,
            None,
            &NoopEvents,
        )
        .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_empty_desired_list_loads_nothing() {
        let source = sample_source();
        let events = RecordingEvents::default();
        let result = load_index_patterns(
            &IndexPatternMap::new(),
            &ids(&[]),
            &source,
            Some(&ids(&["1"])[..]),
            &events,
        )
        .await;

        assert!(result.is_empty());
        assert_eq!(source.get_count(), 0);
        assert_eq!(events.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_index_pattern_success() {
        let source = sample_source();
        let events = RecordingEvents::default();

        let result = ensure_index_pattern("3", &source, &events).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result["3"].title, "my-compatible-pattern");
        assert!(events.errors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_index_pattern_failure_reports_error() {
        let source =
            sample_source().failing("1", FetchError::Timeout("backend unreachable".to_string()));
        let events = RecordingEvents::default();

        let result = ensure_index_pattern("1", &source, &events).await;

        assert!(result.is_none());
        let errors = events.errors.lock();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Missing indexpatterns");
    }

    #[tokio::test]
    async fn test_load_refs_sorted_by_title() {
        let source = sample_source();
        let refs = load_index_pattern_refs(&source).await.unwrap();

        assert_eq!(source.list_calls.load(Ordering::Relaxed), 1);
        assert_eq!(source.get_count(), 0);
        let titles: Vec<&str> = refs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "my-compatible-pattern",
                "my-fake-index-pattern",
                "my-fake-restricted-pattern"
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_refs_sorted(titles in proptest::collection::vec("[a-zA-Z0-9*-]{0,10}", 0..30)) {
            let mut source = MockDataViewSource::new();
            for (i, title) in titles.iter().enumerate() {
                source = source.with_view(RawDataView::new(i.to_string(), title.clone()));
            }

            let refs = futures::executor::block_on(load_index_pattern_refs(&source)).unwrap();

            prop_assert_eq!(refs.len(), titles.len());
            for pair in refs.windows(2) {
                prop_assert!(pair[0].title <= pair[1].title);
            }
        }
    }
}
