//! Application bootstrap implementation.
//!
//! `FieldscopeApp` connects the HTTP adapters to the loader and the existence
//! synchronizer, and keeps their results in a [`DataPanelState`].

use std::sync::Arc;

use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::existence::{
    sync_existing_fields, ExistenceFetcher, ExistenceState, HttpExistenceFetcher,
    SyncExistingFieldsArgs,
};
use crate::http::ApiClient;
use crate::index_pattern::{IndexPattern, IndexPatternMap, IndexPatternRef};
use crate::loader::{
    ensure_index_pattern, load_index_pattern_refs, load_index_patterns, LoaderEvents,
};
use crate::source::{DataViewSource, HttpDataViewSource};
use crate::state::DataPanelState;

/// Loader and existence synchronizer wired to one server.
pub struct FieldscopeApp {
    config: AppConfig,
    source: Arc<dyn DataViewSource>,
    fetcher: Arc<dyn ExistenceFetcher>,
    state: DataPanelState,
}

impl FieldscopeApp {
    /// Build HTTP-backed adapters from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let mut client = ApiClient::with_timeout(config.base_url.clone(), config.timeout)
            .map_err(AppError::ClientCreation)?;
        if let Some(key) = &config.api_key {
            client = client.with_api_key(key.clone());
        }

        info!(base_url = %client.base_url(), "Connecting to data view backend");

        let source = Arc::new(HttpDataViewSource::new(client.clone()));
        let fetcher = Arc::new(HttpExistenceFetcher::new(client));
        Ok(Self::with_backends(config, source, fetcher))
    }

    /// Use caller-supplied backends.
    pub fn with_backends(
        config: AppConfig,
        source: Arc<dyn DataViewSource>,
        fetcher: Arc<dyn ExistenceFetcher>,
    ) -> Self {
        Self {
            config,
            source,
            fetcher,
            state: DataPanelState::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &DataPanelState {
        &self.state
    }

    /// Data view summaries sorted by title.
    pub async fn index_pattern_refs(&self) -> Result<Vec<IndexPatternRef>, AppError> {
        Ok(load_index_pattern_refs(self.source.as_ref()).await?)
    }

    /// Load patterns against the held cache and store the result.
    pub async fn load(
        &self,
        ids: &[String],
        fallback: &[String],
        events: &dyn LoaderEvents,
    ) -> IndexPatternMap {
        let cache = self.state.index_patterns();
        let not_used = (!fallback.is_empty()).then_some(fallback);
        let loaded = load_index_patterns(&cache, ids, self.source.as_ref(), not_used, events).await;
        self.state.replace_index_patterns(loaded.clone());
        loaded
    }

    /// Load one required pattern and add it to the held cache.
    pub async fn ensure(&self, id: &str, events: &dyn LoaderEvents) -> Option<Arc<IndexPattern>> {
        let loaded = ensure_index_pattern(id, self.source.as_ref(), events).await?;
        let mut cache = self.state.index_patterns();
        cache.extend(loaded);
        let pattern = cache.get(id).cloned();
        self.state.replace_index_patterns(cache);
        pattern
    }

    /// Sync field existence for every held pattern, with `current_id` as the
    /// pattern the user is looking at.
    pub async fn sync_existence(
        &self,
        current_id: &str,
        events: &dyn LoaderEvents,
    ) -> Result<ExistenceState, AppError> {
        self.state.set_current_index_pattern(current_id);
        let title = self
            .state
            .current_index_pattern_title()
            .ok_or_else(|| AppError::PatternNotLoaded(current_id.to_string()))?;

        let patterns: Vec<Arc<IndexPattern>> =
            self.state.index_patterns().values().cloned().collect();
        let prior = self.state.existence().existing_fields;

        Ok(sync_existing_fields(SyncExistingFieldsArgs {
            date_range: &self.config.date_range,
            fetcher: self.fetcher.as_ref(),
            index_patterns: &patterns,
            dsl_query: &self.config.dsl_query,
            current_index_pattern_title: &title,
            is_first_existence_fetch: self.state.is_first_existence_fetch(),
            existing_fields: &prior,
            sink: &self.state,
            events,
        })
        .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::FetchError;
    use crate::existence::tests::MockExistenceFetcher;
    use crate::index_pattern::{RawDataView, RawField};
    use crate::loader::tests::RecordingEvents;
    use crate::loader::NoopEvents;
    use crate::source::MockDataViewSource;

    fn app(fetcher: MockExistenceFetcher) -> FieldscopeApp {
        let source = MockDataViewSource::new()
            .with_view(
                RawDataView::new("logs", "logs-*")
                    .with_field(RawField::new("bytes", "number"))
                    .with_field(RawField::new("host", "string")),
            )
            .with_view(RawDataView::new("metrics", "metrics-*"));
        FieldscopeApp::with_backends(
            AppConfig::new("http://localhost:5601"),
            Arc::new(source),
            Arc::new(fetcher),
        )
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_load_stores_cache() {
        let app = app(MockExistenceFetcher::default());
        let events = RecordingEvents::default();

        let loaded = app.load(&ids(&["logs"]), &[], &events).await;

        assert_eq!(loaded.len(), 1);
        assert_eq!(app.state().index_patterns(), loaded);
        assert_eq!(events.refresh_count(), 1);

        // Second load is a pure cache hit.
        app.load(&ids(&["logs"]), &[], &events).await;
        assert_eq!(events.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_load_uses_fallback() {
        let app = app(MockExistenceFetcher::default());
        let loaded = app
            .load(&ids(&["deleted"]), &ids(&["metrics"]), &NoopEvents)
            .await;
        assert!(loaded.contains_key("metrics"));
    }

    #[tokio::test]
    async fn test_ensure_adds_to_cache() {
        let app = app(MockExistenceFetcher::default());
        app.load(&ids(&["logs"]), &[], &NoopEvents).await;

        let pattern = app.ensure("metrics", &NoopEvents).await.unwrap();

        assert_eq!(pattern.title, "metrics-*");
        assert_eq!(app.state().index_patterns().len(), 2);
    }

    #[tokio::test]
    async fn test_ensure_missing_reports_error() {
        let app = app(MockExistenceFetcher::default());
        let events = RecordingEvents::default();

        assert!(app.ensure("deleted", &events).await.is_none());
        assert_eq!(events.errors.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_existence_requires_loaded_pattern() {
        let app = app(MockExistenceFetcher::default());
        let result = app.sync_existence("logs", &NoopEvents).await;
        assert!(matches!(result, Err(AppError::PatternNotLoaded(_))));
    }

    #[tokio::test]
    async fn test_sync_existence_updates_state() {
        let app = app(
            MockExistenceFetcher::default()
                .answering("logs-*", &["bytes"])
                .answering("metrics-*", &[]),
        );
        app.load(&ids(&["logs", "metrics"]), &[], &NoopEvents).await;
        assert!(app.state().is_first_existence_fetch());

        let state = app.sync_existence("logs", &NoopEvents).await.unwrap();

        assert!(state.field_exists("logs", "bytes"));
        assert!(!state.field_exists("logs", "host"));
        assert!(!app.state().is_first_existence_fetch());
        assert_eq!(app.state().existence(), state);
    }

    #[tokio::test]
    async fn test_no_data_only_after_first_sync() {
        let app = app(MockExistenceFetcher::default().answering("metrics-*", &[]));
        let events = RecordingEvents::default();
        app.load(&ids(&["metrics"]), &[], &NoopEvents).await;

        app.sync_existence("metrics", &events).await.unwrap();
        assert_eq!(events.no_data_count(), 0);

        app.sync_existence("metrics", &events).await.unwrap();
        assert_eq!(events.no_data_count(), 1);
    }

    #[tokio::test]
    async fn test_sync_existence_timeout_flags() {
        let app = app(
            MockExistenceFetcher::default().failing("logs-*", FetchError::Timeout("408".into())),
        );
        app.load(&ids(&["logs"]), &[], &NoopEvents).await;

        let state = app.sync_existence("logs", &NoopEvents).await.unwrap();

        assert!(state.existence_fetch_timeout);
        assert!(state.field_exists("logs", "host"));
    }
}
