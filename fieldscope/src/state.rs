//! Caller-side state holder for the data panel.
//!
//! The loader and the existence synchronizer never keep state of their own.
//! [`DataPanelState`] is the place a caller can persist what they return: the
//! current pattern cache, the existence map and its flags. It implements
//! [`IndexPatternSink`] so it can be handed straight to
//! [`sync_existing_fields`](crate::existence::sync_existing_fields).

use parking_lot::RwLock;
use tracing::debug;

use crate::existence::{ExistenceState, IndexPatternSink, UpdateOptions};
use crate::index_pattern::IndexPatternMap;

/// Point-in-time copy of the panel state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPanelSnapshot {
    pub current_index_pattern_id: Option<String>,
    pub existence: ExistenceState,
    /// Updates received without `apply_immediately`, not yet applied.
    pub pending_updates: usize,
}

#[derive(Debug)]
struct Inner {
    index_patterns: IndexPatternMap,
    current_index_pattern_id: Option<String>,
    existence: ExistenceState,
    pending: Vec<ExistenceState>,
}

/// Thread-safe holder for loaded patterns and field existence.
#[derive(Debug)]
pub struct DataPanelState {
    inner: RwLock<Inner>,
}

impl Default for DataPanelState {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPanelState {
    /// Empty state, waiting for its first existence fetch.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                index_patterns: IndexPatternMap::new(),
                current_index_pattern_id: None,
                existence: ExistenceState {
                    is_first_existence_fetch: true,
                    ..Default::default()
                },
                pending: Vec::new(),
            }),
        }
    }

    /// Copy of the current pattern cache.
    pub fn index_patterns(&self) -> IndexPatternMap {
        self.inner.read().index_patterns.clone()
    }

    /// Replace the cache with a value returned by the loader.
    pub fn replace_index_patterns(&self, index_patterns: IndexPatternMap) {
        let mut inner = self.inner.write();
        debug!(count = index_patterns.len(), "Replacing index pattern cache");
        inner.index_patterns = index_patterns;
    }

    /// Select the pattern the editor is working on.
    pub fn set_current_index_pattern(&self, id: impl Into<String>) {
        self.inner.write().current_index_pattern_id = Some(id.into());
    }

    /// Title of the current pattern, if it is loaded.
    pub fn current_index_pattern_title(&self) -> Option<String> {
        let inner = self.inner.read();
        inner
            .current_index_pattern_id
            .as_ref()
            .and_then(|id| inner.index_patterns.get(id))
            .map(|p| p.title.clone())
    }

    /// Whether no existence fetch has completed yet.
    pub fn is_first_existence_fetch(&self) -> bool {
        self.inner.read().existence.is_first_existence_fetch
    }

    /// Current existence state.
    pub fn existence(&self) -> ExistenceState {
        self.inner.read().existence.clone()
    }

    /// Apply updates that were deferred.
    ///
    /// Updates are full states, so applying them in arrival order leaves the
    /// last one in place. Returns how many were applied.
    pub fn flush(&self) -> usize {
        let mut inner = self.inner.write();
        let pending = std::mem::take(&mut inner.pending);
        let count = pending.len();
        if let Some(last) = pending.into_iter().last() {
            inner.existence = last;
        }
        count
    }

    pub fn snapshot(&self) -> DataPanelSnapshot {
        let inner = self.inner.read();
        DataPanelSnapshot {
            current_index_pattern_id: inner.current_index_pattern_id.clone(),
            existence: inner.existence.clone(),
            pending_updates: inner.pending.len(),
        }
    }
}

impl IndexPatternSink for DataPanelState {
    fn update_index_patterns(&self, state: ExistenceState, options: UpdateOptions) {
        let mut inner = self.inner.write();
        if options.apply_immediately {
            inner.existence = state;
            inner.pending.clear();
        } else {
            inner.pending.push(state);
        }
    }
}
