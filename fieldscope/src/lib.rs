//! fieldscope - index pattern loading and field existence for visualization editors
//!
//! This library resolves index patterns (data views) into a caller-owned
//! cache and keeps track of which of their fields have data in a time range.
//!
//! # Overview
//!
//! - [`loader`]: cache-aware pattern loading with ordered fallback
//! - [`existence`]: concurrent field existence queries that fail open
//! - [`index_pattern`]: the data model and raw data view conversion
//! - [`source`] / [`http`]: backend abstractions and their reqwest adapters
//! - [`state`]: a thread-safe holder for what the loader returns
//! - [`app`], [`config`], [`logging`]: wiring for the CLI
//!
//! # Example
//!
//! ```no_run
//! use fieldscope::http::ApiClient;
//! use fieldscope::index_pattern::IndexPatternMap;
//! use fieldscope::loader::{load_index_patterns, NoopEvents};
//! use fieldscope::source::HttpDataViewSource;
//!
//! # async fn run() -> Result<(), fieldscope::error::FetchError> {
//! let source = HttpDataViewSource::new(ApiClient::new("http://localhost:5601")?);
//! let cache = IndexPatternMap::new();
//! let cache = load_index_patterns(&cache, &["logs"], &source, None, &NoopEvents).await;
//! println!("{} patterns loaded", cache.len());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod existence;
pub mod http;
pub mod index_pattern;
pub mod loader;
pub mod logging;
pub mod source;
pub mod state;

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
