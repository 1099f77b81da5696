//! Data view source abstraction.
//!
//! The loader never talks to a backend directly. It goes through
//! [`DataViewSource`], which production code backs with
//! [`HttpDataViewSource`] and tests back with an in-memory mock.

mod http;

use std::future::Future;
use std::pin::Pin;

use crate::error::FetchError;
use crate::index_pattern::{IndexPatternRef, RawDataView};

pub use http::HttpDataViewSource;

#[cfg(test)]
pub use tests::MockDataViewSource;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Capability to resolve data views.
///
/// Implementations must be `Send + Sync` so one source can serve concurrent
/// lookups. Uses boxed futures so callers can hold `&dyn DataViewSource`.
pub trait DataViewSource: Send + Sync {
    /// Resolve one full data view by id.
    ///
    /// Fails with [`FetchError::NotFound`] for unknown ids and with another
    /// variant when the backend is unreachable.
    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<RawDataView, FetchError>>;

    /// List id/title summaries of every data view.
    fn get_ids_with_title(&self) -> BoxFuture<'_, Result<Vec<IndexPatternRef>, FetchError>>;
}
