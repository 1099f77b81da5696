//! Existence fetcher backed by the existing-fields HTTP endpoint.

use super::types::{ExistenceFetcher, ExistenceRequest, ExistingFieldsResponse};
use crate::error::FetchError;
use crate::http::ApiClient;
use crate::source::BoxFuture;

/// POSTs existence requests as JSON.
///
/// A 408 from the server (or a client-side timeout) comes back as
/// [`FetchError::Timeout`].
#[derive(Debug, Clone)]
pub struct HttpExistenceFetcher {
    client: ApiClient,
}

impl HttpExistenceFetcher {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl ExistenceFetcher for HttpExistenceFetcher {
    fn fetch_json<'a>(
        &'a self,
        path: &'a str,
        body: &'a ExistenceRequest,
    ) -> BoxFuture<'a, Result<ExistingFieldsResponse, FetchError>> {
        Box::pin(async move { self.client.post_json(path, body).await })
    }
}
