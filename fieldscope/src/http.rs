//! Shared reqwest client for the HTTP adapters.
//!
//! [`ApiClient`] owns one `reqwest::Client` plus the server base URL and maps
//! every failure onto [`FetchError`]: HTTP 404 → `NotFound`, HTTP 408 or a
//! client-side timeout → `Timeout`, anything else → `Generic`.
//!
//! Values interpolated into a request path (ids, titles) go through
//! [`encode_path_segment`] first.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::FetchError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header Kibana requires on state-changing requests.
const XSRF_HEADER: &str = "kbn-xsrf";

/// Characters that cannot appear raw inside one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a value so it stays a single path segment.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// JSON-over-HTTP client bound to one server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    /// Creates a client with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Generic(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Authenticate every request with an API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Server base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let request = self.authorize(self.client.get(&url));
        Self::decode(request.send().await, &url).await
    }

    /// POST a JSON body to `path` and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let request = self
            .authorize(self.client.post(&url))
            .header(XSRF_HEADER, "true")
            .json(body);
        Self::decode(request.send().await, &url).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(reqwest::header::AUTHORIZATION, format!("ApiKey {}", key)),
            None => request,
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: Result<reqwest::Response, reqwest::Error>,
        url: &str,
    ) -> Result<T, FetchError> {
        let response = response.map_err(|e| classify(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16(), url));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Generic(format!("Failed to decode response from {}: {}", url, e)))
    }
}

fn classify(err: reqwest::Error, url: &str) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Generic(format!("Request to {} failed: {}", url, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:5601/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5601");
    }

    #[test]
    fn test_url_joins_paths() {
        let client = ApiClient::new("http://localhost:5601").unwrap();
        assert_eq!(
            client.url("/api/data_views"),
            "http://localhost:5601/api/data_views"
        );
        assert_eq!(
            client.url("api/data_views"),
            "http://localhost:5601/api/data_views"
        );
    }

    #[test]
    fn test_encode_path_segment_keeps_plain_titles() {
        assert_eq!(encode_path_segment("logs-*"), "logs-*");
        assert_eq!(encode_path_segment("kibana_sample_data_logs"), "kibana_sample_data_logs");
    }

    #[test]
    fn test_encoded_segment_survives_url_parsing() {
        let client = ApiClient::new("http://localhost:5601").unwrap();
        for title in ["logs#2024", "x?y", "a/b", "50% off", "métriques"] {
            let path = format!("/api/lens/existing_fields/{}", encode_path_segment(title));
            let url = reqwest::Url::parse(&client.url(&path)).unwrap();

            assert_eq!(url.fragment(), None, "{}", title);
            assert_eq!(url.query(), None, "{}", title);
            let segments: Vec<&str> = url.path_segments().unwrap().collect();
            assert_eq!(segments.len(), 4, "{}", title);
            let decoded = percent_encoding::percent_decode_str(segments[3])
                .decode_utf8()
                .unwrap();
            assert_eq!(decoded, title);
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_generic_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let client =
            ApiClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result: Result<serde_json::Value, FetchError> = client.get_json("/api/status").await;
        assert!(result.is_err());
    }
}
