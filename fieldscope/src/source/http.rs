//! Data view source backed by the Kibana data views REST API.

use serde::Deserialize;

use super::{BoxFuture, DataViewSource};
use crate::error::FetchError;
use crate::http::{encode_path_segment, ApiClient};
use crate::index_pattern::{IndexPatternRef, RawDataView};

/// Path of the data view listing endpoint.
pub const DATA_VIEWS_PATH: &str = "/api/data_views";

#[derive(Debug, Deserialize)]
struct DataViewResponse {
    data_view: RawDataView,
}

#[derive(Debug, Deserialize)]
struct DataViewListResponse {
    data_view: Vec<IndexPatternRef>,
}

/// Reads data views over HTTP.
///
/// # Example
///
/// ```no_run
/// use fieldscope::http::ApiClient;
/// use fieldscope::source::{DataViewSource, HttpDataViewSource};
///
/// # async fn run() -> Result<(), fieldscope::error::FetchError> {
/// let client = ApiClient::new("http://localhost:5601")?;
/// let source = HttpDataViewSource::new(client);
/// let refs = source.get_ids_with_title().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpDataViewSource {
    client: ApiClient,
}

impl HttpDataViewSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn data_view_path(id: &str) -> String {
        format!("{}/data_view/{}", DATA_VIEWS_PATH, encode_path_segment(id))
    }
}

impl DataViewSource for HttpDataViewSource {
    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<RawDataView, FetchError>> {
        Box::pin(async move {
            let response: DataViewResponse =
                self.client.get_json(&Self::data_view_path(id)).await?;
            Ok(response.data_view)
        })
    }

    fn get_ids_with_title(&self) -> BoxFuture<'_, Result<Vec<IndexPatternRef>, FetchError>> {
        Box::pin(async move {
            let response: DataViewListResponse = self.client.get_json(DATA_VIEWS_PATH).await?;
            Ok(response.data_view)
        })
    }
}
