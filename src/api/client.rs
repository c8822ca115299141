use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use super::types::{FeedType, Item, ItemId};

/// Base URL of the public Firebase v0 API.
pub const DEFAULT_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";

/// Per-request timeout for the upstream API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur fetching id lists or item records.
///
/// Fetch failures never cross component boundaries as errors in the public
/// contract — callers degrade them to absent items plus an error banner.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body was not the expected JSON shape
    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Read-only source of feed id lists and item records.
///
/// The engine is written against this trait; production wires up
/// [`HnClient`], tests substitute counting stubs.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// The current full ordered id list for a feed type.
    async fn list_ids(&self, feed: FeedType) -> Result<Vec<ItemId>, FetchError>;

    /// A single item record. `Ok(None)` means the upstream has no such
    /// item (the API serves JSON `null`).
    async fn item(&self, id: ItemId) -> Result<Option<Item>, FetchError>;
}

/// HTTP client for the Firebase v0 API.
pub struct HnClient {
    client: reqwest::Client,
    base: String,
}

impl HnClient {
    /// `base` is configurable so tests can point at a mock server.
    pub fn new(client: reqwest::Client, base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.client.get(&url).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ItemSource for HnClient {
    async fn list_ids(&self, feed: FeedType) -> Result<Vec<ItemId>, FetchError> {
        let url = format!("{}/{}.json", self.base, feed.endpoint());
        let ids: Vec<ItemId> = self.get_json(url).await?;
        tracing::debug!(feed = %feed, count = ids.len(), "Fetched id list");
        Ok(ids)
    }

    async fn item(&self, id: ItemId) -> Result<Option<Item>, FetchError> {
        let url = format!("{}/item/{}.json", self.base, id);
        // Unknown ids are served as literal `null`, which maps to None.
        self.get_json::<Option<Item>>(url).await
    }
}
