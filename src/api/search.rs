use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::types::SearchHit;

/// Base URL of the Algolia HN search API.
pub const DEFAULT_SEARCH_BASE: &str = "https://hn.algolia.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the search collaborator.
///
/// Surfaced as a banner; prior feed content stays untouched until the
/// query is cleared.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Search HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Search request timed out")]
    Timeout,
    #[error("Invalid search response: {0}")]
    Decode(String),
}

/// Full-text search over the upstream archive.
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

/// HTTP client for hn.algolia.com.
pub struct AlgoliaClient {
    client: reqwest::Client,
    base: String,
}

impl AlgoliaClient {
    pub fn new(client: reqwest::Client, base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchSource for AlgoliaClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let url = format!("{}/api/v1/search", self.base);
        let response = tokio::time::timeout(
            REQUEST_TIMEOUT,
            self.client.get(&url).query(&[("query", query)]).send(),
        )
        .await
        .map_err(|_| SearchError::Timeout)?
        .map_err(SearchError::Network)?;

        if !response.status().is_success() {
            return Err(SearchError::HttpStatus(response.status().as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        tracing::debug!(query = %query, hits = body.hits.len(), "Search completed");
        Ok(body.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_decodes_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/search"))
            .and(query_param("query", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": [
                    {"objectID": "1", "title": "Rust 1.0", "url": "https://example.com", "created_at_i": 100},
                    {"objectID": "2", "title": "Why Rust", "created_at_i": 200}
                ]
            })))
            .mount(&server)
            .await;

        let client = AlgoliaClient::new(reqwest::Client::new(), server.uri());
        let hits = client.search("rust").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "1");
        assert_eq!(hits[1].created_at, 200);
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = AlgoliaClient::new(reqwest::Client::new(), server.uri());
        let err = client.search("x").await.unwrap_err();
        match err {
            SearchError::HttpStatus(500) => {}
            e => panic!("Expected HttpStatus(500), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_query_is_url_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/search"))
            .and(query_param("query", "c++ & rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": []})))
            .mount(&server)
            .await;

        let client = AlgoliaClient::new(reqwest::Client::new(), server.uri());
        let hits = client.search("c++ & rust").await.unwrap();
        assert!(hits.is_empty());
    }
}
