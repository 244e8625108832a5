//! HTTP retrieval client.
//!
//! Speaks a minimal JSON contract to the retrieval service:
//! `POST {base_url}/collections/{collection}/search` with body
//! `{"query": "...", "top_k": 5}`, expecting
//! `{"passages": [{"text": "...", "score": 0.87, "source_id": "..."}]}`
//! ordered most relevant first.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RetrievalConfig, Retriever};
use crate::core::Passage;
use crate::error::RetrievalError;

/// Search request body.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

/// Search response body.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    passages: Vec<Passage>,
}

/// Retriever backed by an HTTP vector search service.
pub struct HttpRetriever {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    api_key: Option<String>,
}

impl HttpRetriever {
    /// Creates a retriever from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Request`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &RetrievalConfig) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::Request {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl std::fmt::Debug for HttpRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRetriever")
            .field("base_url", &self.base_url)
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let url = format!("{}/collections/{}/search", self.base_url, self.collection);
        debug!(%url, top_k, "requesting passages");

        let mut request = self.client.post(&url).json(&SearchRequest { query, top_k });
        if let Some(ref key) = self.api_key {
            request = request.header("api-key", key);
        }

        let response = request.send().await.map_err(|e| RetrievalError::Request {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse =
            response.json().await.map_err(|e| RetrievalError::Decode {
                message: e.to_string(),
            })?;

        // The service is not trusted to honor top_k.
        let mut passages = body.passages;
        passages.truncate(top_k);

        debug!(passages = passages.len(), "retrieval complete");
        Ok(passages)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_shape() {
        let request = SearchRequest {
            query: "Fourth Quarter Highlights",
            top_k: 5,
        };
        let json = serde_json::to_string(&request)
            .unwrap_or_else(|e| panic!("serialize failed: {e}"));
        assert!(json.contains(r#""query":"Fourth Quarter Highlights""#));
        assert!(json.contains(r#""top_k":5"#));
    }

    #[test]
    fn test_search_response_shape() {
        let json = r#"{
            "passages": [
                {"text": "Revenue was $1.2B.", "score": 0.91, "source_id": "10q-2024"},
                {"text": "Margins held at 41%.", "score": 0.84}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json)
            .unwrap_or_else(|e| panic!("deserialize failed: {e}"));
        assert_eq!(response.passages.len(), 2);
        assert_eq!(response.passages[0].source_id.as_deref(), Some("10q-2024"));
        assert!(response.passages[1].source_id.is_none());
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let retriever = HttpRetriever::new(&RetrievalConfig {
            base_url: "http://search.internal:6333/".to_string(),
            ..RetrievalConfig::default()
        })
        .unwrap_or_else(|e| panic!("client build failed: {e}"));
        assert_eq!(retriever.base_url, "http://search.internal:6333");
    }
}
