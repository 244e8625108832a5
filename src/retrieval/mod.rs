//! Retrieval service boundary.
//!
//! The pipeline does not own an index. Retrieval is an external
//! collaborator that turns a query into an ordered, scored passage list;
//! the [`Retriever`] trait is the entire contract, and [`HttpRetriever`]
//! is the production implementation against a vector search service.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::Passage;
use crate::error::RetrievalError;

pub mod http;

pub use http::HttpRetriever;

/// Default retrieval service endpoint.
pub const DEFAULT_RETRIEVAL_URL: &str = "http://localhost:6333";

/// Default corpus collection to query.
pub const DEFAULT_COLLECTION: &str = "financial_stmts";

/// Default retrieval request timeout in seconds. Search is fast compared
/// to generation; a hung service should fail the run quickly.
const DEFAULT_RETRIEVAL_TIMEOUT_SECS: u64 = 30;

/// Trait for retrieval backends.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Returns up to `top_k` passages for the query, most relevant first.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] when the service is unreachable, answers
    /// with a non-success status, or returns an undecodable body.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError>;
}

/// Configuration for the HTTP retriever.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Base URL of the retrieval service.
    pub base_url: String,
    /// Corpus collection to query.
    pub collection: String,
    /// API key sent with each request, when the service requires one.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl RetrievalConfig {
    /// Creates configuration from environment variables with defaults.
    ///
    /// Reads `FINPANEL_RETRIEVAL_URL`, `FINPANEL_COLLECTION`, and
    /// `FINPANEL_RETRIEVAL_API_KEY`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("FINPANEL_RETRIEVAL_URL") {
            config.base_url = url;
        }
        if let Ok(collection) = std::env::var("FINPANEL_COLLECTION") {
            config.collection = collection;
        }
        config.api_key = std::env::var("FINPANEL_RETRIEVAL_API_KEY").ok();
        config
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RETRIEVAL_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_RETRIEVAL_TIMEOUT_SECS),
        }
    }
}
