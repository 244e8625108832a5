//! Pluggable LLM provider trait.
//!
//! Every model call in the pipeline goes through [`LlmProvider`]: the
//! judge, the analysts, and the aggregator all speak the same
//! [`ChatRequest`]/[`ChatResponse`] pair, so the panel can run against a
//! local Ollama daemon or an OpenAI-compatible endpoint without any
//! agent code changing.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// A chat completion backend.
///
/// Implementations own the transport (HTTP client, SDK, auth) for one
/// provider and surface every fault as an [`AgentError`], so callers
/// degrade uniformly whether a model is slow, down, or misconfigured.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"ollama"`, `"openai"`).
    fn name(&self) -> &'static str;

    /// Runs one completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures, timeouts, or parse errors.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}
