//! Aggregator: single-call summarization over analyst answers.
//!
//! The aggregator runs exactly one model call per pipeline run, fed with
//! the concatenation of the successful analyst answers. When nothing
//! usable came back from the panel it returns a fixed result without
//! calling the model at all.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::analyst::AnalystAnswer;
use super::config::PanelConfig;
use super::prompt::build_aggregator_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, execute_bounded};
use crate::error::AgentError;

/// Fixed result when no analyst produced an answer.
pub const NO_INFORMATION_RESULT: &str = "No information available.";

/// Agent that condenses panel output into the final summary.
#[derive(Debug, Clone)]
pub struct Aggregator {
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    system_prompt: String,
}

impl Aggregator {
    /// Creates an aggregator from panel configuration and a system prompt.
    #[must_use]
    pub fn new(config: &PanelConfig, system_prompt: String) -> Self {
        Self {
            model: config.aggregator_model.clone(),
            temperature: config.aggregator_temperature,
            max_tokens: config.aggregator_max_tokens,
            timeout: config.timeout,
            system_prompt,
        }
    }

    /// Summarizes the successful answers into the final result.
    ///
    /// Failed entries are logged and excluded; their empty answer text can
    /// never leak into the summary. With nothing left to summarize the
    /// fixed [`NO_INFORMATION_RESULT`] is returned without a model call.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only when the summarization call itself
    /// fails; that is a pipeline fault, not a degradation.
    pub async fn aggregate(
        &self,
        provider: &dyn LlmProvider,
        answers: &[AnalystAnswer],
    ) -> Result<String, AgentError> {
        let failed = answers.iter().filter(|a| !a.is_ok()).count();
        if failed > 0 {
            warn!(
                failed,
                total = answers.len(),
                "excluding failed analyst answers from summary"
            );
        }

        let document: String = answers
            .iter()
            .filter(|a| a.is_ok())
            .map(|a| a.answer.as_str())
            .collect();

        self.summarize_document(provider, &document).await
    }

    /// Summarizes a pre-assembled document of analyst output.
    ///
    /// An empty document yields [`NO_INFORMATION_RESULT`] without a call.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the summarization call fails.
    pub async fn summarize_document(
        &self,
        provider: &dyn LlmProvider,
        document: &str,
    ) -> Result<String, AgentError> {
        if document.trim().is_empty() {
            debug!("nothing to summarize; returning the fixed no-information result");
            return Ok(NO_INFORMATION_RESULT.to_string());
        }

        let user_msg = build_aggregator_prompt(document);
        let response = execute_bounded(self, provider, &user_msg, self.timeout).await?;

        Ok(response.content.trim().to_string())
    }
}

#[async_trait]
impl Agent for Aggregator {
    fn name(&self) -> &'static str {
        "aggregator"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
