//! Analyst agents: context-bound answer generation.
//!
//! Each analyst answers the user's query strictly from the assembled
//! context. Analyst faults never propagate: every invocation produces an
//! [`AnalystAnswer`], failed or not, so one dead model cannot sink the
//! panel.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::AnalystConfig;
use super::prompt::build_analyst_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, execute_bounded};

/// Marker analysts emit when the context cannot answer the question.
pub const DONT_KNOW_ANSWER: &str = "I don't know.";

/// Outcome status of one analyst invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    /// The analyst produced an answer.
    Ok,
    /// The call failed, timed out, or came back empty.
    Failed,
}

impl AnswerStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analyst's answer to a query over an assembled context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystAnswer {
    /// Identifier of the analyst that produced this entry.
    pub analyst_id: String,
    /// Answer text; empty for failed entries.
    pub answer: String,
    /// Whether the invocation succeeded.
    pub status: AnswerStatus,
}

impl AnalystAnswer {
    /// Successful answer entry.
    #[must_use]
    pub fn ok(analyst_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            analyst_id: analyst_id.into(),
            answer: answer.into(),
            status: AnswerStatus::Ok,
        }
    }

    /// Failed entry with empty answer text.
    ///
    /// The failure reason goes to the log, not the payload, so downstream
    /// concatenation can never pick up error prose as analysis.
    #[must_use]
    pub fn failed(analyst_id: impl Into<String>) -> Self {
        Self {
            analyst_id: analyst_id.into(),
            answer: String::new(),
            status: AnswerStatus::Failed,
        }
    }

    /// Returns `true` when this entry carries a usable answer.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, AnswerStatus::Ok)
    }
}

/// A single analyst on the panel.
///
/// Cheap to clone; fan-out moves one clone into each task.
#[derive(Debug, Clone)]
pub struct Analyst {
    id: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    system_prompt: String,
}

impl Analyst {
    /// Creates an analyst from its configuration and the shared system prompt.
    #[must_use]
    pub fn new(config: &AnalystConfig, timeout: Duration, system_prompt: String) -> Self {
        Self {
            id: config.id.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
            system_prompt,
        }
    }

    /// Stable identifier reported on every answer.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Answers the query over the assembled context.
    ///
    /// An empty context short-circuits to the don't-know marker without a
    /// model call: there is nothing to analyze, and small models asked to
    /// answer from nothing hallucinate instead of declining. Call errors,
    /// timeouts, and empty completions become a failed entry.
    pub async fn answer(
        &self,
        provider: &dyn LlmProvider,
        query: &str,
        context: &str,
    ) -> AnalystAnswer {
        if context.trim().is_empty() {
            debug!(analyst = %self.id, "empty context; answering with the don't-know marker");
            return AnalystAnswer::ok(&self.id, DONT_KNOW_ANSWER);
        }

        let user_msg = build_analyst_prompt(query, context);

        match execute_bounded(self, provider, &user_msg, self.timeout).await {
            Ok(response) => {
                let content = response.content.trim();
                if content.is_empty() {
                    warn!(analyst = %self.id, "analyst returned an empty completion");
                    AnalystAnswer::failed(&self.id)
                } else {
                    debug!(analyst = %self.id, chars = content.len(), "analyst answered");
                    AnalystAnswer::ok(&self.id, content)
                }
            }
            Err(e) => {
                warn!(analyst = %self.id, error = %e, "analyst call failed");
                AnalystAnswer::failed(&self.id)
            }
        }
    }
}

#[async_trait]
impl Agent for Analyst {
    fn name(&self) -> &'static str {
        "analyst"
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
