//! Agent trait definition.
//!
//! All agents (judge, analyst, aggregator) implement this trait, which
//! provides a uniform interface for the orchestrator and the workflow
//! engine.

use std::time::Duration;

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: super::message::TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by all agents in the system.
///
/// Agents encapsulate a specific role (grading, analysis, aggregation)
/// with a fixed system prompt and model configuration. Callers run an
/// agent against a provider via [`Agent::execute`], or via
/// [`execute_bounded`] when the call must honor a deadline.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Executes the agent with the given user message.
    ///
    /// Builds a [`ChatRequest`] from the agent's configuration and
    /// delegates to the provider.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or response parsing errors.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let request = ChatRequest::single_turn(self.model(), self.system_prompt(), user_msg)
            .with_temperature(self.temperature())
            .with_max_tokens(self.max_tokens());

        let response: ChatResponse = provider.chat(&request).await?;

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}

/// Executes an agent under a per-call deadline.
///
/// A call that outlives the deadline is reported as [`AgentError::Timeout`],
/// so a hung provider degrades exactly like an erroring one.
///
/// # Errors
///
/// Returns [`AgentError::Timeout`] when the deadline elapses, otherwise
/// whatever [`Agent::execute`] returns.
pub async fn execute_bounded(
    agent: &dyn Agent,
    provider: &dyn LlmProvider,
    user_msg: &str,
    timeout: Duration,
) -> Result<AgentResponse, AgentError> {
    match tokio::time::timeout(timeout, agent.execute(provider, user_msg)).await {
        Ok(result) => result,
        Err(_) => Err(AgentError::Timeout {
            seconds: timeout.as_secs(),
        }),
    }
}
