//! Provider-agnostic chat types.
//!
//! Every model call in the pipeline is a single turn: one system prompt
//! fixing the agent's role, one user message carrying the work item.
//! These types capture that exchange without tying agents to any
//! provider SDK.

use serde::{Deserialize, Serialize};

/// Sender of a chat message.
///
/// The pipeline never replays model output back into a conversation,
/// so there is no assistant role: a request is system instructions
/// plus one user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Role-fixing instructions for the agent.
    System,
    /// The work item: a passage to grade, a question over context, or
    /// analyst output to summarize.
    User,
}

/// One message of a chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who the message is from.
    pub role: Role,
    /// Message text.
    pub content: String,
}

/// A provider-agnostic completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier (e.g., "phi3:latest").
    pub model: String,
    /// Messages in conversation order.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0.0–2.0).
    pub temperature: Option<f32>,
    /// Completion token cap.
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Builds the single-turn request every agent in the pipeline sends.
    #[must_use]
    pub fn single_turn(model: &str, system: &str, user: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![system_message(system), user_message(user)],
            temperature: None,
            max_tokens: None,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the completion token cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token usage reported by a completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

/// A provider-agnostic completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text.
    pub content: String,
    /// Token usage for the call.
    pub usage: TokenUsage,
    /// Why the model stopped (e.g., `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: content.to_string(),
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content: content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_turn_shape() {
        let request = ChatRequest::single_turn("phi3:latest", "You are a grader.", "Grade this.");
        assert_eq!(request.model, "phi3:latest");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "You are a grader.");
        assert_eq!(request.messages[1].role, Role::User);
        assert!(request.temperature.is_none());
        assert!(request.max_tokens.is_none());
    }

    #[test]
    fn test_sampling_overrides() {
        let request = ChatRequest::single_turn("m", "s", "u")
            .with_temperature(0.8)
            .with_max_tokens(128);
        assert!(
            request
                .temperature
                .is_some_and(|t| (t - 0.8).abs() < f32::EPSILON)
        );
        assert_eq!(request.max_tokens, Some(128));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::System).unwrap_or_default();
        assert_eq!(json, "\"system\"");
        let json = serde_json::to_string(&Role::User).unwrap_or_default();
        assert_eq!(json, "\"user\"");
    }

    #[test]
    fn test_message_serialization() {
        let msg = user_message("What was Q4 revenue?");
        let json = serde_json::to_string(&msg).unwrap_or_default();
        assert!(json.contains("\"user\""));
        assert!(json.contains("Q4 revenue"));
    }
}
