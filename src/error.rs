//! Error types for the finpanel crate.
//!
//! Each layer owns its error enum; the umbrella [`Error`] type wraps them
//! for callers that cross layers (the CLI, integration tests).

use thiserror::Error;

use crate::workflow::Stage;

/// Errors from agents and LLM providers.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured for a provider that requires one.
    #[error("API key missing: set OPENAI_API_KEY or FINPANEL_API_KEY")]
    ApiKeyMissing,

    /// The panel was configured with no analysts.
    #[error("no analysts configured: the panel needs at least one analyst")]
    NoAnalysts,

    /// The requested provider name is not recognized.
    #[error("unsupported provider: {name} (supported: ollama, openai)")]
    UnsupportedProvider {
        /// The provider name that was requested.
        name: String,
    },

    /// An API request to the provider failed.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Human-readable failure description.
        message: String,
        /// HTTP status code, when the provider answered at all.
        status: Option<u16>,
    },

    /// A model call exceeded the configured per-call timeout.
    #[error("model call timed out after {seconds}s")]
    Timeout {
        /// The timeout that elapsed, in seconds.
        seconds: u64,
    },

    /// The model answered with an empty completion.
    #[error("model returned an empty completion")]
    EmptyCompletion,
}

/// Errors from the retrieval service boundary.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The request could not be sent or the client could not be built.
    #[error("retrieval request failed: {message}")]
    Request {
        /// Human-readable failure description.
        message: String,
    },

    /// The retrieval service answered with a non-success status.
    #[error("retrieval service returned {status}: {message}")]
    Status {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode retrieval response: {message}")]
    Decode {
        /// Human-readable decode failure description.
        message: String,
    },
}

/// Errors from workflow execution.
///
/// A workflow that reaches its failed terminal state surfaces as
/// [`WorkflowError::Step`] carrying the stage that faulted and why.
/// Per-analyst generation failures are not workflow errors; they degrade
/// into failed answer entries and the run completes.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The query was rejected before the pipeline started.
    #[error("invalid query: {reason}")]
    InvalidQuery {
        /// Why the query was rejected.
        reason: String,
    },

    /// A pipeline step faulted and the run cannot produce a result.
    #[error("workflow failed at {stage}: {reason}")]
    Step {
        /// The stage that faulted.
        stage: Stage,
        /// Human-readable failure description.
        reason: String,
    },
}

/// Errors from CLI command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command ran but failed.
    #[error("{0}")]
    ExecutionFailed(String),

    /// The result could not be rendered in the requested format.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}

/// Umbrella error type for the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Agent or provider error.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Retrieval service error.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Workflow execution error.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// CLI command error.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_error_display() {
        let err = AgentError::UnsupportedProvider {
            name: "mystery".to_string(),
        };
        assert!(err.to_string().contains("mystery"));

        let err = AgentError::Timeout { seconds: 300 };
        assert!(err.to_string().contains("300"));
    }

    #[test]
    fn workflow_error_carries_stage() {
        let err = WorkflowError::Step {
            stage: Stage::Retrieve,
            reason: "connection refused".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("retrieve"));
        assert!(rendered.contains("connection refused"));
    }

    #[test]
    fn umbrella_conversion() {
        let err: Error = AgentError::ApiKeyMissing.into();
        assert!(matches!(err, Error::Agent(AgentError::ApiKeyMissing)));
    }
}
