//! Analyst panel agents for finpanel.
//!
//! Provides an LLM-powered workflow that grades retrieved passages,
//! fans a question out across a panel of analyst models, and aggregates
//! their answers. Uses a pluggable provider abstraction backed by
//! OpenAI-compatible and Ollama APIs.
//!
//! # Architecture
//!
//! ```text
//! User query → Orchestrator
//!   ├── Retriever (external passage search)
//!   ├── RelevanceJudge (grades each passage yes/no)
//!   ├── Context assembly (relevant passages, retrieval order)
//!   ├── Fan-out → N concurrent Analysts
//!   │   └── Each answers from the same context → AnalystAnswer
//!   └── Aggregator → one bullet-point summary
//! ```

pub mod aggregator;
pub mod analyst;
pub mod client;
pub mod config;
pub mod fanout;
pub mod judge;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod traits;

// Re-export key types
pub use aggregator::{Aggregator, NO_INFORMATION_RESULT};
pub use analyst::{Analyst, AnalystAnswer, AnswerStatus, DONT_KNOW_ANSWER};
pub use client::create_provider;
pub use config::{AnalystConfig, PanelConfig, PanelConfigBuilder};
pub use fanout::run_all;
pub use judge::RelevanceJudge;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{Orchestrator, PanelResult};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use traits::{Agent, AgentResponse, execute_bounded};
