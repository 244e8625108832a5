//! finpanel: a multi-model analyst panel over retrieved financial filings.
//!
//! Answers questions about financial documents by retrieving passages
//! from an external search service, grading them for relevance with a
//! judge model, fanning the question out across a panel of analyst
//! models that share the assembled context, and aggregating the
//! surviving answers into one bullet-point summary.
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
//!
//! Failures degrade instead of aborting: an unreadable judge response
//! drops the passage, a failed analyst becomes a failed entry in the
//! result, and a panel with nothing to say answers with a fixed
//! no-information message.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use finpanel::agent::{Orchestrator, PanelConfig, create_provider};
//! use finpanel::retrieval::{HttpRetriever, RetrievalConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = PanelConfig::from_env()?;
//! let provider = create_provider(&config)?;
//! let retriever = HttpRetriever::new(&RetrievalConfig::from_env())?;
//!
//! let orchestrator = Orchestrator::new(Arc::from(provider), Arc::new(retriever), config)?;
//! let result = orchestrator.ask("What are the Fourth Quarter Highlights?").await?;
//! println!("{}", result.answer);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
pub mod retrieval;
pub mod workflow;

pub use error::{Error, Result};
