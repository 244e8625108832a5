//! Workflow events and stage labels.
//!
//! Every step of a run consumes exactly one event and emits exactly one.
//! The tagged union makes the legal transitions explicit at the dispatch
//! site: a step that receives an event it does not handle cannot
//! accidentally run out of order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Passage, RelevanceVerdict};

/// Pipeline stage labels used in events, logs, and failure reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Fetching passages from the retrieval service.
    Retrieve,
    /// Grading passage relevance.
    Judge,
    /// Assembling the context from relevant passages.
    Assemble,
    /// Generating an analyst answer.
    Answer,
    /// Producing the aggregated summary.
    Summarize,
}

impl Stage {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Judge => "judge",
            Self::Assemble => "assemble",
            Self::Answer => "answer",
            Self::Summarize => "summarize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events flowing through a workflow run.
///
/// A full pipeline run walks `Started → Retrieved → Filtered → Extracted →
/// Answered`; the aggregation workflow walks `Started → Extracted →
/// Answered`. `Answered` and `Failed` are terminal; `Failed` can follow
/// any non-terminal event.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// Run accepted; carries the user query.
    Started {
        /// The query driving this run.
        query: String,
    },
    /// Retrieval returned the top-k passages.
    Retrieved {
        /// Passages in retrieval order.
        passages: Vec<Passage>,
    },
    /// The judge graded every passage.
    Filtered {
        /// One verdict per passage, in retrieval order.
        verdicts: Vec<RelevanceVerdict>,
    },
    /// Context was assembled from the relevant passages.
    Extracted {
        /// The assembled context; empty when nothing was relevant.
        context: String,
    },
    /// Terminal: the run produced its result.
    Answered {
        /// The final result text.
        result: String,
    },
    /// Terminal: a step faulted and the run cannot continue.
    Failed {
        /// The stage that faulted.
        stage: Stage,
        /// Human-readable failure description.
        reason: String,
    },
}

impl WorkflowEvent {
    /// Returns `true` for terminal events.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Answered { .. } | Self::Failed { .. })
    }

    /// Short label for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Retrieved { .. } => "retrieved",
            Self::Filtered { .. } => "filtered",
            Self::Extracted { .. } => "extracted",
            Self::Answered { .. } => "answered",
            Self::Failed { .. } => "failed",
        }
    }
}
