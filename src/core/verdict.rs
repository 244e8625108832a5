//! Relevance verdicts produced by the judge.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relevance classification of one passage against one query.
///
/// `Unknown` records a judge call that failed, timed out, or answered with
/// nothing. Downstream handling treats it exactly like `NotRelevant`, so a
/// broken judge can only ever shrink the context, never grow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The judge answered yes.
    Relevant,
    /// The judge answered anything else.
    NotRelevant,
    /// The judge could not produce an answer.
    Unknown,
}

impl Verdict {
    /// Classifies a raw judge response.
    ///
    /// The rule is deliberately tolerant: the lowercased response merely has
    /// to contain `yes` somewhere. Small local models decorate their binary
    /// answers (`**Yes**`, `Yes, the document discusses ...`) and the
    /// substring check accepts all of them. A blank response is a failed
    /// grade, not a no.
    #[must_use]
    pub fn from_response(response: &str) -> Self {
        if response.trim().is_empty() {
            return Self::Unknown;
        }
        if response.to_lowercase().contains("yes") {
            Self::Relevant
        } else {
            Self::NotRelevant
        }
    }

    /// Returns `true` when this verdict admits the passage into context.
    #[must_use]
    pub const fn is_relevant(self) -> bool {
        matches!(self, Self::Relevant)
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevant => "relevant",
            Self::NotRelevant => "not_relevant",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for the passage at `passage_index` in the retrieved sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    /// Index into the retrieved passage sequence.
    pub passage_index: usize,
    /// The judge's classification.
    pub verdict: Verdict,
}

impl RelevanceVerdict {
    /// Pairs a verdict with its passage index.
    #[must_use]
    pub const fn new(passage_index: usize, verdict: Verdict) -> Self {
        Self {
            passage_index,
            verdict,
        }
    }
}
