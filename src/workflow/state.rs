//! Typed per-run state.

use crate::agent::analyst::AnalystAnswer;
use crate::core::{Passage, RelevanceVerdict};

/// Accumulated state of one workflow run.
///
/// Each field is written exactly once, by the step that produces it.
/// Readers see either the typed value or its empty default.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// The user query driving the run.
    pub query: String,
    /// Passages from retrieval, in retrieval order.
    pub passages: Vec<Passage>,
    /// One verdict per passage, in retrieval order.
    pub verdicts: Vec<RelevanceVerdict>,
    /// Assembled context; `None` until assembly ran.
    pub context: Option<String>,
    /// The analyst's answer; `None` until the answer step ran.
    pub answer: Option<AnalystAnswer>,
}

impl RunState {
    /// Fresh state for a query.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Number of passages graded relevant.
    #[must_use]
    pub fn relevant_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|v| v.verdict.is_relevant())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Verdict;

    #[test]
    fn fresh_state_is_empty() {
        let state = RunState::new("what changed?");
        assert_eq!(state.query, "what changed?");
        assert!(state.passages.is_empty());
        assert!(state.context.is_none());
        assert!(state.answer.is_none());
        assert_eq!(state.relevant_count(), 0);
    }

    #[test]
    fn relevant_count_ignores_unknown() {
        let mut state = RunState::new("q");
        state.verdicts = vec![
            RelevanceVerdict::new(0, Verdict::Relevant),
            RelevanceVerdict::new(1, Verdict::Unknown),
            RelevanceVerdict::new(2, Verdict::Relevant),
        ];
        assert_eq!(state.relevant_count(), 2);
    }
}
