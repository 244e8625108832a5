//! Workflow engines: explicit state machines over typed events.
//!
//! Each engine is a loop around a `step` function that consumes one
//! event and emits the next, with [`RunState`] accumulating typed
//! artifacts along the way. Terminal events end the loop: `Answered`
//! resolves to the run's result, `Failed` to a [`WorkflowError::Step`]
//! carrying the faulting stage.

use std::sync::Arc;

use tracing::{debug, info};

use super::event::{Stage, WorkflowEvent};
use super::state::RunState;
use crate::agent::aggregator::Aggregator;
use crate::agent::analyst::{Analyst, AnalystAnswer};
use crate::agent::config::{AnalystConfig, PanelConfig};
use crate::agent::judge::RelevanceJudge;
use crate::agent::prompt::{PromptSet, SUMMARY_INSTRUCTION};
use crate::agent::provider::LlmProvider;
use crate::core::assemble;
use crate::error::WorkflowError;
use crate::retrieval::Retriever;

/// Longest accepted query, in bytes.
pub(crate) const MAX_QUERY_LEN: usize = 10_000;

/// Rejects blank and oversized queries before any work starts.
pub(crate) fn validate_query(query: &str) -> Result<(), WorkflowError> {
    if query.trim().is_empty() {
        return Err(WorkflowError::InvalidQuery {
            reason: "query is empty".to_string(),
        });
    }
    if query.len() > MAX_QUERY_LEN {
        return Err(WorkflowError::InvalidQuery {
            reason: format!("query exceeds {MAX_QUERY_LEN} bytes"),
        });
    }
    Ok(())
}

/// Single-analyst workflow: one model's complete pipeline run.
///
/// Walks `Started → Retrieved → Filtered → Extracted → Answered`, with
/// its own retrieval, grading, and context assembly. Retrieval faults
/// fail the run; analyst faults degrade into a failed answer entry and
/// the run still completes.
pub struct AnalystWorkflow {
    provider: Arc<dyn LlmProvider>,
    retriever: Arc<dyn Retriever>,
    top_k: usize,
    judge: RelevanceJudge,
    analyst: Analyst,
}

impl AnalystWorkflow {
    /// Creates a workflow for one analyst.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        retriever: Arc<dyn Retriever>,
        config: &PanelConfig,
        analyst_config: &AnalystConfig,
        prompts: &PromptSet,
    ) -> Self {
        Self {
            provider,
            retriever,
            top_k: config.top_k,
            judge: RelevanceJudge::new(config, prompts.judge.clone()),
            analyst: Analyst::new(analyst_config, config.timeout, prompts.analyst.clone()),
        }
    }

    /// Runs the workflow to a terminal event and returns the answer.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidQuery`] for blank or oversized
    /// queries and [`WorkflowError::Step`] when retrieval faults.
    pub async fn run(&self, user_query: &str) -> Result<AnalystAnswer, WorkflowError> {
        let mut state = self.run_with_state(user_query).await?;
        Ok(state
            .answer
            .take()
            .unwrap_or_else(|| AnalystAnswer::failed(self.analyst.id())))
    }

    /// Runs the workflow and returns the full accumulated state.
    ///
    /// Callers that want run diagnostics (passage counts, assembled
    /// context) use this variant; [`AnalystWorkflow::run`] discards them.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AnalystWorkflow::run`].
    pub async fn run_with_state(&self, user_query: &str) -> Result<RunState, WorkflowError> {
        validate_query(user_query)?;

        let mut state = RunState::new(user_query);
        let mut event = WorkflowEvent::Started {
            query: user_query.to_string(),
        };
        debug!(analyst = self.analyst.id(), event = event.kind(), "workflow started");

        loop {
            event = self.step(&mut state, event).await;
            debug!(
                analyst = self.analyst.id(),
                event = event.kind(),
                "workflow transition"
            );

            match event {
                WorkflowEvent::Answered { .. } => {
                    info!(
                        analyst = self.analyst.id(),
                        passages = state.passages.len(),
                        relevant = state.relevant_count(),
                        "workflow completed"
                    );
                    return Ok(state);
                }
                WorkflowEvent::Failed { stage, reason } => {
                    return Err(WorkflowError::Step { stage, reason });
                }
                _ => {}
            }
        }
    }

    /// Consumes one event and produces the next.
    async fn step(&self, state: &mut RunState, event: WorkflowEvent) -> WorkflowEvent {
        match event {
            WorkflowEvent::Started { query } => {
                match self.retriever.retrieve(&query, self.top_k).await {
                    Ok(passages) => WorkflowEvent::Retrieved { passages },
                    Err(e) => WorkflowEvent::Failed {
                        stage: Stage::Retrieve,
                        reason: e.to_string(),
                    },
                }
            }
            WorkflowEvent::Retrieved { passages } => {
                state.passages = passages;
                let verdicts = self
                    .judge
                    .evaluate(&*self.provider, &state.query, &state.passages)
                    .await;
                WorkflowEvent::Filtered { verdicts }
            }
            WorkflowEvent::Filtered { verdicts } => {
                state.verdicts = verdicts;
                let context = assemble(&state.passages, &state.verdicts);
                WorkflowEvent::Extracted { context }
            }
            WorkflowEvent::Extracted { context } => {
                state.context = Some(context.clone());
                let answer = self
                    .analyst
                    .answer(&*self.provider, &state.query, &context)
                    .await;
                let result = answer.answer.clone();
                state.answer = Some(answer);
                WorkflowEvent::Answered { result }
            }
            terminal @ (WorkflowEvent::Answered { .. } | WorkflowEvent::Failed { .. }) => terminal,
        }
    }
}

impl std::fmt::Debug for AnalystWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalystWorkflow")
            .field("provider", &self.provider.name())
            .field("retriever", &self.retriever.name())
            .field("analyst", &self.analyst.id())
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

/// Aggregation workflow: `Started → Extracted → Answered`.
///
/// The inputs are pre-computed analyst answer strings; extraction here
/// means concatenating them into the document the aggregator summarizes.
pub struct AggregatorWorkflow {
    provider: Arc<dyn LlmProvider>,
    aggregator: Aggregator,
}

impl AggregatorWorkflow {
    /// Creates the aggregation workflow.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &PanelConfig, prompts: &PromptSet) -> Self {
        Self {
            provider,
            aggregator: Aggregator::new(config, prompts.aggregator.clone()),
        }
    }

    /// Summarizes an ordered sequence of analyst answer strings.
    ///
    /// With no usable input the run still answers, with the fixed
    /// no-information result and no model call.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Step`] when the summarization call fails.
    pub async fn run(&self, answers: &[String]) -> Result<String, WorkflowError> {
        let mut event = WorkflowEvent::Started {
            query: SUMMARY_INSTRUCTION.to_string(),
        };
        debug!(
            inputs = answers.len(),
            event = event.kind(),
            "aggregation workflow started"
        );

        loop {
            event = self.step(answers, event).await;
            debug!(event = event.kind(), "workflow transition");

            match event {
                WorkflowEvent::Answered { result } => {
                    info!("aggregation workflow completed");
                    return Ok(result);
                }
                WorkflowEvent::Failed { stage, reason } => {
                    return Err(WorkflowError::Step { stage, reason });
                }
                _ => {}
            }
        }
    }

    /// Consumes one event and produces the next.
    async fn step(&self, inputs: &[String], event: WorkflowEvent) -> WorkflowEvent {
        match event {
            WorkflowEvent::Started { .. } => WorkflowEvent::Extracted {
                context: inputs.concat(),
            },
            WorkflowEvent::Extracted { context } => {
                match self
                    .aggregator
                    .summarize_document(&*self.provider, &context)
                    .await
                {
                    Ok(result) => WorkflowEvent::Answered { result },
                    Err(e) => WorkflowEvent::Failed {
                        stage: Stage::Summarize,
                        reason: e.to_string(),
                    },
                }
            }
            other @ (WorkflowEvent::Retrieved { .. } | WorkflowEvent::Filtered { .. }) => {
                let kind = other.kind();
                WorkflowEvent::Failed {
                    stage: Stage::Summarize,
                    reason: format!("illegal {kind} event in aggregation workflow"),
                }
            }
            terminal @ (WorkflowEvent::Answered { .. } | WorkflowEvent::Failed { .. }) => terminal,
        }
    }
}

impl std::fmt::Debug for AggregatorWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatorWorkflow")
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}
