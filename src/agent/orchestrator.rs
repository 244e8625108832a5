//! Orchestrator for the analyst panel pipeline.
//!
//! Coordinates the full query pipeline: retrieval → relevance grading →
//! context assembly → analyst fan-out → aggregation. Two modes exist:
//! [`Orchestrator::ask`] retrieves and grades once for the whole panel,
//! while [`Orchestrator::ask_independent`] gives every analyst its own
//! complete workflow and aggregates at the end.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::aggregator::Aggregator;
use super::analyst::{Analyst, AnalystAnswer};
use super::config::PanelConfig;
use super::fanout::run_all;
use super::judge::RelevanceJudge;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use crate::core::assemble;
use crate::error::{AgentError, WorkflowError};
use crate::retrieval::Retriever;
use crate::workflow::engine::validate_query;
use crate::workflow::{AnalystWorkflow, RunState, Stage, WorkflowEvent};

/// Final result of a panel run.
#[derive(Debug, Clone, Serialize)]
pub struct PanelResult {
    /// The aggregated summary.
    pub answer: String,
    /// Passages returned by the retrieval service.
    pub passages_retrieved: usize,
    /// Passages the judge graded relevant.
    pub passages_relevant: usize,
    /// Analysts that produced an answer.
    pub analysts_ok: usize,
    /// Analysts whose invocations failed.
    pub analysts_failed: usize,
    /// Per-analyst answers, in registration order.
    pub answers: Vec<AnalystAnswer>,
    /// Total wall-clock time for the run.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

/// Serializes a [`Duration`] as fractional seconds.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Coordinates retrieval, grading, fan-out, and aggregation.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    retriever: Arc<dyn Retriever>,
    config: PanelConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates a new orchestrator with the given provider, retriever,
    /// and configuration.
    ///
    /// Loads prompt templates from the directory specified in
    /// [`PanelConfig::prompt_dir`], falling back to compiled-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoAnalysts`] when the panel is empty. The
    /// builder already rejects this, but configs assembled by hand get
    /// the same check at construction rather than a surprise mid-run.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        retriever: Arc<dyn Retriever>,
        config: PanelConfig,
    ) -> Result<Self, AgentError> {
        if config.analysts.is_empty() {
            return Err(AgentError::NoAnalysts);
        }
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Ok(Self {
            provider,
            retriever,
            config,
            prompts,
        })
    }

    /// Executes the shared-context panel pipeline.
    ///
    /// # Steps
    ///
    /// 1. Retrieve the top-k passages for the query
    /// 2. Grade each passage with the relevance judge
    /// 3. Assemble the context from the relevant passages
    /// 4. Fan the panel out over the same query and context
    /// 5. Aggregate the successful answers into one summary
    ///
    /// Steps 1-3 walk the same event sequence as a single-analyst
    /// workflow; the final steps swap one analyst for the whole panel.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidQuery`] for blank or oversized
    /// queries and [`WorkflowError::Step`] when retrieval or the final
    /// summarization call fails. Per-analyst faults do not error; they
    /// surface as failed entries in [`PanelResult::answers`].
    pub async fn ask(&self, query: &str) -> Result<PanelResult, WorkflowError> {
        validate_query(query)?;
        let start = Instant::now();

        info!(
            provider = self.provider.name(),
            analysts = self.config.analysts.len(),
            "panel run started"
        );

        let mut state = RunState::new(query);
        let mut event = WorkflowEvent::Started {
            query: query.to_string(),
        };

        // Steps 1-3: retrieve, grade, assemble.
        let context = loop {
            event = self.prepare_step(&mut state, event).await;
            debug!(event = event.kind(), "panel transition");

            match event {
                WorkflowEvent::Extracted { ref context } => break context.clone(),
                WorkflowEvent::Failed { stage, reason } => {
                    return Err(WorkflowError::Step { stage, reason });
                }
                _ => {}
            }
        };

        debug!(
            passages = state.passages.len(),
            relevant = state.relevant_count(),
            context_chars = context.len(),
            "context assembled"
        );

        // Step 4: fan the panel out over the shared context.
        let analysts: Vec<Analyst> = self
            .config
            .analysts
            .iter()
            .map(|c| Analyst::new(c, self.config.timeout, self.prompts.analyst.clone()))
            .collect();
        let answers = run_all(
            Arc::clone(&self.provider),
            &analysts,
            query,
            &context,
            self.config.max_concurrency,
        )
        .await;

        // Step 5: aggregate once.
        let aggregator = Aggregator::new(&self.config, self.prompts.aggregator.clone());
        let summary = aggregator
            .aggregate(&*self.provider, &answers)
            .await
            .map_err(|e| WorkflowError::Step {
                stage: Stage::Summarize,
                reason: e.to_string(),
            })?;

        let analysts_ok = answers.iter().filter(|a| a.is_ok()).count();
        info!(
            analysts_ok,
            analysts_failed = answers.len() - analysts_ok,
            elapsed = ?start.elapsed(),
            "panel run completed"
        );

        Ok(PanelResult {
            answer: summary,
            passages_retrieved: state.passages.len(),
            passages_relevant: state.relevant_count(),
            analysts_ok,
            analysts_failed: answers.len() - analysts_ok,
            answers,
            elapsed: start.elapsed(),
        })
    }

    /// Executes one complete workflow per analyst, concurrently.
    ///
    /// Every analyst retrieves, grades, and assembles on its own; the
    /// aggregator then summarizes whatever the runs produced. A run that
    /// fails outright degrades into a failed entry rather than sinking
    /// the panel, so the caller still gets a result whenever the final
    /// summarization succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidQuery`] for blank or oversized
    /// queries and [`WorkflowError::Step`] when the final summarization
    /// call fails.
    pub async fn ask_independent(&self, query: &str) -> Result<PanelResult, WorkflowError> {
        validate_query(query)?;
        let start = Instant::now();

        info!(
            analysts = self.config.analysts.len(),
            "independent panel run started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));

        let mut handles = Vec::with_capacity(self.config.analysts.len());
        for analyst_config in &self.config.analysts {
            let workflow = AnalystWorkflow::new(
                Arc::clone(&self.provider),
                Arc::clone(&self.retriever),
                &self.config,
                analyst_config,
                &self.prompts,
            );
            let sem = Arc::clone(&semaphore);
            let query = query.to_string();

            handles.push(tokio::spawn(async move {
                match sem.acquire().await {
                    Ok(_permit) => workflow.run_with_state(&query).await,
                    // The semaphore is never closed; this arm is for totality.
                    Err(_) => Err(WorkflowError::Step {
                        stage: Stage::Answer,
                        reason: "concurrency limiter closed".to_string(),
                    }),
                }
            }));
        }

        let mut answers = Vec::with_capacity(handles.len());
        let mut passages_retrieved = 0;
        let mut passages_relevant = 0;
        let mut counts_seen = false;

        for (handle, analyst_config) in handles.into_iter().zip(&self.config.analysts) {
            match handle.await {
                Ok(Ok(mut run)) => {
                    if !counts_seen {
                        // Runs share the corpus and query; the first
                        // completed run's counts stand for the panel.
                        passages_retrieved = run.passages.len();
                        passages_relevant = run.relevant_count();
                        counts_seen = true;
                    }
                    answers.push(
                        run.answer
                            .take()
                            .unwrap_or_else(|| AnalystAnswer::failed(&analyst_config.id)),
                    );
                }
                Ok(Err(e)) => {
                    warn!(analyst = %analyst_config.id, error = %e, "independent workflow failed");
                    answers.push(AnalystAnswer::failed(&analyst_config.id));
                }
                Err(e) => {
                    warn!(analyst = %analyst_config.id, error = %e, "workflow task join failed");
                    answers.push(AnalystAnswer::failed(&analyst_config.id));
                }
            }
        }

        debug_assert_eq!(
            answers.len(),
            self.config.analysts.len(),
            "panel answer count mismatch: expected {}, got {}",
            self.config.analysts.len(),
            answers.len()
        );

        let aggregator = Aggregator::new(&self.config, self.prompts.aggregator.clone());
        let summary = aggregator
            .aggregate(&*self.provider, &answers)
            .await
            .map_err(|e| WorkflowError::Step {
                stage: Stage::Summarize,
                reason: e.to_string(),
            })?;

        let analysts_ok = answers.iter().filter(|a| a.is_ok()).count();
        info!(
            analysts_ok,
            elapsed = ?start.elapsed(),
            "independent panel run completed"
        );

        Ok(PanelResult {
            answer: summary,
            passages_retrieved,
            passages_relevant,
            analysts_ok,
            analysts_failed: answers.len() - analysts_ok,
            answers,
            elapsed: start.elapsed(),
        })
    }

    /// Drives the shared retrieve/grade/assemble prefix of a panel run.
    async fn prepare_step(&self, state: &mut RunState, event: WorkflowEvent) -> WorkflowEvent {
        match event {
            WorkflowEvent::Started { query } => {
                match self.retriever.retrieve(&query, self.config.top_k).await {
                    Ok(passages) => WorkflowEvent::Retrieved { passages },
                    Err(e) => WorkflowEvent::Failed {
                        stage: Stage::Retrieve,
                        reason: e.to_string(),
                    },
                }
            }
            WorkflowEvent::Retrieved { passages } => {
                state.passages = passages;
                let judge = RelevanceJudge::new(&self.config, self.prompts.judge.clone());
                let verdicts = judge
                    .evaluate(&*self.provider, &state.query, &state.passages)
                    .await;
                WorkflowEvent::Filtered { verdicts }
            }
            WorkflowEvent::Filtered { verdicts } => {
                state.verdicts = verdicts;
                let context = assemble(&state.passages, &state.verdicts);
                WorkflowEvent::Extracted { context }
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("retriever", &self.retriever.name())
            .field("analysts", &self.config.analysts.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::agent::config::AnalystConfig;
    use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
    use crate::core::Passage;
    use crate::error::RetrievalError;

    struct CountingRetriever {
        calls: AtomicUsize,
        passages: Vec<Passage>,
    }

    impl CountingRetriever {
        fn new(passages: Vec<Passage>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                passages,
            }
        }
    }

    #[async_trait]
    impl Retriever for CountingRetriever {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn retrieve(
            &self,
            _query: &str,
            _top_k: usize,
        ) -> Result<Vec<Passage>, RetrievalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.passages.clone())
        }
    }

    struct RoutingProvider;

    #[async_trait]
    impl LlmProvider for RoutingProvider {
        fn name(&self) -> &'static str {
            "routing"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            let prompt = request
                .messages
                .last()
                .map(|m| m.content.as_str())
                .unwrap_or_default();

            let content = if request.model == "judge-model" {
                if prompt.contains("KEEP") { "yes" } else { "no" }.to_string()
            } else if request.model == "agg-model" {
                "- combined summary".to_string()
            } else {
                format!("{} says fine", request.model)
            };

            Ok(ChatResponse {
                content,
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    fn config() -> PanelConfig {
        PanelConfig::builder()
            .judge_model("judge-model")
            .aggregator_model("agg-model")
            .analysts(vec![
                AnalystConfig::new("a1", "a1-model"),
                AnalystConfig::new("a2", "a2-model"),
            ])
            .prompt_dir("/nonexistent-prompt-dir")
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    fn orchestrator(retriever: Arc<CountingRetriever>) -> Orchestrator {
        Orchestrator::new(Arc::new(RoutingProvider), retriever, config())
            .unwrap_or_else(|e| panic!("construction failed: {e}"))
    }

    #[test]
    fn test_empty_panel_rejected_at_construction() {
        let mut cfg = config();
        cfg.analysts.clear();
        let result = Orchestrator::new(
            Arc::new(RoutingProvider),
            Arc::new(CountingRetriever::new(vec![])),
            cfg,
        );
        assert!(matches!(result, Err(AgentError::NoAnalysts)));
    }

    #[tokio::test]
    async fn test_ask_retrieves_once_for_the_panel() {
        let retriever = Arc::new(CountingRetriever::new(vec![
            Passage::new("KEEP alpha", 0.9),
            Passage::new("noise beta", 0.8),
        ]));
        let result = orchestrator(Arc::clone(&retriever))
            .ask("What are the Fourth Quarter Highlights?")
            .await
            .unwrap_or_else(|e| panic!("ask failed: {e}"));

        assert_eq!(result.answer, "- combined summary");
        assert_eq!(result.passages_retrieved, 2);
        assert_eq!(result.passages_relevant, 1);
        assert_eq!(result.analysts_ok, 2);
        assert_eq!(result.analysts_failed, 0);
        assert_eq!(result.answers.len(), 2);
        assert_eq!(result.answers[0].analyst_id, "a1");
        assert_eq!(result.answers[1].analyst_id, "a2");
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ask_independent_retrieves_per_analyst() {
        let retriever = Arc::new(CountingRetriever::new(vec![Passage::new("KEEP", 0.9)]));
        let result = orchestrator(Arc::clone(&retriever))
            .ask_independent("query")
            .await
            .unwrap_or_else(|e| panic!("ask_independent failed: {e}"));

        assert_eq!(result.answers.len(), 2);
        assert_eq!(result.analysts_ok, 2);
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let retriever = Arc::new(CountingRetriever::new(vec![]));
        let result = orchestrator(retriever).ask("   ").await;
        assert!(matches!(result, Err(WorkflowError::InvalidQuery { .. })));
    }

    #[test]
    fn test_panel_result_serializes_elapsed_as_seconds() {
        let result = PanelResult {
            answer: "ok".to_string(),
            passages_retrieved: 1,
            passages_relevant: 1,
            analysts_ok: 1,
            analysts_failed: 0,
            answers: vec![AnalystAnswer::ok("a1", "ok")],
            elapsed: Duration::from_millis(1500),
        };
        let json = serde_json::to_string(&result).unwrap_or_default();
        assert!(json.contains("\"elapsed\":1.5"));
    }
}
