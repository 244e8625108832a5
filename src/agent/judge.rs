//! Relevance judge: grades each retrieved passage against the query.
//!
//! The judge runs one model call per passage, sequentially and in
//! retrieval order, and never fails the pipeline: a call that errors,
//! times out, or answers with nothing yields a [`Verdict::Unknown`]
//! for that passage and grading continues.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::config::PanelConfig;
use super::prompt::build_judge_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, execute_bounded};
use crate::core::{Passage, RelevanceVerdict, Verdict};

/// Agent that grades passage relevance with a binary yes/no call.
#[derive(Debug, Clone)]
pub struct RelevanceJudge {
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    system_prompt: String,
}

impl RelevanceJudge {
    /// Creates a judge from panel configuration and a system prompt.
    #[must_use]
    pub fn new(config: &PanelConfig, system_prompt: String) -> Self {
        Self {
            model: config.judge_model.clone(),
            temperature: config.judge_temperature,
            max_tokens: config.judge_max_tokens,
            timeout: config.timeout,
            system_prompt,
        }
    }

    /// Grades every passage against the query.
    ///
    /// Returns exactly one verdict per passage, indexed in retrieval
    /// order. Failed calls degrade to [`Verdict::Unknown`], which the
    /// context assembler excludes; a broken judge therefore shrinks the
    /// context rather than poisoning it.
    pub async fn evaluate(
        &self,
        provider: &dyn LlmProvider,
        query: &str,
        passages: &[Passage],
    ) -> Vec<RelevanceVerdict> {
        let mut verdicts = Vec::with_capacity(passages.len());

        for (index, passage) in passages.iter().enumerate() {
            let user_msg = build_judge_prompt(query, &passage.text);

            let verdict = match execute_bounded(self, provider, &user_msg, self.timeout).await {
                Ok(response) => Verdict::from_response(&response.content),
                Err(e) => {
                    warn!(passage = index, error = %e, "judge call failed; grading passage as unknown");
                    Verdict::Unknown
                }
            };

            debug!(passage = index, verdict = %verdict, "passage graded");
            verdicts.push(RelevanceVerdict::new(index, verdict));
        }

        verdicts
    }
}

#[async_trait]
impl Agent for RelevanceJudge {
    fn name(&self) -> &'static str {
        "judge"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
