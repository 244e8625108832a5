//! Concurrent analyst fan-out.
//!
//! Runs every analyst on the panel over the same query and context.
//! Concurrency is capped with a semaphore so a large panel cannot flood
//! the provider; answers come back in registration order regardless of
//! completion order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::analyst::{Analyst, AnalystAnswer};
use super::provider::LlmProvider;

/// Runs all analysts concurrently and collects their answers.
///
/// Guarantees exactly one [`AnalystAnswer`] per analyst, ordered by
/// registration. A panicked or cancelled task is converted into a failed
/// entry for that analyst rather than surfacing a join error; fan-out
/// itself never fails.
pub async fn run_all(
    provider: Arc<dyn LlmProvider>,
    analysts: &[Analyst],
    query: &str,
    context: &str,
    max_concurrency: usize,
) -> Vec<AnalystAnswer> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let query: Arc<str> = Arc::from(query);
    let context: Arc<str> = Arc::from(context);

    debug!(
        analysts = analysts.len(),
        max_concurrency, "starting analyst fan-out"
    );

    let mut handles = Vec::with_capacity(analysts.len());
    for analyst in analysts {
        let semaphore = Arc::clone(&semaphore);
        let provider = Arc::clone(&provider);
        let analyst = analyst.clone();
        let query = Arc::clone(&query);
        let context = Arc::clone(&context);

        let handle = tokio::spawn(async move {
            match semaphore.acquire().await {
                Ok(_permit) => analyst.answer(&*provider, &query, &context).await,
                // The semaphore is never closed; this arm is for totality.
                Err(_) => AnalystAnswer::failed(analyst.id()),
            }
        });
        handles.push(handle);
    }

    let mut answers = Vec::with_capacity(analysts.len());
    for (handle, analyst) in handles.into_iter().zip(analysts) {
        match handle.await {
            Ok(answer) => answers.push(answer),
            Err(e) => {
                warn!(analyst = analyst.id(), error = %e, "analyst task join failed");
                answers.push(AnalystAnswer::failed(analyst.id()));
            }
        }
    }

    debug_assert_eq!(answers.len(), analysts.len());
    answers
}
