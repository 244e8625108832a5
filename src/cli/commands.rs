//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

// Allow certain patterns that improve readability in CLI output formatting
#![allow(clippy::format_push_string)]
#![allow(clippy::too_many_lines)]

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::agent::client::create_provider;
use crate::agent::config::{AnalystConfig, PanelConfig};
use crate::agent::orchestrator::{Orchestrator, PanelResult};
use crate::agent::prompt::PromptSet;
use crate::cli::output::OutputFormat;
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result};
use crate::retrieval::{HttpRetriever, RetrievalConfig};
use crate::workflow::AggregatorWorkflow;

// ==================== Parameter Structs ====================

/// Parameters for the ask command.
#[derive(Debug, Clone, Default)]
pub struct AskParams<'a> {
    /// The question to put to the panel.
    pub query: &'a str,
    /// LLM provider (ollama, openai).
    pub provider: Option<&'a str>,
    /// Panel analysts as `id=model` or bare `model` specs.
    pub analysts: &'a [String],
    /// Model for the relevance judge.
    pub judge_model: Option<&'a str>,
    /// Model for the aggregator.
    pub aggregator_model: Option<&'a str>,
    /// Passages to request from the retrieval service.
    pub top_k: Option<usize>,
    /// Maximum concurrent analyst calls.
    pub concurrency: Option<usize>,
    /// Base URL of the retrieval service.
    pub retrieval_url: Option<&'a str>,
    /// Collection to search in the retrieval service.
    pub collection: Option<&'a str>,
    /// Per-call timeout in seconds.
    pub timeout: Option<u64>,
    /// Run a complete workflow per analyst.
    pub independent: bool,
    /// Directory containing prompt template files.
    pub prompt_dir: Option<&'a Path>,
    /// Show per-analyst statuses in text output.
    pub verbose: bool,
}

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask {
            query,
            provider,
            analysts,
            judge_model,
            aggregator_model,
            top_k,
            concurrency,
            retrieval_url,
            collection,
            timeout,
            independent,
            prompt_dir,
        } => {
            let params = AskParams {
                query,
                provider: provider.as_deref(),
                analysts,
                judge_model: judge_model.as_deref(),
                aggregator_model: aggregator_model.as_deref(),
                top_k: *top_k,
                concurrency: *concurrency,
                retrieval_url: retrieval_url.as_deref(),
                collection: collection.as_deref(),
                timeout: *timeout,
                independent: *independent,
                prompt_dir: prompt_dir.as_deref(),
                verbose: cli.verbose,
            };
            cmd_ask(&params, format).await
        }

        Commands::Aggregate {
            provider,
            aggregator_model,
            timeout,
            prompt_dir,
        } => {
            cmd_aggregate(
                provider.as_deref(),
                aggregator_model.as_deref(),
                *timeout,
                prompt_dir.as_deref(),
                format,
            )
            .await
        }

        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

/// Parses a `--analyst` spec of the form `id=model` or bare `model`.
fn parse_analyst_spec(spec: &str) -> AnalystConfig {
    match spec.split_once('=') {
        Some((id, model)) if !id.trim().is_empty() && !model.trim().is_empty() => {
            AnalystConfig::new(id.trim(), model.trim())
        }
        _ => AnalystConfig::from_model(spec.trim()),
    }
}

/// Builds the panel configuration from environment plus CLI overrides.
fn build_panel_config(params: &AskParams<'_>) -> Result<PanelConfig> {
    let mut builder = PanelConfig::builder().from_env();

    if let Some(provider) = params.provider {
        builder = builder.provider(provider);
    }
    if !params.analysts.is_empty() {
        let panel: Vec<AnalystConfig> = params
            .analysts
            .iter()
            .map(|spec| parse_analyst_spec(spec))
            .collect();
        builder = builder.analysts(panel);
    }
    if let Some(model) = params.judge_model {
        builder = builder.judge_model(model);
    }
    if let Some(model) = params.aggregator_model {
        builder = builder.aggregator_model(model);
    }
    if let Some(k) = params.top_k {
        builder = builder.top_k(k);
    }
    if let Some(n) = params.concurrency {
        builder = builder.max_concurrency(n);
    }
    if let Some(secs) = params.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }

    builder
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("Panel configuration error: {e}")).into())
}

async fn cmd_ask(params: &AskParams<'_>, format: OutputFormat) -> Result<String> {
    let config = build_panel_config(params)?;

    let mut retrieval = RetrievalConfig::from_env();
    if let Some(url) = params.retrieval_url {
        retrieval.base_url = url.to_string();
    }
    if let Some(collection) = params.collection {
        retrieval.collection = collection.to_string();
    }
    let retriever = HttpRetriever::new(&retrieval)
        .map_err(|e| CommandError::ExecutionFailed(format!("Retriever creation failed: {e}")))?;

    let provider = create_provider(&config)
        .map_err(|e| CommandError::ExecutionFailed(format!("Provider creation failed: {e}")))?;

    let orchestrator = Orchestrator::new(Arc::from(provider), Arc::new(retriever), config)
        .map_err(|e| CommandError::ExecutionFailed(format!("Panel setup failed: {e}")))?;

    let result = if params.independent {
        orchestrator.ask_independent(params.query).await
    } else {
        orchestrator.ask(params.query).await
    };

    match result {
        Ok(panel_result) => format_panel_result(&panel_result, format, params.verbose),
        Err(e) => Err(CommandError::ExecutionFailed(format!("Ask failed: {e}")).into()),
    }
}

/// Renders a panel result in the requested output format.
fn format_panel_result(
    result: &PanelResult,
    format: OutputFormat,
    verbose: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut output = result.answer.clone();
            output.push_str(&format!(
                "\n\n---\nPassages: {}/{} relevant | Analysts: {} ok, {} failed | Time: {:.1}s",
                result.passages_relevant,
                result.passages_retrieved,
                result.analysts_ok,
                result.analysts_failed,
                result.elapsed.as_secs_f64()
            ));
            if verbose {
                for answer in &result.answers {
                    output.push_str(&format!("\n  {}: {}", answer.analyst_id, answer.status));
                }
            }
            Ok(output)
        }
        OutputFormat::Json => serde_json::to_string_pretty(result).map_err(|e| {
            CommandError::OutputFormat(format!("JSON serialization failed: {e}")).into()
        }),
    }
}

async fn cmd_aggregate(
    provider_name: Option<&str>,
    aggregator_model: Option<&str>,
    timeout: Option<u64>,
    prompt_dir: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    // Parse stdin before building any client so malformed input fails
    // without touching the network.
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| CommandError::ExecutionFailed(format!("Failed to read from stdin: {e}")))?;
    let answers: Vec<String> = serde_json::from_str(&input)
        .map_err(|e| CommandError::ExecutionFailed(format!("Invalid JSON input: {e}")))?;

    let mut builder = PanelConfig::builder().from_env();
    if let Some(provider) = provider_name {
        builder = builder.provider(provider);
    }
    if let Some(model) = aggregator_model {
        builder = builder.aggregator_model(model);
    }
    if let Some(secs) = timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(dir) = prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    let config = builder
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("Panel configuration error: {e}")))?;

    let provider = create_provider(&config)
        .map_err(|e| CommandError::ExecutionFailed(format!("Provider creation failed: {e}")))?;
    let prompts = PromptSet::load(config.prompt_dir.as_deref());
    let workflow = AggregatorWorkflow::new(Arc::from(provider), &config, &prompts);

    let summary = workflow
        .run(&answers)
        .await
        .map_err(|e| CommandError::ExecutionFailed(format!("Aggregation failed: {e}")))?;

    match format {
        OutputFormat::Text => Ok(summary),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "answer": summary,
                "inputs": answers.len(),
            });
            Ok(format.to_json(&json))
        }
    }
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ))
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    output.push_str(&format!(
                        "  {}\n",
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown")
                    ));
                }
                output.push_str("\nEdit these files to customize panel system prompts.\n");
                Ok(output)
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json))
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_analyst_spec_with_id() {
        let analyst = parse_analyst_spec("phi3=phi3:latest");
        assert_eq!(analyst.id, "phi3");
        assert_eq!(analyst.model, "phi3:latest");
    }

    #[test]
    fn test_parse_analyst_spec_bare_model() {
        let analyst = parse_analyst_spec("gemma2:latest");
        assert_eq!(analyst.id, "gemma2");
        assert_eq!(analyst.model, "gemma2:latest");
    }

    #[test]
    fn test_parse_analyst_spec_trims_whitespace() {
        let analyst = parse_analyst_spec(" qwen2 = qwen2:latest ");
        assert_eq!(analyst.id, "qwen2");
        assert_eq!(analyst.model, "qwen2:latest");
    }

    #[test]
    fn test_format_panel_result_text() {
        use crate::agent::analyst::AnalystAnswer;

        let result = PanelResult {
            answer: "- revenue grew".to_string(),
            passages_retrieved: 3,
            passages_relevant: 2,
            analysts_ok: 4,
            analysts_failed: 0,
            answers: vec![AnalystAnswer::ok("phi3", "fine")],
            elapsed: Duration::from_secs(2),
        };

        let output = format_panel_result(&result, OutputFormat::Text, false)
            .unwrap_or_default();
        assert!(output.starts_with("- revenue grew"));
        assert!(output.contains("Passages: 2/3 relevant"));
        assert!(output.contains("Analysts: 4 ok, 0 failed"));
        assert!(!output.contains("phi3:"));
    }

    #[test]
    fn test_format_panel_result_verbose_lists_statuses() {
        use crate::agent::analyst::AnalystAnswer;

        let result = PanelResult {
            answer: "summary".to_string(),
            passages_retrieved: 1,
            passages_relevant: 1,
            analysts_ok: 1,
            analysts_failed: 1,
            answers: vec![
                AnalystAnswer::ok("phi3", "fine"),
                AnalystAnswer::failed("gemma2"),
            ],
            elapsed: Duration::from_secs(1),
        };

        let output = format_panel_result(&result, OutputFormat::Text, true)
            .unwrap_or_default();
        assert!(output.contains("phi3: ok"));
        assert!(output.contains("gemma2: failed"));
    }

    #[test]
    fn test_format_panel_result_json() {
        let result = PanelResult {
            answer: "summary".to_string(),
            passages_retrieved: 0,
            passages_relevant: 0,
            analysts_ok: 0,
            analysts_failed: 0,
            answers: vec![],
            elapsed: Duration::from_millis(500),
        };

        let output = format_panel_result(&result, OutputFormat::Json, false)
            .unwrap_or_default();
        assert!(output.contains("\"answer\": \"summary\""));
        assert!(output.contains("\"elapsed\": 0.5"));
    }

    #[test]
    fn test_cmd_init_prompts_writes_templates() {
        let temp_dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let target = temp_dir.path().join("prompts");

        let output = cmd_init_prompts(Some(&target), OutputFormat::Text)
            .unwrap_or_else(|e| panic!("init-prompts failed: {e}"));
        assert!(output.contains("Wrote 3 prompt template(s)"));
        assert!(target.join("judge.md").exists());
        assert!(target.join("analyst.md").exists());
        assert!(target.join("aggregator.md").exists());

        // Second run finds everything in place.
        let output = cmd_init_prompts(Some(&target), OutputFormat::Text)
            .unwrap_or_else(|e| panic!("init-prompts failed: {e}"));
        assert!(output.contains("already exist"));
    }
}
