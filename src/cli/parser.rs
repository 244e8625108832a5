//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// finpanel: multi-model analyst panel over retrieved financial filings.
///
/// Retrieves passages for a question, grades them for relevance, fans
/// the question out across a panel of analyst models, and aggregates
/// their answers into one summary.
#[derive(Parser, Debug)]
#[command(name = "finpanel")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the analyst panel a question.
    ///
    /// Retrieves passages from the retrieval service, filters them with
    /// the relevance judge, runs every analyst over the shared context,
    /// and prints the aggregated summary. Analyst failures degrade
    /// rather than abort: the panel answers with whatever survived.
    #[command(after_help = r#"Examples:
  finpanel ask "What are the Fourth Quarter Highlights?"
  finpanel ask "How did operating margin develop?" -k 8
  finpanel ask "Summarize segment revenue" --analyst phi3=phi3:latest --analyst gemma2=gemma2:latest
  finpanel ask "Full-year outlook?" --provider openai --judge-model gpt-4o-mini
  finpanel ask "Cash flow drivers?" --independent       # Per-analyst retrieval
  finpanel --format json ask "Net income?" | jq '.answers[].status'
"#)]
    Ask {
        /// The question to put to the panel.
        query: String,

        /// LLM provider (ollama, openai).
        #[arg(long, env = "FINPANEL_PROVIDER")]
        provider: Option<String>,

        /// Panel analyst as `id=model` or bare `model` (repeatable).
        ///
        /// Replaces the default panel when given at least once.
        #[arg(long = "analyst")]
        analysts: Vec<String>,

        /// Model for the relevance judge.
        #[arg(long)]
        judge_model: Option<String>,

        /// Model for the aggregator.
        #[arg(long)]
        aggregator_model: Option<String>,

        /// Passages to request from the retrieval service.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Maximum concurrent analyst calls.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Base URL of the retrieval service.
        #[arg(long, env = "FINPANEL_RETRIEVAL_URL")]
        retrieval_url: Option<String>,

        /// Collection to search in the retrieval service.
        #[arg(long, env = "FINPANEL_COLLECTION")]
        collection: Option<String>,

        /// Per-call timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Run a complete workflow per analyst instead of sharing one
        /// retrieval pass across the panel.
        #[arg(long)]
        independent: bool,

        /// Directory containing prompt template files.
        #[arg(long)]
        prompt_dir: Option<PathBuf>,
    },

    /// Aggregate pre-computed analyst answers from stdin.
    ///
    /// Reads a JSON array of answer strings and produces the same
    /// bullet-point summary the full pipeline would. Useful when the
    /// analyst runs happened elsewhere.
    #[command(after_help = r#"Examples:
  echo '["Revenue grew 12%.", "Margins held at 38%."]' | finpanel aggregate
  cat answers.json | finpanel aggregate --aggregator-model llama3.1:latest
  cat answers.json | finpanel --format json aggregate | jq '.answer'

Input format (JSON array of answer strings):
["Revenue grew 12% year over year.", "Operating margin held at 38%."]"#)]
    Aggregate {
        /// LLM provider (ollama, openai).
        #[arg(long, env = "FINPANEL_PROVIDER")]
        provider: Option<String>,

        /// Model for the aggregator.
        #[arg(long)]
        aggregator_model: Option<String>,

        /// Per-call timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Directory containing prompt template files.
        #[arg(long)]
        prompt_dir: Option<PathBuf>,
    },

    /// Write default prompt templates to disk for customization.
    ///
    /// Creates markdown template files in the prompt directory so users
    /// can customize agent system prompts without recompiling.
    #[command(name = "init-prompts")]
    #[command(after_help = r#"Examples:
  finpanel init-prompts                        # Write to ~/.config/finpanel/prompts/
  finpanel init-prompts --dir ./my-prompts     # Write to custom directory
"#)]
    InitPrompts {
        /// Target directory for prompt templates.
        ///
        /// Defaults to `~/.config/finpanel/prompts/`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        // Test that CLI can be created
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_defaults() {
        let cli = Cli::try_parse_from(["finpanel", "ask", "net income?"]);
        let Ok(cli) = cli else {
            panic!("parse failed");
        };
        match cli.command {
            Commands::Ask {
                query,
                analysts,
                top_k,
                independent,
                ..
            } => {
                assert_eq!(query, "net income?");
                assert!(analysts.is_empty());
                assert_eq!(top_k, None);
                assert!(!independent);
            }
            Commands::Aggregate { .. } | Commands::InitPrompts { .. } => {
                panic!("wrong command parsed");
            }
        }
        assert_eq!(cli.format, "text");
    }

    #[test]
    fn test_repeatable_analyst_flag() {
        let cli = Cli::try_parse_from([
            "finpanel",
            "ask",
            "q",
            "--analyst",
            "phi3=phi3:latest",
            "--analyst",
            "gemma2=gemma2:latest",
            "-k",
            "8",
        ]);
        let Ok(cli) = cli else {
            panic!("parse failed");
        };
        match cli.command {
            Commands::Ask {
                analysts, top_k, ..
            } => {
                assert_eq!(analysts.len(), 2);
                assert_eq!(analysts[0], "phi3=phi3:latest");
                assert_eq!(top_k, Some(8));
            }
            Commands::Aggregate { .. } | Commands::InitPrompts { .. } => {
                panic!("wrong command parsed");
            }
        }
    }

    #[test]
    fn test_ask_requires_query() {
        assert!(Cli::try_parse_from(["finpanel", "ask"]).is_err());
    }
}
