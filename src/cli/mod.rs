//! CLI layer for finpanel.
//!
//! Provides the command-line interface using clap, with commands for
//! asking the analyst panel, aggregating pre-computed answers, and
//! managing prompt templates.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
