//! finpanel binary entry point.
//!
//! Parses CLI arguments, initializes tracing to stderr, and prints the
//! command result to stdout.

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use finpanel::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let output = cli::execute(&cli).await?;

    // stdout carries results; diagnostics go to stderr via tracing.
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}").context("failed to write output")?;

    Ok(())
}

/// Initializes the tracing subscriber with stderr output.
///
/// `RUST_LOG` takes precedence when set; otherwise `--verbose` raises
/// the crate level to debug, and the default is info.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_directive = if verbose {
        "finpanel=debug"
    } else {
        "finpanel=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}
