//! Main entry point for the ampex CLI.
//!
//! Downloads the requested Amplitude export archive (or takes an already
//! downloaded one), runs the extraction pipeline, and reports the batch
//! outcome.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ampex::{Cli, ExportClient, ExportWindow, run_pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a .env file; absence is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let archive = match &cli.archive {
        Some(path) => path.clone(),
        None => download_archive(&cli).await?,
    };

    let config = cli.pipeline_config();
    let summary = run_pipeline(&archive, &config)
        .await
        .with_context(|| format!("failed to ingest {}", archive.display()))?;

    summary.log_summary();
    println!(
        "{}: {} of {} members extracted into {} ({} skipped, {} failed)",
        archive.display(),
        summary.extracted(),
        summary.records.len(),
        config.output_dir.display(),
        summary.skipped(),
        summary.failed(),
    );

    Ok(())
}

/// Fetch the archive for the requested window into `--archive-path`.
async fn download_archive(cli: &Cli) -> Result<PathBuf> {
    // clap guarantees both bounds are present when --archive is absent
    let start = cli.start.as_deref().context("missing START argument")?;
    let end = cli.end.as_deref().context("missing END argument")?;
    let window = ExportWindow::parse(start, end)?;

    let api_key = std::env::var("AMP_API_KEY").context("AMP_API_KEY is not set")?;
    let secret_key = std::env::var("AMP_SECRET_KEY").context("AMP_SECRET_KEY is not set")?;

    let client = ExportClient::new(&cli.api_url, api_key, secret_key)?;
    client.download(&window, &cli.archive_path).await?;

    Ok(cli.archive_path.clone())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
