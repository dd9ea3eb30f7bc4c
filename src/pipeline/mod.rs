//! The ingestion pipeline: archive -> scratch -> flat output directory.
//!
//! One run is strictly sequential: unpack the outer archive into a fresh
//! scratch directory, locate the batch folder, decompress its members
//! into the output directory, and remove the scratch directory whatever
//! happened. Concurrent runs are safe as long as they target different
//! output directories; every run gets its own scratch directory.

mod gunzip;
mod report;
mod unpack;

pub use report::{MemberOutcome, MemberRecord, RunSummary};

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// Ingest one export archive.
///
/// Fatal conditions ([`PipelineError`]) abort the run; per-member
/// decompression failures do not and are reported through the returned
/// [`RunSummary`]. The scratch directory is removed on every exit path;
/// if removal itself fails that is logged as a warning and otherwise
/// ignored (a leak, not a correctness problem).
pub async fn run_pipeline(
    archive: &Path,
    config: &PipelineConfig,
) -> Result<RunSummary, PipelineError> {
    let started = Instant::now();
    let archive_bytes = tokio::fs::metadata(archive).await?.len();

    tokio::fs::create_dir_all(&config.output_dir).await?;
    tokio::fs::create_dir_all(&config.scratch_base).await?;

    // Fresh directory per run keeps concurrent runs disjoint; the guard
    // also removes it if anything below panics.
    let scratch = tempfile::Builder::new()
        .prefix("ampex-")
        .tempdir_in(&config.scratch_base)?;
    debug!(scratch = %scratch.path().display(), "created scratch directory");

    let result = ingest(archive, scratch.path(), config).await;

    if let Err(err) = scratch.close() {
        warn!(error = %err, "failed to remove scratch directory");
    }

    Ok(RunSummary {
        records: result?,
        archive_bytes,
        duration: started.elapsed(),
    })
}

async fn ingest(
    archive: &Path,
    scratch: &Path,
    config: &PipelineConfig,
) -> Result<Vec<MemberRecord>, PipelineError> {
    let batch_dir = unpack::unpack_archive(archive, scratch).await?;
    info!(batch = %batch_dir.display(), "located batch folder");

    let records = gunzip::decompress_batch(&batch_dir, &config.output_dir, &config.suffix).await?;
    Ok(records)
}
