//! Fatal pipeline error taxonomy.
//!
//! Only conditions that abort a run live here. Per-member decompression
//! failures are not errors in this sense: they are recorded in the run
//! report and the batch continues (see [`crate::pipeline`]).

use thiserror::Error;

use crate::zip::ZipError;

/// Fatal failures of an ingestion run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The downloaded archive cannot be parsed as a ZIP file.
    #[error("malformed archive: {0}")]
    MalformedArchive(#[source] ZipError),

    /// The archive root does not contain exactly one digit-named batch
    /// folder, which signals an export format change upstream.
    #[error("expected exactly one digit-named batch folder at the archive root, found {count}")]
    AmbiguousBatch { count: usize },

    /// An archive entry name escapes the extraction directory.
    #[error("archive entry has an unsafe path: {0}")]
    UnsafeEntryPath(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ZipError> for PipelineError {
    fn from(err: ZipError) -> Self {
        match err {
            // Plain I/O trouble is not evidence of a bad archive
            ZipError::Io(io) => PipelineError::Io(io),
            other => PipelineError::MalformedArchive(other),
        }
    }
}
