//! Per-run outcome reporting.

use std::time::Duration;

/// What happened to one member of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberOutcome {
    /// Decompressed and written to the output directory.
    Extracted,
    /// Filename did not carry the compression suffix; left alone.
    Skipped,
    /// Decompression or write failed; no output file was produced.
    Failed(String),
}

/// One examined member and its outcome.
#[derive(Debug, Clone)]
pub struct MemberRecord {
    /// Member path relative to the batch folder.
    pub name: String,
    pub outcome: MemberOutcome,
}

/// Report for one completed (possibly partially failed) run.
#[derive(Debug)]
pub struct RunSummary {
    /// One record per member examined, in processing order.
    pub records: Vec<MemberRecord>,
    /// Size of the ingested archive in bytes.
    pub archive_bytes: u64,
    /// Wall-clock time of unpack + decompress.
    pub duration: Duration,
}

impl RunSummary {
    pub fn extracted(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Extracted))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Failed(_)))
    }

    /// True when every member that should decompress did.
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&MemberOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Emit the structured run-outcome event plus one warning per failure.
    pub fn log_summary(&self) {
        tracing::info!(
            archive_bytes = self.archive_bytes,
            members = self.records.len(),
            extracted = self.extracted(),
            skipped = self.skipped(),
            failed = self.failed(),
            duration_ms = self.duration.as_millis() as u64,
            "batch ingestion finished"
        );

        for record in &self.records {
            if let MemberOutcome::Failed(reason) = &record.outcome {
                tracing::warn!(member = %record.name, reason = %reason, "member failed");
            }
        }
    }
}
