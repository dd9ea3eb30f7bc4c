//! Run configuration.
//!
//! Everything a pipeline run needs is passed in explicitly so that
//! multiple runs with different settings can coexist in one process.

use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;
use thiserror::Error;

/// Hour-granularity wire format of the Export API (`20251104T00`).
const HOUR_FORMAT: &str = "%Y%m%dT%H";

/// Settings for one ingestion run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent directory under which the per-run scratch directory is created.
    pub scratch_base: PathBuf,
    /// Persistent directory receiving the decompressed member files.
    pub output_dir: PathBuf,
    /// Filename suffix identifying compressed members (with leading dot).
    pub suffix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_base: std::env::temp_dir(),
            output_dir: PathBuf::from("data"),
            suffix: ".gz".to_string(),
        }
    }
}

/// Invalid export window bounds.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("invalid export timestamp '{0}', expected YYYYMMDDTHH (e.g. 20251104T00)")]
    InvalidTimestamp(String),

    #[error("export window start {start} is not before end {end}")]
    EmptyWindow { start: String, end: String },
}

/// Half-open time range identifying one export batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ExportWindow {
    /// Parse a window from the API's `YYYYMMDDTHH` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        let start = parse_hour(start)?;
        let end = parse_hour(end)?;
        if start >= end {
            return Err(WindowError::EmptyWindow {
                start: start.format(HOUR_FORMAT).to_string(),
                end: end.format(HOUR_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Wire form of the window start, e.g. `20251104T00`.
    pub fn start_param(&self) -> String {
        self.start.format(HOUR_FORMAT).to_string()
    }

    /// Wire form of the window end.
    pub fn end_param(&self) -> String {
        self.end.format(HOUR_FORMAT).to_string()
    }
}

fn parse_hour(s: &str) -> Result<NaiveDateTime, WindowError> {
    let invalid = || WindowError::InvalidTimestamp(s.to_string());

    let (date, hour) = s.split_once('T').ok_or_else(invalid)?;
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| invalid())?;
    if hour.len() != 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hour: u32 = hour.parse().map_err(|_| invalid())?;

    date.and_hms_opt(hour, 0, 0).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_cli_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert_eq!(config.suffix, ".gz");
        assert_eq!(config.scratch_base, std::env::temp_dir());
    }

    #[test]
    fn parses_valid_window() {
        let window = ExportWindow::parse("20251104T00", "20251105T00").unwrap();
        assert_eq!(window.start_param(), "20251104T00");
        assert_eq!(window.end_param(), "20251105T00");
    }

    #[test]
    fn rejects_malformed_timestamps() {
        for bad in ["20251104", "2025-11-04T00", "20251104T0", "20251104T24", "20251399T00"] {
            let err = ExportWindow::parse(bad, "20251105T00").unwrap_err();
            assert!(
                matches!(err, WindowError::InvalidTimestamp(_)),
                "expected InvalidTimestamp for {bad}, got {err}"
            );
        }
    }

    #[test]
    fn rejects_inverted_and_empty_windows() {
        assert!(matches!(
            ExportWindow::parse("20251105T00", "20251104T00"),
            Err(WindowError::EmptyWindow { .. })
        ));
        assert!(matches!(
            ExportWindow::parse("20251104T00", "20251104T00"),
            Err(WindowError::EmptyWindow { .. })
        ));
    }
}
