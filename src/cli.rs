use clap::Parser;
use std::path::PathBuf;

use crate::api::DEFAULT_API_URL;
use crate::config::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "ampex")]
#[command(version)]
#[command(about = "Fetch an Amplitude event export and unpack it into flat event files", long_about = None)]
#[command(after_help = "Examples:\n  \
  ampex 20251104T00 20251105T00             ingest one day of events into ./data\n  \
  ampex 20251104T00 20251104T06 -d events   ingest six hours into ./events\n  \
  ampex --archive amp_events.zip            re-ingest an already downloaded archive\n\n\
Credentials are read from AMP_API_KEY and AMP_SECRET_KEY (a .env file is honored).")]
pub struct Cli {
    /// Export window start, YYYYMMDDTHH (e.g. 20251104T00)
    #[arg(value_name = "START", required_unless_present = "archive")]
    pub start: Option<String>,

    /// Export window end, YYYYMMDDTHH
    #[arg(value_name = "END", required_unless_present = "archive")]
    pub end: Option<String>,

    /// Ingest an existing archive instead of downloading one
    #[arg(long, value_name = "FILE", conflicts_with_all = ["start", "end"])]
    pub archive: Option<PathBuf>,

    /// Directory receiving the decompressed event files
    #[arg(short = 'd', long, value_name = "DIR", default_value = "data")]
    pub output: PathBuf,

    /// Parent directory for the per-run scratch directory
    #[arg(long, value_name = "DIR")]
    pub scratch_base: Option<PathBuf>,

    /// Filename suffix identifying compressed members
    #[arg(long, value_name = "SUFFIX", default_value = ".gz")]
    pub suffix: String,

    /// Where the downloaded archive is persisted
    #[arg(long, value_name = "FILE", default_value = "amp_events.zip")]
    pub archive_path: PathBuf,

    /// Export API base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            scratch_base: self
                .scratch_base
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            output_dir: self.output.clone(),
            suffix: self.suffix.clone(),
        }
    }
}
