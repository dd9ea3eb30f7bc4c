//! # ampex
//!
//! Amplitude export ingestion: download an event export archive for a
//! time window, unpack it, and decompress every gzip member into a flat
//! output directory.
//!
//! An export archive is a ZIP file holding one digit-named batch folder
//! (the app id), under which the event files sit gzip-compressed,
//! possibly nested in date/hour subfolders. The pipeline extracts the
//! archive into a per-run scratch directory, locates the batch folder,
//! gunzips every member into the output directory (atomically, one
//! output file per member, named by stripping the compression suffix),
//! and removes the scratch directory whether or not everything worked.
//! Individual corrupt members are recorded in the run report without
//! failing the batch.
//!
//! ## Example
//!
//! ```no_run
//! use ampex::{ExportClient, ExportWindow, PipelineConfig, run_pipeline};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let window = ExportWindow::parse("20251104T00", "20251105T00")?;
//!     let client = ExportClient::new(
//!         ampex::DEFAULT_API_URL,
//!         std::env::var("AMP_API_KEY")?,
//!         std::env::var("AMP_SECRET_KEY")?,
//!     )?;
//!     client.download(&window, Path::new("amp_events.zip")).await?;
//!
//!     let summary = run_pipeline(Path::new("amp_events.zip"), &PipelineConfig::default()).await?;
//!     println!("{} members extracted", summary.extracted());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod zip;

pub use api::{DEFAULT_API_URL, ExportClient, FetchError};
pub use cli::Cli;
pub use config::{ExportWindow, PipelineConfig, WindowError};
pub use error::PipelineError;
pub use io::{LocalFileReader, ReadAt};
pub use pipeline::{MemberOutcome, MemberRecord, RunSummary, run_pipeline};
pub use zip::{ZipError, ZipExtractor, ZipFileEntry};
