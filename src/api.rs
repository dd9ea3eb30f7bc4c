//! Amplitude Export API client (archive acquirer).
//!
//! Thin wrapper over the `GET /api/2/export` endpoint: one authenticated
//! request per run, body streamed straight to the archive file on disk.
//! Transient failures are not retried; a failed download fails the run.

use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::ExportWindow;

/// Default Export API endpoint (EU residency cluster).
pub const DEFAULT_API_URL: &str = "https://analytics.eu.amplitude.com";

/// Failures while acquiring an export archive. All fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("export request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("export request returned HTTP {status}")]
    Status { status: reqwest::StatusCode },

    #[error("failed to write archive to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Authenticated client for the Export API.
pub struct ExportClient {
    http: Client,
    base_url: String,
    api_key: String,
    secret_key: String,
}

impl ExportClient {
    /// Build a client for the given endpoint and credential pair.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, FetchError> {
        // Export bodies can take minutes to stream; bound only the
        // connection phase.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(FetchError::Client)?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        })
    }

    /// Download the archive for `window` into `dest`.
    ///
    /// Returns the number of bytes written. The file is created (or
    /// truncated) before the first byte arrives, so a failed download
    /// leaves a partial archive behind for inspection.
    pub async fn download(&self, window: &ExportWindow, dest: &Path) -> Result<u64, FetchError> {
        let url = format!(
            "{}/api/2/export?start={}&end={}",
            self.base_url,
            window.start_param(),
            window.end_param()
        );
        debug!(url = %url, "requesting export archive");

        let mut response = self
            .http
            .get(&url)
            .basic_auth(&self.api_key, Some(&self.secret_key))
            .send()
            .await
            .map_err(FetchError::Transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
            });
        }

        let write_err = |source| FetchError::Write {
            path: dest.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(dest).await.map_err(write_err)?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await.map_err(FetchError::Transport)? {
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;

        info!(
            bytes = written,
            path = %dest.display(),
            "export archive downloaded"
        );

        Ok(written)
    }
}
