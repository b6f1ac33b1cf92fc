//! Fetching a single remote media file to a local path.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::fs::{FileSystem, TokioFileSystem};

/// What a transfer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// The file was fetched; carries the number of bytes written.
    Downloaded(u64),
    /// Nothing was fetched — the destination already existed, or this is a
    /// dry run.
    Skipped,
}

/// Builds the shared HTTP client with pooling tuned for many small fetches.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(8)
        .tcp_keepalive(Duration::from_secs(30))
        .build()
}

/// Fetches remote resources to local paths, honoring skip/force/dry-run.
pub struct Fetcher<F: FileSystem = TokioFileSystem> {
    http: reqwest::Client,
    fs: F,
}

impl Fetcher<TokioFileSystem> {
    /// Creates a fetcher with the default file system.
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            fs: TokioFileSystem,
        }
    }
}

impl<F: FileSystem> Fetcher<F> {
    /// Creates a fetcher with a custom file system implementation.
    #[must_use]
    pub const fn with_fs(http: reqwest::Client, fs: F) -> Self {
        Self { http, fs }
    }

    /// Returns a reference to the file system implementation.
    #[must_use]
    pub const fn fs(&self) -> &F {
        &self.fs
    }

    /// Transfers `url` to `dest`.
    ///
    /// With `force` off and `dest` present, returns [`TransferStatus::Skipped`]
    /// without a network call. In dry-run mode, logs the intended action and
    /// returns `Skipped` without touching network or disk. Otherwise the
    /// response body is streamed straight to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] on a non-success response status and
    /// [`Error::Stream`] when writing to `dest` fails. After a stream
    /// failure the partial file is removed (best effort) unless
    /// `cleanup_on_error` is off.
    pub async fn transfer(
        &self,
        url: &str,
        dest: &Path,
        config: &DownloadConfig,
    ) -> Result<TransferStatus> {
        if !config.force && self.fs.file_exists(dest).await {
            log::debug!("{} exists, skipping", dest.display());
            return Ok(TransferStatus::Skipped);
        }
        if config.dry_run {
            log::info!("dry run: would fetch {url} -> {}", dest.display());
            return Ok(TransferStatus::Skipped);
        }

        log::debug!("fetching {url} -> {}", dest.display());
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status: response.status(),
            });
        }

        match self.stream_to_file(response, dest).await {
            Ok(written) => Ok(TransferStatus::Downloaded(written)),
            Err(e) => {
                if config.cleanup_on_error {
                    let _ = self.fs.remove_file(dest).await;
                }
                Err(e)
            }
        }
    }

    /// Streams the response body to `dest`, returning the bytes written.
    async fn stream_to_file(&self, response: reqwest::Response, dest: &Path) -> Result<u64> {
        let stream_err = |source| Error::Stream {
            path: dest.to_path_buf(),
            source,
        };

        let mut file = self.fs.create_file(dest).await.map_err(stream_err)?;
        let mut body = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(stream_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(stream_err)?;

        Ok(written)
    }
}
