//! Error types for the podarchive library.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can occur while syncing the catalog or the archive.
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog file exists but does not parse as a catalog.
    #[error("malformed catalog {path}: {source}")]
    Catalog {
        /// Path of the offending catalog file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("fetching {url} failed: HTTP {status}")]
    Fetch {
        /// The requested URL.
        url: String,
        /// The response status.
        status: reqwest::StatusCode,
    },

    /// Failure while writing response bytes to disk.
    #[error("failed writing {path}: {source}")]
    Stream {
        /// Destination path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The external encoder exited with a non-zero status.
    #[error("encoder exited with {status}: {stderr}")]
    Encode {
        /// Exit status of the encoder process.
        status: ExitStatus,
        /// Captured stderr of the encoder.
        stderr: String,
    },

    /// The external encoder binary could not be found on `PATH`.
    #[error("encoder `{0}` not found on PATH")]
    EncoderMissing(String),

    /// The episode filter is not a valid regular expression.
    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The scraper collaborator failed or produced unusable output.
    #[error("scraper error: {0}")]
    Scrape(String),
}

/// A specialized `Result` type for podarchive operations.
pub type Result<T> = std::result::Result<T, Error>;
