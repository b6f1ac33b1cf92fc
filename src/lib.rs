//! podarchive - keep a local archive of podcast episodes in sync.
//!
//! The library maintains a flat JSON catalog of scraped episode metadata and
//! downloads the corresponding media files incrementally: repeated runs skip
//! what is already archived, `--force` re-fetches, and dry runs only report.
//! Downloads fan out under a concurrency cap; each file can optionally be
//! re-encoded with an external encoder afterwards.
//!
//! # Example
//!
//! ```no_run
//! use podarchive::{AppConfig, Catalog, Fetcher, NoProgress, Scheduler, build_http_client};
//!
//! # async fn example() -> podarchive::Result<()> {
//! let config = AppConfig::load();
//! let catalog = Catalog::load(&config.paths.catalog)?;
//!
//! let fetcher = Fetcher::new(build_http_client()?);
//! let scheduler = Scheduler::new(fetcher, None);
//!
//! let outcomes = scheduler.run(&catalog, &config, &NoProgress).await?;
//! println!("{} task(s) settled", outcomes.len());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod sanitize;
pub mod scheduler;
pub mod scrape;
pub mod transcode;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export main types for convenience
pub use catalog::{Catalog, EpisodeKey, EpisodeRecord};
pub use config::{AppConfig, DownloadConfig, PathConfig};
pub use error::{Error, Result};
pub use fetch::{Fetcher, TransferStatus, build_http_client};
pub use fs::{FileSystem, TokioFileSystem};
pub use sanitize::sanitize;
pub use scheduler::{NoProgress, ProgressReport, Scheduler, TaskOutcome, TaskStatus};
pub use transcode::{TranscodeStatus, Transcoder};
