//! Terminal frontend for the downloader.

mod progress;

use std::time::Instant;

pub use progress::BarReporter;
use progress::print_summary;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::error::Result;
use crate::fetch::{Fetcher, build_http_client};
use crate::scheduler::{Scheduler, TaskOutcome};
use crate::transcode::Transcoder;

/// Runs a full download pass over the catalog.
///
/// Loads the catalog, resolves the encoder when conversion is requested,
/// dispatches the scheduler with a progress bar, and prints the end-of-run
/// summary. Per-task failures appear as interleaved lines and in the summary
/// count; they do not turn the run into an error.
///
/// # Errors
///
/// Returns an error on fatal startup conditions only: a malformed catalog
/// file, a missing encoder, an invalid filter pattern, or a download
/// directory that cannot be created.
pub async fn run_download(config: AppConfig) -> Result<Vec<TaskOutcome>> {
    let catalog = Catalog::load(&config.paths.catalog)?;
    if catalog.is_empty() {
        println!("Catalog {} is empty, nothing to do.", config.paths.catalog.display());
        return Ok(Vec::new());
    }

    let transcoder = if config.download.convert {
        Some(Transcoder::resolve()?)
    } else {
        None
    };

    let total =
        crate::scheduler::filter_records(catalog.records(), config.filter.as_deref())?.len();
    if total == 0 {
        println!("No episodes match the filter, nothing to do.");
        return Ok(Vec::new());
    }

    if config.download.dry_run {
        println!("Dry run: no files will be written.");
    }

    let fetcher = Fetcher::new(build_http_client()?);
    let scheduler = Scheduler::new(fetcher, transcoder);
    let reporter = BarReporter::new(total as u64);

    let started = Instant::now();
    let outcomes = scheduler.run(&catalog, &config, &reporter).await?;
    reporter.finish();

    print_summary(&outcomes, started.elapsed());
    Ok(outcomes)
}
