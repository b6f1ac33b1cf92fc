//! Fan-out of per-episode download tasks under a concurrency cap.

use std::path::{Path, PathBuf};

use futures::{StreamExt, stream};
use regex::RegexBuilder;

use crate::catalog::{Catalog, EpisodeRecord};
use crate::config::AppConfig;
use crate::error::Result;
use crate::fetch::{Fetcher, TransferStatus};
use crate::fs::{FileSystem, TokioFileSystem};
use crate::sanitize::sanitize;
use crate::transcode::{TranscodeStatus, Transcoder};

/// Extension appended to sanitized titles for downloaded media.
pub const MEDIA_EXTENSION: &str = "mp3";

/// Trait for receiving per-task progress events.
///
/// All methods have default no-op implementations. Exactly one
/// [`on_task_done`](Self::on_task_done) event fires per dispatched task,
/// in completion order, whether the task succeeded or failed.
pub trait ProgressReport: Send + Sync {
    /// Called when a task is admitted into the in-flight window.
    fn on_task_start(&self, _title: &str) {}

    /// Called once per task with its status label
    /// (`downloaded`/`skipped`/`converted`/`failed`).
    fn on_task_done(&self, _title: &str, _label: &str) {}
}

/// A null progress implementation that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReport for NoProgress {}

/// What a completed task did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The media file was fetched; carries the bytes written.
    Downloaded(u64),
    /// The file was re-encoded after the fetch; carries the bytes written by
    /// the fetch (zero when the fetch itself was skipped).
    Converted(u64),
    /// Neither fetch nor encode had anything to do.
    Skipped,
}

impl TaskStatus {
    /// Returns the status label used in progress events.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Downloaded(_) => "downloaded",
            Self::Converted(_) => "converted",
            Self::Skipped => "skipped",
        }
    }

    /// Returns the bytes fetched by this task.
    #[must_use]
    pub const fn bytes(self) -> u64 {
        match self {
            Self::Downloaded(bytes) | Self::Converted(bytes) => bytes,
            Self::Skipped => 0,
        }
    }
}

/// The settled result of one dispatched task.
///
/// Failures are collected, not swallowed: the caller gets the full list and
/// decides what they mean for the process exit.
#[derive(Debug)]
pub struct TaskOutcome {
    /// Title of the episode the task worked on.
    pub title: String,
    /// What the task did, or why it failed.
    pub result: Result<TaskStatus>,
}

impl TaskOutcome {
    /// Returns true if the task failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Dispatches one task per catalog record under the concurrency cap.
pub struct Scheduler<F: FileSystem = TokioFileSystem> {
    fetcher: Fetcher<F>,
    transcoder: Option<Transcoder>,
}

impl<F: FileSystem> Scheduler<F> {
    /// Creates a scheduler.
    ///
    /// `transcoder` must be `Some` when conversion is requested; resolve it
    /// before calling [`run`](Self::run) so a missing encoder aborts the run
    /// up front instead of failing every task.
    #[must_use]
    pub const fn new(fetcher: Fetcher<F>, transcoder: Option<Transcoder>) -> Self {
        Self {
            fetcher,
            transcoder,
        }
    }

    /// Runs one task per catalog record, at most `parallel` in flight.
    ///
    /// Per-task failures are caught at the task boundary, logged with the
    /// episode title, and reported like any other completion; they never
    /// cancel sibling tasks. The returned vector holds one settled outcome
    /// per dispatched task, in completion order.
    ///
    /// # Errors
    ///
    /// Returns an error only for startup failures: an invalid filter
    /// pattern, or a download directory that cannot be created.
    pub async fn run(
        &self,
        catalog: &Catalog,
        config: &AppConfig,
        reporter: &dyn ProgressReport,
    ) -> Result<Vec<TaskOutcome>> {
        let records = filter_records(catalog.records(), config.filter.as_deref())?;
        if records.is_empty() {
            log::info!("no episodes to process");
            return Ok(Vec::new());
        }

        self.fetcher
            .fs()
            .create_dir_all(&config.paths.download_dir)
            .await?;

        let outcomes = stream::iter(records)
            .map(|record| async move {
                reporter.on_task_start(&record.title);
                let result = self.process(record, config).await;
                match &result {
                    Ok(status) => reporter.on_task_done(&record.title, status.label()),
                    Err(e) => {
                        log::error!("{}: {e}", record.title);
                        reporter.on_task_done(&record.title, "failed");
                    }
                }
                TaskOutcome {
                    title: record.title.clone(),
                    result,
                }
            })
            .buffer_unordered(config.download.parallel.max(1))
            .collect()
            .await;

        Ok(outcomes)
    }

    /// Runs the fetch and optional encode for a single record.
    async fn process(&self, record: &EpisodeRecord, config: &AppConfig) -> Result<TaskStatus> {
        let dest = destination(&config.paths.download_dir, &record.title);
        let transferred = self
            .fetcher
            .transfer(&record.download_link, &dest, &config.download)
            .await?;
        let bytes = match transferred {
            TransferStatus::Downloaded(bytes) => bytes,
            TransferStatus::Skipped => 0,
        };

        if config.download.convert
            && let Some(transcoder) = &self.transcoder
            && transcoder.transcode(&dest, &config.download).await? == TranscodeStatus::Converted
        {
            return Ok(TaskStatus::Converted(bytes));
        }

        Ok(match transferred {
            TransferStatus::Downloaded(_) => TaskStatus::Downloaded(bytes),
            TransferStatus::Skipped => TaskStatus::Skipped,
        })
    }
}

/// Returns the destination path for an episode title.
fn destination(download_dir: &Path, title: &str) -> PathBuf {
    download_dir.join(format!("{}.{MEDIA_EXTENSION}", sanitize(title)))
}

/// Keeps the records whose title matches `pattern` (case-insensitive).
///
/// With no pattern, every record is kept.
pub(crate) fn filter_records<'a>(
    records: &'a [EpisodeRecord],
    pattern: Option<&str>,
) -> Result<Vec<&'a EpisodeRecord>> {
    let Some(pattern) = pattern else {
        return Ok(records.iter().collect());
    };
    let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
    Ok(records
        .iter()
        .filter(|record| regex.is_match(&record.title))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DownloadConfig;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn record(title: &str, link: &str) -> EpisodeRecord {
        EpisodeRecord {
            title: title.to_string(),
            release_date: "2020-01-01T00:00:00.000Z".to_string(),
            download_link: link.to_string(),
            description: String::new(),
        }
    }

    fn app_config(download_dir: &Path, download: DownloadConfig) -> AppConfig {
        AppConfig {
            download,
            paths: crate::config::PathConfig {
                catalog: download_dir.join("podcasts.json"),
                download_dir: download_dir.to_path_buf(),
            },
            filter: None,
        }
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    #[test]
    fn filter_selects_matching_titles_case_insensitively() {
        let records = vec![
            record("Teil 1 - komplette Folge", "http://x/1.mp3"),
            record("Teil 2 - Kurzfassung", "http://x/2.mp3"),
        ];

        let matched = filter_records(&records, Some("komplette")).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "Teil 1 - komplette Folge");

        let shouting = filter_records(&records, Some("KOMPLETTE")).unwrap();
        assert_eq!(shouting.len(), 1);
    }

    #[test]
    fn no_filter_keeps_everything() {
        let records = vec![record("A", "http://x/1"), record("B", "http://x/2")];
        assert_eq!(filter_records(&records, None).unwrap().len(), 2);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(filter_records(&[], Some("[unclosed")).is_err());
    }

    #[tokio::test]
    async fn empty_catalog_after_filter_is_a_no_op() {
        let dir = tempfile::TempDir::new().unwrap();
        let download_dir = dir.path().join("downloads");
        let mut config = app_config(&download_dir, DownloadConfig::default());
        config.filter = Some("matches nothing".to_string());

        let catalog = Catalog::from_records(vec![record("A", "http://127.0.0.1:1/a.mp3")]);
        let scheduler = Scheduler::new(Fetcher::new(reqwest::Client::new()), None);
        let outcomes = scheduler.run(&catalog, &config, &NoProgress).await.unwrap();

        assert!(outcomes.is_empty());
        // Work was never partitioned, so the download dir was never created.
        assert!(!download_dir.exists());
    }

    // =========================================================================
    // Mock file system with a configurable probe delay
    // =========================================================================

    struct MockFileSystem {
        existing: Mutex<HashSet<std::path::PathBuf>>,
        probe_delay: Duration,
    }

    impl MockFileSystem {
        fn new(probe_delay: Duration) -> Self {
            Self {
                existing: Mutex::new(HashSet::new()),
                probe_delay,
            }
        }

        fn add_existing(&self, path: impl Into<std::path::PathBuf>) {
            self.existing.lock().unwrap().insert(path.into());
        }
    }

    #[async_trait]
    impl FileSystem for MockFileSystem {
        async fn file_exists(&self, path: &Path) -> bool {
            tokio::time::sleep(self.probe_delay).await;
            self.existing.lock().unwrap().contains(path)
        }

        async fn create_dir_all(&self, _path: &Path) -> std::io::Result<()> {
            Ok(())
        }

        async fn create_file(&self, _path: &Path) -> std::io::Result<tokio::fs::File> {
            // Any write attempt in these tests is a bug.
            Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "mock file system is read-only",
            ))
        }

        async fn remove_file(&self, _path: &Path) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn mock_scheduler(fs: MockFileSystem) -> Scheduler<MockFileSystem> {
        Scheduler::new(Fetcher::with_fs(reqwest::Client::new(), fs), None)
    }

    // =========================================================================
    // Progress recording
    // =========================================================================

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl ProgressReport for RecordingReporter {
        fn on_task_start(&self, title: &str) {
            self.events.lock().unwrap().push(format!("start {title}"));
        }

        fn on_task_done(&self, title: &str, label: &str) {
            self.events.lock().unwrap().push(format!("{label} {title}"));
        }
    }

    #[derive(Default)]
    struct InFlightTracker {
        active: AtomicUsize,
        high_water: AtomicUsize,
    }

    impl ProgressReport for InFlightTracker {
        fn on_task_start(&self, _title: &str) {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.high_water.fetch_max(now, Ordering::SeqCst);
        }

        fn on_task_done(&self, _title: &str, _label: &str) {
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    // =========================================================================
    // Scheduler runs
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn in_flight_tasks_never_exceed_parallel() {
        let dir = tempfile::TempDir::new().unwrap();
        let fs = MockFileSystem::new(Duration::from_millis(50));
        let catalog = Catalog::from_records(
            (0..8)
                .map(|i| record(&format!("Ep {i}"), "http://127.0.0.1:1/x.mp3"))
                .collect(),
        );
        let config = app_config(
            dir.path(),
            DownloadConfig::new().with_parallel(3).with_dry_run(true),
        );

        let tracker = InFlightTracker::default();
        let outcomes = mock_scheduler(fs)
            .run(&catalog, &config, &tracker)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 8);
        assert_eq!(tracker.high_water.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_one_serializes_tasks() {
        let dir = tempfile::TempDir::new().unwrap();
        let fs = MockFileSystem::new(Duration::from_millis(10));
        let catalog = Catalog::from_records(vec![
            record("First", "http://127.0.0.1:1/1.mp3"),
            record("Second", "http://127.0.0.1:1/2.mp3"),
            record("Third", "http://127.0.0.1:1/3.mp3"),
        ]);
        let config = app_config(
            dir.path(),
            DownloadConfig::new().with_parallel(1).with_dry_run(true),
        );

        let reporter = RecordingReporter::default();
        mock_scheduler(fs)
            .run(&catalog, &config, &reporter)
            .await
            .unwrap();

        let events = reporter.events.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                "start First",
                "skipped First",
                "start Second",
                "skipped Second",
                "start Third",
                "skipped Third",
            ]
        );
    }

    #[tokio::test]
    async fn dry_run_touches_neither_network_nor_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        // Unroutable links: any network attempt would fail the task. The
        // read-only mock fails any write attempt.
        let fs = MockFileSystem::new(Duration::ZERO);
        let catalog = Catalog::from_records(vec![
            record("A - Ep1", "http://127.0.0.1:1/1.mp3"),
            record("B - Ep2", "http://127.0.0.1:1/2.mp3"),
        ]);
        let config = app_config(dir.path(), DownloadConfig::new().with_dry_run(true));

        let outcomes = mock_scheduler(fs)
            .run(&catalog, &config, &NoProgress)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert_eq!(*outcome.result.as_ref().unwrap(), TaskStatus::Skipped);
        }
    }

    #[tokio::test]
    async fn failed_task_does_not_abort_siblings() {
        let dir = tempfile::TempDir::new().unwrap();
        let fs = MockFileSystem::new(Duration::ZERO);
        // Two destinations already exist (skip without network); the third
        // link is unroutable and must fail alone.
        fs.add_existing(destination(dir.path(), "A - Ep1"));
        fs.add_existing(destination(dir.path(), "C - Ep3"));
        let catalog = Catalog::from_records(vec![
            record("A - Ep1", "http://127.0.0.1:1/1.mp3"),
            record("B - Ep2", "http://127.0.0.1:1/2.mp3"),
            record("C - Ep3", "http://127.0.0.1:1/3.mp3"),
        ]);
        let config = app_config(dir.path(), DownloadConfig::default());

        let reporter = RecordingReporter::default();
        let outcomes = mock_scheduler(fs)
            .run(&catalog, &config, &reporter)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes.iter().filter(|o| o.is_failure()).count(), 1);
        let failed = outcomes.iter().find(|o| o.is_failure()).unwrap();
        assert_eq!(failed.title, "B - Ep2");

        let events = reporter.events.into_inner().unwrap();
        assert!(events.contains(&"failed B - Ep2".to_string()));
        assert!(events.contains(&"skipped A - Ep1".to_string()));
        assert!(events.contains(&"skipped C - Ep3".to_string()));
    }

    #[test]
    fn destination_is_sanitized_title_with_media_extension() {
        assert_eq!(
            destination(Path::new("downloads"), "A / B: Ep 1?"),
            PathBuf::from("downloads/A_-_B-_Ep_1-.mp3")
        );
    }

    #[test]
    fn status_labels_and_bytes() {
        assert_eq!(TaskStatus::Downloaded(10).label(), "downloaded");
        assert_eq!(TaskStatus::Converted(10).label(), "converted");
        assert_eq!(TaskStatus::Skipped.label(), "skipped");
        assert_eq!(TaskStatus::Downloaded(10).bytes(), 10);
        assert_eq!(TaskStatus::Skipped.bytes(), 0);
    }
}
