//! Configuration records for catalog and download runs.
//!
//! All configuration is explicit: records are constructed once (defaults,
//! optionally seeded from a config file, then CLI overrides) and passed by
//! value into the scheduler. Nothing reads ambient global state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for a download run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Maximum number of concurrently in-flight tasks.
    pub parallel: usize,
    /// Whether to overwrite outputs that already exist.
    pub force: bool,
    /// Report intended actions without touching network or disk.
    pub dry_run: bool,
    /// Re-encode each downloaded file with the external encoder.
    pub convert: bool,
    /// Whether to remove a partially written file after a stream failure.
    pub cleanup_on_error: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            parallel: 8,
            force: false,
            dry_run: false,
            convert: false,
            cleanup_on_error: true,
        }
    }
}

impl DownloadConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of concurrently in-flight tasks.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets whether to overwrite existing outputs.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Sets dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets whether downloads are re-encoded afterwards.
    #[must_use]
    pub const fn with_convert(mut self, convert: bool) -> Self {
        self.convert = convert;
        self
    }

    /// Sets whether partial files are removed after a stream failure.
    #[must_use]
    pub const fn with_cleanup_on_error(mut self, cleanup: bool) -> Self {
        self.cleanup_on_error = cleanup;
        self
    }
}

/// Locations of the catalog file and the download directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// The catalog JSON file.
    pub catalog: PathBuf,
    /// Directory where media files are saved.
    pub download_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("podcasts.json"),
            download_dir: PathBuf::from("downloads"),
        }
    }
}

/// Complete configuration for a downloader invocation.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Download behavior.
    pub download: DownloadConfig,
    /// File locations.
    pub paths: PathConfig,
    /// Optional case-insensitive title filter (regular expression).
    pub filter: Option<String>,
}

/// On-disk shape of the optional config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    download: DownloadConfig,
    paths: PathConfig,
}

impl AppConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration, seeding defaults from
    /// `<config dir>/podarchive/config.toml` when that file exists.
    ///
    /// A missing file is normal; an unreadable or malformed file is logged
    /// and ignored, since every setting can still come from CLI flags.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = dirs::config_dir().map(|d| d.join("podarchive").join("config.toml"))
        else {
            return Self::default();
        };
        let Ok(text) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str::<ConfigFile>(&text) {
            Ok(file) => Self {
                download: file.download,
                paths: file.paths,
                filter: None,
            },
            Err(e) => {
                log::warn!("ignoring malformed config {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
