//! The scraper collaborator seam.
//!
//! DOM scraping itself lives outside this crate: an external command emits a
//! JSON array of raw episode objects on stdout (or a previously captured
//! result is read from a file). This module runs the collaborator, parses
//! its output, and drops records that could never enter the catalog.

use std::path::Path;

use chrono::DateTime;
use serde::Deserialize;
use tokio::process::Command;

use crate::catalog::EpisodeRecord;
use crate::error::{Error, Result};

/// One episode object exactly as the scraper emitted it.
///
/// Everything is optional here; validation decides what survives.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEpisode {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub download_link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Runs the scraper collaborator and parses its stdout.
///
/// The contract: the command prints a JSON array of raw episode objects and
/// exits zero. `--headless` is appended to its argv when requested; what it
/// means is the collaborator's business.
///
/// # Errors
///
/// Returns [`Error::Scrape`] when the command exits non-zero or its output
/// is not a JSON array of episode objects.
pub async fn scrape_command(program: &str, headless: bool) -> Result<Vec<RawEpisode>> {
    let mut command = Command::new(program);
    if headless {
        command.arg("--headless");
    }

    log::info!("running scraper: {program}");
    let output = command.output().await?;
    if !output.status.success() {
        return Err(Error::Scrape(format!(
            "`{program}` exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| Error::Scrape(format!("unparseable scraper output: {e}")))
}

/// Reads a previously captured scrape result from a JSON file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Scrape`]
/// if it is not a JSON array of episode objects.
pub fn read_records(path: &Path) -> Result<Vec<RawEpisode>> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| Error::Scrape(format!("unparseable scrape file {}: {e}", path.display())))
}

/// Validates raw records into catalog records, dropping the unusable ones.
///
/// A record survives only with a non-empty title, a release date that parses
/// as RFC 3339, and an absolute download URL. Dropped records are logged and
/// never reach the merge.
#[must_use]
pub fn validate(raw: Vec<RawEpisode>) -> Vec<EpisodeRecord> {
    raw.into_iter()
        .filter_map(|episode| match validate_one(episode) {
            Ok(record) => Some(record),
            Err(reason) => {
                log::warn!("dropping scraped record: {reason}");
                None
            }
        })
        .collect()
}

fn validate_one(raw: RawEpisode) -> std::result::Result<EpisodeRecord, String> {
    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or("missing title")?;
    let release_date = raw
        .release_date
        .filter(|d| !d.is_empty())
        .ok_or_else(|| format!("`{title}` has no release date"))?;
    DateTime::parse_from_rfc3339(&release_date)
        .map_err(|e| format!("`{title}` has unparseable release date {release_date}: {e}"))?;
    let download_link = raw
        .download_link
        .filter(|l| !l.is_empty())
        .ok_or_else(|| format!("`{title}` has no download link"))?;
    reqwest::Url::parse(&download_link)
        .map_err(|e| format!("`{title}` has invalid download link {download_link}: {e}"))?;

    Ok(EpisodeRecord {
        title,
        release_date,
        download_link,
        description: raw.description.unwrap_or_default(),
    })
}
