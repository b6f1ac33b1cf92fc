//! The episode catalog: the persisted, ordered, deduplicated record list.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One scraped episode as stored in the catalog file.
///
/// Field names on disk are camelCase so the file stays interchangeable with
/// catalogs written by earlier versions of the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// Human-readable title, combining the category label and episode title.
    pub title: String,
    /// ISO-8601 release timestamp, kept verbatim as scraped.
    pub release_date: String,
    /// Absolute URL of the media file.
    pub download_link: String,
    /// Episode description; may be empty.
    #[serde(default)]
    pub description: String,
}

impl EpisodeRecord {
    /// Returns the identity key of this record.
    #[must_use]
    pub fn key(&self) -> EpisodeKey {
        EpisodeKey {
            title: self.title.clone(),
            release_date: self.release_date.clone(),
        }
    }
}

/// The (title, release date) pair that uniquely identifies an episode.
///
/// Uniqueness is defined on this pair only — never on the download link or
/// the description. Comparison is case-sensitive with no normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeKey {
    title: String,
    release_date: String,
}

/// An ordered sequence of episode records with unique identity keys.
///
/// Existing entries keep their position across merges; new entries append at
/// the end. Records already in the catalog are never updated, even when a
/// fresh scrape carries different data for the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<EpisodeRecord>,
}

impl Catalog {
    /// Creates a catalog from a list of records, deduplicating by identity
    /// key and keeping the first occurrence of each key.
    #[must_use]
    pub fn from_records(records: Vec<EpisodeRecord>) -> Self {
        let mut catalog = Self::default();
        catalog.merge(records);
        catalog
    }

    /// Reads the catalog from a JSON file.
    ///
    /// A missing file yields an empty catalog; that is the normal first-run
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] if the file exists but does not parse, or
    /// [`Error::Io`] if it cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no catalog at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };
        serde_json::from_str(&text).map_err(|source| Error::Catalog {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the whole catalog back to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.records).map_err(|source| Error::Catalog {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Merges freshly scraped records into the catalog.
    ///
    /// Incoming records whose identity key is already present are dropped;
    /// the rest append in the order encountered, deduplicated against each
    /// other as well (first occurrence per key wins). Merging the same list
    /// twice is a no-op the second time.
    ///
    /// Returns the number of records added.
    pub fn merge(&mut self, incoming: Vec<EpisodeRecord>) -> usize {
        let mut seen: HashSet<EpisodeKey> = self.records.iter().map(EpisodeRecord::key).collect();
        let mut added = 0;
        for record in incoming {
            if seen.insert(record.key()) {
                self.records.push(record);
                added += 1;
            }
        }
        added
    }

    /// Returns the records in catalog order.
    #[must_use]
    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    /// Returns the number of records in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the catalog holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
