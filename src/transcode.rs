//! Re-encoding downloaded media with the external encoder.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::config::DownloadConfig;
use crate::error::{Error, Result};

/// The encoder binary invoked for conversion.
pub const ENCODER: &str = "ffmpeg";

/// Extension of transcoded output files.
pub const TARGET_EXTENSION: &str = "opus";

/// Constant bitrate target passed to the encoder.
const BITRATE: &str = "64k";

/// What a transcode did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeStatus {
    /// The encoder ran and produced the output file.
    Converted,
    /// Nothing was encoded — the output already existed, or this is a dry
    /// run.
    Skipped,
}

/// Re-encodes downloaded files, honoring skip/force/dry-run.
///
/// Construct one with [`Transcoder::resolve`] before scheduling any work:
/// a missing encoder binary is a startup error, never a per-task one.
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: PathBuf,
}

impl Transcoder {
    /// Locates the encoder on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncoderMissing`] if no executable named
    /// [`ENCODER`] exists in any `PATH` entry.
    pub fn resolve() -> Result<Self> {
        let program = find_in_path(ENCODER, env::var_os("PATH").as_deref())
            .ok_or_else(|| Error::EncoderMissing(ENCODER.to_string()))?;
        log::debug!("encoder resolved to {}", program.display());
        Ok(Self { program })
    }

    /// Returns the resolved encoder path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the output path derived from `input`: same base name,
    /// [`TARGET_EXTENSION`] instead of the media extension.
    #[must_use]
    pub fn output_path(input: &Path) -> PathBuf {
        input.with_extension(TARGET_EXTENSION)
    }

    /// Re-encodes `input` into the derived output path.
    ///
    /// With `force` off and the output present, returns
    /// [`TranscodeStatus::Skipped`] without spawning the encoder. In dry-run
    /// mode, logs the intended action and returns `Skipped`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] when the encoder exits non-zero.
    pub async fn transcode(
        &self,
        input: &Path,
        config: &DownloadConfig,
    ) -> Result<TranscodeStatus> {
        let output = Self::output_path(input);

        if !config.force && tokio::fs::metadata(&output).await.is_ok() {
            log::debug!("{} exists, skipping", output.display());
            return Ok(TranscodeStatus::Skipped);
        }
        if config.dry_run {
            log::info!(
                "dry run: would encode {} -> {}",
                input.display(),
                output.display()
            );
            return Ok(TranscodeStatus::Skipped);
        }

        log::debug!("encoding {} -> {}", input.display(), output.display());
        let result = Command::new(&self.program)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-c:a", "libopus", "-b:a", BITRATE])
            .arg(&output)
            .output()
            .await?;

        if !result.status.success() {
            return Err(Error::Encode {
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(TranscodeStatus::Converted)
    }
}

/// Searches the entries of a `PATH`-style variable for `name`.
fn find_in_path(name: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    env::split_paths(path_var?)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
