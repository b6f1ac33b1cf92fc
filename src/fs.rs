//! File system abstraction so skip/force/dry-run logic is testable.

use async_trait::async_trait;
use std::path::Path;

/// Abstraction over the file system operations the pipeline performs.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Checks if a file exists at the given path.
    async fn file_exists(&self, path: &Path) -> bool;

    /// Creates all directories in the given path.
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Creates (or truncates) a file at the given path for writing.
    async fn create_file(&self, path: &Path) -> std::io::Result<tokio::fs::File>;

    /// Removes the file at the given path.
    async fn remove_file(&self, path: &Path) -> std::io::Result<()>;
}

/// Default file system implementation using `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Creates a new `TokioFileSystem` instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn create_file(&self, path: &Path) -> std::io::Result<tokio::fs::File> {
        tokio::fs::File::create(path).await
    }

    async fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn file_exists_checks_presence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episode.mp3");
        std::fs::File::create(&path).unwrap();

        let fs = TokioFileSystem::new();
        assert!(fs.file_exists(&path).await);
        assert!(!fs.file_exists(&dir.path().join("missing.mp3")).await);
    }

    #[tokio::test]
    async fn create_dir_all_is_recursive() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");

        let fs = TokioFileSystem::new();
        fs.create_dir_all(&nested).await.unwrap();
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn create_file_truncates_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episode.mp3");
        std::fs::write(&path, "old content").unwrap();

        let fs = TokioFileSystem::new();
        let mut file = fs.create_file(&path).await.unwrap();
        file.write_all(b"new").await.unwrap();
        file.flush().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn remove_file_deletes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.mp3");
        std::fs::File::create(&path).unwrap();

        let fs = TokioFileSystem::new();
        fs.remove_file(&path).await.unwrap();
        assert!(!path.exists());
    }
}
