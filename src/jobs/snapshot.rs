//! Timestamped JSON snapshots of search results
//!
//! Snapshots are a side channel: a failed write is logged and the search
//! result is still returned.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Prefix of the raw API response snapshot
pub const RAW_PREFIX: &str = "job_search_full";

/// Prefix of the processed listing snapshot
pub const PROCESSED_PREFIX: &str = "job_search_processed";

/// Writes `<prefix>_<YYYYMMDD_HHMMSS>.json` files into one directory
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a snapshot, returning its path when it was saved
    pub async fn write<T: Serialize>(&self, prefix: &str, data: &T) -> Option<PathBuf> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self.dir.join(format!("{}_{}.json", prefix, timestamp));

        match self.try_write(&path, data).await {
            Ok(()) => {
                tracing::info!("Data saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("Error saving to {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn try_write<T: Serialize>(&self, path: &Path, data: &T) -> crate::error::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("outputs"));

        let path = writer.write(RAW_PREFIX, &json!({"data": []})).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("job_search_full_"));
        assert!(name.ends_with(".json"));
        // job_search_full_ + YYYYMMDD_HHMMSS + .json
        assert_eq!(name.len(), "job_search_full_".len() + 15 + 5);

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, json!({"data": []}));
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let writer = SnapshotWriter::new(blocker.join("outputs"));
        assert!(writer.write(PROCESSED_PREFIX, &json!({})).await.is_none());
    }
}
