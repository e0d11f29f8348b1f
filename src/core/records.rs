//! Append-only record log of artifact logging attempts.
//!
//! Records are stored as newline-delimited JSON (JSONL) in the run
//! directory for simplicity and easy debugging/inspection. The log is the
//! durable trace of what the worker did with each descriptor; the live
//! outcome still travels through the descriptor's completion handle.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

/// Errors that can occur with the record store
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Terminal status of one logging attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// The artifact was persisted to the run's store
    Logged,

    /// Staging or upload failed
    Failed,
}

/// One record in the append-only log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Unique identifier for this record
    pub id: Uuid,

    /// When the attempt concluded
    pub timestamp: DateTime<Utc>,

    /// The run this artifact belongs to
    pub run_id: Uuid,

    /// Destination subdirectory within the run's artifact store
    pub artifact_path: String,

    /// File name the artifact was stored under (if known)
    pub file_name: Option<String>,

    /// Size of the persisted file in bytes (successful attempts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Short SHA-256 of the staged file content (best-effort metadata)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    /// Terminal status of the attempt
    pub status: RecordStatus,

    /// Error message if the attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArtifactRecord {
    /// Record for a successfully persisted artifact
    pub fn logged(
        run_id: Uuid,
        artifact_path: impl Into<String>,
        file_name: Option<String>,
        size_bytes: u64,
        content_hash: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            run_id,
            artifact_path: artifact_path.into(),
            file_name,
            size_bytes: Some(size_bytes),
            content_hash,
            status: RecordStatus::Logged,
            error: None,
        }
    }

    /// Record for a failed attempt
    pub fn failed(
        run_id: Uuid,
        artifact_path: impl Into<String>,
        file_name: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            run_id,
            artifact_path: artifact_path.into(),
            file_name,
            size_bytes: None,
            content_hash: None,
            status: RecordStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// JSONL-backed record store for one run
pub struct RecordStore {
    run_id: Uuid,

    /// Path to the records.jsonl file
    records_path: PathBuf,
}

impl RecordStore {
    /// Create a record store writing to `records_path`
    pub fn new(records_path: PathBuf, run_id: Uuid) -> Self {
        Self {
            run_id,
            records_path,
        }
    }

    /// Create or open the record store for a run under the configured
    /// runs directory (`$RUNLOG_HOME/runs/<run_id>/records.jsonl`)
    pub async fn open(run_id: Uuid) -> anyhow::Result<Self> {
        let run_dir = crate::config::runs_dir()?.join(run_id.to_string());
        fs::create_dir_all(&run_dir).await?;

        Ok(Self::new(run_dir.join("records.jsonl"), run_id))
    }

    /// The run this store belongs to
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Path to the records file
    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    /// Append a record to the log
    pub async fn append(&self, record: &ArtifactRecord) -> Result<(), RecordError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.records_path)
            .await?;

        let json = serde_json::to_string(record)?;
        file.write_all(format!("{}\n", json).as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    /// Replay all records in order
    pub async fn replay(&self) -> Result<Vec<ArtifactRecord>, RecordError> {
        let mut records = Vec::new();

        if !self.records_path.exists() {
            return Ok(records);
        }

        let file = File::open(&self.records_path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            records.push(serde_json::from_str(&line)?);
        }

        Ok(records)
    }
}

/// Compute SHA256 hash of file content (first 12 chars)
pub async fn compute_file_hash(path: &Path) -> Result<String, std::io::Error> {
    let content = tokio::fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let result = hasher.finalize();

    // Return first 12 hex characters
    Ok(hex::encode(result)[..12].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (RecordStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::new(temp.path().join("records.jsonl"), Uuid::new_v4());
        (store, temp)
    }

    #[tokio::test]
    async fn test_append_and_replay() {
        let (store, _temp) = test_store();
        let run_id = store.run_id();

        store
            .append(&ArtifactRecord::logged(
                run_id,
                "plots",
                Some("plot.png".to_string()),
                1234,
                Some("abc123def456".to_string()),
            ))
            .await
            .unwrap();
        store
            .append(&ArtifactRecord::failed(
                run_id,
                "tables",
                Some("table.json".to_string()),
                "unsupported artifact payload: structured",
            ))
            .await
            .unwrap();

        let records = store.replay().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, RecordStatus::Logged);
        assert_eq!(records[0].size_bytes, Some(1234));
        assert_eq!(records[1].status, RecordStatus::Failed);
        assert!(records[1].error.as_deref().unwrap().contains("unsupported"));
    }

    #[tokio::test]
    async fn test_replay_missing_file_is_empty() {
        let (store, _temp) = test_store();

        let records = store.replay().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_compute_file_hash_is_short_and_stable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.bin");
        tokio::fs::write(&path, b"artifact bytes").await.unwrap();

        let first = compute_file_hash(&path).await.unwrap();
        let second = compute_file_hash(&path).await.unwrap();

        assert_eq!(first.len(), 12);
        assert_eq!(first, second);
    }
}
