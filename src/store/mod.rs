//! Artifact store interfaces.
//!
//! Stores provide a unified interface for persisting staged artifact
//! files to a run's storage location.

pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

// Re-export the filesystem store
pub use local::LocalArtifactStore;

/// Errors raised by an artifact store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact has no usable file name: {0}")]
    InvalidFileName(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Location and size of a persisted artifact
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    /// Store-side path of the persisted file
    pub path: PathBuf,

    /// Size of the persisted file in bytes
    pub size_bytes: u64,
}

/// Trait for artifact stores
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Human-readable store name
    fn name(&self) -> &str;

    /// Persist `local_file` under the `artifact_path` subdirectory of the
    /// run's store. The file keeps its name.
    async fn put(&self, local_file: &Path, artifact_path: &str)
        -> Result<StoredArtifact, StoreError>;
}
