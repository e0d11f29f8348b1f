//! Local filesystem artifact store.
//!
//! Copies staged files into the run's artifact tree:
//! `<runs_dir>/<run_id>/artifacts/<artifact_path>/<file_name>`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::{ArtifactStore, StoreError, StoredArtifact};

/// Artifact store rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store rooted at the artifact tree of a run
    pub fn for_run(runs_dir: &Path, run_id: Uuid) -> Self {
        Self::new(runs_dir.join(run_id.to_string()).join("artifacts"))
    }

    /// Root of the artifact tree
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn put(
        &self,
        local_file: &Path,
        artifact_path: &str,
    ) -> Result<StoredArtifact, StoreError> {
        let file_name = local_file
            .file_name()
            .ok_or_else(|| StoreError::InvalidFileName(local_file.to_path_buf()))?;

        let dest_dir = if artifact_path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(artifact_path)
        };
        fs::create_dir_all(&dest_dir).await?;

        let dest = dest_dir.join(file_name);
        let size_bytes = fs::copy(local_file, &dest).await?;

        Ok(StoredArtifact {
            path: dest,
            size_bytes,
        })
    }
}
