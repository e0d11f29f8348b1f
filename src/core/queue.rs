//! Asynchronous artifact logging queue.
//!
//! One dedicated worker task drains a bounded channel of pending
//! artifacts. For each descriptor the worker stages it (scoped
//! acquisition of any temporary storage), uploads the staged file through
//! the artifact store, appends a record, and finalizes the descriptor's
//! completion handle. The completion fires on every path, success or
//! failure, so waiters are never left blocked.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::domain::{ArtifactError, Completion, LogOutcome, PendingArtifact};
use crate::store::{ArtifactStore, StoreError, StoredArtifact};

use super::records::{compute_file_hash, ArtifactRecord, RecordStore};

/// Errors raised when handing a descriptor to the queue
#[derive(Debug, Error)]
pub enum QueueError {
    /// The worker is gone; the descriptor was not accepted
    #[error("logging queue is closed")]
    Closed,
}

/// A failed logging attempt, captured into the descriptor's outcome
#[derive(Debug, Error)]
pub enum LogError {
    /// The artifact could not be materialized as a local file
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The store rejected the upload
    #[error("artifact store '{store}' failed: {source}")]
    Store {
        store: String,
        #[source]
        source: StoreError,
    },
}

/// Handle to the logging queue and its worker task
pub struct LoggingQueue {
    tx: mpsc::Sender<PendingArtifact>,
    worker: JoinHandle<()>,
}

impl LoggingQueue {
    /// Spawn the worker task over a bounded channel of `capacity` entries
    pub fn spawn(store: Arc<dyn ArtifactStore>, records: RecordStore, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        let worker = tokio::spawn(worker_loop(rx, store, records));

        Self { tx, worker }
    }

    /// Hand a descriptor to the worker.
    ///
    /// Returns the descriptor's completion handle; callers wait on it to
    /// observe the outcome of the attempt.
    pub async fn enqueue(&self, artifact: PendingArtifact) -> Result<Completion, QueueError> {
        let completion = artifact.completion();
        self.tx.send(artifact).await.map_err(|_| QueueError::Closed)?;

        Ok(completion)
    }

    /// Close the queue, drain remaining descriptors, and wait for the
    /// worker to finish
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.worker.await;
    }
}

async fn worker_loop(
    mut rx: mpsc::Receiver<PendingArtifact>,
    store: Arc<dyn ArtifactStore>,
    records: RecordStore,
) {
    while let Some(artifact) = rx.recv().await {
        process_one(store.as_ref(), &records, artifact).await;
    }
}

/// Process a single descriptor: stage, upload, record, finalize.
#[instrument(skip_all, fields(store = store.name(), artifact_path = %artifact.artifact_path()))]
async fn process_one(store: &dyn ArtifactStore, records: &RecordStore, artifact: PendingArtifact) {
    let file_name = artifact.file_name().map(str::to_string);

    match upload(store, &artifact).await {
        Ok((stored, content_hash)) => {
            debug!(path = %stored.path.display(), size_bytes = stored.size_bytes, "artifact logged");

            let record = ArtifactRecord::logged(
                records.run_id(),
                artifact.artifact_path(),
                file_name,
                stored.size_bytes,
                content_hash,
            );
            if let Err(e) = records.append(&record).await {
                warn!("failed to append artifact record: {e}");
            }

            artifact.completion().finish(LogOutcome::Logged);
        }
        Err(error) => {
            warn!(%error, "artifact logging failed");

            let record = ArtifactRecord::failed(
                records.run_id(),
                artifact.artifact_path(),
                file_name,
                error.to_string(),
            );
            if let Err(e) = records.append(&record).await {
                warn!("failed to append artifact record: {e}");
            }

            artifact.completion().finish(LogOutcome::failed(error));
        }
    }
}

/// Stage the artifact and push it through the store.
///
/// The staging guard lives until the upload concludes, then drops,
/// removing any temporary storage whether the put succeeded or not.
async fn upload(
    store: &dyn ArtifactStore,
    artifact: &PendingArtifact,
) -> Result<(StoredArtifact, Option<String>), LogError> {
    let staged = artifact.stage()?;

    // Hash is best-effort record metadata; an unreadable file fails the
    // put below on its own.
    let content_hash = compute_file_hash(staged.path()).await.ok();

    let stored = store
        .put(staged.path(), artifact.artifact_path())
        .await
        .map_err(|source| LogError::Store {
            store: store.name().to_string(),
            source,
        })?;

    Ok((stored, content_hash))
}
