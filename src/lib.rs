//! runlog - Asynchronous run artifact logging
//!
//! A library for logging run artifacts asynchronously: callers enqueue a
//! pending artifact (a file already on disk, or an in-memory image to be
//! encoded) and a dedicated worker persists it to the run's artifact
//! store, records the attempt, and signals a completion handle the caller
//! can wait on.
//!
//! # Architecture
//!
//! The system is built around single-use artifact descriptors:
//! - Staging materializes a descriptor as a local file, with any
//!   temporary storage owned by an RAII guard (cleanup on every exit path)
//! - One worker task drains a bounded queue and uploads staged files
//! - Each descriptor carries a one-shot completion signal with a
//!   write-once outcome slot; waiters unblock only after the outcome is
//!   finalized
//!
//! # Modules
//!
//! - `domain`: Data structures (PendingArtifact, ArtifactPayload, Completion)
//! - `store`: Artifact store trait and local filesystem implementation
//! - `core`: Logging queue, worker, and the per-run record log
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Log a file into a fresh run
//! runlog log results/plot.png --artifact-path plots
//!
//! # Inspect what was logged
//! runlog records <run-id>
//! runlog list <run-id>
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod store;

// Re-export main types at crate root for convenience
pub use crate::core::{ArtifactRecord, LogError, LoggingQueue, RecordStatus, RecordStore};
pub use crate::domain::{
    ArtifactError, ArtifactPayload, ArtifactSource, Completion, LogOutcome, PendingArtifact,
    StagedArtifact,
};
pub use crate::store::{ArtifactStore, LocalArtifactStore, StoreError, StoredArtifact};
