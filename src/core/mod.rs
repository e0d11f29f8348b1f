//! Core logging machinery.
//!
//! This module contains:
//! - LoggingQueue: bounded channel plus the dedicated worker task
//! - RecordStore: append-only JSONL log of logging attempts

pub mod queue;
pub mod records;

// Re-export commonly used types
pub use queue::{LogError, LoggingQueue, QueueError};
pub use records::{compute_file_hash, ArtifactRecord, RecordError, RecordStatus, RecordStore};
