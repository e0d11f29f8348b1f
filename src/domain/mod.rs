//! Domain types for asynchronous artifact logging.
//!
//! This module contains the core data structures:
//! - PendingArtifact: one artifact awaiting upload, with scoped staging
//! - ArtifactPayload: in-memory payloads and their encoders
//! - Completion: one-shot completion signal with a write-once outcome slot

pub mod artifact;
pub mod completion;
pub mod payload;

// Re-export commonly used types
pub use artifact::{ArtifactError, ArtifactSource, PendingArtifact, StagedArtifact};
pub use completion::{Completion, LogOutcome};
pub use payload::ArtifactPayload;
