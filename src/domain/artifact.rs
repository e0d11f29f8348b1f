//! Pending artifact descriptors and scoped staging.
//!
//! A `PendingArtifact` identifies one artifact awaiting upload: where it
//! should land in the run's store, how to materialize it as a local file,
//! and the completion handle the worker finalizes afterwards. Staging
//! yields an RAII guard that owns any temporary storage, so cleanup runs
//! on every exit path.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

use super::completion::Completion;
use super::payload::ArtifactPayload;

/// Errors raised while materializing an artifact as a local file
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Neither a payload nor a local file was supplied
    #[error("no artifact payload or local file provided for logging")]
    MissingSource,

    /// The payload kind has no registered encoder
    #[error("unsupported artifact payload: {kind} (only image payloads can be logged)")]
    UnsupportedPayload { kind: &'static str },

    /// The staging directory could not be created
    #[error("failed to create staging directory: {0}")]
    Staging(#[source] std::io::Error),

    /// The payload could not be encoded into the staging directory
    #[error("failed to encode artifact to {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Where the bytes of a pending artifact come from.
///
/// Exactly one of the populated arms is meaningful for a usable
/// descriptor; `Empty` is the explicit invalid case and fails staging.
#[derive(Debug, Default)]
pub enum ArtifactSource {
    /// A file that already exists on disk; staged as-is
    LocalFile(PathBuf),

    /// An in-memory payload encoded under `filename` at staging time
    InMemory {
        filename: String,
        payload: ArtifactPayload,
    },

    /// No source supplied; staging fails fast
    #[default]
    Empty,
}

/// A staged artifact: a local file path ready for upload.
///
/// If the descriptor carried an in-memory payload, the guard owns the
/// temporary directory holding the encoded file. Dropping the guard
/// removes that directory and its contents, best-effort; removal errors
/// are suppressed. The path is only guaranteed to exist while the guard
/// lives.
#[derive(Debug)]
pub struct StagedArtifact {
    local_file: PathBuf,
    tmp_dir: Option<TempDir>,
}

impl StagedArtifact {
    /// The local file to upload
    pub fn path(&self) -> &Path {
        &self.local_file
    }

    /// Whether the file lives in temporary storage owned by this guard
    pub fn is_temporary(&self) -> bool {
        self.tmp_dir.is_some()
    }
}

/// One pending artifact-logging request.
///
/// Construction is cheap and performs no I/O; source validation is
/// deferred to [`PendingArtifact::stage`] so descriptors can be created
/// from contexts that must not block or fail.
#[derive(Debug)]
pub struct PendingArtifact {
    /// Subdirectory within the run's artifact store (opaque, passed
    /// through to the store)
    artifact_path: String,

    /// Materialization source
    source: ArtifactSource,

    /// Completion handle finalized by the worker
    completion: Completion,
}

impl PendingArtifact {
    /// Create a descriptor with an explicit source and completion handle
    pub fn new(
        artifact_path: impl Into<String>,
        source: ArtifactSource,
        completion: Completion,
    ) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            source,
            completion,
        }
    }

    /// Descriptor for a file that already exists on disk
    pub fn from_file(artifact_path: impl Into<String>, local_file: impl Into<PathBuf>) -> Self {
        Self::new(
            artifact_path,
            ArtifactSource::LocalFile(local_file.into()),
            Completion::new(),
        )
    }

    /// Descriptor for an in-memory payload to be encoded under `filename`
    pub fn from_payload(
        artifact_path: impl Into<String>,
        filename: impl Into<String>,
        payload: impl Into<ArtifactPayload>,
    ) -> Self {
        Self::new(
            artifact_path,
            ArtifactSource::InMemory {
                filename: filename.into(),
                payload: payload.into(),
            },
            Completion::new(),
        )
    }

    /// Destination subdirectory within the run's artifact store
    pub fn artifact_path(&self) -> &str {
        &self.artifact_path
    }

    /// The materialization source
    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }

    /// Handle to this descriptor's completion signal and outcome slot
    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    /// File name the artifact will be stored under, if one is known
    pub fn file_name(&self) -> Option<&str> {
        match &self.source {
            ArtifactSource::LocalFile(path) => path.file_name().and_then(|name| name.to_str()),
            ArtifactSource::InMemory { filename, .. } => Some(filename),
            ArtifactSource::Empty => None,
        }
    }

    /// Materialize the artifact as a local file ready for upload.
    ///
    /// A `LocalFile` source resolves to exactly the constructed path and
    /// allocates nothing. An `InMemory` source allocates a fresh,
    /// uniquely-named temporary directory, encodes the payload into it
    /// under the descriptor's filename, and hands ownership of the
    /// directory to the returned guard. If encoding fails the directory is
    /// removed before the error propagates.
    pub fn stage(&self) -> Result<StagedArtifact, ArtifactError> {
        match &self.source {
            ArtifactSource::LocalFile(path) => Ok(StagedArtifact {
                local_file: path.clone(),
                tmp_dir: None,
            }),
            ArtifactSource::InMemory { filename, payload } => {
                let tmp_dir = tempfile::tempdir().map_err(ArtifactError::Staging)?;
                let local_file = tmp_dir.path().join(filename);
                payload.write_to(&local_file)?;
                Ok(StagedArtifact {
                    local_file,
                    tmp_dir: Some(tmp_dir),
                })
            }
            ArtifactSource::Empty => Err(ArtifactError::MissingSource),
        }
    }
}
