//! Error types for training, inference and model persistence.

use std::path::PathBuf;
use thiserror::Error;

use crate::dataset::TableError;
use crate::preprocessing::PreprocessingError;
use crate::serialization::ArtifactError;

/// Error type for every [`Machine`](crate::machine::Machine) operation.
///
/// Errors are reported to the immediate caller and never retried internally.
/// A failed operation leaves any previously built machine or saved artifact
/// untouched.
#[derive(Debug, Error)]
pub enum MachineError {
    /// Column mismatch at fit or predict time.
    #[error("Schema error: {0}")]
    Schema(String),
    /// Fewer than two label classes at fit time.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    /// Artifact read or write failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Artifact does not match the expected layout, version or structure.
    #[error("Corrupt artifact: {0}")]
    CorruptArtifact(String),
    /// Rejected trainer settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MachineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MachineError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<PreprocessingError> for MachineError {
    fn from(err: PreprocessingError) -> Self {
        match err {
            PreprocessingError::EmptyData(msg) => MachineError::InsufficientData(msg),
            other => MachineError::Schema(other.to_string()),
        }
    }
}

impl From<ArtifactError> for MachineError {
    fn from(err: ArtifactError) -> Self {
        MachineError::CorruptArtifact(err.to_string())
    }
}

impl From<TableError> for MachineError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::Io { path, source } => MachineError::Io { path, source },
            other => MachineError::Schema(other.to_string()),
        }
    }
}
