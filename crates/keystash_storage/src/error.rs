//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No snapshot has been written yet.
    #[error("snapshot not found: {path:?}")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The temporary file could not be created or fully written.
    #[error("failed to write temporary file {path:?}: {source}")]
    TempWrite {
        /// Path of the temporary file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The atomic rename onto the target path failed.
    #[error("failed to replace {to:?} with {from:?}: {source}")]
    Replace {
        /// Source path of the rename.
        from: PathBuf,
        /// Target path of the rename.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Returns true if this error means there is nothing stored yet.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io(err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
