//! Error types for KeyStash core.

use keystash_storage::StorageError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file is unusable even after trying to create it.
    #[error("failed to open store at {location}: {source}")]
    OpenFailed {
        /// Where the store lives.
        location: String,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// The key is not present.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// The key that was looked up.
        key: String,
    },

    /// The stored value could not be decoded.
    #[error("invalid encoding for key {key}: {message}")]
    InvalidEncoding {
        /// The key whose value is corrupt.
        key: String,
        /// Description of the decoding problem.
        message: String,
    },

    /// The caller's buffer cannot hold the value.
    #[error("buffer too small: value needs {required} bytes, buffer holds {capacity}")]
    BufferTooSmall {
        /// Exact decoded length of the value.
        required: u16,
        /// Capacity of the buffer that was passed in.
        capacity: usize,
    },

    /// Persisting the store failed.
    #[error("write failed: {0}")]
    WriteFailed(#[source] StorageError),

    /// The key cannot be represented in the store file.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Why the key was rejected.
        reason: &'static str,
    },

    /// The value is longer than the store accepts.
    #[error("value too large: {len} bytes exceeds {max}", max = u16::MAX)]
    ValueTooLarge {
        /// Length of the rejected value.
        len: usize,
    },

    /// Another process holds the store lock.
    #[error("store locked: another process has exclusive access to {path:?}")]
    Locked {
        /// Path of the lock file.
        path: PathBuf,
    },

    /// I/O error outside of snapshot storage.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Creates a key not found error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Creates an invalid encoding error.
    pub fn invalid_encoding(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }

    /// Returns the exact value length carried by a `BufferTooSmall` error.
    #[must_use]
    pub fn required_len(&self) -> Option<u16> {
        match self {
            Self::BufferTooSmall { required, .. } => Some(*required),
            _ => None,
        }
    }
}
