//! In-memory snapshot backend for testing.

use crate::backend::SnapshotBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

/// An in-memory snapshot backend.
///
/// Suitable for unit tests and ephemeral stores. Clones share the same
/// snapshot, so a test can keep a handle and inspect what a store committed.
///
/// # Example
///
/// ```rust
/// use keystash_storage::{InMemoryBackend, SnapshotBackend};
///
/// let mut backend = InMemoryBackend::new();
/// assert!(backend.load().is_err());
///
/// backend.replace(b"[Default]\n").unwrap();
/// assert_eq!(backend.load().unwrap(), b"[Default]\n");
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    data: Arc<RwLock<Option<Vec<u8>>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding an existing snapshot.
    ///
    /// Useful for testing load and recovery paths.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(RwLock::new(Some(data))),
        }
    }

    /// Returns a copy of the current snapshot, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }

    /// Discards the stored snapshot.
    pub fn clear(&self) {
        *self.data.write() = None;
    }
}

impl SnapshotBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Vec<u8>> {
        self.data.read().clone().ok_or_else(|| StorageError::NotFound {
            path: PathBuf::from(":memory:"),
        })
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        *self.data.write() = Some(data.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        ":memory:".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_backend_is_not_found() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap_err().is_not_found());
        assert!(backend.data().is_none());
    }

    #[test]
    fn replace_overwrites() {
        let mut backend = InMemoryBackend::new();
        backend.replace(b"one").unwrap();
        backend.replace(b"two").unwrap();
        assert_eq!(backend.load().unwrap(), b"two");
    }

    #[test]
    fn clones_share_snapshot() {
        let mut backend = InMemoryBackend::new();
        let observer = backend.clone();

        backend.replace(b"shared").unwrap();
        assert_eq!(observer.data().unwrap(), b"shared");
    }

    #[test]
    fn with_data_and_clear() {
        let backend = InMemoryBackend::with_data(b"seed".to_vec());
        assert_eq!(backend.load().unwrap(), b"seed");

        backend.clear();
        assert!(backend.load().is_err());
    }

    #[test]
    fn boxed_backend_delegates() {
        let mut boxed: Box<dyn SnapshotBackend> = Box::new(InMemoryBackend::new());
        boxed.replace(b"boxed").unwrap();
        assert_eq!(boxed.load().unwrap(), b"boxed");
        assert_eq!(boxed.describe(), ":memory:");
    }
}
