//! Snapshot backend trait definition.

use crate::error::StorageResult;

/// A whole-snapshot storage backend for KeyStash.
///
/// Backends are **opaque byte stores** holding exactly one snapshot. They do
/// not interpret the bytes; KeyStash owns the text format.
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the last successful `replace`
/// - `replace` is atomic: either the new snapshot is fully visible, or the
///   previous one is left untouched
/// - Backends must be `Send` so stores can move between threads
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait SnapshotBackend: Send {
    /// Reads the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::NotFound`] if nothing has been stored
    /// yet, or an I/O error if the snapshot cannot be read.
    fn load(&self) -> StorageResult<Vec<u8>>;

    /// Atomically replaces the snapshot with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the new snapshot could not be staged or swapped in.
    /// On error the previous snapshot is still the one `load` returns, so an
    /// implementation must not fail once the new snapshot is visible.
    fn replace(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Returns a human-readable location for logs and error messages.
    fn describe(&self) -> String;
}

impl<B: SnapshotBackend + ?Sized> SnapshotBackend for Box<B> {
    fn load(&self) -> StorageResult<Vec<u8>> {
        (**self).load()
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        (**self).replace(data)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
