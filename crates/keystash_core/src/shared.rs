//! Thread-safe store handle.

use crate::error::StoreResult;
use crate::store::KeyStore;
use keystash_storage::{FileBackend, SnapshotBackend};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use zeroize::Zeroizing;

/// A cloneable handle that serializes access to one [`KeyStore`].
///
/// Every operation, including the commit that follows a mutation, runs under
/// a single mutex, so concurrent writers in one process never interleave
/// inside a commit. Clones share the same store.
///
/// # Example
///
/// ```rust
/// use keystash_core::{KeyStore, SharedKeyStore};
///
/// let shared = SharedKeyStore::new(KeyStore::in_memory().unwrap());
/// let worker = shared.clone();
///
/// std::thread::spawn(move || worker.set("k", b"v").unwrap())
///     .join()
///     .unwrap();
///
/// assert_eq!(shared.get_vec("k").unwrap().as_slice(), b"v");
/// ```
#[derive(Debug)]
pub struct SharedKeyStore<B: SnapshotBackend = FileBackend> {
    inner: Arc<Mutex<KeyStore<B>>>,
}

impl<B: SnapshotBackend> Clone for SharedKeyStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: SnapshotBackend> SharedKeyStore<B> {
    /// Wraps a store.
    #[must_use]
    pub fn new(store: KeyStore<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Locks the store for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, KeyStore<B>> {
        self.inner.lock()
    }

    /// See [`KeyStore::get`].
    ///
    /// # Errors
    ///
    /// Same as [`KeyStore::get`].
    pub fn get(&self, key: &str, buf: &mut [u8]) -> StoreResult<u16> {
        self.inner.lock().get(key, buf)
    }

    /// See [`KeyStore::get_vec`].
    ///
    /// # Errors
    ///
    /// Same as [`KeyStore::get_vec`].
    pub fn get_vec(&self, key: &str) -> StoreResult<Zeroizing<Vec<u8>>> {
        self.inner.lock().get_vec(key)
    }

    /// See [`KeyStore::set`].
    ///
    /// # Errors
    ///
    /// Same as [`KeyStore::set`].
    pub fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.inner.lock().set(key, value)
    }

    /// See [`KeyStore::delete`].
    ///
    /// # Errors
    ///
    /// Same as [`KeyStore::delete`].
    pub fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.lock().delete(key)
    }

    /// See [`KeyStore::commit`].
    ///
    /// # Errors
    ///
    /// Same as [`KeyStore::commit`].
    pub fn commit(&self) -> StoreResult<()> {
        self.inner.lock().commit()
    }

    /// See [`KeyStore::reload`].
    ///
    /// # Errors
    ///
    /// Same as [`KeyStore::reload`].
    pub fn reload(&self) -> StoreResult<()> {
        self.inner.lock().reload()
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    /// Returns a snapshot of all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().keys().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn concurrent_writers_all_land() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini");
        let shared = SharedKeyStore::new(KeyStore::open(StoreConfig::new(&path)).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = shared.clone();
                thread::spawn(move || {
                    for j in 0..10 {
                        store.set(&format!("t{i}-k{j}"), &[i, j]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.keys().len(), 80);

        let reopened = KeyStore::open(StoreConfig::new(&path)).unwrap();
        assert_eq!(reopened.len(), 80);
        assert_eq!(reopened.get_vec("t3-k7").unwrap().as_slice(), &[3, 7]);
    }

    #[test]
    fn lock_allows_batched_reads() {
        let shared = SharedKeyStore::new(KeyStore::in_memory().unwrap());
        shared.set("a", b"1").unwrap();
        shared.set("b", b"22").unwrap();

        let guard = shared.lock();
        let total: usize = guard
            .keys()
            .map(|k| guard.get_vec(k).unwrap().len())
            .sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn delete_and_reload() {
        let shared = SharedKeyStore::new(KeyStore::in_memory().unwrap());
        shared.set("k", b"v").unwrap();
        shared.delete("k").unwrap();
        shared.reload().unwrap();

        assert!(!shared.contains("k"));
        let mut buf = [0u8; 1];
        assert!(shared.get("k", &mut buf).is_err());
        shared.commit().unwrap();
    }
}
