//! The persistent key-value store.

use crate::config::{CommitFailurePolicy, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::format::{validate_key, Document, Section};
use crate::lock::StoreLock;
use keystash_storage::{FileBackend, InMemoryBackend, SnapshotBackend, StorageError};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// The section holding every key of the store.
pub const DEFAULT_SECTION: &str = "Default";

/// Largest value the store accepts, in bytes.
pub const MAX_VALUE_LEN: usize = u16::MAX as usize;

/// A durable key-value store for binary values.
///
/// The whole store lives in memory as a [`Document`]. Values are kept in
/// their encoded text form and decoded on every read. Every mutation
/// re-renders the complete document and hands it to the backend, which swaps
/// it in atomically, so the backing file always holds one complete snapshot.
///
/// # Opening a Store
///
/// ```rust,no_run
/// use keystash_core::{KeyStore, StoreConfig};
///
/// let mut store = KeyStore::open(StoreConfig::new("/var/lib/app/creds.ini"))?;
/// store.set("session", &[0x00, 0x01, 0xFF])?;
///
/// let mut buf = [0u8; 16];
/// let len = store.get("session", &mut buf)?;
/// assert_eq!(&buf[..usize::from(len)], &[0x00, 0x01, 0xFF]);
/// # Ok::<(), keystash_core::StoreError>(())
/// ```
///
/// # Concurrency
///
/// There is no implicit locking. Mutations take `&mut self`; to share a store
/// between threads use [`crate::SharedKeyStore`]. Separate processes writing
/// the same file overwrite each other's commits unless
/// [`StoreConfig::exclusive_lock`] is enabled.
#[derive(Debug)]
pub struct KeyStore<B: SnapshotBackend = FileBackend> {
    document: Document,
    backend: B,
    on_commit_failure: CommitFailurePolicy,
    _lock: Option<StoreLock>,
}

impl KeyStore<FileBackend> {
    /// Opens the store at `config.path`, creating the backing file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if an exclusive lock was requested and
    /// is held elsewhere, and [`StoreError::OpenFailed`] if the backing file
    /// cannot be read even after trying to create it.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let location = config.path.display().to_string();
        let open_failed = |source: StorageError| StoreError::OpenFailed {
            location: location.clone(),
            source,
        };

        let backend = if config.create_dirs {
            FileBackend::with_create_dirs(&config.path).map_err(open_failed)?
        } else {
            FileBackend::new(&config.path)
        };
        let backend = backend.sync(config.sync_on_commit);

        let lock = if config.exclusive_lock {
            Some(StoreLock::acquire(&config.lock_path())?)
        } else {
            None
        };

        let mut store = Self {
            document: Document::new(),
            backend,
            on_commit_failure: config.on_commit_failure,
            _lock: lock,
        };
        store.reload()?;
        Ok(store)
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.backend.path()
    }
}

impl KeyStore<InMemoryBackend> {
    /// Opens an empty store that lives only in memory.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other constructors.
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_backend(InMemoryBackend::new(), CommitFailurePolicy::default())
    }
}

impl<B: SnapshotBackend> KeyStore<B> {
    /// Opens a store over an arbitrary backend.
    ///
    /// Location, syncing and locking are the backend's business, so the only
    /// store-level setting is what to do when a commit fails.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OpenFailed`] if the backend cannot produce a
    /// snapshot even after trying to create one.
    pub fn with_backend(backend: B, on_commit_failure: CommitFailurePolicy) -> StoreResult<Self> {
        let mut store = Self {
            document: Document::new(),
            backend,
            on_commit_failure,
            _lock: None,
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-reads the store from its backend, discarding in-memory state.
    ///
    /// If no snapshot exists (or it cannot be read), an empty store is
    /// committed first and the load is retried.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OpenFailed`] if the snapshot is still unreadable
    /// or is not valid UTF-8.
    pub fn reload(&mut self) -> StoreResult<()> {
        let data = match self.backend.load() {
            Ok(data) => data,
            Err(err) => {
                debug!(
                    location = %self.backend.describe(),
                    error = %err,
                    "no readable snapshot, creating one"
                );
                self.document = Document::new();
                if let Err(commit_err) = self.commit() {
                    warn!(
                        location = %self.backend.describe(),
                        error = %commit_err,
                        "failed to create empty snapshot"
                    );
                }
                self.backend.load().map_err(|source| self.open_failed(source))?
            }
        };

        self.document = Document::parse(data.as_slice())
            .map_err(|err| self.open_failed(StorageError::Io(err)))?;

        debug!(
            location = %self.backend.describe(),
            keys = self.len(),
            "store loaded"
        );
        Ok(())
    }

    /// Copies the value of `key` into the front of `buf`.
    ///
    /// Returns the decoded length. Nothing is written to `buf` on error.
    ///
    /// # Errors
    ///
    /// - [`StoreError::KeyNotFound`] if the key is absent
    /// - [`StoreError::InvalidEncoding`] if the stored text does not decode
    /// - [`StoreError::BufferTooSmall`] if `buf` is shorter than the value;
    ///   the error carries the exact length needed
    pub fn get(&self, key: &str, buf: &mut [u8]) -> StoreResult<u16> {
        let value = self.decode(key)?;
        let len = u16::try_from(value.len()).map_err(|_| {
            StoreError::invalid_encoding(
                key,
                format!("decoded length {} exceeds {MAX_VALUE_LEN}", value.len()),
            )
        })?;

        if value.len() > buf.len() {
            return Err(StoreError::BufferTooSmall {
                required: len,
                capacity: buf.len(),
            });
        }

        buf[..value.len()].copy_from_slice(&value);
        Ok(len)
    }

    /// Returns the value of `key` in an owned buffer wiped on drop.
    ///
    /// # Errors
    ///
    /// Same as [`KeyStore::get`], except that it never reports
    /// `BufferTooSmall`.
    pub fn get_vec(&self, key: &str) -> StoreResult<Zeroizing<Vec<u8>>> {
        let value = self.decode(key)?;
        if value.len() > MAX_VALUE_LEN {
            return Err(StoreError::invalid_encoding(
                key,
                format!("decoded length {} exceeds {MAX_VALUE_LEN}", value.len()),
            ));
        }
        Ok(value)
    }

    /// Returns the decoded length of the value of `key`.
    ///
    /// # Errors
    ///
    /// Same as [`KeyStore::get_vec`].
    pub fn value_len(&self, key: &str) -> StoreResult<u16> {
        let value = self.get_vec(key)?;
        u16::try_from(value.len())
            .map_err(|_| StoreError::invalid_encoding(key, "decoded length overflow"))
    }

    /// Stores `value` under `key`, replacing any previous value, and commits.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidKey`] or [`StoreError::ValueTooLarge`] before
    ///   anything changes
    /// - [`StoreError::WriteFailed`] if the commit fails; see
    ///   [`CommitFailurePolicy`] for what stays in memory
    pub fn set(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        validate_key(key).map_err(|reason| StoreError::invalid_key(key, reason))?;
        if value.len() > MAX_VALUE_LEN {
            return Err(StoreError::ValueTooLarge { len: value.len() });
        }

        let token = keystash_codec::encode(value);
        self.mutate(|section| {
            section.insert(key, token);
        })?;
        debug!(key, bytes = value.len(), "value stored");
        Ok(())
    }

    /// Removes `key` and commits. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteFailed`] if the commit fails.
    pub fn delete(&mut self, key: &str) -> StoreResult<()> {
        let mut removed = false;
        self.mutate(|section| {
            removed = section.remove(key).is_some();
        })?;
        debug!(key, removed, "value deleted");
        Ok(())
    }

    /// Persists the whole in-memory store through the backend.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteFailed`] if the snapshot could not be
    /// written or swapped in. The previous snapshot is left intact.
    pub fn commit(&mut self) -> StoreResult<()> {
        let text = self.document.to_text();
        self.backend
            .replace(text.as_bytes())
            .map_err(StoreError::WriteFailed)?;
        debug!(
            location = %self.backend.describe(),
            bytes = text.len(),
            "store committed"
        );
        Ok(())
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.section().is_some_and(|s| s.contains(key))
    }

    /// Iterates over all keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.section().into_iter().flat_map(Section::keys)
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.section().map_or(0, Section::len)
    }

    /// Returns true if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the in-memory document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns what happens to in-memory state when a commit fails.
    #[must_use]
    pub const fn commit_failure_policy(&self) -> CommitFailurePolicy {
        self.on_commit_failure
    }

    fn section(&self) -> Option<&Section> {
        self.document.section(DEFAULT_SECTION)
    }

    fn decode(&self, key: &str) -> StoreResult<Zeroizing<Vec<u8>>> {
        let token = self
            .section()
            .and_then(|s| s.get(key))
            .ok_or_else(|| StoreError::key_not_found(key))?;

        keystash_codec::decode(token)
            .map(Zeroizing::new)
            .map_err(|err| StoreError::invalid_encoding(key, err.to_string()))
    }

    /// Applies `change` to the default section, then commits.
    fn mutate<F>(&mut self, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Section),
    {
        let previous = match self.on_commit_failure {
            CommitFailurePolicy::Rollback => Some(self.document.clone()),
            CommitFailurePolicy::Diverge => None,
        };

        change(self.document.section_mut(DEFAULT_SECTION));

        if let Err(err) = self.commit() {
            if let Some(previous) = previous {
                warn!(error = %err, "commit failed, rolling back in-memory change");
                self.document = previous;
            } else {
                warn!(error = %err, "commit failed, in-memory store differs from disk");
            }
            return Err(err);
        }
        Ok(())
    }

    fn open_failed(&self, source: StorageError) -> StoreError {
        StoreError::OpenFailed {
            location: self.backend.describe(),
            source,
        }
    }
}
