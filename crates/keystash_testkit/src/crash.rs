//! Crash and fault injection for KeyStash stores.
//!
//! [`CrashableBackend`] wraps a [`FileBackend`] and fails at a chosen
//! [`CrashPoint`] of the commit protocol. It is driven through a
//! [`FaultHandle`] so a test can arm a fault after the store has taken
//! ownership of the backend.
//!
//! ## Usage
//!
//! ```rust
//! use keystash_core::{CommitFailurePolicy, KeyStore};
//! use keystash_testkit::crash::{CrashPoint, CrashableBackend};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let (backend, faults) = CrashableBackend::new(&dir.path().join("store.ini"));
//! let mut store = KeyStore::with_backend(backend, CommitFailurePolicy::Diverge).unwrap();
//!
//! faults.arm(CrashPoint::BeforeRename);
//! assert!(store.set("k", b"v").is_err());
//! ```

use keystash_storage::{FileBackend, SnapshotBackend, StorageError, StorageResult};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Points of the commit protocol at which a fault can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashPoint {
    /// Reading the snapshot fails.
    Load,
    /// Creating the temporary file fails; nothing is written.
    TempCreate,
    /// Only part of the snapshot reaches the temporary file.
    DuringTempWrite,
    /// The temporary file is complete but the rename never happens.
    BeforeRename,
    /// The rename itself fails.
    Rename,
}

impl CrashPoint {
    const ALL: [Self; 5] = [
        Self::Load,
        Self::TempCreate,
        Self::DuringTempWrite,
        Self::BeforeRename,
        Self::Rename,
    ];

    fn to_u8(self) -> u8 {
        match self {
            Self::Load => 1,
            Self::TempCreate => 2,
            Self::DuringTempWrite => 3,
            Self::BeforeRename => 4,
            Self::Rename => 5,
        }
    }

    fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.to_u8() == value)
    }
}

#[derive(Debug, Default)]
struct FaultState {
    armed: AtomicU8,
    partial_bytes: AtomicUsize,
    crashed: AtomicBool,
    commits: AtomicUsize,
}

/// Control handle for a [`CrashableBackend`].
#[derive(Debug, Clone)]
pub struct FaultHandle {
    state: Arc<FaultState>,
}

impl FaultHandle {
    /// Arms a fault; it fires on every matching step until disarmed.
    pub fn arm(&self, point: CrashPoint) {
        self.state.armed.store(point.to_u8(), Ordering::SeqCst);
    }

    /// Sets how many bytes reach the temp file for [`CrashPoint::DuringTempWrite`].
    pub fn set_partial_bytes(&self, bytes: usize) {
        self.state.partial_bytes.store(bytes, Ordering::SeqCst);
    }

    /// Clears any armed fault and the crashed flag.
    pub fn disarm(&self) {
        self.state.armed.store(0, Ordering::SeqCst);
        self.state.crashed.store(false, Ordering::SeqCst);
    }

    /// Returns whether an armed fault has fired.
    pub fn has_crashed(&self) -> bool {
        self.state.crashed.load(Ordering::SeqCst)
    }

    /// Returns the number of snapshots that were fully swapped in.
    pub fn commits(&self) -> usize {
        self.state.commits.load(Ordering::SeqCst)
    }
}

/// A file backend wrapper that can simulate crashes.
#[derive(Debug)]
pub struct CrashableBackend {
    inner: FileBackend,
    state: Arc<FaultState>,
}

impl CrashableBackend {
    /// Creates an unarmed backend for `path` and its control handle.
    pub fn new(path: &Path) -> (Self, FaultHandle) {
        let state = Arc::new(FaultState::default());
        let backend = Self {
            inner: FileBackend::new(path).sync(false),
            state: Arc::clone(&state),
        };
        (backend, FaultHandle { state })
    }

    /// Returns the wrapped file backend.
    pub fn inner(&self) -> &FileBackend {
        &self.inner
    }

    fn fires(&self, point: CrashPoint) -> bool {
        let armed = CrashPoint::from_u8(self.state.armed.load(Ordering::SeqCst));
        if armed == Some(point) {
            self.state.crashed.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    fn simulated(point: CrashPoint) -> std::io::Error {
        std::io::Error::other(format!("simulated crash at {point:?}"))
    }
}

impl SnapshotBackend for CrashableBackend {
    fn load(&self) -> StorageResult<Vec<u8>> {
        if self.fires(CrashPoint::Load) {
            return Err(StorageError::Io(Self::simulated(CrashPoint::Load)));
        }
        self.inner.load()
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        let temp_path = self.inner.temp_path().to_path_buf();

        if self.fires(CrashPoint::TempCreate) {
            return Err(StorageError::TempWrite {
                path: temp_path,
                source: Self::simulated(CrashPoint::TempCreate),
            });
        }

        if self.fires(CrashPoint::DuringTempWrite) {
            let partial = self.state.partial_bytes.load(Ordering::SeqCst).min(data.len());
            self.inner.write_temp(&data[..partial])?;
            return Err(StorageError::TempWrite {
                path: temp_path,
                source: Self::simulated(CrashPoint::DuringTempWrite),
            });
        }

        self.inner.write_temp(data)?;

        if self.fires(CrashPoint::BeforeRename) {
            return Err(StorageError::Io(Self::simulated(CrashPoint::BeforeRename)));
        }

        if self.fires(CrashPoint::Rename) {
            return Err(StorageError::Replace {
                from: temp_path,
                to: self.inner.path().to_path_buf(),
                source: Self::simulated(CrashPoint::Rename),
            });
        }

        self.inner.promote_temp()?;
        self.state.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("crashable:{}", self.inner.describe())
    }
}
