//! Test fixtures and store helpers.

use keystash_core::{KeyStore, StoreConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name of the backing file inside a fixture directory.
pub const STORE_FILE: &str = "store.ini";

/// A file-backed test store with automatic cleanup.
pub struct TempStore {
    /// The store instance.
    pub store: KeyStore,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TempStore {
    /// Creates a fresh store in a new temporary directory.
    ///
    /// Sync is disabled; tests do not need power-loss durability.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = KeyStore::open(Self::config_for(temp_dir.path()))
            .expect("Failed to open test store");
        Self { store, temp_dir }
    }

    /// Returns the configuration used for the fixture's store.
    pub fn config_for(dir: &Path) -> StoreConfig {
        StoreConfig::new(dir.join(STORE_FILE)).sync_on_commit(false)
    }

    /// Returns the backing file path.
    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().join(STORE_FILE)
    }

    /// Returns the temporary directory.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Opens a second, independent store over the same backing file.
    pub fn reopen(&self) -> KeyStore {
        KeyStore::open(Self::config_for(self.temp_dir.path())).expect("Failed to reopen store")
    }

    /// Reads the raw backing file.
    pub fn raw(&self) -> String {
        std::fs::read_to_string(self.path()).expect("Failed to read backing file")
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TempStore {
    type Target = KeyStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl std::ops::DerefMut for TempStore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

/// Runs a test with a temporary file-backed store.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&mut KeyStore, &Path) -> R,
{
    let mut fixture = TempStore::new();
    let path = fixture.path();
    f(&mut fixture.store, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store holding `count` keys `key-0000..` with distinct values.
    pub fn populated_store(count: usize) -> TempStore {
        let mut fixture = TempStore::new();
        for i in 0..count {
            fixture
                .store
                .set(&format!("key-{i:04}"), &value_for(i))
                .expect("Failed to populate store");
        }
        fixture
    }

    /// Returns the value `populated_store` writes for index `i`.
    pub fn value_for(i: usize) -> Vec<u8> {
        (0..=(i % 64)).map(|b| (b as u8) ^ (i as u8)).collect()
    }
}
