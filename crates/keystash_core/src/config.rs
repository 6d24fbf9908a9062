//! Store configuration.

use keystash_storage::temp_path_for;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the store path to form the lock file path.
pub const LOCK_SUFFIX: &str = ".lock";

/// What happens to in-memory state when a commit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitFailurePolicy {
    /// Keep the mutation in memory. Memory and disk differ until the next
    /// successful commit or reload.
    #[default]
    Diverge,
    /// Restore the pre-mutation state before returning the error.
    Rollback,
}

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the backing file.
    pub path: PathBuf,

    /// Whether to fsync the temporary file and directory on every commit.
    pub sync_on_commit: bool,

    /// Whether to create missing parent directories on open.
    pub create_dirs: bool,

    /// Whether to hold an advisory lock on `<path>.lock` while open.
    pub exclusive_lock: bool,

    /// In-memory behavior when a commit fails.
    pub on_commit_failure: CommitFailurePolicy,
}

impl StoreConfig {
    /// Creates a configuration for the given backing file with defaults.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_on_commit: true,
            create_dirs: true,
            exclusive_lock: false,
            on_commit_failure: CommitFailurePolicy::Diverge,
        }
    }

    /// Sets whether to fsync on every commit.
    #[must_use]
    pub const fn sync_on_commit(mut self, value: bool) -> Self {
        self.sync_on_commit = value;
        self
    }

    /// Sets whether to create missing parent directories.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }

    /// Sets whether to take an exclusive advisory lock.
    #[must_use]
    pub const fn exclusive_lock(mut self, value: bool) -> Self {
        self.exclusive_lock = value;
        self
    }

    /// Sets the commit failure policy.
    #[must_use]
    pub const fn on_commit_failure(mut self, policy: CommitFailurePolicy) -> Self {
        self.on_commit_failure = policy;
        self
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the temporary file path used during commits.
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        temp_path_for(&self.path)
    }

    /// Returns the advisory lock file path.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(LOCK_SUFFIX);
        PathBuf::from(name)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("keystash.ini")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert!(config.sync_on_commit);
        assert!(config.create_dirs);
        assert!(!config.exclusive_lock);
        assert_eq!(config.on_commit_failure, CommitFailurePolicy::Diverge);
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new("/tmp/creds.ini")
            .sync_on_commit(false)
            .exclusive_lock(true)
            .on_commit_failure(CommitFailurePolicy::Rollback);

        assert!(!config.sync_on_commit);
        assert!(config.exclusive_lock);
        assert_eq!(config.on_commit_failure, CommitFailurePolicy::Rollback);
    }

    #[test]
    fn derived_paths() {
        let config = StoreConfig::new("/tmp/creds.ini");
        assert_eq!(config.path(), Path::new("/tmp/creds.ini"));
        assert_eq!(config.temp_path(), Path::new("/tmp/creds.ini.tmp"));
        assert_eq!(config.lock_path(), Path::new("/tmp/creds.ini.lock"));
    }
}
