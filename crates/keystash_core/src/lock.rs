//! Advisory single-writer lock.
//!
//! The lock lives in a sibling file (`<path>.lock`) rather than on the store
//! file itself, because every commit replaces the store file by rename and a
//! lock held on the old inode would no longer guard the new one.

use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// An exclusive advisory lock, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    _file: File,
}

impl StoreLock {
    /// Acquires the lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another holder has it, or an I/O
    /// error if the lock file cannot be opened.
    pub fn acquire(path: &Path) -> StoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    /// Returns the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lock_prevents_second_holder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini.lock");

        let _lock = StoreLock::acquire(&path).unwrap();
        let result = StoreLock::acquire(&path);
        assert!(matches!(result, Err(StoreError::Locked { .. })));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini.lock");

        {
            let lock = StoreLock::acquire(&path).unwrap();
            assert_eq!(lock.path(), path);
        }

        let _again = StoreLock::acquire(&path).unwrap();
    }
}
