//! File-based snapshot backend with atomic replace.

use crate::backend::SnapshotBackend;
use crate::error::{StorageError, StorageResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix appended to the target path to form the temporary file path.
pub const TEMP_SUFFIX: &str = ".tmp";

/// A file-based snapshot backend.
///
/// The snapshot lives at a single target path. Every `replace` uses the
/// write-then-rename pattern:
///
/// 1. Write the full snapshot to `<path>.tmp`, truncating any earlier one
/// 2. Flush (and optionally fsync) and close the temporary file
/// 3. Rename `<path>.tmp` onto `<path>`
/// 4. Optionally fsync the parent directory so the rename is durable
///
/// A reader never observes a partially written target file. Once the rename
/// has happened the replace has taken effect, so a failed directory fsync is
/// logged rather than returned.
///
/// # Example
///
/// ```no_run
/// use keystash_storage::{FileBackend, SnapshotBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::new(Path::new("store.ini"));
/// backend.replace(b"[Default]\n").unwrap();
/// assert_eq!(backend.load().unwrap(), b"[Default]\n");
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    temp_path: PathBuf,
    dir: PathBuf,
    sync: bool,
}

impl FileBackend {
    /// Creates a backend for the given target path.
    ///
    /// Nothing is touched on disk until the first `load` or `replace`.
    /// Syncing is enabled by default.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            temp_path: temp_path_for(path),
            dir: parent_dir(path).to_path_buf(),
            sync: true,
        }
    }

    /// Creates a backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(path))
    }

    /// Sets whether the temporary file and directory are fsynced on replace.
    #[must_use]
    pub const fn sync(mut self, value: bool) -> Self {
        self.sync = value;
        self
    }

    /// Returns the target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the temporary file path.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Writes `data` to the temporary file and closes it.
    ///
    /// This is the first half of [`SnapshotBackend::replace`]. On its own it
    /// never changes what `load` returns.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TempWrite`] if the file cannot be created or
    /// the write does not complete.
    pub fn write_temp(&self, data: &[u8]) -> StorageResult<()> {
        let temp_write = |source: io::Error| StorageError::TempWrite {
            path: self.temp_path.clone(),
            source,
        };

        let mut file = File::create(&self.temp_path).map_err(temp_write)?;
        file.write_all(data).map_err(temp_write)?;
        file.flush().map_err(temp_write)?;
        if self.sync {
            file.sync_all().map_err(temp_write)?;
        }
        drop(file);

        Ok(())
    }

    /// Renames the temporary file onto the target path.
    ///
    /// This is the second half of [`SnapshotBackend::replace`]. When syncing
    /// is on, the parent directory is fsynced afterwards; that step failing
    /// only logs a warning because the new snapshot is already in place.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Replace`] if the rename fails, in which case
    /// the target still holds its previous content.
    pub fn promote_temp(&self) -> StorageResult<()> {
        fs::rename(&self.temp_path, &self.path).map_err(|source| StorageError::Replace {
            from: self.temp_path.clone(),
            to: self.path.clone(),
            source,
        })?;

        if self.sync {
            if let Err(err) = self.sync_directory() {
                warn!(
                    dir = ?self.dir,
                    error = %err,
                    "snapshot replaced but directory sync failed"
                );
            }
        }

        Ok(())
    }

    /// Syncs the parent directory so the rename survives power loss.
    ///
    /// On Windows, directory fsync is not supported in the same way as Unix;
    /// NTFS journaling covers metadata durability, so this is a no-op there.
    #[cfg(unix)]
    fn sync_directory(&self) -> io::Result<()> {
        File::open(&self.dir)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> io::Result<()> {
        Ok(())
    }
}

impl SnapshotBackend for FileBackend {
    fn load(&self) -> StorageResult<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(data) => {
                debug!(path = ?self.path, bytes = data.len(), "loaded snapshot");
                Ok(data)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound {
                path: self.path.clone(),
            }),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        self.write_temp(data)?;
        self.promote_temp()?;
        debug!(path = ?self.path, bytes = data.len(), "replaced snapshot");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Returns `<path>.tmp` for a target path.
#[must_use]
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("store.ini"));

        let err = backend.load().unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn replace_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini");
        let mut backend = FileBackend::new(&path);

        backend.replace(b"first").unwrap();
        assert_eq!(backend.load().unwrap(), b"first");

        backend.replace(b"second").unwrap();
        assert_eq!(backend.load().unwrap(), b"second");
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn replace_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("store.ini"));

        backend.replace(b"data").unwrap();
        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn temp_path_appends_suffix() {
        let path = Path::new("/var/lib/app/store.ini");
        assert_eq!(temp_path_for(path), Path::new("/var/lib/app/store.ini.tmp"));
        assert_eq!(
            FileBackend::new(path).temp_path(),
            Path::new("/var/lib/app/store.ini.tmp")
        );
    }

    #[test]
    fn interrupted_replace_keeps_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini");
        let mut backend = FileBackend::new(&path);
        backend.replace(b"committed").unwrap();

        // Stage a new snapshot but never promote it.
        backend.write_temp(b"uncommitted and partial").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"committed");
        assert_eq!(backend.load().unwrap(), b"committed");
        assert_eq!(fs::read(backend.temp_path()).unwrap(), b"uncommitted and partial");
    }

    #[test]
    fn stale_temp_file_is_truncated() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("store.ini"));
        fs::write(backend.temp_path(), b"a much longer stale temporary file").unwrap();

        backend.replace(b"short").unwrap();
        assert_eq!(backend.load().unwrap(), b"short");
    }

    #[test]
    fn temp_write_failure_keeps_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini");
        let mut backend = FileBackend::new(&path);
        backend.replace(b"committed").unwrap();

        // A directory squatting on the temp path makes File::create fail.
        fs::create_dir(backend.temp_path()).unwrap();

        let err = backend.replace(b"new").unwrap_err();
        assert!(matches!(err, StorageError::TempWrite { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"committed");
    }

    #[test]
    fn promote_without_temp_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini");
        let backend = FileBackend::new(&path);

        let err = backend.promote_temp().unwrap_err();
        assert!(matches!(err, StorageError::Replace { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn directory_sync_failure_after_rename_is_not_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.ini");
        let mut backend = FileBackend::new(&path);
        backend.replace(b"old").unwrap();

        // Point the directory fsync at something that cannot be opened.
        backend.dir = dir.path().join("vanished");

        backend.replace(b"new").unwrap();
        assert_eq!(backend.load().unwrap(), b"new");
        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("store.ini");

        let mut backend = FileBackend::with_create_dirs(&path).unwrap();
        backend.replace(b"x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unsynced_replace() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(&dir.path().join("store.ini")).sync(false);

        backend.replace(b"fast").unwrap();
        assert_eq!(backend.load().unwrap(), b"fast");
    }

    #[test]
    fn describe_is_path() {
        let backend = FileBackend::new(Path::new("store.ini"));
        assert_eq!(backend.describe(), "store.ini");
    }
}
