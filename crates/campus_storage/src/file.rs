//! File-based snapshot backend for persistent storage.

use crate::backend::SnapshotBackend;
use crate::error::StorageResult;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// A file-based snapshot backend.
///
/// This backend keeps one snapshot per file. Data survives process
/// restarts.
///
/// # Durability
///
/// `persist` uses the write-then-rename pattern:
/// 1. Write to a temporary file next to the target
/// 2. Sync the temporary file to disk
/// 3. Rename it over the target
/// 4. Fsync the parent directory so the rename is durable
///
/// A crash mid-persist therefore leaves either the old snapshot or the
/// new one, never a torn file.
///
/// # Example
///
/// ```no_run
/// use campus_storage::{SnapshotBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("students.dat")).unwrap();
/// backend.persist(b"snapshot bytes").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Opens a file backend at the given path.
    ///
    /// If the file doesn't exist, an empty placeholder is created so
    /// the store's backing file is visible on disk from the start.
    ///
    /// # Errors
    ///
    /// Returns an error if the placeholder cannot be created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        // Touch an empty placeholder so a fresh store has a file.
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Syncs the parent directory so renames are durable.
    #[cfg(unix)]
    fn sync_parent(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if parent.as_os_str().is_empty() {
                return Ok(());
            }
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> StorageResult<()> {
        // NTFS journaling covers metadata durability; directory fsync
        // is not supported on Windows.
        Ok(())
    }
}

impl SnapshotBackend for FileBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&self.path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        if data.is_empty() {
            // The placeholder created on first open.
            return Ok(None);
        }

        Ok(Some(data))
    }

    fn persist(&mut self, bytes: &[u8]) -> StorageResult<()> {
        let temp = self.temp_path();

        let mut file = File::create(&temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp, &self.path)?;
        self.sync_parent()?;

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
