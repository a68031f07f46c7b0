//! Data directory management.
//!
//! This module handles the file system layout for a Campus registry:
//!
//! ```text
//! <data_path>/
//! ├─ LOCK                 # Advisory lock for single-process access
//! ├─ counters.dat         # Id allocator counter table
//! ├─ student.dat          # One snapshot file per record kind
//! ├─ teacher.dat
//! ├─ room.dat
//! ├─ class.dat
//! ├─ schedule.dat
//! └─ academic_record.dat
//! ```
//!
//! The LOCK file ensures only one process can use the directory at a
//! time; no two store instances may share a backing file.

use crate::error::{RegistryError, RegistryResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const COUNTERS_FILE: &str = "counters.dat";

/// Manages the registry's data directory and its advisory lock.
///
/// Only one `RegistryDir` instance can exist per directory at a time;
/// the lock is released when the instance is dropped.
#[derive(Debug)]
pub struct RegistryDir {
    path: PathBuf,
    _lock_file: File,
}

impl RegistryDir {
    /// Opens a data directory, creating it on demand.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DirectoryLocked`] if another process holds
    ///   the lock
    /// - `InvalidState` if the path exists but is not a directory
    /// - I/O errors from directory or lock file creation
    pub fn open(path: &Path) -> RegistryResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(RegistryError::invalid_state(format!(
                "data path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(RegistryError::DirectoryLocked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the data directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the allocator's counter table.
    #[must_use]
    pub fn counters_path(&self) -> PathBuf {
        self.path.join(COUNTERS_FILE)
    }

    /// Returns the snapshot path for a record kind.
    #[must_use]
    pub fn collection_path(&self, kind: &str) -> PathBuf {
        self.path.join(format!("{kind}.dat"))
    }
}
