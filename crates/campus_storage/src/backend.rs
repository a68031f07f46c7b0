//! Snapshot backend trait definition.

use crate::error::StorageResult;

/// A whole-snapshot storage backend for Campus.
///
/// Snapshot backends are **opaque blob stores**. They hold exactly one
/// snapshot and replace it wholesale on every write. Campus owns all
/// format interpretation - backends do not understand records, counters,
/// or collections.
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the last successful `persist`
/// - After `persist` returns successfully, the snapshot is durable
/// - A backend that has never been persisted to loads as `None`
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait SnapshotBackend: Send + Sync {
    /// Loads the current snapshot in full.
    ///
    /// Returns `None` if no snapshot has ever been persisted (a missing
    /// or empty backing file).
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs while reading.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the snapshot with `bytes`, atomically and durably.
    ///
    /// After this returns successfully, a subsequent `load` (including
    /// one after process restart, for persistent backends) returns
    /// exactly `bytes`. A failure leaves the previous snapshot intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be durably written.
    fn persist(&mut self, bytes: &[u8]) -> StorageResult<()>;

    /// Describes the backing location, for diagnostics.
    fn describe(&self) -> String;
}
