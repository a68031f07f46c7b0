//! In-memory snapshot backend for testing.

use crate::backend::SnapshotBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;

/// An in-memory snapshot backend.
///
/// This backend keeps the snapshot in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral registries that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use campus_storage::{SnapshotBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// assert!(backend.load().unwrap().is_none());
/// backend.persist(b"test data").unwrap();
/// assert!(backend.load().unwrap().is_some());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    snapshot: RwLock<Option<Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory backend with a pre-existing snapshot.
    ///
    /// Useful for testing load and corruption scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            snapshot: RwLock::new(Some(data)),
        }
    }

    /// Returns a copy of the current snapshot, if any.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.snapshot.read().clone()
    }
}

impl SnapshotBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.snapshot.read().clone())
    }

    fn persist(&mut self, bytes: &[u8]) -> StorageResult<()> {
        *self.snapshot.write() = Some(bytes.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "<in-memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn persist_then_load() {
        let mut backend = InMemoryBackend::new();
        backend.persist(b"hello").unwrap();
        assert_eq!(backend.load().unwrap().as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn persist_replaces() {
        let mut backend = InMemoryBackend::new();
        backend.persist(b"first").unwrap();
        backend.persist(b"second").unwrap();
        assert_eq!(backend.load().unwrap().as_deref(), Some(&b"second"[..]));
    }

    #[test]
    fn with_data_preloads_snapshot() {
        let backend = InMemoryBackend::with_data(b"preloaded".to_vec());
        assert_eq!(backend.load().unwrap().as_deref(), Some(&b"preloaded"[..]));
    }

    #[test]
    fn data_returns_copy() {
        let mut backend = InMemoryBackend::new();
        backend.persist(b"snapshot").unwrap();
        assert_eq!(backend.data().as_deref(), Some(&b"snapshot"[..]));
    }
}
