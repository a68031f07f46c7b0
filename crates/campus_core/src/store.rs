//! Generic persistent entity store.

use crate::alloc::IdAllocator;
use crate::codec;
use crate::error::{CoreError, CoreResult};
use crate::id::RecordId;
use crate::record::Record;
use campus_storage::SnapshotBackend;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

struct Inner<T> {
    records: Vec<T>,
    backend: Box<dyn SnapshotBackend>,
}

/// A durable, thread-safe collection of records of one kind.
///
/// The store keeps the whole collection in memory and writes it back to
/// its backend on every mutation (snapshot-on-write). One reader/writer
/// lock guards the collection: reads may run concurrently, while each
/// mutation holds the exclusive lock for its full read-modify-persist
/// sequence.
///
/// # Rollback on failed persist
///
/// Mutations are applied to a working copy and swapped into place only
/// after the snapshot is durably written. A failed persist therefore
/// leaves the in-memory collection and the on-disk snapshot identical
/// (both unchanged) and surfaces the storage error to the caller.
///
/// # Id assignment
///
/// The store holds the data directory's shared [`IdAllocator`]. Every
/// record admitted through [`add`](Self::add) gets a fresh allocator id
/// for `T::KIND`; any id the record arrives with is discarded. Ids are
/// only ever issued by the allocator, so re-adding a previously stored
/// record creates a second record under a new id rather than a
/// duplicate of the old one.
pub struct EntityStore<T: Record> {
    inner: RwLock<Inner<T>>,
    allocator: Arc<IdAllocator>,
}

impl<T: Record> EntityStore<T> {
    /// Opens a store, reading the whole snapshot into memory.
    ///
    /// A missing snapshot is an empty collection; the file backend has
    /// already created a placeholder file for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read, or decodes to
    /// garbage (`Corrupted` - fatal, since continuing with partial data
    /// could hide existing records).
    pub fn open(backend: Box<dyn SnapshotBackend>, allocator: Arc<IdAllocator>) -> CoreResult<Self> {
        let records = match backend.load()? {
            Some(bytes) => codec::from_cbor::<Vec<T>>(T::KIND, &bytes)?,
            None => Vec::new(),
        };

        Ok(Self {
            inner: RwLock::new(Inner { records, backend }),
            allocator,
        })
    }

    /// Returns the kind name this store persists.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        T::KIND
    }

    /// Returns the shared id allocator.
    #[must_use]
    pub fn allocator(&self) -> &Arc<IdAllocator> {
        &self.allocator
    }

    /// Returns a defensive copy of all records, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<T> {
        self.inner.read().records.clone()
    }

    /// Returns a copy of the record with the given id, if present.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<T> {
        self.inner
            .read()
            .records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Runs a read-only query against the current collection.
    ///
    /// Holds the shared lock for the duration of `f`, so compound reads
    /// observe one consistent snapshot.
    pub fn with_records<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.read().records)
    }

    /// Appends a record under a freshly minted id, and persists.
    ///
    /// Any id the record arrives with is replaced; the collection never
    /// holds two records with the same id.
    ///
    /// Returns the stored record, with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if an id cannot be minted or the snapshot cannot
    /// be persisted. The collection is unchanged on error.
    pub fn add(&self, mut record: T) -> CoreResult<T> {
        record.set_id(self.allocator.next(T::KIND)?);

        let stored = record.clone();
        self.mutate::<_, CoreError>(move |records| {
            records.push(record);
            Ok(())
        })?;
        Ok(stored)
    }

    /// Replaces the record with a matching id, and persists.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has the given id, or a storage
    /// error if the snapshot cannot be persisted.
    pub fn update(&self, record: T) -> CoreResult<()> {
        self.mutate(move |records| {
            let pos = records
                .iter()
                .position(|r| r.id() == record.id())
                .ok_or_else(|| CoreError::not_found(T::KIND, record.id()))?;
            records[pos] = record;
            Ok(())
        })
    }

    /// Removes the record with the given id, if present.
    ///
    /// Returns whether a record was removed. A missing id is a logged
    /// no-op, not an error, and nothing is persisted for it.
    ///
    /// # Errors
    ///
    /// Returns an error only if a removal happened but the snapshot
    /// could not be persisted (the removal is then rolled back).
    pub fn delete(&self, id: RecordId) -> CoreResult<bool> {
        let removed = self.mutate_opt::<_, CoreError>(|records| {
            match records.iter().position(|r| r.id() == id) {
                Some(pos) => {
                    records.remove(pos);
                    Ok(Some(()))
                }
                None => {
                    debug!(kind = T::KIND, %id, "delete of missing record, ignoring");
                    Ok(None)
                }
            }
        })?;
        Ok(removed.is_some())
    }

    /// Runs a guarded mutation and persists the result.
    ///
    /// The closure receives the collection under the exclusive lock, so
    /// validation it performs (conflict checks, capacity checks) is
    /// atomic with the write. If the closure errors, nothing changes; if
    /// persisting fails, the in-memory change is rolled back and the
    /// storage error escalates.
    ///
    /// Generic over the caller's error type so layered stores can reject
    /// a write with their own domain errors; core failures convert via
    /// `From<CoreError>`.
    pub fn mutate<R, E>(&self, f: impl FnOnce(&mut Vec<T>) -> Result<R, E>) -> Result<R, E>
    where
        E: From<CoreError>,
    {
        let mut inner = self.inner.write();

        let mut working = inner.records.clone();
        let result = f(&mut working)?;

        let bytes = codec::to_cbor(T::KIND, &working)?;
        inner.backend.persist(&bytes).map_err(CoreError::from)?;
        inner.records = working;

        Ok(result)
    }

    /// Like [`mutate`](Self::mutate), but the closure may decline to
    /// change anything by returning `Ok(None)`; the snapshot is only
    /// rewritten when it returns `Ok(Some(..))`.
    pub fn mutate_opt<R, E>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<Option<R>, E>,
    ) -> Result<Option<R>, E>
    where
        E: From<CoreError>,
    {
        let mut inner = self.inner.write();

        let mut working = inner.records.clone();
        let result = match f(&mut working)? {
            Some(value) => value,
            None => return Ok(None),
        };

        let bytes = codec::to_cbor(T::KIND, &working)?;
        inner.backend.persist(&bytes).map_err(CoreError::from)?;
        inner.records = working;

        Ok(Some(result))
    }
}

impl<T: Record> std::fmt::Debug for EntityStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &T::KIND)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_storage::{FileBackend, InMemoryBackend, StorageError, StorageResult};
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: RecordId,
        title: String,
    }

    impl Record for Note {
        const KIND: &'static str = "note";

        fn id(&self) -> RecordId {
            self.id
        }

        fn set_id(&mut self, id: RecordId) {
            self.id = id;
        }
    }

    fn note(title: &str) -> Note {
        Note {
            id: RecordId::UNSET,
            title: title.to_string(),
        }
    }

    fn memory_store() -> EntityStore<Note> {
        let alloc = Arc::new(IdAllocator::open(Box::new(InMemoryBackend::new())).unwrap());
        EntityStore::open(Box::new(InMemoryBackend::new()), alloc).unwrap()
    }

    /// Backend that accepts a fixed number of persists, then fails.
    struct FlakyBackend {
        remaining: std::sync::atomic::AtomicU32,
    }

    impl FlakyBackend {
        fn failing_after(n: u32) -> Self {
            Self {
                remaining: std::sync::atomic::AtomicU32::new(n),
            }
        }
    }

    impl SnapshotBackend for FlakyBackend {
        fn load(&self) -> StorageResult<Option<Vec<u8>>> {
            Ok(None)
        }

        fn persist(&mut self, _bytes: &[u8]) -> StorageResult<()> {
            use std::sync::atomic::Ordering;
            if self.remaining.load(Ordering::SeqCst) == 0 {
                return Err(StorageError::Io(std::io::Error::other("write failed")));
            }
            self.remaining.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }

        fn describe(&self) -> String {
            "<flaky>".to_string()
        }
    }

    #[test]
    fn add_mints_sequential_ids() {
        let store = memory_store();

        let a = store.add(note("alpha")).unwrap();
        let b = store.add(note("beta")).unwrap();

        assert_eq!(a.id, RecordId::new(1));
        assert_eq!(b.id, RecordId::new(2));
    }

    #[test]
    fn readding_a_stored_record_mints_a_new_id() {
        let store = memory_store();
        let stored = store.add(note("original")).unwrap();

        // The stored record carries a positive id; adding it again must
        // not duplicate that id.
        let again = store.add(stored.clone()).unwrap();
        assert_ne!(again.id, stored.id);

        let ids: Vec<RecordId> = store.list().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![RecordId::new(1), RecordId::new(2)]);
    }

    #[test]
    fn add_discards_hand_built_ids() {
        let store = memory_store();

        let forged = Note {
            id: RecordId::new(17),
            title: "imported".into(),
        };
        let stored = store.add(forged).unwrap();
        assert_eq!(stored.id, RecordId::new(1));
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = memory_store();
        for title in ["a", "b", "c"] {
            store.add(note(title)).unwrap();
        }

        let titles: Vec<String> = store.list().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn list_returns_defensive_copy() {
        let store = memory_store();
        store.add(note("original")).unwrap();

        let mut copy = store.list();
        copy[0].title = "mutated".into();

        assert_eq!(store.list()[0].title, "original");
    }

    #[test]
    fn get_by_id() {
        let store = memory_store();
        let stored = store.add(note("target")).unwrap();

        assert_eq!(store.get(stored.id).unwrap().title, "target");
        assert!(store.get(RecordId::new(999)).is_none());
    }

    #[test]
    fn update_replaces_in_place() {
        let store = memory_store();
        let mut stored = store.add(note("before")).unwrap();

        stored.title = "after".into();
        store.update(stored.clone()).unwrap();

        assert_eq!(store.get(stored.id).unwrap().title, "after");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = memory_store();

        let ghost = Note {
            id: RecordId::new(42),
            title: "ghost".into(),
        };
        let err = store.update(ghost).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn delete_removes_and_reports() {
        let store = memory_store();
        let stored = store.add(note("doomed")).unwrap();

        assert!(store.delete(stored.id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn delete_missing_is_silent_no_op() {
        let store = memory_store();
        store.add(note("keeper")).unwrap();

        assert!(!store.delete(RecordId::new(999)).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_missing_never_touches_backend() {
        // One persist budget: consumed by add. A no-op delete must not
        // attempt a second persist (which would error here).
        let alloc = Arc::new(IdAllocator::open(Box::new(InMemoryBackend::new())).unwrap());
        let store: EntityStore<Note> =
            EntityStore::open(Box::new(FlakyBackend::failing_after(1)), alloc).unwrap();

        store.add(note("only")).unwrap();
        assert!(!store.delete(RecordId::new(999)).unwrap());
    }

    #[test]
    fn failed_persist_rolls_back_memory() {
        let alloc = Arc::new(IdAllocator::open(Box::new(InMemoryBackend::new())).unwrap());
        let store: EntityStore<Note> =
            EntityStore::open(Box::new(FlakyBackend::failing_after(1)), alloc).unwrap();

        store.add(note("survivor")).unwrap();
        assert!(store.add(note("lost")).is_err());

        let titles: Vec<String> = store.list().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["survivor"]);
    }

    #[test]
    fn ids_not_reused_after_delete() {
        let store = memory_store();

        let first = store.add(note("one")).unwrap();
        store.delete(first.id).unwrap();

        let second = store.add(note("two")).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn reopen_yields_identical_collection() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("notes.dat");
        let counters = dir.path().join("counters.dat");

        let before = {
            let alloc = Arc::new(
                IdAllocator::open(Box::new(FileBackend::open(&counters).unwrap())).unwrap(),
            );
            let store: EntityStore<Note> =
                EntityStore::open(Box::new(FileBackend::open(&data).unwrap()), alloc).unwrap();
            store.add(note("first")).unwrap();
            store.add(note("second")).unwrap();
            store.delete(RecordId::new(1)).unwrap();
            store.list()
        };

        let alloc =
            Arc::new(IdAllocator::open(Box::new(FileBackend::open(&counters).unwrap())).unwrap());
        let store: EntityStore<Note> =
            EntityStore::open(Box::new(FileBackend::open(&data).unwrap()), alloc).unwrap();
        assert_eq!(store.list(), before);
    }

    #[test]
    fn corrupt_snapshot_fails_open() {
        let alloc = Arc::new(IdAllocator::open(Box::new(InMemoryBackend::new())).unwrap());
        let backend = InMemoryBackend::with_data(b"\x9f\x9f garbage".to_vec());

        let result: CoreResult<EntityStore<Note>> = EntityStore::open(Box::new(backend), alloc);
        assert!(matches!(result, Err(CoreError::Corrupted { .. })));
    }

    #[test]
    fn mutate_is_atomic_check_then_act() {
        let store = memory_store();
        store.add(note("unique")).unwrap();

        // A guard composed inside mutate sees the current records.
        let result = store.mutate(|records| {
            if records.iter().any(|n| n.title == "unique") {
                return Err(CoreError::not_found(Note::KIND, RecordId::UNSET));
            }
            records.push(note("duplicate"));
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(store.len(), 1);
    }

    proptest! {
        /// Snapshot durability law: after any sequence of adds, reloading
        /// the store from its backing file yields the in-memory state.
        #[test]
        fn snapshot_round_trip_law(titles in proptest::collection::vec("[a-z]{1,12}", 1..20)) {
            let dir = tempdir().unwrap();
            let data = dir.path().join("notes.dat");
            let counters = dir.path().join("counters.dat");

            let before = {
                let alloc = Arc::new(
                    IdAllocator::open(Box::new(FileBackend::open(&counters).unwrap())).unwrap(),
                );
                let store: EntityStore<Note> =
                    EntityStore::open(Box::new(FileBackend::open(&data).unwrap()), alloc).unwrap();
                for title in &titles {
                    store.add(note(title)).unwrap();
                }
                store.list()
            };

            let alloc = Arc::new(
                IdAllocator::open(Box::new(FileBackend::open(&counters).unwrap())).unwrap(),
            );
            let store: EntityStore<Note> =
                EntityStore::open(Box::new(FileBackend::open(&data).unwrap()), alloc).unwrap();
            prop_assert_eq!(store.list(), before);
        }
    }
}
