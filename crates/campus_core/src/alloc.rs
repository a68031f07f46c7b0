//! Monotonic id allocation.

use crate::codec;
use crate::error::CoreResult;
use crate::id::RecordId;
use campus_storage::SnapshotBackend;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::warn;

/// Pseudo-kind under which the counter table itself is persisted.
const COUNTERS_KIND: &str = "id_counters";

struct Inner {
    counters: BTreeMap<String, u64>,
    backend: Box<dyn SnapshotBackend>,
}

/// Process-wide monotonic id counters, one per record kind.
///
/// The allocator owns its own backing file, independent of any entity
/// store, so ids stay unique across delete/re-add cycles. One allocator
/// instance is shared by every store of a data directory; all access
/// goes through a single lock.
///
/// # Durability
///
/// `next` persists the entire counter table *before* returning the
/// issued id. If the table cannot be durably written, the id is not
/// considered issued: the in-memory counter is rolled back and the
/// error surfaces to the caller. This guarantees no id is handed out
/// twice even if the process crashes immediately after a call.
///
/// # Example
///
/// ```rust
/// use campus_core::IdAllocator;
/// use campus_storage::InMemoryBackend;
///
/// let alloc = IdAllocator::open(Box::new(InMemoryBackend::new())).unwrap();
/// assert_eq!(alloc.next("student").unwrap().get(), 1);
/// assert_eq!(alloc.next("student").unwrap().get(), 2);
/// assert_eq!(alloc.next("room").unwrap().get(), 1);
/// ```
pub struct IdAllocator {
    inner: Mutex<Inner>,
}

impl IdAllocator {
    /// Opens an allocator over its backing snapshot.
    ///
    /// A missing snapshot starts all counters at their default of 1. An
    /// undecodable table is tolerated the same way (logged), rather than
    /// failing a fresh or partially damaged installation. Entries that
    /// are not positive are normalized to 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing snapshot cannot be read.
    pub fn open(backend: Box<dyn SnapshotBackend>) -> CoreResult<Self> {
        let counters = match backend.load()? {
            Some(bytes) => match codec::from_cbor::<BTreeMap<String, i64>>(COUNTERS_KIND, &bytes) {
                Ok(raw) => raw
                    .into_iter()
                    .map(|(kind, value)| (kind, if value < 1 { 1 } else { value as u64 }))
                    .collect(),
                Err(err) => {
                    warn!(
                        backend = %backend.describe(),
                        %err,
                        "counter table unreadable, starting from defaults"
                    );
                    BTreeMap::new()
                }
            },
            None => BTreeMap::new(),
        };

        Ok(Self {
            inner: Mutex::new(Inner { counters, backend }),
        })
    }

    /// Issues the next id for `kind`.
    ///
    /// Counters start at 1 for kinds never seen before. The whole table
    /// is persisted synchronously before the id is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter table cannot be persisted; the
    /// id is then not considered issued.
    pub fn next(&self, kind: &str) -> CoreResult<RecordId> {
        let mut inner = self.inner.lock();

        let current = inner.counters.get(kind).copied().unwrap_or(1);
        inner.counters.insert(kind.to_string(), current + 1);

        let bytes = codec::to_cbor(COUNTERS_KIND, &inner.counters)?;
        if let Err(err) = inner.backend.persist(&bytes) {
            // Not durably recorded, so not issued.
            inner.counters.insert(kind.to_string(), current);
            return Err(err.into());
        }

        Ok(RecordId::new(current))
    }

    /// Returns the id `next(kind)` would issue, without issuing it.
    ///
    /// Diagnostic helper; never persists.
    #[must_use]
    pub fn peek(&self, kind: &str) -> u64 {
        self.inner.lock().counters.get(kind).copied().unwrap_or(1)
    }
}

impl std::fmt::Debug for IdAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("IdAllocator")
            .field("kinds", &inner.counters.len())
            .finish_non_exhaustive()
    }
}
