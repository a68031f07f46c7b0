//! Academic record ledger with upsert-by-natural-key.

use crate::error::RegistryResult;
use crate::models::AcademicRecord;
use campus_core::{EntityStore, IdAllocator, Record, RecordId};
use campus_storage::SnapshotBackend;
use std::sync::Arc;

/// Academic record store keeping at most one record per
/// `(student, class)` pair.
///
/// Callers work with surrogate ids, but the write path reconciles by
/// the natural key: an upsert either creates a record (minting a fresh
/// id) or overwrites the pair's existing record while preserving its
/// id. The whole reconciliation runs under the store's exclusive lock.
pub struct AcademicLedger {
    store: EntityStore<AcademicRecord>,
}

impl AcademicLedger {
    /// Opens the ledger over its backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or is corrupt.
    pub fn open(
        backend: Box<dyn SnapshotBackend>,
        allocator: Arc<IdAllocator>,
    ) -> RegistryResult<Self> {
        Ok(Self {
            store: EntityStore::open(backend, allocator)?,
        })
    }

    /// Creates or overwrites the record for its `(student, class)` pair.
    ///
    /// Resolution order:
    /// 1. A record with the same positive id is replaced in place.
    /// 2. Otherwise a record matching the natural key is overwritten,
    ///    keeping its existing id.
    /// 3. Otherwise a fresh id is minted and the record appended.
    ///
    /// This ordering means a record rebuilt from a prior lookup (which
    /// already carries its id) is never duplicated, while a freshly
    /// constructed record is reconciled against the key before falling
    /// back to creation.
    ///
    /// Returns the stored record, with its definitive id.
    ///
    /// # Errors
    ///
    /// Returns an error if an id cannot be minted or the snapshot
    /// cannot be persisted.
    pub fn add_or_update(&self, record: AcademicRecord) -> RegistryResult<AcademicRecord> {
        let allocator = Arc::clone(self.store.allocator());

        self.store.mutate(move |records| {
            if !record.id.is_unset() {
                if let Some(pos) = records.iter().position(|r| r.id == record.id) {
                    records[pos] = record.clone();
                    return Ok(record);
                }
            }

            if let Some(pos) = records.iter().position(|r| r.same_key(&record)) {
                let mut replacement = record;
                replacement.id = records[pos].id;
                records[pos] = replacement.clone();
                return Ok(replacement);
            }

            // No id match, no key match: this is a creation, and a
            // stale id the caller still holds must not be resurrected.
            let mut fresh = record;
            fresh.id = allocator.next(AcademicRecord::KIND)?;
            records.push(fresh.clone());
            Ok(fresh)
        })
    }

    /// Removes a record. A missing id is a logged no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only if the snapshot cannot be persisted.
    pub fn delete(&self, id: RecordId) -> RegistryResult<bool> {
        Ok(self.store.delete(id)?)
    }

    /// Returns the record with the given id, if present.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<AcademicRecord> {
        self.store.get(id)
    }

    /// Returns the record for a `(student, class)` pair, if present.
    #[must_use]
    pub fn find(&self, student_id: RecordId, class_id: RecordId) -> Option<AcademicRecord> {
        self.store.with_records(|records| {
            records
                .iter()
                .find(|r| r.student_id == student_id && r.class_id == class_id)
                .cloned()
        })
    }

    /// All records of one student, in insertion order.
    #[must_use]
    pub fn for_student(&self, student_id: RecordId) -> Vec<AcademicRecord> {
        self.store.with_records(|records| {
            records
                .iter()
                .filter(|r| r.student_id == student_id)
                .cloned()
                .collect()
        })
    }

    /// All records of one class, in insertion order.
    #[must_use]
    pub fn for_class(&self, class_id: RecordId) -> Vec<AcademicRecord> {
        self.store.with_records(|records| {
            records
                .iter()
                .filter(|r| r.class_id == class_id)
                .cloned()
                .collect()
        })
    }

    /// Returns all records, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<AcademicRecord> {
        self.store.list()
    }
}

impl std::fmt::Debug for AcademicLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcademicLedger")
            .field("len", &self.list().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_storage::InMemoryBackend;

    fn ledger() -> AcademicLedger {
        let alloc = Arc::new(IdAllocator::open(Box::new(InMemoryBackend::new())).unwrap());
        AcademicLedger::open(Box::new(InMemoryBackend::new()), alloc).unwrap()
    }

    fn grade(student: u64, class: u64, score: f64) -> AcademicRecord {
        AcademicRecord::new(RecordId::new(student), RecordId::new(class), "2024-T1", score)
    }

    #[test]
    fn first_upsert_creates_with_fresh_id() {
        let ledger = ledger();
        let stored = ledger.add_or_update(grade(1, 2, 85.0)).unwrap();

        assert!(!stored.id.is_unset());
        assert_eq!(ledger.list().len(), 1);
    }

    #[test]
    fn second_upsert_overwrites_same_pair() {
        let ledger = ledger();
        let first = ledger.add_or_update(grade(1, 2, 85.0)).unwrap();
        let second = ledger.add_or_update(grade(1, 2, 91.5)).unwrap();

        // Same pair: one record, same id, second call's values.
        assert_eq!(second.id, first.id);
        assert_eq!(ledger.list().len(), 1);
        assert_eq!(ledger.find(RecordId::new(1), RecordId::new(2)).unwrap().score, 91.5);
    }

    #[test]
    fn distinct_pairs_get_distinct_records() {
        let ledger = ledger();
        let a = ledger.add_or_update(grade(1, 2, 70.0)).unwrap();
        let b = ledger.add_or_update(grade(1, 3, 80.0)).unwrap();
        let c = ledger.add_or_update(grade(2, 2, 90.0)).unwrap();

        assert_eq!(ledger.list().len(), 3);
        assert!(a.id != b.id && b.id != c.id);
    }

    #[test]
    fn upsert_by_id_replaces_in_place() {
        let ledger = ledger();
        let mut stored = ledger.add_or_update(grade(1, 2, 60.0)).unwrap();

        stored.score = 65.0;
        stored.remark = Some("re-sit".to_string());
        let replaced = ledger.add_or_update(stored.clone()).unwrap();

        assert_eq!(replaced.id, stored.id);
        assert_eq!(ledger.get(stored.id).unwrap().score, 65.0);
        assert_eq!(ledger.list().len(), 1);
    }

    #[test]
    fn record_from_prior_lookup_is_never_duplicated() {
        let ledger = ledger();
        ledger.add_or_update(grade(1, 2, 60.0)).unwrap();

        let mut looked_up = ledger.find(RecordId::new(1), RecordId::new(2)).unwrap();
        looked_up.score = 99.0;
        ledger.add_or_update(looked_up).unwrap();

        assert_eq!(ledger.list().len(), 1);
        assert_eq!(ledger.find(RecordId::new(1), RecordId::new(2)).unwrap().score, 99.0);
    }

    #[test]
    fn stale_id_falls_back_to_key_match() {
        let ledger = ledger();
        let stored = ledger.add_or_update(grade(1, 2, 60.0)).unwrap();
        ledger.delete(stored.id).unwrap();

        let fresh = ledger.add_or_update(grade(1, 2, 70.0)).unwrap();

        // A new record; the deleted surrogate id is never reused.
        assert!(fresh.id > stored.id);
        assert_eq!(ledger.list().len(), 1);
    }

    #[test]
    fn deleted_record_reupserted_gets_a_fresh_id() {
        let ledger = ledger();
        let stored = ledger.add_or_update(grade(1, 2, 60.0)).unwrap();
        ledger.delete(stored.id).unwrap();

        // Neither the stale id nor the key matches anything now; the
        // create arm must mint rather than resurrect the old id.
        let recreated = ledger.add_or_update(stored.clone()).unwrap();
        assert_ne!(recreated.id, stored.id);
        assert!(recreated.id > stored.id);
        assert_eq!(ledger.list().len(), 1);
    }

    #[test]
    fn delete_then_find_is_empty() {
        let ledger = ledger();
        let stored = ledger.add_or_update(grade(1, 2, 60.0)).unwrap();

        assert!(ledger.delete(stored.id).unwrap());
        assert!(ledger.find(RecordId::new(1), RecordId::new(2)).is_none());
        assert!(!ledger.delete(stored.id).unwrap());
    }

    #[test]
    fn per_student_and_per_class_views() {
        let ledger = ledger();
        ledger.add_or_update(grade(1, 2, 70.0)).unwrap();
        ledger.add_or_update(grade(1, 3, 75.0)).unwrap();
        ledger.add_or_update(grade(2, 2, 80.0)).unwrap();

        assert_eq!(ledger.for_student(RecordId::new(1)).len(), 2);
        assert_eq!(ledger.for_class(RecordId::new(2)).len(), 2);
        assert!(ledger.for_student(RecordId::new(9)).is_empty());
    }
}
