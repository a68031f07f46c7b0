//! Capacity-bounded class roster store.

use crate::error::{RegistryError, RegistryResult};
use crate::models::EduClass;
use campus_core::{CoreError, EntityStore, IdAllocator, Record, RecordId};
use campus_storage::SnapshotBackend;
use std::sync::Arc;
use tracing::debug;

/// Class store that keeps every roster within its declared capacity.
///
/// Membership changes run inside the store's exclusive lock, so the
/// capacity check and the write are atomic. Re-adding an enrolled
/// student and removing a non-member are logged no-ops, not errors.
pub struct RosterStore {
    store: EntityStore<EduClass>,
}

impl RosterStore {
    /// Opens the roster store over its backend.
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

    /// Persists a new class, minting its id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the class arrives with a roster that
    /// already breaks its invariants (duplicates or over capacity).
    pub fn create(&self, class: EduClass) -> RegistryResult<EduClass> {
        if class.member_count() > class.capacity {
            return Err(RegistryError::invalid_state(format!(
                "class '{}' starts with {} members but capacity {}",
                class.name,
                class.member_count(),
                class.capacity
            )));
        }
        if has_duplicate_members(&class) {
            return Err(RegistryError::invalid_state(format!(
                "class '{}' starts with duplicate members",
                class.name
            )));
        }

        Ok(self.store.add(class)?)
    }

    /// Enrolls one student.
    ///
    /// Re-enrolling an existing member is a logged no-op; returns
    /// whether the roster changed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the class doesn't exist
    /// - [`RegistryError::CapacityExceeded`] if the roster is full
    /// - storage errors if the snapshot cannot be persisted
    pub fn add_member(&self, class_id: RecordId, student_id: RecordId) -> RegistryResult<bool> {
        let changed = self.store.mutate_opt(|records| {
            let class = find_class_mut(records, class_id)?;

            if class.is_full() {
                return Err(RegistryError::CapacityExceeded {
                    class_id,
                    capacity: class.capacity,
                });
            }
            if class.is_member(student_id) {
                debug!(%class_id, %student_id, "student already enrolled, ignoring");
                return Ok(None);
            }

            class.members.push(student_id);
            Ok(Some(()))
        })?;
        Ok(changed.is_some())
    }

    /// Enrolls a batch of students, in input order, while spots remain.
    ///
    /// Already-enrolled ids, duplicates within the batch, and unset ids
    /// are skipped. Returns the number of students actually enrolled;
    /// the capacity bound is never exceeded.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the class doesn't exist, or storage errors
    /// if the snapshot cannot be persisted.
    pub fn add_members(
        &self,
        class_id: RecordId,
        student_ids: &[RecordId],
    ) -> RegistryResult<usize> {
        let added = self.store.mutate_opt::<_, RegistryError>(|records| {
            let class = find_class_mut(records, class_id)?;

            let mut available = class.available_spots() as usize;
            let mut added = 0usize;
            for &student_id in student_ids {
                if student_id.is_unset() {
                    debug!(%class_id, "skipping unset student id in batch");
                    continue;
                }
                if class.is_member(student_id) {
                    debug!(%class_id, %student_id, "already enrolled, skipping");
                    continue;
                }
                if available == 0 {
                    debug!(%class_id, %student_id, "class full, remaining batch not enrolled");
                    break;
                }
                class.members.push(student_id);
                available -= 1;
                added += 1;
            }

            if added == 0 {
                return Ok(None);
            }
            Ok(Some(added))
        })?;
        Ok(added.unwrap_or(0))
    }

    /// Removes one student from the roster.
    ///
    /// Removing a non-member is a logged no-op; returns whether the
    /// roster changed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the class doesn't exist, or storage errors
    /// if the snapshot cannot be persisted.
    pub fn remove_member(&self, class_id: RecordId, student_id: RecordId) -> RegistryResult<bool> {
        let changed = self.store.mutate_opt::<_, RegistryError>(|records| {
            let class = find_class_mut(records, class_id)?;

            if !class.is_member(student_id) {
                debug!(%class_id, %student_id, "student not enrolled, ignoring removal");
                return Ok(None);
            }

            class.members.retain(|&m| m != student_id);
            Ok(Some(()))
        })?;
        Ok(changed.is_some())
    }

    /// Removes a batch of students; non-members are skipped.
    ///
    /// Returns the number actually removed; persists only when at least
    /// one removal occurred.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the class doesn't exist, or storage errors
    /// if the snapshot cannot be persisted.
    pub fn remove_members(
        &self,
        class_id: RecordId,
        student_ids: &[RecordId],
    ) -> RegistryResult<usize> {
        let removed = self.store.mutate_opt::<_, RegistryError>(|records| {
            let class = find_class_mut(records, class_id)?;

            let before = class.members.len();
            class.members.retain(|m| !student_ids.contains(m));
            let removed = before - class.members.len();

            if removed == 0 {
                debug!(%class_id, "no listed student enrolled, ignoring removal");
                return Ok(None);
            }
            Ok(Some(removed))
        })?;
        Ok(removed.unwrap_or(0))
    }

    /// Changes a class's capacity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if `new_capacity` is below the current
    /// membership, or `NotFound` if the class doesn't exist.
    pub fn update_capacity(&self, class_id: RecordId, new_capacity: u32) -> RegistryResult<()> {
        self.store.mutate(|records| {
            let class = find_class_mut(records, class_id)?;

            if new_capacity < class.member_count() {
                return Err(RegistryError::invalid_state(format!(
                    "cannot shrink class {} to capacity {}: {} students enrolled",
                    class_id,
                    new_capacity,
                    class.member_count()
                )));
            }

            class.capacity = new_capacity;
            Ok(())
        })
    }

    /// Deletes a class. A missing id is a logged no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` while the class still has members.
    pub fn delete(&self, class_id: RecordId) -> RegistryResult<bool> {
        let removed = self.store.mutate_opt(|records| {
            let Some(pos) = records.iter().position(|c| c.id == class_id) else {
                debug!(%class_id, "delete of missing class, ignoring");
                return Ok::<_, RegistryError>(None);
            };

            let count = records[pos].member_count();
            if count > 0 {
                return Err(RegistryError::invalid_state(format!(
                    "cannot delete class {class_id}: {count} students enrolled"
                )));
            }

            records.remove(pos);
            Ok(Some(()))
        })?;
        Ok(removed.is_some())
    }

    /// Replaces a class record wholesale (rename, course change).
    ///
    /// Roster and capacity invariants still apply.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no class has the record's id, or
    /// `InvalidState` if the replacement breaks the roster invariants.
    pub fn update(&self, class: EduClass) -> RegistryResult<()> {
        if class.member_count() > class.capacity {
            return Err(RegistryError::invalid_state(format!(
                "class {} would hold {} members over capacity {}",
                class.id,
                class.member_count(),
                class.capacity
            )));
        }
        if has_duplicate_members(&class) {
            return Err(RegistryError::invalid_state(format!(
                "class {} would hold duplicate members",
                class.id
            )));
        }
        Ok(self.store.update(class)?)
    }

    /// Returns the class with the given id, if present.
    #[must_use]
    pub fn get(&self, class_id: RecordId) -> Option<EduClass> {
        self.store.get(class_id)
    }

    /// Returns all classes, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<EduClass> {
        self.store.list()
    }
}

impl std::fmt::Debug for RosterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterStore")
            .field("len", &self.store.list().len())
            .finish_non_exhaustive()
    }
}

fn has_duplicate_members(class: &EduClass) -> bool {
    let mut unique = class.members.clone();
    unique.sort_unstable();
    unique.dedup();
    unique.len() != class.members.len()
}

fn find_class_mut(
    records: &mut [EduClass],
    class_id: RecordId,
) -> Result<&mut EduClass, RegistryError> {
    records
        .iter_mut()
        .find(|c| c.id == class_id)
        .ok_or_else(|| CoreError::not_found(EduClass::KIND, class_id).into())
}
