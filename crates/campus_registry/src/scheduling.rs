//! Conflict-checked schedule store.

use crate::error::{ConflictResource, RegistryError, RegistryResult};
use crate::models::Schedule;
use campus_core::{CoreError, EntityStore, IdAllocator, Record, RecordId};
use campus_storage::SnapshotBackend;
use chrono::NaiveDate;
use std::sync::Arc;

/// Schedule store that never admits a teacher or room double-booking.
///
/// Add and update are guarded write paths: the conflict search runs
/// against the current collection inside the store's exclusive lock, so
/// the check and the write are atomic with respect to every other
/// mutation of this store. A rejected write leaves the store unchanged.
///
/// Conflict policy: among persisted schedules with a different id, the
/// same date, and an overlapping half-open time range, a shared teacher
/// rejects first, then a shared room. Exact boundary touching is not a
/// conflict - back-to-back sessions are legal.
pub struct ScheduleStore {
    store: EntityStore<Schedule>,
}

impl ScheduleStore {
    /// Opens the schedule store over its backend.
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

    /// Admits a new schedule if it conflicts with nothing.
    ///
    /// The schedule is stored under a freshly minted id; any id it
    /// arrives with is discarded, so a previously stored schedule fed
    /// back into `add` is checked against its persisted original like
    /// any other candidate.
    ///
    /// Returns the stored schedule with its assigned id.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidTimeRange`] if `start >= end`
    /// - [`RegistryError::ScheduleConflict`] if the teacher or room is
    ///   already booked in an overlapping range on that date
    /// - storage errors if the snapshot cannot be persisted
    pub fn add(&self, schedule: Schedule) -> RegistryResult<Schedule> {
        validate_time_range(&schedule)?;

        let mut schedule = schedule;
        schedule.id = self.store.allocator().next(Schedule::KIND)?;

        let stored = schedule.clone();
        self.store.mutate(move |records| {
            check_conflicts(records, &schedule)?;
            records.push(schedule);
            Ok::<_, RegistryError>(())
        })?;
        Ok(stored)
    }

    /// Replaces an existing schedule if the new times conflict with
    /// nothing (the schedule's own persisted slot is not a conflict).
    ///
    /// # Errors
    ///
    /// As for [`add`](Self::add), plus `NotFound` if no schedule has the
    /// given id.
    pub fn update(&self, schedule: Schedule) -> RegistryResult<()> {
        validate_time_range(&schedule)?;

        self.store.mutate(move |records| {
            let pos = records
                .iter()
                .position(|r| r.id == schedule.id)
                .ok_or_else(|| CoreError::not_found(Schedule::KIND, schedule.id))?;
            check_conflicts(records, &schedule)?;
            records[pos] = schedule;
            Ok::<_, RegistryError>(())
        })
    }

    /// Removes a schedule. A missing id is a logged no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only if the snapshot cannot be persisted.
    pub fn delete(&self, id: RecordId) -> RegistryResult<bool> {
        Ok(self.store.delete(id)?)
    }

    /// Returns the schedule with the given id, if present.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<Schedule> {
        self.store.get(id)
    }

    /// Returns all schedules, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Schedule> {
        self.store.list()
    }

    /// A teacher's sessions on one date, in insertion order.
    #[must_use]
    pub fn for_teacher_on(&self, teacher_id: RecordId, date: NaiveDate) -> Vec<Schedule> {
        self.store.with_records(|records| {
            records
                .iter()
                .filter(|s| s.teacher_id == teacher_id && s.date == date)
                .cloned()
                .collect()
        })
    }

    /// A room's sessions on one date, in insertion order.
    #[must_use]
    pub fn for_room_on(&self, room_id: RecordId, date: NaiveDate) -> Vec<Schedule> {
        self.store.with_records(|records| {
            records
                .iter()
                .filter(|s| s.room_id == room_id && s.date == date)
                .cloned()
                .collect()
        })
    }

    /// All sessions of one class, in insertion order.
    #[must_use]
    pub fn for_class(&self, class_id: RecordId) -> Vec<Schedule> {
        self.store.with_records(|records| {
            records
                .iter()
                .filter(|s| s.class_id == class_id)
                .cloned()
                .collect()
        })
    }
}

impl std::fmt::Debug for ScheduleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleStore")
            .field("len", &self.store.len())
            .finish_non_exhaustive()
    }
}

fn validate_time_range(schedule: &Schedule) -> RegistryResult<()> {
    if schedule.start >= schedule.end {
        return Err(RegistryError::InvalidTimeRange {
            start: schedule.start,
            end: schedule.end,
        });
    }
    Ok(())
}

/// Searches the collection for a booking that clashes with `candidate`.
///
/// Teacher conflicts take priority over room conflicts.
fn check_conflicts(records: &[Schedule], candidate: &Schedule) -> RegistryResult<()> {
    let overlapping = records
        .iter()
        .filter(|r| r.id != candidate.id && r.overlaps(candidate));

    let mut room_hit: Option<&Schedule> = None;
    for existing in overlapping {
        if existing.teacher_id == candidate.teacher_id {
            return Err(conflict(ConflictResource::Teacher, candidate.teacher_id, existing));
        }
        if room_hit.is_none() && existing.room_id == candidate.room_id {
            room_hit = Some(existing);
        }
    }

    if let Some(existing) = room_hit {
        return Err(conflict(ConflictResource::Room, candidate.room_id, existing));
    }
    Ok(())
}

fn conflict(
    resource: ConflictResource,
    resource_id: RecordId,
    existing: &Schedule,
) -> RegistryError {
    RegistryError::ScheduleConflict {
        resource,
        resource_id,
        conflicting_id: existing.id,
        date: existing.date,
        start: existing.start,
        end: existing.end,
    }
}
