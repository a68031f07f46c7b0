//! Registry facade.

use crate::dir::RegistryDir;
use crate::error::RegistryResult;
use crate::ledger::AcademicLedger;
use crate::models::{Room, Student, Teacher};
use crate::roster::RosterStore;
use crate::scheduling::ScheduleStore;
use campus_core::{EntityStore, IdAllocator, Record};
use campus_storage::{FileBackend, InMemoryBackend, SnapshotBackend};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The main handle over one school's data directory.
///
/// A `Registry` owns one snapshot file per record kind, one shared
/// [`IdAllocator`] over the counter table, and the directory's advisory
/// lock. Plain kinds (students, teachers, rooms) are served by the
/// generic [`EntityStore`]; schedules, rosters, and academic records go
/// through their guarded stores.
///
/// # Opening a Registry
///
/// ```rust,ignore
/// use campus_registry::Registry;
/// use std::path::Path;
///
/// let registry = Registry::open(Path::new("school_data"))?;
/// let alice = registry.students().add(Student::new("Alice", "S-001"))?;
/// ```
///
/// # In-Memory Registries
///
/// For tests, use [`Registry::open_in_memory`].
pub struct Registry {
    /// Holds the directory lock for on-disk registries.
    _dir: Option<RegistryDir>,
    allocator: Arc<IdAllocator>,
    students: EntityStore<Student>,
    teachers: EntityStore<Teacher>,
    rooms: EntityStore<Room>,
    schedules: ScheduleStore,
    roster: RosterStore,
    ledger: AcademicLedger,
}

impl Registry {
    /// Opens a registry over a data directory, creating it on demand.
    ///
    /// Every store reads its whole snapshot during open; a store whose
    /// snapshot is unreadable or corrupt aborts the open, since running
    /// against an accidentally-empty store would silently lose data.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory lock is held elsewhere, or if
    /// any snapshot fails to load.
    pub fn open(path: &Path) -> RegistryResult<Self> {
        let dir = RegistryDir::open(path)?;

        let counters =
            FileBackend::open(&dir.counters_path()).map_err(campus_core::CoreError::from)?;
        let allocator = Arc::new(IdAllocator::open(Box::new(counters))?);

        let students = EntityStore::open(
            file_backend(&dir, Student::KIND)?,
            Arc::clone(&allocator),
        )?;
        let teachers = EntityStore::open(
            file_backend(&dir, Teacher::KIND)?,
            Arc::clone(&allocator),
        )?;
        let rooms = EntityStore::open(file_backend(&dir, Room::KIND)?, Arc::clone(&allocator))?;
        let schedules = ScheduleStore::open(
            file_backend(&dir, crate::models::Schedule::KIND)?,
            Arc::clone(&allocator),
        )?;
        let roster = RosterStore::open(
            file_backend(&dir, crate::models::EduClass::KIND)?,
            Arc::clone(&allocator),
        )?;
        let ledger = AcademicLedger::open(
            file_backend(&dir, crate::models::AcademicRecord::KIND)?,
            Arc::clone(&allocator),
        )?;

        info!(path = %dir.path().display(), "registry opened");

        Ok(Self {
            _dir: Some(dir),
            allocator,
            students,
            teachers,
            rooms,
            schedules,
            roster,
            ledger,
        })
    }

    /// Opens an ephemeral registry backed by memory, for tests.
    ///
    /// # Errors
    ///
    /// Construction of in-memory stores does not realistically fail;
    /// the `Result` mirrors [`open`](Self::open).
    pub fn open_in_memory() -> RegistryResult<Self> {
        let allocator = Arc::new(IdAllocator::open(memory_backend())?);

        Ok(Self {
            _dir: None,
            students: EntityStore::open(memory_backend(), Arc::clone(&allocator))?,
            teachers: EntityStore::open(memory_backend(), Arc::clone(&allocator))?,
            rooms: EntityStore::open(memory_backend(), Arc::clone(&allocator))?,
            schedules: ScheduleStore::open(memory_backend(), Arc::clone(&allocator))?,
            roster: RosterStore::open(memory_backend(), Arc::clone(&allocator))?,
            ledger: AcademicLedger::open(memory_backend(), Arc::clone(&allocator))?,
            allocator,
        })
    }

    /// The student store.
    #[must_use]
    pub fn students(&self) -> &EntityStore<Student> {
        &self.students
    }

    /// The teacher store.
    #[must_use]
    pub fn teachers(&self) -> &EntityStore<Teacher> {
        &self.teachers
    }

    /// The room store.
    #[must_use]
    pub fn rooms(&self) -> &EntityStore<Room> {
        &self.rooms
    }

    /// The conflict-checked schedule store.
    #[must_use]
    pub fn schedules(&self) -> &ScheduleStore {
        &self.schedules
    }

    /// The capacity-bounded class roster store.
    #[must_use]
    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    /// The academic record ledger.
    #[must_use]
    pub fn ledger(&self) -> &AcademicLedger {
        &self.ledger
    }

    /// The shared id allocator.
    #[must_use]
    pub fn allocator(&self) -> &Arc<IdAllocator> {
        &self.allocator
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("on_disk", &self._dir.is_some())
            .finish_non_exhaustive()
    }
}

fn file_backend(dir: &RegistryDir, kind: &str) -> RegistryResult<Box<dyn SnapshotBackend>> {
    let backend =
        FileBackend::open(&dir.collection_path(kind)).map_err(campus_core::CoreError::from)?;
    Ok(Box::new(backend))
}

fn memory_backend() -> Box<dyn SnapshotBackend> {
    Box::new(InMemoryBackend::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use tempfile::tempdir;

    #[test]
    fn in_memory_registry_shares_one_allocator() {
        let registry = Registry::open_in_memory().unwrap();

        let student = registry
            .students()
            .add(Student::new("Alice", "S-001"))
            .unwrap();
        let teacher = registry
            .teachers()
            .add(Teacher::new("Ms. Finch", "Mathematics"))
            .unwrap();

        // Kinds count independently on the shared allocator.
        assert_eq!(student.id.get(), 1);
        assert_eq!(teacher.id.get(), 1);
        assert_eq!(registry.allocator().peek(Student::KIND), 2);
    }

    #[test]
    fn second_open_of_same_directory_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("school");

        let _first = Registry::open(&path).unwrap();
        assert!(matches!(
            Registry::open(&path),
            Err(RegistryError::DirectoryLocked)
        ));
    }

    #[test]
    fn data_survives_reopen() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("school");

        let (student_id, room_id) = {
            let registry = Registry::open(&path).unwrap();
            let student = registry
                .students()
                .add(Student::new("Alice", "S-001"))
                .unwrap();
            let room = registry.rooms().add(Room::new("B-204", 30)).unwrap();
            (student.id, room.id)
        };

        let registry = Registry::open(&path).unwrap();
        assert_eq!(registry.students().get(student_id).unwrap().name, "Alice");
        assert_eq!(registry.rooms().get(room_id).unwrap().seats, 30);

        // Counters resumed: new ids continue past the reload.
        let next = registry
            .students()
            .add(Student::new("Bob", "S-002"))
            .unwrap();
        assert!(next.id > student_id);
    }

    #[test]
    fn corrupt_snapshot_aborts_open() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("school");

        {
            let registry = Registry::open(&path).unwrap();
            registry
                .students()
                .add(Student::new("Alice", "S-001"))
                .unwrap();
        }

        std::fs::write(path.join("student.dat"), b"\xff\xffnot a snapshot").unwrap();

        assert!(matches!(
            Registry::open(&path),
            Err(RegistryError::Core(campus_core::CoreError::Corrupted { .. }))
        ));
    }
}
