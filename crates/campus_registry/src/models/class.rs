//! Class record with bounded membership.

use campus_core::{Record, RecordId};
use serde::{Deserialize, Serialize};

/// A class with a capacity-bounded student roster.
///
/// `members` is an ordered, duplicate-free list of student ids. The
/// [`RosterStore`](crate::RosterStore) maintains the invariants
/// `members.len() <= capacity` and no duplicates; the fields are public
/// for reading, but membership changes should go through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EduClass {
    /// Surrogate id, unset until first persisted.
    pub id: RecordId,
    /// Display name, e.g. "9B Mathematics".
    pub name: String,
    /// The course this class teaches.
    pub course_id: RecordId,
    /// Maximum number of enrolled students.
    pub capacity: u32,
    /// Enrolled student ids, in enrollment order.
    pub members: Vec<RecordId>,
}

impl EduClass {
    /// Creates an unpersisted class with an empty roster.
    #[must_use]
    pub fn new(name: impl Into<String>, course_id: RecordId, capacity: u32) -> Self {
        Self {
            id: RecordId::UNSET,
            name: name.into(),
            course_id,
            capacity,
            members: Vec::new(),
        }
    }

    /// Number of enrolled students.
    #[must_use]
    pub fn member_count(&self) -> u32 {
        self.members.len() as u32
    }

    /// Whether the given student is enrolled.
    #[must_use]
    pub fn is_member(&self, student_id: RecordId) -> bool {
        self.members.contains(&student_id)
    }

    /// Remaining free spots.
    #[must_use]
    pub fn available_spots(&self) -> u32 {
        self.capacity.saturating_sub(self.member_count())
    }

    /// Whether the roster is full.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.member_count() >= self.capacity
    }
}

impl Record for EduClass {
    const KIND: &'static str = "class";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}
