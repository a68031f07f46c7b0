//! Plain record kinds with no store-level invariants.
//!
//! These are served directly by the generic `EntityStore`; their field
//! validation (non-empty names and the like) belongs to callers.

use campus_core::{Record, RecordId};
use serde::{Deserialize, Serialize};

/// An enrolled student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Surrogate id, unset until first persisted.
    pub id: RecordId,
    /// Full name.
    pub name: String,
    /// External student number.
    pub code: String,
}

impl Student {
    /// Creates an unpersisted student.
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: RecordId::UNSET,
            name: name.into(),
            code: code.into(),
        }
    }
}

impl Record for Student {
    const KIND: &'static str = "student";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

/// A teaching staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Surrogate id, unset until first persisted.
    pub id: RecordId,
    /// Full name.
    pub name: String,
    /// Main subject taught.
    pub subject: String,
}

impl Teacher {
    /// Creates an unpersisted teacher.
    #[must_use]
    pub fn new(name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: RecordId::UNSET,
            name: name.into(),
            subject: subject.into(),
        }
    }
}

impl Record for Teacher {
    const KIND: &'static str = "teacher";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Surrogate id, unset until first persisted.
    pub id: RecordId,
    /// Room label, e.g. "B-204".
    pub name: String,
    /// Seat count.
    pub seats: u32,
}

impl Room {
    /// Creates an unpersisted room.
    #[must_use]
    pub fn new(name: impl Into<String>, seats: u32) -> Self {
        Self {
            id: RecordId::UNSET,
            name: name.into(),
            seats,
        }
    }
}

impl Record for Room {
    const KIND: &'static str = "room";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}
