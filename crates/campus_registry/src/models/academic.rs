//! Academic record, keyed naturally by student and class.

use campus_core::{Record, RecordId};
use serde::{Deserialize, Serialize};

/// A student's academic result in one class.
///
/// Stored under a surrogate id, but unique by the natural key
/// `(student_id, class_id)`. The [`AcademicLedger`](crate::AcademicLedger)
/// guarantees at most one record per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    /// Surrogate id, unset until first persisted.
    pub id: RecordId,
    /// The graded student.
    pub student_id: RecordId,
    /// The class the grade belongs to.
    pub class_id: RecordId,
    /// Term label, e.g. "2024-T1".
    pub term: String,
    /// Numeric score.
    pub score: f64,
    /// Free-form remark, if any.
    pub remark: Option<String>,
}

impl AcademicRecord {
    /// Creates an unpersisted academic record.
    #[must_use]
    pub fn new(student_id: RecordId, class_id: RecordId, term: impl Into<String>, score: f64) -> Self {
        Self {
            id: RecordId::UNSET,
            student_id,
            class_id,
            term: term.into(),
            score,
            remark: None,
        }
    }

    /// Whether this record and `other` share the natural key.
    #[must_use]
    pub fn same_key(&self, other: &AcademicRecord) -> bool {
        self.student_id == other.student_id && self.class_id == other.class_id
    }
}

impl Record for AcademicRecord {
    const KIND: &'static str = "academic_record";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}
