//! School-domain record types.
//!
//! All models are plain serde types implementing [`campus_core::Record`].
//! Field validation beyond the structural invariants enforced by the
//! stores (conflicts, capacity, natural keys) is the caller's concern.

mod academic;
mod class;
mod people;
mod schedule;

pub use academic::AcademicRecord;
pub use class::EduClass;
pub use people::{Room, Student, Teacher};
pub use schedule::Schedule;
