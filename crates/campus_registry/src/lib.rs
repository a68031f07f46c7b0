//! # Campus Registry
//!
//! School-domain stores and scheduling-consistency engine for Campus.
//!
//! This crate specializes the generic [`campus_core::EntityStore`] for
//! the records a school keeps:
//!
//! - [`ScheduleStore`] - admits schedules only if no teacher or room is
//!   double-booked
//! - [`RosterStore`] - keeps class membership within capacity
//! - [`AcademicLedger`] - at most one academic record per
//!   `(student, class)` pair
//! - [`Registry`] - facade over one data directory, with one snapshot
//!   file per record kind, a shared id allocator, and an advisory lock
//!
//! Callers (controllers, UI) invoke store operations synchronously and
//! translate [`RegistryError`] values into user-facing messages; this
//! crate never touches presentation.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dir;
mod error;
mod ledger;
pub mod models;
mod registry;
mod roster;
mod scheduling;

pub use campus_core::{CoreError, EntityStore, IdAllocator, Record, RecordId};
pub use dir::RegistryDir;
pub use error::{ConflictResource, RegistryError, RegistryResult};
pub use ledger::AcademicLedger;
pub use models::{AcademicRecord, EduClass, Room, Schedule, Student, Teacher};
pub use registry::Registry;
pub use roster::RosterStore;
pub use scheduling::ScheduleStore;
