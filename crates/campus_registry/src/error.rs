//! Error types for the registry stores.

use campus_core::RecordId;
use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// The resource a schedule conflict was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResource {
    /// The same teacher is already booked.
    Teacher,
    /// The same room is already booked.
    Room,
}

impl fmt::Display for ConflictResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictResource::Teacher => write!(f, "teacher"),
            ConflictResource::Room => write!(f, "room"),
        }
    }
}

/// Errors that can occur in registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Core store error (not-found, corruption, storage failure).
    #[error("store error: {0}")]
    Core(#[from] campus_core::CoreError),

    /// I/O error while managing the data directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Candidate write would double-book a teacher or room.
    #[error(
        "{resource} {resource_id} is already booked on {date} \
         {start}-{end} by schedule {conflicting_id}"
    )]
    ScheduleConflict {
        /// Which resource clashed.
        resource: ConflictResource,
        /// Id of the clashing teacher or room.
        resource_id: RecordId,
        /// Id of the already-persisted conflicting schedule.
        conflicting_id: RecordId,
        /// Date of the conflicting booking.
        date: NaiveDate,
        /// Start of the conflicting booking.
        start: NaiveTime,
        /// End of the conflicting booking.
        end: NaiveTime,
    },

    /// A schedule's time range is not well-formed.
    ///
    /// Plain input validation, distinct from a conflict.
    #[error("invalid time range: start {start} is not before end {end}")]
    InvalidTimeRange {
        /// Candidate start time.
        start: NaiveTime,
        /// Candidate end time.
        end: NaiveTime,
    },

    /// Roster write would exceed the class's declared capacity.
    #[error("class {class_id} is at capacity ({capacity})")]
    CapacityExceeded {
        /// The class that is full.
        class_id: RecordId,
        /// Its declared capacity.
        capacity: u32,
    },

    /// Structural precondition violated.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the violated precondition.
        message: String,
    },

    /// Another process holds the data directory's lock.
    #[error("registry locked: another process has exclusive access")]
    DirectoryLocked,
}

impl RegistryError {
    /// Creates an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}
