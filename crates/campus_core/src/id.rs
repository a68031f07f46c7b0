//! Record identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Surrogate identifier for a persisted record.
///
/// Record ids are allocator-issued integers that are:
/// - Unique within their kind
/// - Assigned once, on the first successful add
/// - Never reused or renumbered, even across delete/re-add cycles
///
/// An unpersisted record carries [`RecordId::UNSET`] (zero); every
/// persisted record has a positive id.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// The id of a record that has never been persisted.
    pub const UNSET: RecordId = RecordId(0);

    /// Creates a record id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this id has been assigned yet.
    #[inline]
    #[must_use]
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
