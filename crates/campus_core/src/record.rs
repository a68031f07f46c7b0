//! The record trait.

use crate::id::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A persistable record of some kind.
///
/// Implementors are plain data types with serde derives. The kind name
/// is the key for both the store's backing file and the id counter, so
/// it must be stable across releases.
///
/// # Example
///
/// ```rust
/// use campus_core::{Record, RecordId};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Student {
///     id: RecordId,
///     name: String,
/// }
///
/// impl Record for Student {
///     const KIND: &'static str = "student";
///
///     fn id(&self) -> RecordId {
///         self.id
///     }
///
///     fn set_id(&mut self, id: RecordId) {
///         self.id = id;
///     }
/// }
/// ```
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable kind name, used as storage-file and counter key.
    const KIND: &'static str;

    /// Returns the record's surrogate id ([`RecordId::UNSET`] before the
    /// first successful add).
    fn id(&self) -> RecordId;

    /// Assigns the record's surrogate id.
    ///
    /// Called by the store when it mints a fresh id; application code
    /// has no reason to call this.
    fn set_id(&mut self, id: RecordId);
}
