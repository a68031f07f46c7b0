//! Error types for core record-store operations.

use crate::id::RecordId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core record-store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] campus_storage::StorageError),

    /// A persisted snapshot could not be decoded.
    ///
    /// Fatal at load time: continuing with a partially decoded
    /// collection could hide existing records.
    #[error("corrupt snapshot for kind '{kind}': {message}")]
    Corrupted {
        /// The record kind whose snapshot failed to decode.
        kind: String,
        /// Description of the decode failure.
        message: String,
    },

    /// A collection could not be encoded for persistence.
    #[error("codec error for kind '{kind}': {message}")]
    Codec {
        /// The record kind being encoded.
        kind: String,
        /// Description of the encode failure.
        message: String,
    },

    /// Operation referenced a record id that does not exist.
    #[error("no {kind} record with id {id}")]
    NotFound {
        /// The record kind searched.
        kind: String,
        /// The id that was not found.
        id: RecordId,
    },
}

impl CoreError {
    /// Creates a corrupt-snapshot error.
    pub fn corrupted(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupted {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Creates a codec error.
    pub fn codec(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Codec {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(kind: impl Into<String>, id: RecordId) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id,
        }
    }
}
