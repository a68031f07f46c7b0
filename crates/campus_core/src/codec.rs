//! CBOR encoding/decoding for persisted snapshots.
//!
//! All Campus snapshots (record collections and the counter table) are
//! CBOR, produced and parsed through serde. Decode failures are treated
//! as corruption of the named kind.

use crate::error::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes a value as a CBOR snapshot.
///
/// # Errors
///
/// Returns [`CoreError::Codec`] if serialization fails.
pub fn to_cbor<T: Serialize>(kind: &str, value: &T) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CoreError::codec(kind, e.to_string()))?;
    Ok(buf)
}

/// Decodes a value from a CBOR snapshot.
///
/// # Errors
///
/// Returns [`CoreError::Corrupted`] if the bytes are not a valid
/// encoding of `T`.
pub fn from_cbor<T: DeserializeOwned>(kind: &str, bytes: &[u8]) -> CoreResult<T> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::corrupted(kind, e.to_string()))
}
