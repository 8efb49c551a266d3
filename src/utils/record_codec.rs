//! JSON codec for the cached record set.
//!
//! The encoded form is a JSON array of flat user objects. It is both the value
//! stored under the cache key and the body of `GET /users`, so a cache hit can
//! be relayed to the client without re-encoding.

use crate::domain::entities::{RecordSet, UserRecord};

/// Errors that can occur while converting a record set to or from its cached form.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to encode records: {0}")]
    Encode(String),

    #[error("Failed to decode records: {0}")]
    Decode(String),
}

/// Encodes records as a JSON array, preserving iteration order.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails. This does not happen
/// for well-formed [`UserRecord`] values.
pub fn encode(records: &[UserRecord]) -> Result<String, CodecError> {
    serde_json::to_string(records).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decodes a cached payload back into records.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the payload is not a JSON array of user objects.
pub fn decode(payload: &str) -> Result<RecordSet, CodecError> {
    serde_json::from_str(payload).map_err(|e| CodecError::Decode(e.to_string()))
}
