//! JSON codec for persisted session snapshots.
//!
//! The durable key-value slot stores a single [`Identity`] serialized as
//! JSON. Decoding is strict; callers decide how to treat malformed data.

use crate::identity::Identity;

/// Errors from encoding or decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization failed.
    #[error("snapshot encode error: {0}")]
    Encode(serde_json::Error),
    /// Input is not a valid identity snapshot.
    #[error("snapshot decode error: {0}")]
    Decode(serde_json::Error),
}

/// Encodes an identity snapshot.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_identity(identity: &Identity) -> Result<String, CodecError> {
    serde_json::to_string(identity).map_err(CodecError::Encode)
}

/// Decodes an identity snapshot.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if `raw` is not a well-formed snapshot.
pub fn decode_identity(raw: &str) -> Result<Identity, CodecError> {
    serde_json::from_str(raw).map_err(CodecError::Decode)
}
