//! Error types for the protocol layer.
//!
//! Each crate in dropgrid defines its own error enum. A `ProtocolError`
//! always means a message could not be turned into bytes or back; move
//! rejections are not errors and live in [`MoveRejection`](crate::MoveRejection).

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or an
    /// unknown message tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The bytes decoded but break a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
