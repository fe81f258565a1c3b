//! Codec trait and implementations for turning messages into bytes.
//!
//! The delivery substrate only moves bytes. Whatever sits on either end
//! picks a [`Codec`] to convert [`Envelope`](crate::Envelope)s to and from
//! those bytes; swapping JSON for a binary format touches nothing else.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes them back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: one codec is shared by the substrate and every
///   participant, and Tokio may poll any of them on any worker thread.
/// - `'static`: the codec owns everything it needs, so it can live for
///   the whole session inside spawned tasks.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the value type, so the same
/// codec handles [`Envelope`](crate::Envelope)s, bare
/// [`SessionMessage`](crate::SessionMessage)s or anything else with the
/// right serde derive:
/// - `encode<T: Serialize>`: `T` can be turned into bytes.
/// - `decode<T: DeserializeOwned>`: `T` can be rebuilt from bytes without
///   borrowing them, so the inbox buffer can be dropped straight after.
///
/// Codecs carry no per-message state. Encoding the same value twice gives
/// the same bytes, which is what lets a relay buffer encoded broadcasts
/// and replay them verbatim to late joiners.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// truncated, or carry an unknown message tag.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature (on by default).
///
/// ```rust
/// use dropgrid_protocol::{Codec, Envelope, JsonCodec, PlayerId, SessionMessage};
///
/// let codec = JsonCodec;
/// let envelope = Envelope {
///     seq: 1,
///     sender: PlayerId(1),
///     payload: SessionMessage::Reset,
/// };
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Envelope, MoveRequest, PlayerId, SessionMessage};

    #[test]
    fn test_json_codec_round_trips_envelope() {
        let codec = JsonCodec;
        let envelope = Envelope {
            seq: 7,
            sender: PlayerId(2),
            payload: SessionMessage::RequestMove(MoveRequest {
                column: 3,
                requester: PlayerId(2),
            }),
        };
        let bytes = codec.encode(&envelope).unwrap();
        let decoded: Envelope = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_json_codec_decode_garbage_is_error() {
        let result: Result<Envelope, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
