//! Codec trait and the JSON implementation.
//!
//! The server never touches `serde_json` directly; it goes through a
//! [`Codec`] so the wire format can change without touching dispatch.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`. Output is always valid UTF-8, so
/// the WebSocket transport sends it as text frames.
///
/// ```rust
/// use broadside_protocol::{ClientEvent, Codec, JsonCodec, LeaveRoom};
///
/// let codec = JsonCodec;
/// let event: ClientEvent = codec.decode(br#"{"event":"leave-room"}"#).unwrap();
/// assert_eq!(event, ClientEvent::LeaveRoom(LeaveRoom));
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
    use crate::{ErrorBody, ErrorCode, ServerEvent};

    #[test]
    fn test_json_codec_encodes_utf8() {
        let event = ServerEvent::Error(ErrorBody::new(
            ErrorCode::NotHost,
            "only the host can start the game",
        ));
        let bytes = JsonCodec.encode(&event).unwrap();
        let text = std::str::from_utf8(&bytes).expect("JSON is UTF-8");
        assert!(text.starts_with(r#"{"event":"error""#));
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<ServerEvent, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_error_message_mentions_decode() {
        let err = JsonCodec
            .decode::<ServerEvent>(br#"{"event":"nope"}"#)
            .unwrap_err();
        assert!(err.to_string().starts_with("decode failed"));
    }
}
