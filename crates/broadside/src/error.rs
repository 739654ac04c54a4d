//! Unified error type for the Broadside server.

use broadside_protocol::ProtocolError;
use broadside_room::RoomError;
use broadside_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BroadsideError {
    /// Binding, accepting, sending, or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An event could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room operation was rejected.
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadside_protocol::{ClientEvent, Codec, JsonCodec, RoomId};

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::SendFailed(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "gone",
        ));
        let broadside_err: BroadsideError = err.into();
        assert!(matches!(broadside_err, BroadsideError::Transport(_)));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = JsonCodec.decode::<ClientEvent>(b"not json").unwrap_err();
        let broadside_err: BroadsideError = err.into();
        assert!(matches!(broadside_err, BroadsideError::Protocol(_)));
        assert!(broadside_err.to_string().starts_with("decode failed"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomId::from("ABC123"));
        let broadside_err: BroadsideError = err.into();
        assert!(matches!(broadside_err, BroadsideError::Room(_)));
        assert!(broadside_err.to_string().contains("ABC123"));
    }
}
