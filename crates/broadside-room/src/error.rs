//! Error types for the room layer.

use broadside_protocol::{ErrorBody, ErrorCode, RoomId};

/// Why a room operation was rejected.
///
/// Every variant is recoverable by the caller and is reported only to the
/// connection that issued the command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No room has this id.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room already has two players.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// A game is already running in the room.
    #[error("game already in progress in room {0}")]
    GameInProgress(RoomId),

    /// Another player in the room already uses this name.
    #[error("a player named {name:?} is already in room {room_id}")]
    NameTaken { room_id: RoomId, name: String },

    /// The game needs two players to start.
    #[error("need 2 players to start the game in room {0}")]
    NotEnoughPlayers(RoomId),

    /// Only the host may start the game.
    #[error("only the host can start the game in room {0}")]
    NotHost(RoomId),

    /// The connection is already seated in a room.
    #[error("connection is already in room {0}")]
    AlreadyInRoom(RoomId),

    /// The store detected an inconsistency it could not recover from.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RoomError {
    /// The wire category for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::RoomNotFound,
            Self::RoomFull(_) => ErrorCode::RoomFull,
            Self::GameInProgress(_) => ErrorCode::GameInProgress,
            Self::NameTaken { .. } => ErrorCode::NameTaken,
            Self::NotEnoughPlayers(_) => ErrorCode::NotEnoughPlayers,
            Self::NotHost(_) => ErrorCode::NotHost,
            Self::AlreadyInRoom(_) => ErrorCode::AlreadyInRoom,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Builds the payload of an error event.
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody::new(self.code(), self.to_string())
    }
}
