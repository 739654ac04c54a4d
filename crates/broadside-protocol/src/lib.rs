//! Wire protocol for Broadside.
//!
//! This crate defines what travels between a browser client and the
//! server:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomSnapshot`], etc.):
//!   the event shapes and the room data embedded in them.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events are turned
//!   into bytes and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Room store (state transitions)
//! ```

mod codec;
mod error;
mod types;

pub use broadside_transport::ConnectionId;
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, CreateRoom, ErrorBody, ErrorCode, GamePhase, GameStarted,
    GameState, JoinRoom, LeaveRoom, Player, PlayerId, PlayerJoined, PlayerLeft,
    PlayerReady, PlayerStatusUpdated, RoomCreated, RoomId, RoomJoined,
    RoomReady, RoomSnapshot, RoomStatus, RoomsSummary, ServerEvent,
    StartGame, StatusReport,
};
