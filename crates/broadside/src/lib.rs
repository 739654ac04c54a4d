//! # Broadside
//!
//! Room-based matchmaking server for two-player turn-based games.
//!
//! Clients connect over WebSocket, create or join a room by its six
//! character code, and are told when the room fills and when the host
//! starts the game. Game rules themselves run on the clients; the server
//! only owns who is in which room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use broadside::prelude::*;
//!
//! # async fn run() -> Result<(), BroadsideError> {
//! let server = BroadsideServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .sweep_config(SweepConfig::default())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! ## Identity
//!
//! Connections are not authenticated. A client may claim any `playerId`
//! it likes; the server only guarantees that names are unique per room.

pub mod dispatch;
mod error;
mod handler;
pub mod hub;
mod server;
mod status;

pub use error::BroadsideError;
pub use server::{BroadsideServer, BroadsideServerBuilder};
pub use status::StatusHandle;

pub mod prelude {
    pub use crate::{
        BroadsideError, BroadsideServer, BroadsideServerBuilder, StatusHandle,
    };
    pub use broadside_protocol::{
        ClientEvent, ErrorCode, RoomId, RoomSnapshot, RoomStatus,
        RoomsSummary, ServerEvent, StatusReport,
    };
    pub use broadside_room::SweepConfig;
}
