//! Room lifecycle and membership for Broadside.
//!
//! The [`SessionStore`] is the single owner of every room and of the
//! connection → room membership index. It is a plain, synchronous value:
//! callers share it behind one `tokio::sync::Mutex` so every operation
//! runs as an atomic unit.
//!
//! # Key types
//!
//! - [`SessionStore`]: rooms, membership, and every state transition
//! - [`RoomError`]: why an operation was rejected
//! - [`SweepConfig`] / [`spawn_sweeper`]: periodic removal of stale rooms
//!
//! ```text
//! Dispatcher (above)  ← turns store results into outbound events
//!     ↕
//! Room layer (this crate)  ← owns rooms and membership
//!     ↕
//! Protocol layer (below)  ← provides RoomId, Player, RoomSnapshot
//! ```

mod config;
mod error;
mod id;
mod room;
mod store;
mod sweep;

pub use config::{ROOM_CAPACITY, SweepConfig};
pub use error::RoomError;
pub use id::{ROOM_ID_LEN, random_room_id};
pub use store::{
    Created, Departure, Joined, Membership, ReadyUpdate, SessionStore,
    StoreStats,
};
pub use sweep::{SharedStore, spawn_sweeper};
