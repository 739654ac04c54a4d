//! The room record owned by the store.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use broadside_protocol::{
    ConnectionId, GameState, Player, PlayerId, RoomId, RoomSnapshot,
    RoomStatus,
};

use crate::ROOM_CAPACITY;

/// A room as the store sees it. Never leaves the crate; callers get a
/// [`RoomSnapshot`] instead.
#[derive(Debug)]
pub(crate) struct Room {
    pub(crate) id: RoomId,
    pub(crate) players: Vec<Player>,
    pub(crate) status: RoomStatus,
    /// Monotonic creation time, used for sweep aging.
    pub(crate) created_at: Instant,
    /// Wall-clock creation time reported to clients.
    pub(crate) created_at_ms: u64,
    pub(crate) game_state: Option<GameState>,
}

impl Room {
    /// Creates a waiting room seated with its host.
    pub(crate) fn new(id: RoomId, host: Player) -> Self {
        Self {
            id,
            players: vec![host],
            status: RoomStatus::Waiting,
            created_at: Instant::now(),
            created_at_ms: unix_millis(),
            game_state: None,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.players.len() >= ROOM_CAPACITY
    }

    pub(crate) fn has_player_named(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    pub(crate) fn position_of(&self, conn_id: ConnectionId) -> Option<usize> {
        self.players.iter().position(|p| p.connection_id == conn_id)
    }

    pub(crate) fn player_mut(
        &mut self,
        conn_id: ConnectionId,
    ) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.connection_id == conn_id)
    }

    pub(crate) fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            players: self.players.clone(),
            status: self.status,
            created_at: self.created_at_ms,
            game_state: self.game_state.clone(),
        }
    }
}

/// Builds a freshly seated player. An absent or empty `player_id` falls
/// back to the connection id.
pub(crate) fn seat_player(
    conn_id: ConnectionId,
    name: &str,
    player_id: Option<PlayerId>,
    is_host: bool,
) -> Player {
    let id = player_id
        .filter(|id| !id.0.is_empty())
        .unwrap_or_else(|| PlayerId::from(conn_id));
    Player {
        id,
        name: name.to_string(),
        connection_id: conn_id,
        ready: false,
        is_host,
    }
}

/// Milliseconds since the Unix epoch; 0 if the clock is before 1970.
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
