//! The session store: every room, every membership, every transition.
//!
//! # Concurrency note
//!
//! `SessionStore` is NOT thread-safe by itself. It holds two plain
//! `HashMap`s that must change together, so the server wraps the whole
//! store in a single `tokio::sync::Mutex` (see [`SharedStore`]) and each
//! method runs start to finish under that lock. No method awaits or does
//! I/O, so holding the lock for the duration of a call is cheap.
//!
//! [`SharedStore`]: crate::SharedStore

use std::collections::HashMap;
use std::time::{Duration, Instant};

use broadside_protocol::{
    ConnectionId, GamePhase, GameState, PlayerId, RoomId, RoomSnapshot,
    RoomStatus, RoomsSummary,
};

use crate::room::{Room, seat_player, unix_millis};
use crate::{ROOM_CAPACITY, RoomError, random_room_id};

/// How many times `create_room` re-rolls a colliding room code before
/// giving up.
const MAX_ROOM_ID_ATTEMPTS: usize = 64;

/// Where a connection is currently seated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room_id: RoomId,
    pub player_name: String,
}

/// Result of a successful [`SessionStore::create_room`].
#[derive(Debug, Clone)]
pub struct Created {
    pub room_id: RoomId,
    pub room: RoomSnapshot,
}

/// Result of a successful [`SessionStore::join_room`].
#[derive(Debug, Clone)]
pub struct Joined {
    pub room: RoomSnapshot,
    /// `true` exactly when this join filled the room.
    pub room_full: bool,
}

/// Result of [`SessionStore::set_ready`].
#[derive(Debug, Clone)]
pub struct ReadyUpdate {
    pub room_id: RoomId,
    pub player_name: String,
    pub ready: bool,
    pub room: RoomSnapshot,
}

/// Result of [`SessionStore::remove_member`].
#[derive(Debug, Clone)]
pub struct Departure {
    pub room_id: RoomId,
    pub player_name: String,
    /// Players left in the room after the removal.
    pub remaining: usize,
    /// The room after the removal, or `None` if it was deleted because
    /// nobody is left to notify.
    pub room: Option<RoomSnapshot>,
}

/// Aggregate counts over the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub room_count: usize,
    pub player_count: usize,
    pub active_game_count: usize,
}

impl StoreStats {
    /// Splits the room count into running games and everything else.
    pub fn summary(&self) -> RoomsSummary {
        RoomsSummary {
            total_rooms: self.room_count,
            active_games: self.active_game_count,
            waiting_rooms: self.room_count.saturating_sub(self.active_game_count),
        }
    }
}

/// Owns all rooms and the connection → room membership index.
///
/// ## Invariants
///
/// - A room holds 0..=2 players and is deleted the moment it reaches 0.
/// - Player names are unique within a room.
/// - The creator is the only host a room ever has.
/// - `InProgress` implies two players and a recorded [`GameState`];
///   `ReadyToStart` means two players and no running game.
/// - `members` holds exactly one entry per seated player, and a
///   connection is seated in at most one room.
pub struct SessionStore {
    rooms: HashMap<RoomId, Room>,
    members: HashMap<ConnectionId, Membership>,
    room_ids: Box<dyn FnMut() -> RoomId + Send>,
}

impl SessionStore {
    /// Creates an empty store that issues random room codes.
    pub fn new() -> Self {
        Self::with_room_ids(random_room_id)
    }

    /// Creates an empty store that draws room codes from `room_ids`.
    ///
    /// Collisions are still detected and re-rolled, so the source only
    /// needs to be "usually fresh".
    pub fn with_room_ids(
        room_ids: impl FnMut() -> RoomId + Send + 'static,
    ) -> Self {
        Self {
            rooms: HashMap::new(),
            members: HashMap::new(),
            room_ids: Box::new(room_ids),
        }
    }

    /// Opens a new room with the caller seated as host.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] if the connection is already seated.
    /// - [`RoomError::Internal`] if no unused room code could be drawn.
    pub fn create_room(
        &mut self,
        conn_id: ConnectionId,
        player_name: &str,
        player_id: Option<PlayerId>,
    ) -> Result<Created, RoomError> {
        if let Some(existing) = self.members.get(&conn_id) {
            return Err(RoomError::AlreadyInRoom(existing.room_id.clone()));
        }

        let room_id = self.next_room_id()?;
        let host = seat_player(conn_id, player_name, player_id, true);
        let room = Room::new(room_id.clone(), host);
        let snapshot = room.snapshot();

        self.rooms.insert(room_id.clone(), room);
        self.members.insert(
            conn_id,
            Membership {
                room_id: room_id.clone(),
                player_name: player_name.to_string(),
            },
        );

        tracing::info!(%room_id, %conn_id, player = player_name, "room created");
        Ok(Created {
            room_id,
            room: snapshot,
        })
    }

    /// Seats the caller in an existing room.
    ///
    /// # Errors
    /// Checked in this order: [`RoomError::NotFound`],
    /// [`RoomError::RoomFull`], [`RoomError::GameInProgress`],
    /// [`RoomError::NameTaken`], [`RoomError::AlreadyInRoom`].
    pub fn join_room(
        &mut self,
        conn_id: ConnectionId,
        room_id: &RoomId,
        player_name: &str,
        player_id: Option<PlayerId>,
    ) -> Result<Joined, RoomError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        if room.is_full() {
            return Err(RoomError::RoomFull(room_id.clone()));
        }
        if room.status.is_in_progress() {
            return Err(RoomError::GameInProgress(room_id.clone()));
        }
        if room.has_player_named(player_name) {
            return Err(RoomError::NameTaken {
                room_id: room_id.clone(),
                name: player_name.to_string(),
            });
        }
        if let Some(existing) = self.members.get(&conn_id) {
            return Err(RoomError::AlreadyInRoom(existing.room_id.clone()));
        }

        room.players
            .push(seat_player(conn_id, player_name, player_id, false));
        let room_full = room.players.len() == ROOM_CAPACITY;
        if room_full {
            room.status = RoomStatus::ReadyToStart;
        }
        self.members.insert(
            conn_id,
            Membership {
                room_id: room_id.clone(),
                player_name: player_name.to_string(),
            },
        );

        tracing::info!(
            %room_id,
            %conn_id,
            player = player_name,
            players = room.players.len(),
            "player joined room"
        );
        Ok(Joined {
            room: room.snapshot(),
            room_full,
        })
    }

    /// Starts the game. The host moves first.
    ///
    /// # Errors
    /// Checked in this order: [`RoomError::NotFound`],
    /// [`RoomError::NotEnoughPlayers`], [`RoomError::NotHost`],
    /// [`RoomError::GameInProgress`] (a running game is never restarted).
    pub fn start_game(
        &mut self,
        conn_id: ConnectionId,
        room_id: &RoomId,
    ) -> Result<RoomSnapshot, RoomError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        if room.players.len() != ROOM_CAPACITY {
            return Err(RoomError::NotEnoughPlayers(room_id.clone()));
        }
        let host_id = room
            .players
            .iter()
            .find(|p| p.connection_id == conn_id && p.is_host)
            .map(|p| p.id.clone())
            .ok_or_else(|| RoomError::NotHost(room_id.clone()))?;
        if room.status.is_in_progress() {
            return Err(RoomError::GameInProgress(room_id.clone()));
        }

        room.status = RoomStatus::InProgress;
        room.game_state = Some(GameState {
            current_turn_player_id: host_id,
            phase: GamePhase::ShipPlacement,
            started_at: unix_millis(),
        });

        tracing::info!(%room_id, "game started");
        Ok(room.snapshot())
    }

    /// Records whether the caller is ready. Purely informational: no
    /// status transition depends on it.
    ///
    /// Returns `None` if the connection is not seated anywhere.
    pub fn set_ready(
        &mut self,
        conn_id: ConnectionId,
        ready: bool,
    ) -> Option<ReadyUpdate> {
        let membership = self.members.get(&conn_id)?;
        let Some(room) = self.rooms.get_mut(&membership.room_id) else {
            tracing::error!(
                %conn_id,
                room_id = %membership.room_id,
                "membership points at a missing room"
            );
            return None;
        };
        let Some(player) = room.player_mut(conn_id) else {
            tracing::error!(
                %conn_id,
                room_id = %membership.room_id,
                "member not seated in its room"
            );
            return None;
        };

        player.ready = ready;
        let player_name = player.name.clone();
        tracing::debug!(
            room_id = %room.id,
            player = %player_name,
            ready,
            "player readiness changed"
        );

        Some(ReadyUpdate {
            room_id: room.id.clone(),
            player_name,
            ready,
            room: room.snapshot(),
        })
    }

    /// Unseats the caller. Backs both an explicit leave and a dropped
    /// connection.
    ///
    /// An emptied room is deleted on the spot. Otherwise the room falls
    /// back to `Waiting` and any running game is discarded.
    ///
    /// Returns `None` if the connection is not seated anywhere.
    pub fn remove_member(&mut self, conn_id: ConnectionId) -> Option<Departure> {
        let membership = self.members.remove(&conn_id)?;
        let room_id = membership.room_id;

        let Some(room) = self.rooms.get_mut(&room_id) else {
            tracing::error!(%conn_id, %room_id, "membership points at a missing room");
            return None;
        };
        let Some(index) = room.position_of(conn_id) else {
            tracing::error!(%conn_id, %room_id, "member not seated in its room");
            return None;
        };

        let player = room.players.remove(index);
        let remaining = room.players.len();
        tracing::info!(
            %room_id,
            %conn_id,
            player = %player.name,
            remaining,
            "player left room"
        );

        let snapshot = if remaining == 0 {
            self.rooms.remove(&room_id);
            tracing::info!(%room_id, "room deleted, no players left");
            None
        } else {
            if room.status.is_in_progress() {
                tracing::info!(%room_id, "game abandoned");
            }
            room.status = RoomStatus::Waiting;
            room.game_state = None;
            Some(room.snapshot())
        };

        Some(Departure {
            room_id,
            player_name: player.name,
            remaining,
            room: snapshot,
        })
    }

    /// Deletes empty rooms created more than `max_age` before `now`.
    /// Rooms with players are never touched.
    ///
    /// Returns how many rooms were deleted.
    pub fn sweep_stale_rooms(&mut self, now: Instant, max_age: Duration) -> usize {
        let before = self.rooms.len();
        self.rooms.retain(|_, room| {
            !(room.players.is_empty()
                && now.saturating_duration_since(room.created_at) > max_age)
        });
        let swept = before - self.rooms.len();

        if swept > 0 {
            let rooms = &self.rooms;
            self.members.retain(|_, m| rooms.contains_key(&m.room_id));
            tracing::info!(swept, "swept stale rooms");
        }
        swept
    }

    /// Counts rooms, seated players, and running games.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            room_count: self.rooms.len(),
            player_count: self.members.len(),
            active_game_count: self
                .rooms
                .values()
                .filter(|r| r.status.is_in_progress())
                .count(),
        }
    }

    /// Returns a snapshot of one room.
    pub fn room(&self, room_id: &RoomId) -> Option<RoomSnapshot> {
        self.rooms.get(room_id).map(Room::snapshot)
    }

    /// Returns where a connection is seated, if anywhere.
    pub fn membership(&self, conn_id: ConnectionId) -> Option<&Membership> {
        self.members.get(&conn_id)
    }

    fn next_room_id(&mut self) -> Result<RoomId, RoomError> {
        for _ in 0..MAX_ROOM_ID_ATTEMPTS {
            let candidate = (self.room_ids)();
            if !self.rooms.contains_key(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!(room_id = %candidate, "room id collision, re-rolling");
        }
        tracing::error!(
            attempts = MAX_ROOM_ID_ATTEMPTS,
            "could not draw an unused room id"
        );
        Err(RoomError::Internal(
            "could not allocate a room id, please try again".into(),
        ))
    }

    /// Inserts an already-empty room, as a path that bypasses eager
    /// deletion would leave behind.
    #[cfg(test)]
    pub(crate) fn insert_empty_room(&mut self, room_id: &str, created_at: Instant) {
        let id = RoomId::from(room_id);
        let host = seat_player(ConnectionId::new(0), "ghost", None, true);
        let mut room = Room::new(id.clone(), host);
        room.players.clear();
        room.created_at = created_at;
        self.rooms.insert(id, room);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("rooms", &self.rooms)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

// =========================================================================
// Tests
// =========================================================================
