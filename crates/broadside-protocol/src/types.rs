//! Wire types: identities, room snapshots, and the inbound/outbound events.
//!
//! Everything here is plain data that crosses the connection boundary as
//! JSON. The room store builds [`RoomSnapshot`]s; the dispatcher wraps
//! them into [`ServerEvent`]s.
//!
//! Event envelopes are adjacently tagged:
//!
//! ```text
//! { "event": "join-room", "data": { "roomId": "K3ZQ7A", "playerName": "Bob" } }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, IgnoredAny, Visitor};
use serde::{Deserialize, Serialize};

use crate::ConnectionId;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Short, human-typeable room code, e.g. `K3ZQ7A`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

/// Stable player identity.
///
/// Supplied by the client when it has one, otherwise derived from the
/// connection id. Not authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<ConnectionId> for PlayerId {
    fn from(conn_id: ConnectionId) -> Self {
        Self(conn_id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Room state
// ---------------------------------------------------------------------------

/// Lifecycle status of a room.
///
/// ```text
/// Waiting ──(2nd player joins)──→ ReadyToStart ──(host starts)──→ InProgress
///    ↑                                 │                              │
///    └──────────(a player leaves)──────┴──────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    ReadyToStart,
    InProgress,
}

impl RoomStatus {
    /// Returns `true` while a game is running.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::ReadyToStart => write!(f, "ready_to_start"),
            Self::InProgress => write!(f, "in_progress"),
        }
    }
}

/// Phase of a running game. Only the opening phase is tracked here; the
/// game rules that advance it live on the clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    ShipPlacement,
}

/// Recorded when the host starts the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub current_turn_player_id: PlayerId,
    pub phase: GamePhase,
    /// Milliseconds since the Unix epoch.
    pub started_at: u64,
}

/// A player seated in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub connection_id: ConnectionId,
    pub ready: bool,
    pub is_host: bool,
}

/// Point-in-time copy of a room, safe to hand out after the store lock
/// is released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: RoomId,
    /// Join order; the host is first unless they have left.
    pub players: Vec<Player>,
    pub status: RoomStatus,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    pub game_state: Option<GameState>,
}

impl RoomSnapshot {
    /// Connections of every player in the room.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.players.iter().map(|p| p.connection_id).collect()
    }

    /// Connections of every player except `excluded`.
    pub fn connection_ids_except(
        &self,
        excluded: ConnectionId,
    ) -> Vec<ConnectionId> {
        self.players
            .iter()
            .map(|p| p.connection_id)
            .filter(|id| *id != excluded)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub player_name: String,
    #[serde(default)]
    pub player_id: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_id: RoomId,
    pub player_name: String,
    #[serde(default)]
    pub player_id: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGame {
    pub room_id: RoomId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerReady {
    pub ready: bool,
}

/// Payload of `leave-room`. Carries nothing; clients may send `data` as
/// `{}`, as `null`, or leave it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LeaveRoom;

impl<'de> Deserialize<'de> for LeaveRoom {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct LeaveRoomVisitor;

        impl<'de> Visitor<'de> for LeaveRoomVisitor {
            type Value = LeaveRoom;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an empty object, null, or nothing")
            }

            fn visit_none<E: de::Error>(self) -> Result<LeaveRoom, E> {
                Ok(LeaveRoom)
            }

            fn visit_unit<E: de::Error>(self) -> Result<LeaveRoom, E> {
                Ok(LeaveRoom)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<LeaveRoom, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                // Unknown keys are ignored; anything but an object is not.
                BTreeMap::<String, IgnoredAny>::deserialize(deserializer)?;
                Ok(LeaveRoom)
            }
        }

        deserializer.deserialize_option(LeaveRoomVisitor)
    }
}

/// Client → server events.
///
/// A dropped connection is the one inbound signal with no event of its
/// own; the server synthesizes it when the socket closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    CreateRoom(CreateRoom),
    JoinRoom(JoinRoom),
    StartGame(StartGame),
    PlayerReady(PlayerReady),
    LeaveRoom(LeaveRoom),
}

impl ClientEvent {
    /// The event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom(_) => "create-room",
            Self::JoinRoom(_) => "join-room",
            Self::StartGame(_) => "start-game",
            Self::PlayerReady(_) => "player-ready",
            Self::LeaveRoom(_) => "leave-room",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreated {
    pub room_id: RoomId,
    pub room: RoomSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoined {
    pub room_id: RoomId,
    pub room: RoomSnapshot,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoined {
    pub player_name: String,
    pub players_count: usize,
    pub room: RoomSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomReady {
    pub room: RoomSnapshot,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStarted {
    pub room: RoomSnapshot,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatusUpdated {
    pub player_name: String,
    pub ready: bool,
    pub room: RoomSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLeft {
    pub player_name: String,
    pub players_count: usize,
    pub room: RoomSnapshot,
}

/// Machine-readable error category carried by every error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    RoomNotFound,
    RoomFull,
    GameInProgress,
    NameTaken,
    NotEnoughPlayers,
    NotHost,
    AlreadyInRoom,
    InvalidEvent,
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    RoomCreated(RoomCreated),
    RoomCreationError(ErrorBody),
    RoomJoined(RoomJoined),
    JoinRoomError(ErrorBody),
    PlayerJoined(PlayerJoined),
    RoomReady(RoomReady),
    GameStarted(GameStarted),
    Error(ErrorBody),
    PlayerStatusUpdated(PlayerStatusUpdated),
    LeftRoom,
    PlayerLeft(PlayerLeft),
}

// ---------------------------------------------------------------------------
// Status surface
// ---------------------------------------------------------------------------

/// Server health snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub room_count: usize,
    pub player_count: usize,
    pub active_game_count: usize,
    /// Seconds since the server was built.
    pub uptime: f64,
}

/// Room totals split by whether a game is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsSummary {
    pub total_rooms: usize,
    pub active_games: usize,
    pub waiting_rooms: usize,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client matches on these exact JSON shapes, so the
    //! tests pin the serde attributes rather than round-tripping.

    use serde_json::json;

    use super::*;

    fn sample_room() -> RoomSnapshot {
        RoomSnapshot {
            id: RoomId::from("ABC123"),
            players: vec![
                Player {
                    id: PlayerId::from("alice-1"),
                    name: "Alice".into(),
                    connection_id: ConnectionId::new(1),
                    ready: false,
                    is_host: true,
                },
                Player {
                    id: PlayerId::from("conn-2"),
                    name: "Bob".into(),
                    connection_id: ConnectionId::new(2),
                    ready: true,
                    is_host: false,
                },
            ],
            status: RoomStatus::ReadyToStart,
            created_at: 1_700_000_000_000,
            game_state: None,
        }
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::from("K3ZQ7A")).unwrap();
        assert_eq!(json, "\"K3ZQ7A\"");
    }

    #[test]
    fn test_player_id_from_connection_id_uses_display_form() {
        let pid = PlayerId::from(ConnectionId::new(9));
        assert_eq!(pid, PlayerId::from("conn-9"));
    }

    // =====================================================================
    // Room snapshot
    // =====================================================================

    #[test]
    fn test_room_snapshot_json_uses_camel_case() {
        let json = serde_json::to_value(sample_room()).unwrap();

        assert_eq!(json["id"], "ABC123");
        assert_eq!(json["status"], "ready_to_start");
        assert_eq!(json["createdAt"], 1_700_000_000_000u64);
        assert!(json["gameState"].is_null());
        assert_eq!(json["players"][0]["isHost"], true);
        assert_eq!(json["players"][0]["connectionId"], 1);
        assert_eq!(json["players"][1]["id"], "conn-2");
    }

    #[test]
    fn test_game_state_json_format() {
        let state = GameState {
            current_turn_player_id: PlayerId::from("alice-1"),
            phase: GamePhase::ShipPlacement,
            started_at: 42,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentTurnPlayerId"], "alice-1");
        assert_eq!(json["phase"], "ship_placement");
        assert_eq!(json["startedAt"], 42);
    }

    #[test]
    fn test_connection_ids_except_skips_excluded() {
        let room = sample_room();
        assert_eq!(
            room.connection_ids(),
            vec![ConnectionId::new(1), ConnectionId::new(2)]
        );
        assert_eq!(
            room.connection_ids_except(ConnectionId::new(1)),
            vec![ConnectionId::new(2)]
        );
    }

    #[test]
    fn test_room_status_display_matches_wire_name() {
        for status in [
            RoomStatus::Waiting,
            RoomStatus::ReadyToStart,
            RoomStatus::InProgress,
        ] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, json!(status.to_string()));
        }
    }

    // =====================================================================
    // ClientEvent
    // =====================================================================

    #[test]
    fn test_client_event_create_room_parses_without_player_id() {
        let raw = r#"{"event":"create-room","data":{"playerName":"Alice"}}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event,
            ClientEvent::CreateRoom(CreateRoom {
                player_name: "Alice".into(),
                player_id: None,
            })
        );
        assert_eq!(event.name(), "create-room");
    }

    #[test]
    fn test_client_event_join_room_parses_camel_case_fields() {
        let raw = r#"{
            "event": "join-room",
            "data": { "roomId": "ABC123", "playerName": "Bob", "playerId": "bob-7" }
        }"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRoom(JoinRoom {
                room_id: RoomId::from("ABC123"),
                player_name: "Bob".into(),
                player_id: Some(PlayerId::from("bob-7")),
            })
        );
    }

    #[test]
    fn test_client_event_leave_room_needs_no_data() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"leave-room"}"#).unwrap();
        assert_eq!(event, ClientEvent::LeaveRoom(LeaveRoom));
    }

    #[test]
    fn test_client_event_leave_room_accepts_empty_or_null_data() {
        for raw in [
            r#"{"event":"leave-room","data":{}}"#,
            r#"{"event":"leave-room","data":null}"#,
            r#"{"data":{},"event":"leave-room"}"#,
        ] {
            let event: ClientEvent = serde_json::from_str(raw)
                .unwrap_or_else(|e| panic!("{raw} rejected: {e}"));
            assert_eq!(event, ClientEvent::LeaveRoom(LeaveRoom), "{raw}");
        }
    }

    #[test]
    fn test_client_event_leave_room_rejects_non_object_data() {
        let result =
            serde_json::from_str::<ClientEvent>(r#"{"event":"leave-room","data":5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_player_ready_and_start_game() {
        let ready: ClientEvent = serde_json::from_str(
            r#"{"event":"player-ready","data":{"ready":true}}"#,
        )
        .unwrap();
        assert_eq!(ready, ClientEvent::PlayerReady(PlayerReady { ready: true }));

        let start: ClientEvent = serde_json::from_str(
            r#"{"event":"start-game","data":{"roomId":"ABC123"}}"#,
        )
        .unwrap();
        assert_eq!(
            start,
            ClientEvent::StartGame(StartGame {
                room_id: RoomId::from("ABC123")
            })
        );
    }

    #[test]
    fn test_client_event_unknown_name_is_rejected() {
        let raw = r#"{"event":"fire-torpedo","data":{"x":1}}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn test_client_event_missing_required_field_is_rejected() {
        let raw = r#"{"event":"join-room","data":{"playerName":"Bob"}}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_server_event_room_created_json_format() {
        let event = ServerEvent::RoomCreated(RoomCreated {
            room_id: RoomId::from("ABC123"),
            room: sample_room(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "room-created");
        assert_eq!(json["data"]["roomId"], "ABC123");
        assert_eq!(json["data"]["room"]["players"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_server_event_error_variants_use_distinct_names() {
        let body = ErrorBody::new(ErrorCode::RoomFull, "room ABC123 is full");
        let names: Vec<String> = [
            ServerEvent::RoomCreationError(body.clone()),
            ServerEvent::JoinRoomError(body.clone()),
            ServerEvent::Error(body),
        ]
        .iter()
        .map(|e| serde_json::to_value(e).unwrap()["event"].to_string())
        .collect();
        assert_eq!(
            names,
            vec!["\"room-creation-error\"", "\"join-room-error\"", "\"error\""]
        );
    }

    #[test]
    fn test_server_event_error_body_format() {
        let event = ServerEvent::JoinRoomError(ErrorBody::new(
            ErrorCode::NameTaken,
            "name taken",
        ));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["code"], "name_taken");
        assert_eq!(json["data"]["message"], "name taken");
    }

    #[test]
    fn test_server_event_left_room_has_no_data() {
        let json = serde_json::to_value(&ServerEvent::LeftRoom).unwrap();
        assert_eq!(json, json!({ "event": "left-room" }));
    }

    #[test]
    fn test_server_event_player_left_json_format() {
        let event = ServerEvent::PlayerLeft(PlayerLeft {
            player_name: "Bob".into(),
            players_count: 1,
            room: sample_room(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "player-left");
        assert_eq!(json["data"]["playerName"], "Bob");
        assert_eq!(json["data"]["playersCount"], 1);
    }

    // =====================================================================
    // Status surface
    // =====================================================================

    #[test]
    fn test_status_report_json_format() {
        let report = StatusReport {
            room_count: 3,
            player_count: 5,
            active_game_count: 1,
            uptime: 12.5,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            json!({
                "roomCount": 3,
                "playerCount": 5,
                "activeGameCount": 1,
                "uptime": 12.5
            })
        );
    }

    #[test]
    fn test_rooms_summary_json_format() {
        let summary = RoomsSummary {
            total_rooms: 4,
            active_games: 1,
            waiting_rooms: 3,
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["totalRooms"], 4);
        assert_eq!(json["waitingRooms"], 3);
    }
}
