//! Event dispatch: one inbound event in, one store operation, a list of
//! outbound deliveries back.
//!
//! [`dispatch`] is synchronous and does no I/O. The handler calls it while
//! holding the store lock and hands the result to the
//! [`ConnectionHub`](crate::hub::ConnectionHub) before releasing the lock,
//! so every connection sees events in the order the store applied them.

use broadside_protocol::{
    ClientEvent, ConnectionId, CreateRoom, GameStarted, JoinRoom,
    PlayerJoined, PlayerLeft, PlayerReady, PlayerStatusUpdated, RoomCreated,
    RoomJoined, RoomReady, ServerEvent, StartGame,
};
use broadside_room::{RoomError, SessionStore};

/// Something the dispatcher was asked to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A decoded client event.
    Event(ClientEvent),
    /// The connection went away without saying goodbye.
    Disconnected,
}

/// One outbound event and the connections it goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipients: Vec<ConnectionId>,
    pub event: ServerEvent,
}

impl Delivery {
    pub fn to(recipient: ConnectionId, event: ServerEvent) -> Self {
        Self {
            recipients: vec![recipient],
            event,
        }
    }

    pub fn to_all(recipients: Vec<ConnectionId>, event: ServerEvent) -> Self {
        Self { recipients, event }
    }
}

/// Applies `inbound` from `caller` to the store and returns who must hear
/// about it.
///
/// Failures are reported to the caller only. Create and join failures have
/// their own event names; every other failure is a plain `error`.
pub fn dispatch(
    store: &mut SessionStore,
    caller: ConnectionId,
    inbound: Inbound,
) -> Vec<Delivery> {
    match inbound {
        Inbound::Event(ClientEvent::CreateRoom(req)) => {
            create_room(store, caller, req)
        }
        Inbound::Event(ClientEvent::JoinRoom(req)) => {
            join_room(store, caller, req)
        }
        Inbound::Event(ClientEvent::StartGame(req)) => {
            start_game(store, caller, req)
        }
        Inbound::Event(ClientEvent::PlayerReady(req)) => {
            player_ready(store, caller, req)
        }
        Inbound::Event(ClientEvent::LeaveRoom(_)) => leave_room(store, caller),
        Inbound::Disconnected => disconnect(store, caller),
    }
}

fn create_room(
    store: &mut SessionStore,
    caller: ConnectionId,
    req: CreateRoom,
) -> Vec<Delivery> {
    match store.create_room(caller, &req.player_name, req.player_id) {
        Ok(created) => vec![Delivery::to(
            caller,
            ServerEvent::RoomCreated(RoomCreated {
                room_id: created.room_id,
                room: created.room,
            }),
        )],
        Err(e) => {
            tracing::debug!(conn_id = %caller, error = %e, "create-room rejected");
            vec![Delivery::to(
                caller,
                ServerEvent::RoomCreationError(e.to_error_body()),
            )]
        }
    }
}

fn join_room(
    store: &mut SessionStore,
    caller: ConnectionId,
    req: JoinRoom,
) -> Vec<Delivery> {
    let joined = match store.join_room(
        caller,
        &req.room_id,
        &req.player_name,
        req.player_id,
    ) {
        Ok(joined) => joined,
        Err(e) => {
            tracing::debug!(conn_id = %caller, error = %e, "join-room rejected");
            return vec![Delivery::to(
                caller,
                ServerEvent::JoinRoomError(e.to_error_body()),
            )];
        }
    };

    let room = joined.room;
    let mut out = vec![
        Delivery::to(
            caller,
            ServerEvent::RoomJoined(RoomJoined {
                room_id: req.room_id.clone(),
                room: room.clone(),
                message: format!("Successfully joined {}!", req.room_id),
            }),
        ),
        Delivery::to_all(
            room.connection_ids_except(caller),
            ServerEvent::PlayerJoined(PlayerJoined {
                player_name: req.player_name,
                players_count: room.players.len(),
                room: room.clone(),
            }),
        ),
    ];
    if joined.room_full {
        out.push(Delivery::to_all(
            room.connection_ids(),
            ServerEvent::RoomReady(RoomReady {
                message: "Room is full! Game can start.".into(),
                room,
            }),
        ));
    }
    out
}

fn start_game(
    store: &mut SessionStore,
    caller: ConnectionId,
    req: StartGame,
) -> Vec<Delivery> {
    match store.start_game(caller, &req.room_id) {
        Ok(room) => vec![Delivery::to_all(
            room.connection_ids(),
            ServerEvent::GameStarted(GameStarted {
                room,
                message: "Game started! Place your ships.".into(),
            }),
        )],
        Err(e) => error_to_caller(caller, "start-game", e),
    }
}

fn player_ready(
    store: &mut SessionStore,
    caller: ConnectionId,
    req: PlayerReady,
) -> Vec<Delivery> {
    let Some(update) = store.set_ready(caller, req.ready) else {
        tracing::debug!(conn_id = %caller, "player-ready from unseated connection ignored");
        return Vec::new();
    };
    vec![Delivery::to_all(
        update.room.connection_ids(),
        ServerEvent::PlayerStatusUpdated(PlayerStatusUpdated {
            player_name: update.player_name,
            ready: update.ready,
            room: update.room,
        }),
    )]
}

fn leave_room(store: &mut SessionStore, caller: ConnectionId) -> Vec<Delivery> {
    let Some(departure) = store.remove_member(caller) else {
        return Vec::new();
    };
    let mut out = vec![Delivery::to(caller, ServerEvent::LeftRoom)];
    if let Some(room) = departure.room {
        out.push(Delivery::to_all(
            room.connection_ids(),
            ServerEvent::PlayerLeft(PlayerLeft {
                player_name: departure.player_name,
                players_count: departure.remaining,
                room,
            }),
        ));
    }
    out
}

fn disconnect(store: &mut SessionStore, caller: ConnectionId) -> Vec<Delivery> {
    let Some(departure) = store.remove_member(caller) else {
        return Vec::new();
    };
    match departure.room {
        Some(room) => vec![Delivery::to_all(
            room.connection_ids(),
            ServerEvent::PlayerLeft(PlayerLeft {
                player_name: departure.player_name,
                players_count: departure.remaining,
                room,
            }),
        )],
        None => Vec::new(),
    }
}

fn error_to_caller(
    caller: ConnectionId,
    event: &'static str,
    err: RoomError,
) -> Vec<Delivery> {
    tracing::debug!(conn_id = %caller, event, error = %err, "request rejected");
    vec![Delivery::to(caller, ServerEvent::Error(err.to_error_body()))]
}
