//! Read-only health queries over a running server.

use std::time::Instant;

use broadside_protocol::{RoomsSummary, StatusReport};
use broadside_room::SharedStore;

/// Cheap, cloneable view of server health. Obtain one with
/// [`BroadsideServer::status_handle`](crate::BroadsideServer::status_handle).
#[derive(Clone)]
pub struct StatusHandle {
    store: SharedStore,
    started_at: Instant,
}

impl StatusHandle {
    pub(crate) fn new(store: SharedStore, started_at: Instant) -> Self {
        Self { store, started_at }
    }

    /// Room, player, and game counts plus seconds since the server was
    /// built.
    pub async fn status(&self) -> StatusReport {
        let stats = self.store.lock().await.stats();
        StatusReport {
            room_count: stats.room_count,
            player_count: stats.player_count,
            active_game_count: stats.active_game_count,
            uptime: self.started_at.elapsed().as_secs_f64(),
        }
    }

    /// Room totals split into running games and waiting rooms.
    pub async fn rooms(&self) -> RoomsSummary {
        self.store.lock().await.stats().summary()
    }
}

impl std::fmt::Debug for StatusHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusHandle")
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use broadside_protocol::ConnectionId;
    use broadside_room::SessionStore;
    use tokio::sync::Mutex;

    use super::*;

    #[tokio::test]
    async fn test_status_reports_store_counts() {
        let store: SharedStore = Arc::new(Mutex::new(SessionStore::new()));
        let handle = StatusHandle::new(Arc::clone(&store), Instant::now());
        {
            let mut s = store.lock().await;
            let created = s.create_room(ConnectionId::new(1), "Alice", None).unwrap();
            s.join_room(ConnectionId::new(2), &created.room_id, "Bob", None)
                .unwrap();
            s.start_game(ConnectionId::new(1), &created.room_id).unwrap();
            s.create_room(ConnectionId::new(3), "Carol", None).unwrap();
        }

        let status = handle.status().await;
        assert_eq!(status.room_count, 2);
        assert_eq!(status.player_count, 3);
        assert_eq!(status.active_game_count, 1);
        assert!(status.uptime >= 0.0);

        let rooms = handle.rooms().await;
        assert_eq!(
            rooms,
            RoomsSummary {
                total_rooms: 2,
                active_games: 1,
                waiting_rooms: 1,
            }
        );
    }
}
