//! Outbound routing: one unbounded channel per live connection.

use std::collections::HashMap;

use broadside_protocol::{ConnectionId, ServerEvent};
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use crate::dispatch::Delivery;

/// Sender half of a connection's outbound queue. The receiving half is
/// drained by that connection's writer task.
pub type EventSender = UnboundedSender<ServerEvent>;

/// Maps live connections to their outbound queues.
///
/// Enqueueing never blocks, so the handler can deliver while still
/// holding the store lock.
#[derive(Debug, Default)]
pub struct ConnectionHub {
    senders: Mutex<HashMap<ConnectionId, EventSender>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, conn_id: ConnectionId, sender: EventSender) {
        self.senders.lock().await.insert(conn_id, sender);
    }

    /// Drops the connection's sender. Its writer task drains what is
    /// already queued and then stops.
    pub async fn unregister(&self, conn_id: ConnectionId) {
        self.senders.lock().await.remove(&conn_id);
    }

    /// Enqueues every delivery for its recipients. Recipients that are
    /// gone are skipped.
    pub async fn deliver(&self, deliveries: Vec<Delivery>) {
        let senders = self.senders.lock().await;
        for delivery in deliveries {
            for conn_id in &delivery.recipients {
                let Some(sender) = senders.get(conn_id) else {
                    tracing::debug!(%conn_id, "no outbound queue, event dropped");
                    continue;
                };
                if sender.send(delivery.event.clone()).is_err() {
                    tracing::debug!(%conn_id, "writer gone, event dropped");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[tokio::test]
    async fn test_deliver_routes_to_each_recipient() {
        let hub = ConnectionHub::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        hub.register(conn(1), tx1).await;
        hub.register(conn(2), tx2).await;

        hub.deliver(vec![
            Delivery::to(conn(1), ServerEvent::LeftRoom),
            Delivery::to_all(vec![conn(1), conn(2)], ServerEvent::LeftRoom),
        ])
        .await;

        assert_eq!(rx1.try_recv().unwrap(), ServerEvent::LeftRoom);
        assert_eq!(rx1.try_recv().unwrap(), ServerEvent::LeftRoom);
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), ServerEvent::LeftRoom);
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_deliver_skips_unknown_and_closed_recipients() {
        let hub = ConnectionHub::new();
        let (tx, rx) = mpsc::unbounded_channel();
        hub.register(conn(1), tx).await;
        drop(rx);

        // Neither a closed queue nor an unknown id is an error.
        hub.deliver(vec![Delivery::to_all(
            vec![conn(1), conn(7)],
            ServerEvent::LeftRoom,
        )])
        .await;
    }

    #[tokio::test]
    async fn test_unregister_closes_queue() {
        let hub = ConnectionHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(conn(1), tx).await;

        hub.unregister(conn(1)).await;

        assert!(rx.recv().await.is_none());
        assert!(hub.senders.lock().await.is_empty());
    }
}
