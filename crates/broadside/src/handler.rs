//! Per-connection handler: outbound queue, read loop, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound queue in the hub and spawn the writer task
//!   2. Loop: receive frames → decode `ClientEvent` → dispatch
//!   3. On exit, the drop guard runs the disconnect path

use std::sync::Arc;

use broadside_protocol::{
    ClientEvent, Codec, ConnectionId, ErrorBody, ErrorCode, ServerEvent,
};
use broadside_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::BroadsideError;
use crate::dispatch::{Delivery, Inbound, dispatch};
use crate::server::ServerState;

/// Drop guard that removes a connection from its room and from the hub
/// when the handler exits.
///
/// This ensures cleanup happens even if the handler returns early or
/// panics. Since `Drop` is synchronous, we spawn a fire-and-forget task
/// for the async locks.
struct ConnectionGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut store = state.store.lock().await;
            state.hub.unregister(conn_id).await;
            let deliveries =
                dispatch(&mut store, conn_id, Inbound::Disconnected);
            state.hub.deliver(deliveries).await;
            tracing::debug!(%conn_id, "connection cleaned up");
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), BroadsideError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::info!(%conn_id, "client connected");

    let (tx, rx) = mpsc::unbounded_channel();
    state.hub.register(conn_id, tx).await;
    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    tokio::spawn(write_loop(Arc::clone(&conn), Arc::clone(&state), rx));

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "client disconnected");
                break;
            }
            Err(e) => {
                tracing::info!(%conn_id, error = %e, "client connection lost");
                return Err(e.into());
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode event");
                state
                    .hub
                    .deliver(vec![Delivery::to(
                        conn_id,
                        ServerEvent::Error(ErrorBody::new(
                            ErrorCode::InvalidEvent,
                            e.to_string(),
                        )),
                    )])
                    .await;
                continue;
            }
        };

        tracing::debug!(%conn_id, event = event.name(), "event received");
        let mut store = state.store.lock().await;
        let deliveries = dispatch(&mut store, conn_id, Inbound::Event(event));
        state.hub.deliver(deliveries).await;
    }

    // _guard drops here → disconnect path fires.
    Ok(())
}

/// Encodes queued events and writes them to the socket. Ends once the hub
/// drops the sender and the queue is drained, or when a send fails.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut rx: UnboundedReceiver<ServerEvent>,
) {
    let conn_id = conn.id();
    while let Some(event) = rx.recv().await {
        let bytes = match state.codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            return;
        }
    }
    let _ = conn.close().await;
}
