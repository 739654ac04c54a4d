//! `BroadsideServer` builder and server loop.
//!
//! This is the entry point for running a Broadside server. It ties the
//! layers together: transport → protocol → dispatch → room store.

use std::sync::Arc;
use std::time::Instant;

use broadside_protocol::{Codec, JsonCodec};
use broadside_room::{SessionStore, SharedStore, SweepConfig, spawn_sweeper};
use broadside_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::BroadsideError;
use crate::handler::handle_connection;
use crate::hub::ConnectionHub;
use crate::status::StatusHandle;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The store
/// lock is always taken before the hub lock.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) store: SharedStore,
    pub(crate) hub: ConnectionHub,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Broadside server.
///
/// # Example
///
/// ```rust,no_run
/// use broadside::prelude::*;
///
/// # async fn run() -> Result<(), BroadsideError> {
/// let server = BroadsideServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BroadsideServerBuilder {
    bind_addr: String,
    sweep_config: SweepConfig,
}

impl BroadsideServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            sweep_config: SweepConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how often stale rooms are swept and how old they must be.
    pub fn sweep_config(mut self, config: SweepConfig) -> Self {
        self.sweep_config = config;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<BroadsideServer<JsonCodec>, BroadsideError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            store: Arc::new(Mutex::new(SessionStore::new())),
            hub: ConnectionHub::new(),
            codec: JsonCodec,
        });

        Ok(BroadsideServer {
            transport,
            state,
            sweep_config: self.sweep_config,
            started_at: Instant::now(),
        })
    }
}

impl Default for BroadsideServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Broadside server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BroadsideServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    sweep_config: SweepConfig,
    started_at: Instant,
}

impl BroadsideServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> BroadsideServerBuilder {
        BroadsideServerBuilder::new()
    }
}

impl<C: Codec> BroadsideServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle for querying server health. Stays valid while
    /// the server runs.
    pub fn status_handle(&self) -> StatusHandle {
        StatusHandle::new(Arc::clone(&self.state.store), self.started_at)
    }

    /// Runs the server accept loop.
    ///
    /// Starts the stale-room sweeper, then accepts connections and spawns
    /// a handler task for each. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), BroadsideError> {
        let _sweeper = spawn_sweeper(
            Arc::clone(&self.state.store),
            self.sweep_config,
        );
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Broadside server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
