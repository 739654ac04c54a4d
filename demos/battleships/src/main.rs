//! Battleships matchmaking server.
//!
//! Browser clients create or join rooms by code, and the host starts the
//! game once both seats are filled. Ship placement and shots are resolved
//! on the clients.
//!
//! Environment:
//! - `PORT`: listen port, default 3000
//! - `RUST_LOG`: log filter, default `info`

use std::time::Duration;

use broadside::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 3000;
const STATUS_LOG_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true).compact())
        .init();
}

fn port_from_env() -> u16 {
    match std::env::var("PORT") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(port = %raw, "PORT is not a valid port, using default");
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let addr = format!("0.0.0.0:{}", port_from_env());
    let server = BroadsideServer::builder()
        .bind(&addr)
        .sweep_config(SweepConfig::default())
        .build()
        .await?;

    let status = server.status_handle();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(STATUS_LOG_INTERVAL);
        loop {
            ticker.tick().await;
            let report = status.status().await;
            let rooms = status.rooms().await;
            tracing::info!(
                rooms = report.room_count,
                players = report.player_count,
                active_games = report.active_game_count,
                waiting_rooms = rooms.waiting_rooms,
                uptime_secs = report.uptime as u64,
                "server status"
            );
        }
    });

    tracing::info!(%addr, "battleships server starting");
    server.run().await?;
    Ok(())
}
