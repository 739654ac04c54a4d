//! Background removal of stale empty rooms.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{SessionStore, SweepConfig};

/// The store as the server shares it: one lock around all room state.
pub type SharedStore = Arc<Mutex<SessionStore>>;

/// Spawns a task that sweeps `store` every `config.interval`.
///
/// The first sweep runs one full interval after spawning. The task runs
/// until aborted; dropping the returned handle does not stop it.
pub fn spawn_sweeper(store: SharedStore, config: SweepConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + config.interval;
        let mut ticker = tokio::time::interval_at(start, config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(
            interval_secs = config.interval.as_secs(),
            max_age_secs = config.max_age.as_secs(),
            "room sweeper started"
        );

        loop {
            ticker.tick().await;
            // tokio's clock, so paused-time tests age rooms too.
            let now = tokio::time::Instant::now().into_std();
            let swept = store.lock().await.sweep_stale_rooms(now, config.max_age);
            tracing::trace!(swept, "sweep pass finished");
        }
    })
}
