//! Room capacity and sweep settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Players per room. A room with this many players is full.
pub const ROOM_CAPACITY: usize = 2;

/// Settings for the periodic stale-room sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// How often the sweeper runs.
    pub interval: Duration,

    /// Empty rooms older than this are deleted.
    pub max_age: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            max_age: Duration::from_secs(60 * 60),
        }
    }
}
