//! Runtime settings for the arena server.

use shared::{HEARTBEAT_TIMEOUT_MS, SERVER_PORT};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the datagram socket binds to.
    pub bind_addr: String,
    /// How often queued datagrams are drained.
    pub poll_interval: Duration,
    /// How often the world is advanced and a snapshot is sent.
    pub broadcast_interval: Duration,
    /// Silence after which a slot is freed.
    pub heartbeat_timeout: Duration,
    /// Upper bound on the elapsed time integrated in a single tick.
    pub max_delta: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", SERVER_PORT),
            poll_interval: Duration::from_millis(10),
            broadcast_interval: Duration::from_millis(100),
            heartbeat_timeout: Duration::from_millis(HEARTBEAT_TIMEOUT_MS),
            max_delta: Duration::from_millis(250),
        }
    }
}

impl ServerConfig {
    /// Elapsed time to integrate for one tick, capped at `max_delta`.
    ///
    /// Returns the seconds to use and whether the cap was applied.
    pub fn tick_delta(&self, elapsed: Duration) -> (f32, bool) {
        if elapsed > self.max_delta {
            (self.max_delta.as_secs_f32(), true)
        } else {
            (elapsed.as_secs_f32(), false)
        }
    }
}
