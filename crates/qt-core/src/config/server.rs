//! Server configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::duration_secs;

/// Configuration for the session server daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP/WebSocket server to
    pub bind_address: String,

    /// How long an idle session survives before the sweeper removes it.
    /// Every mutation and every gateway attach/detach refreshes the clock.
    #[serde(with = "duration_secs")]
    pub session_ttl: Duration,

    /// Interval between expiry sweeps
    #[serde(with = "duration_secs")]
    pub sweep_interval: Duration,

    /// Capacity of each push connection's outbound buffer. A subscriber
    /// that falls this many messages behind starts losing intermediate
    /// updates; it still receives the latest snapshot on the next push.
    pub push_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            session_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
            push_buffer: 64,
        }
    }
}
