//! Global server state

use std::sync::Arc;
use std::time::Instant;

use qt_core::config::ServerConfig;

use crate::gateway::Gateway;
use crate::session::SessionService;

/// Global state for the session server daemon.
pub struct AppState {
    /// Configuration
    pub config: ServerConfig,
    /// The single writer of session state
    pub service: SessionService,
    /// When the server started
    pub start_time: Instant,
}

impl AppState {
    /// Create server state from configuration.
    pub fn new(config: ServerConfig) -> Self {
        let gateway = Arc::new(Gateway::new(config.push_buffer));
        Self {
            config,
            service: SessionService::new(gateway),
            start_time: Instant::now(),
        }
    }
}
