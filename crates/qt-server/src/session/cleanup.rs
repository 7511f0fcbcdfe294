//! Session expiry sweeper
//!
//! Sessions live in memory only, so abandoned ones must be collected.
//! A session is expired when it has no live push connections and nothing
//! has touched it (mutation or attach/detach) for the configured TTL.
//! The reference behavior leaves garbage collection unspecified; the TTL
//! policy here is a deliberate addition.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Run the expiry sweeper until `cancel` fires.
pub async fn run_expiry_sweeper(state: Arc<AppState>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(state.config.sweep_interval);

    tracing::info!(
        ttl = ?state.config.session_ttl,
        interval = ?state.config.sweep_interval,
        "starting session expiry sweeper"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = state.service.sweep_expired(state.config.session_ttl).await;
                if removed > 0 {
                    tracing::info!(removed, "swept expired sessions");
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("expiry sweeper shutting down");
                break;
            }
        }
    }
}
