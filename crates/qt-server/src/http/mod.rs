//! HTTP surface: router and request handlers

mod handlers;
mod middleware;

pub use handlers::ApiError;

use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};

use crate::gateway::handler::ws_handler;
use crate::state::AppState;

/// Build the full router: REST endpoints, the WebSocket upgrade, and the
/// CORS/logging middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/api/sessions", post(handlers::create_session))
        .route("/api/sessions/:id", get(handlers::fetch_session))
        .route("/api/sessions/:id/join", post(handlers::join_session))
        .route("/api/sessions/:id/advance", post(handlers::advance_session))
        .route("/api/sessions/:id/leave", post(handlers::leave_session))
        .route("/api/ws", get(ws_handler))
        .layer(from_fn(middleware::cors_and_log))
        .with_state(state)
}
