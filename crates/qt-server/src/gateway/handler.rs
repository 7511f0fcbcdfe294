//! WebSocket upgrade handler
//!
//! `GET /api/ws?session=<id>&token=<token>` upgrades to the push
//! channel. Credentials are validated before the connection is
//! registered; an invalid pair gets one terminal `error` frame and an
//! immediate close. A valid connection receives a `joined` snapshot,
//! then every subsequent mutation as `state_update` frames until either
//! side drops. Dropping marks the role disconnected but does not release
//! it.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use qt_protocol::WsMessage;

use crate::state::AppState;

/// Query parameters of the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub session: String,
    pub token: String,
}

/// Perform the upgrade and hand the socket to the connection loop.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, query: WsQuery) {
    let attached = match state.service.attach(&query.session, &query.token).await {
        Ok(attached) => attached,
        Err(err) => {
            tracing::warn!(session = %query.session, %err, "gateway handshake rejected");
            let frame = WsMessage::Error {
                message: err.to_string(),
            };
            if let Ok(json) = serde_json::to_string(&frame) {
                let _ = socket.send(Message::Text(json)).await;
            }
            let _ = socket.close().await;
            return;
        }
    };

    let conn_id = attached.conn_id;
    let (mut ws_tx, mut ws_rx) = socket.split();

    // The joined snapshot goes out before any queued broadcast.
    match serde_json::to_string(&attached.joined) {
        Ok(json) => {
            if ws_tx.send(Message::Text(json)).await.is_err() {
                state.service.detach(&query.session, conn_id).await;
                return;
            }
        }
        Err(err) => {
            tracing::error!(%err, "failed to serialize joined message");
            state.service.detach(&query.session, conn_id).await;
            return;
        }
    }

    // Forward broadcasts until the gateway drops our sender or the peer
    // stops reading.
    let mut rx = attached.rx;
    let forward = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(%err, "failed to serialize push message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // The client never drives state over the socket; drain until it
    // closes or errors.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    state.service.detach(&query.session, conn_id).await;
    forward.abort();
    tracing::debug!(session = %query.session, conn_id, "push connection closed");
}
