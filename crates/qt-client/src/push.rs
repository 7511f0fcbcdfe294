//! Push channel connection
//!
//! Opens the WebSocket side of the gateway with the (session, token)
//! pair and yields decoded [`WsMessage`] frames. Reconnection is the
//! caller's concern; presenting a still-valid token is all it takes.

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

use qt_protocol::WsMessage;

use crate::error::ClientError;

/// An open push channel scoped to one (session, role).
pub struct PushConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl PushConnection {
    /// Connect to the gateway. The server validates the pair before the
    /// first frame; invalid credentials produce one `error` frame
    /// followed by a close.
    pub async fn connect(
        ws_base: &str,
        session: &str,
        token: &str,
    ) -> Result<Self, ClientError> {
        let url = format!("{}/api/ws?session={}&token={}", ws_base, session, token);
        let (stream, _) = connect_async(&url).await?;
        Ok(Self { stream })
    }

    /// Next decoded message, or `None` once the channel is closed.
    /// Undecodable frames are logged and skipped.
    pub async fn next_message(&mut self) -> Option<WsMessage> {
        while let Some(result) = self.stream.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str(&text) {
                    Ok(message) => return Some(message),
                    Err(err) => {
                        tracing::warn!(%err, "failed to parse push message");
                    }
                },
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(%err, "push channel read failed");
                    return None;
                }
            }
        }
        None
    }

    /// Close the channel politely.
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
