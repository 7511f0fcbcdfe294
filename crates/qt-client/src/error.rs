//! Client-side error type

use thiserror::Error;

/// Errors surfaced by the API client and session controller.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server rejected the request; `message` is its human-readable
    /// reason (e.g. "role already taken: alice").
    #[error("{message}")]
    Api { status: u16, message: String },

    /// HTTP transport failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Push channel failure
    #[error("push channel error: {0}")]
    Push(#[from] tokio_tungstenite::tungstenite::Error),

    /// The controller was asked to do something its state does not allow
    #[error("invalid client state: {0}")]
    State(&'static str),
}

impl ClientError {
    /// HTTP status of an API rejection, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
