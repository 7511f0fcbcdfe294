//! Client session controller
//!
//! Holds the client-side view of one session: the cached snapshot, the
//! claimed role, and the reconnection token. Push messages replace the
//! snapshot wholesale — the server is authoritative and the client never
//! merges partial updates. The controller also mirrors the role gate so
//! the UI can disable an `advance` that is certain to fail; the server
//! re-validates regardless.

use std::fmt;

use qt_core::config::ClientConfig;
use qt_protocol::{LocalView, Role, SessionSnapshot, WsMessage};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::push::PushConnection;

/// Client-visible connection lifecycle.
///
/// `idle → session_loaded → joining → connected ⇄ disconnected`, with an
/// explicit leave (or local reset) returning to `idle` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    Idle,
    SessionLoaded,
    Joining,
    Connected,
    Disconnected,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientStatus::Idle => write!(f, "idle"),
            ClientStatus::SessionLoaded => write!(f, "session_loaded"),
            ClientStatus::Joining => write!(f, "joining"),
            ClientStatus::Connected => write!(f, "connected"),
            ClientStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Drives the session API and reconciles push messages into a local
/// view model.
pub struct SessionController {
    api: ApiClient,
    ws_base: String,
    status: ClientStatus,
    session: Option<SessionSnapshot>,
    local: Option<LocalView>,
    role: Option<Role>,
    token: Option<String>,
}

impl SessionController {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            api: ApiClient::new(config.api_base.clone()),
            ws_base: config.ws_base.clone(),
            status: ClientStatus::Idle,
            session: None,
            local: None,
            role: None,
            token: None,
        }
    }

    pub fn status(&self) -> ClientStatus {
        self.status
    }

    pub fn session(&self) -> Option<&SessionSnapshot> {
        self.session.as_ref()
    }

    pub fn local(&self) -> Option<&LocalView> {
        self.local.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether a reconnection token is held (survives disconnects).
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Create a fresh session and load it. `idle → session_loaded`.
    pub async fn create(&mut self) -> Result<&SessionSnapshot, ClientError> {
        let snapshot = self.api.create().await?;
        self.load(snapshot);
        Ok(self.session.as_ref().expect("snapshot just loaded"))
    }

    /// Fetch an existing session and load it. `idle → session_loaded`;
    /// a failed lookup resets to `idle`.
    pub async fn lookup(&mut self, id: &str) -> Result<&SessionSnapshot, ClientError> {
        match self.api.fetch(id).await {
            Ok(snapshot) => {
                self.load(snapshot);
                Ok(self.session.as_ref().expect("snapshot just loaded"))
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }

    fn load(&mut self, snapshot: SessionSnapshot) {
        self.session = Some(snapshot);
        self.local = None;
        self.role = None;
        self.token = None;
        self.status = ClientStatus::SessionLoaded;
    }

    /// Claim a role on the loaded session. `session_loaded → joining`;
    /// the handshake that follows completes the transition to
    /// `connected`.
    pub async fn join(&mut self, role: Role) -> Result<(), ClientError> {
        let id = self.session_id()?;
        self.status = ClientStatus::Joining;
        match self.api.join(&id, role, self.token.as_deref()).await {
            Ok(joined) => {
                self.token = Some(joined.token);
                self.role = Some(joined.role);
                Ok(())
            }
            Err(err) => {
                self.status = ClientStatus::SessionLoaded;
                Err(err)
            }
        }
    }

    /// Adopt a previously issued token instead of contending for the
    /// role, e.g. when resuming after a process restart.
    pub fn resume(&mut self, role: Role, token: String) {
        self.role = Some(role);
        self.token = Some(token);
    }

    /// Open the push channel with the held token. Used both for the
    /// initial handshake and for reconnects — no new `join` call.
    pub async fn open_push(&mut self) -> Result<PushConnection, ClientError> {
        let id = self.session_id()?;
        let token = self
            .token
            .clone()
            .ok_or(ClientError::State("no token held"))?;
        self.status = ClientStatus::Joining;
        match PushConnection::connect(&self.ws_base, &id, &token).await {
            Ok(connection) => Ok(connection),
            Err(err) => {
                self.status = ClientStatus::Disconnected;
                Err(err)
            }
        }
    }

    /// Reconcile one push message. `joined`/`state_update` replace the
    /// cached snapshot and local view (last-write-wins); `error` implies
    /// no state change.
    pub fn apply_push(&mut self, message: &WsMessage) {
        match message {
            WsMessage::Joined { global, local } | WsMessage::StateUpdate { global, local } => {
                self.session = Some(global.clone());
                self.local = Some(local.clone());
                self.role = Some(local.role);
                self.status = ClientStatus::Connected;
            }
            WsMessage::Error { message } => {
                tracing::warn!(%message, "push channel error");
                if self.status != ClientStatus::Connected {
                    self.status = ClientStatus::SessionLoaded;
                }
            }
        }
    }

    /// The push channel dropped. Token and role are retained so a
    /// reconnect needs only the gateway handshake.
    pub fn mark_disconnected(&mut self) {
        if self.has_token() {
            self.status = ClientStatus::Disconnected;
        } else {
            self.reset();
        }
    }

    /// Mirror of the server's role gate: true when the cached role may
    /// perform the current step and the session is not terminal.
    pub fn can_advance(&self) -> bool {
        let (Some(role), Some(session)) = (self.role, self.session.as_ref()) else {
            return false;
        };
        if session.is_terminal() {
            return false;
        }
        session
            .current_step()
            .map(|step| step.permits(role))
            .unwrap_or(false)
    }

    /// Request an advance. The response snapshot replaces the cache; the
    /// broadcast that follows will bring the same state to everyone else.
    pub async fn advance(&mut self) -> Result<&SessionSnapshot, ClientError> {
        let id = self.session_id()?;
        let token = self
            .token
            .clone()
            .ok_or(ClientError::State("no token held"))?;
        let snapshot = self.api.advance(&id, &token).await?;
        if let Some(role) = self.role {
            self.local = Some(snapshot.local_view(role));
        }
        self.session = Some(snapshot);
        Ok(self.session.as_ref().expect("snapshot just stored"))
    }

    /// Release the role (when a token is held) and reset to `idle`.
    pub async fn leave(&mut self) -> Result<(), ClientError> {
        if let (Ok(id), Some(token)) = (self.session_id(), self.token.clone()) {
            self.api.leave(&id, &token).await?;
        }
        self.reset();
        Ok(())
    }

    /// Local reset to `idle`: drop the snapshot, role, and token.
    pub fn reset(&mut self) {
        self.session = None;
        self.local = None;
        self.role = None;
        self.token = None;
        self.status = ClientStatus::Idle;
    }

    fn session_id(&self) -> Result<String, ClientError> {
        self.session
            .as_ref()
            .map(|session| session.id.clone())
            .ok_or(ClientError::State("no session loaded"))
    }
}
