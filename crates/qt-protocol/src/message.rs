//! Request/response bodies and the push-channel envelope
//!
//! The HTTP surface exchanges small JSON bodies; the push channel speaks
//! [`WsMessage`], tagged by a snake_case `type` field. `joined` and
//! `state_update` carry the authoritative snapshot plus a role-scoped
//! local view; `error` carries a human-readable reason and implies no
//! state change.

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::session::{LocalView, SessionSnapshot};

/// Body of a join request. `token` resumes an earlier claim on the role
/// instead of contending for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Successful join: the secret that proves ownership of the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub token: String,
    pub role: Role,
}

/// Body of an advance request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub token: String,
}

/// Body of a leave request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub token: String,
}

/// JSON error body returned by the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Envelope pushed over the persistent channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// First message after a successful handshake: the current snapshot.
    Joined {
        global: SessionSnapshot,
        local: LocalView,
    },

    /// Pushed to every open subscriber after each accepted mutation.
    StateUpdate {
        global: SessionSnapshot,
        local: LocalView,
    },

    /// Human-readable failure; session state is untouched.
    Error { message: String },
}

impl WsMessage {
    /// The snapshot carried by this message, if any.
    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        match self {
            WsMessage::Joined { global, .. } | WsMessage::StateUpdate { global, .. } => {
                Some(global)
            }
            WsMessage::Error { .. } => None,
        }
    }
}
