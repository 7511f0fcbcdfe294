//! qt-server: Authoritative session server for quantum-teleport
//!
//! The server owns every session's state machine. Clients drive it
//! through a small HTTP surface (create/fetch/join/advance/leave) and
//! observe it through a WebSocket push channel that fans out a fresh
//! snapshot after every accepted mutation. All mutation goes through the
//! session service; nothing else touches session state.

pub mod gateway;
pub mod http;
pub mod session;
pub mod state;

pub use gateway::Gateway;
pub use session::{SessionService, SessionStore};
pub use state::AppState;
