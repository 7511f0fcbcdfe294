//! qt-core: Shared errors, configuration, and identifiers for quantum-teleport
//!
//! This crate provides the ambient infrastructure used by the server and
//! client crates: the session error taxonomy, TOML configuration
//! structures, random identifier/token minting, and time helpers.

pub mod config;
pub mod error;
pub mod ids;
pub mod time;

pub use error::{ConfigError, SessionError};
pub use ids::{new_id, new_token};
