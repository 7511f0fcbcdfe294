//! qt-client: Client-side session controller and CLI for quantum-teleport
//!
//! The [`controller::SessionController`] drives the server's five session
//! operations over HTTP, holds the reconnection token, and reconciles
//! push messages into a local view model. The CLI wraps it in one-shot
//! subcommands plus an interactive mode with automatic reconnection.

pub mod api;
pub mod backoff;
pub mod commands;
pub mod controller;
pub mod error;
pub mod output;
pub mod push;
pub mod render;

pub use api::ApiClient;
pub use controller::{ClientStatus, SessionController};
pub use error::ClientError;
