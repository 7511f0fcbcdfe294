//! qt-protocol: Wire protocol and shared domain types for quantum-teleport
//!
//! This crate defines everything both sides of the wire must agree on:
//! the participant roles, the fixed six-step protocol table, the role
//! gate that decides which role may trigger which step, the Bloch-sphere
//! state carried by each qubit, the session snapshot, and the message
//! envelopes exchanged over HTTP and the push channel.
//!
//! It performs no I/O; the server and client crates both depend on it so
//! the client can mirror the role gate locally without a round-trip.

pub mod bloch;
pub mod message;
pub mod role;
pub mod session;
pub mod step;

pub use bloch::BlochState;
pub use message::{AdvanceRequest, ErrorBody, JoinRequest, JoinResponse, LeaveRequest, WsMessage};
pub use role::Role;
pub use session::{LocalView, Participant, QubitView, SessionSnapshot};
pub use step::{step_table, Step, StepInfo, STEP_COUNT};
