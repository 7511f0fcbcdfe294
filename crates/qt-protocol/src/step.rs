//! The fixed step sequence and the role gate
//!
//! The protocol is a fixed, ordered list of six steps. Sessions copy the
//! table at creation time so a snapshot is self-describing; the table
//! itself never changes at runtime.
//!
//! Advancing a session means *performing* the current step: the role gate
//! is evaluated against the step the caller is about to perform, and on
//! success the cursor moves to the next step. The terminal `complete`
//! step is never performed, so a session parked there accepts no further
//! advances.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::Role;

/// Number of steps in the protocol, terminal step included.
pub const STEP_COUNT: usize = 6;

/// A stage of the teleportation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Entangle,
    Combine,
    Measure,
    SendClassical,
    Reconstruct,
    Complete,
}

impl Step {
    /// All steps in protocol order.
    pub const ALL: [Step; STEP_COUNT] = [
        Step::Entangle,
        Step::Combine,
        Step::Measure,
        Step::SendClassical,
        Step::Reconstruct,
        Step::Complete,
    ];

    /// Whether `role` is permitted to perform this step.
    ///
    /// Alice drives the quantum half of the protocol, Bob the classical
    /// half; either party may kick off the shared entanglement. Nobody
    /// performs the terminal step.
    pub fn permits(&self, role: Role) -> bool {
        match self {
            Step::Entangle => true,
            Step::Combine | Step::Measure => role == Role::Alice,
            Step::SendClassical | Step::Reconstruct => role == Role::Bob,
            Step::Complete => false,
        }
    }

    /// Lowercase wire key, e.g. `send_classical`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Entangle => "entangle",
            Step::Combine => "combine",
            Step::Measure => "measure",
            Step::SendClassical => "send_classical",
            Step::Reconstruct => "reconstruct",
            Step::Complete => "complete",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable context for a protocol step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    pub key: Step,
    pub title: String,
    pub description: String,
}

impl StepInfo {
    fn new(key: Step, title: &str, description: &str) -> Self {
        Self {
            key,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// The step definition table: the six steps with their display metadata.
///
/// Sessions copy this at creation; callers own the returned vector.
pub fn step_table() -> Vec<StepInfo> {
    vec![
        StepInfo::new(
            Step::Entangle,
            "Prepare the entangled pair",
            "An entangled pair of qubits is created and one half is handed to each party.",
        ),
        StepInfo::new(
            Step::Combine,
            "Combine the states",
            "Alice joins her unknown qubit with her half of the entangled pair.",
        ),
        StepInfo::new(
            Step::Measure,
            "Alice's measurement",
            "Alice performs a joint measurement, destroying the original state.",
        ),
        StepInfo::new(
            Step::SendClassical,
            "Classical transmission",
            "The measurement outcome travels to Bob over an ordinary channel.",
        ),
        StepInfo::new(
            Step::Reconstruct,
            "Reconstruction at Bob's side",
            "Bob applies the corrections and recovers Alice's state.",
        ),
        StepInfo::new(
            Step::Complete,
            "Done",
            "The state has been transferred; the original is destroyed.",
        ),
    ]
}
