//! Session snapshot and its constituents
//!
//! The snapshot is the full, authoritative view of one session as the
//! server publishes it: over HTTP as a response body and over the push
//! channel inside a [`crate::message::WsMessage`]. Field names are
//! camelCase on the wire. Reconnection tokens never appear here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bloch::BlochState;
use crate::role::Role;
use crate::step::{Step, StepInfo};

/// A bound client role within a session.
///
/// `connected` implies `taken`: a live push connection can only exist for
/// a claimed role. A dropped connection clears `connected` but leaves the
/// role claimed; only an explicit leave releases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub role: Role,
    pub taken: bool,
    pub connected: bool,
}

impl Participant {
    /// An unclaimed slot for `role`.
    pub fn open(role: Role) -> Self {
        Self {
            role,
            taken: false,
            connected: false,
        }
    }
}

/// A simplified qubit within the visualizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitView {
    pub id: String,
    pub role: Role,
    pub state: String,
    pub bloch: BlochState,
}

/// The full session state as published to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub step_index: usize,
    pub steps: Vec<StepInfo>,
    pub qubits: Vec<QubitView>,
    pub log: Vec<String>,
    pub participants: BTreeMap<Role, Participant>,
}

impl SessionSnapshot {
    /// The step the session is currently parked at.
    pub fn current_step(&self) -> Option<Step> {
        self.steps.get(self.step_index).map(|info| info.key)
    }

    /// Whether the session has reached the terminal step.
    pub fn is_terminal(&self) -> bool {
        !self.steps.is_empty() && self.step_index >= self.steps.len() - 1
    }

    /// The role-scoped view sent alongside the snapshot on the push
    /// channel: the role plus its qubit's state label.
    pub fn local_view(&self, role: Role) -> LocalView {
        let state = self
            .qubits
            .iter()
            .find(|qubit| qubit.role == role)
            .map(|qubit| qubit.state.clone())
            .unwrap_or_default();
        LocalView { role, state }
    }
}

/// Role-specific data delivered next to the global snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalView {
    pub role: Role,
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::step_table;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            id: "abc123".to_string(),
            step_index: 0,
            steps: step_table(),
            qubits: vec![
                QubitView {
                    id: "q1".to_string(),
                    role: Role::Alice,
                    state: "Unknown state".to_string(),
                    bloch: BlochState::new(1.0, 2.0),
                },
                QubitView {
                    id: "q2".to_string(),
                    role: Role::Bob,
                    state: "Pure state".to_string(),
                    bloch: BlochState::pole(),
                },
            ],
            log: vec!["Session created, roles are open.".to_string()],
            participants: Role::ALL
                .into_iter()
                .map(|role| (role, Participant::open(role)))
                .collect(),
        }
    }

    #[test]
    fn test_snapshot_uses_camel_case_on_the_wire() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        assert!(json.contains("\"stepIndex\":0"));
        assert!(json.contains("\"participants\":{\"alice\""));
        let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot());
    }

    #[test]
    fn test_current_step_and_terminal() {
        let mut snap = snapshot();
        assert_eq!(snap.current_step(), Some(Step::Entangle));
        assert!(!snap.is_terminal());
        snap.step_index = snap.steps.len() - 1;
        assert_eq!(snap.current_step(), Some(Step::Complete));
        assert!(snap.is_terminal());
    }

    #[test]
    fn test_local_view_picks_the_roles_qubit() {
        let snap = snapshot();
        let local = snap.local_view(Role::Bob);
        assert_eq!(local.role, Role::Bob);
        assert_eq!(local.state, "Pure state");
    }
}
