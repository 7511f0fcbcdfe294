//! In-memory session store
//!
//! The store maps session ids to sessions, each behind its own
//! `tokio::sync::Mutex`. Holding a session's lock serializes every
//! mutating operation on that session; operations on different sessions
//! never contend. The session service is the only code that locks these
//! entries.

use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use qt_core::time::current_time_millis;
use qt_protocol::{
    step_table, BlochState, Participant, QubitView, Role, SessionSnapshot, Step, StepInfo,
};

/// All live sessions, indexed by id.
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<Session>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Insert a freshly created session.
    pub fn insert(&self, session: Session) -> Arc<Mutex<Session>> {
        let id = session.id.clone();
        let slot = Arc::new(Mutex::new(session));
        self.sessions.insert(id, Arc::clone(&slot));
        slot
    }

    /// Look up a session by id.
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(id).map(|entry| Arc::clone(&entry))
    }

    /// Remove a session; returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Ids of all live sessions.
    pub fn ids(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Authoritative state of one session.
///
/// The hidden pre-measurement state and the token table stay server-side;
/// [`Session::snapshot`] produces the client-visible view.
pub struct Session {
    pub(crate) id: String,
    pub(crate) step_index: usize,
    pub(crate) steps: Vec<StepInfo>,
    pub(crate) qubits: Vec<QubitView>,
    pub(crate) log: Vec<String>,
    pub(crate) participants: BTreeMap<Role, Participant>,
    /// token -> role, independent of any live connection. Reconnecting is
    /// just presenting a valid token to the gateway.
    pub(crate) tokens: HashMap<String, Role>,
    /// Alice's original unknown state, restored at reconstruction.
    pub(crate) hidden: BlochState,
    /// Millisecond timestamp of the last mutation or attach/detach.
    pub(crate) last_activity: u64,
}

impl Session {
    /// A fresh session at step 0 with both roles untaken. `hidden` is the
    /// unknown state Alice will teleport; her qubit starts there, Bob's
    /// at the pure pole state.
    pub fn new(id: String, hidden: BlochState) -> Self {
        Self {
            id,
            step_index: 0,
            steps: step_table(),
            qubits: vec![
                QubitView {
                    id: "q1".to_string(),
                    role: Role::Alice,
                    state: "Unknown state".to_string(),
                    bloch: hidden,
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
            tokens: HashMap::new(),
            hidden,
            last_activity: current_time_millis(),
        }
    }

    /// The step the session is parked at.
    pub fn current_step(&self) -> Step {
        self.steps[self.step_index].key
    }

    /// Whether the session has reached the terminal step.
    pub fn is_terminal(&self) -> bool {
        self.step_index >= self.steps.len() - 1
    }

    /// Resolve a reconnection token to its role.
    pub fn resolve_token(&self, token: &str) -> Option<Role> {
        self.tokens.get(token).copied()
    }

    pub(crate) fn participant_mut(&mut self, role: Role) -> &mut Participant {
        self.participants
            .get_mut(&role)
            .expect("participants map holds every role")
    }

    pub(crate) fn qubit_mut(&mut self, role: Role) -> &mut QubitView {
        self.qubits
            .iter_mut()
            .find(|qubit| qubit.role == role)
            .expect("each role owns one qubit")
    }

    pub(crate) fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// Refresh the activity clock used by the expiry sweeper.
    pub(crate) fn touch(&mut self) {
        self.last_activity = current_time_millis();
    }

    /// The client-visible view: everything except tokens and the hidden
    /// state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            step_index: self.step_index,
            steps: self.steps.clone(),
            qubits: self.qubits.clone(),
            log: self.log.clone(),
            participants: self.participants.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("s1".to_string(), BlochState::new(1.2, 0.7))
    }

    #[test]
    fn test_new_session_shape() {
        let session = session();
        assert_eq!(session.step_index, 0);
        assert_eq!(session.current_step(), Step::Entangle);
        assert!(!session.is_terminal());
        assert_eq!(session.qubits.len(), 2);
        assert_eq!(session.participants.len(), 2);
        assert!(session.participants.values().all(|p| !p.taken && !p.connected));
        assert_eq!(session.log.len(), 1);
    }

    #[test]
    fn test_snapshot_hides_tokens_and_hidden_state() {
        let mut session = session();
        session.tokens.insert("secret".to_string(), Role::Alice);
        let json = serde_json::to_string(&session.snapshot()).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("hidden"));
    }

    #[test]
    fn test_store_insert_get_remove() {
        let store = SessionStore::new();
        assert!(store.is_empty());
        store.insert(session());
        assert_eq!(store.len(), 1);
        assert!(store.get("s1").is_some());
        assert!(store.get("missing").is_none());
        assert!(store.remove("s1"));
        assert!(!store.remove("s1"));
    }
}
