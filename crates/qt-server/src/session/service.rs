//! The session service: single writer of session state
//!
//! Every mutation — join, advance, leave, gateway attach/detach — runs
//! under the session's own lock, so concurrent calls against one session
//! observe a total order while different sessions proceed in parallel.
//! Broadcasts happen before the lock is released so subscribers see
//! snapshots in commit order; delivery itself never blocks (see
//! [`crate::gateway::Gateway`]).

use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use qt_core::error::SessionError;
use qt_core::time::elapsed_duration;
use qt_core::{new_id, new_token};
use qt_protocol::{BlochState, JoinResponse, Role, SessionSnapshot, Step, WsMessage};

use crate::gateway::Gateway;
use crate::session::store::{Session, SessionStore};

/// Result of a successful gateway attach.
pub struct Attached {
    pub conn_id: u64,
    pub role: Role,
    pub rx: tokio::sync::mpsc::Receiver<WsMessage>,
    pub joined: WsMessage,
}

/// Exposes the five session operations plus gateway attach/detach.
pub struct SessionService {
    store: SessionStore,
    gateway: Arc<Gateway>,
}

impl SessionService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            store: SessionStore::new(),
            gateway,
        }
    }

    /// The push fan-out this service broadcasts through.
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Allocate a fresh session at step 0 with both roles untaken.
    pub async fn create(&self) -> SessionSnapshot {
        let session = Session::new(new_id(), random_unknown_state());
        let slot = self.store.insert(session);
        let session = slot.lock().await;
        tracing::info!(session = %session.id, "session created");
        session.snapshot()
    }

    /// Read-only lookup.
    pub async fn fetch(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        let slot = self.store.get(id).ok_or(SessionError::NotFound)?;
        let session = slot.lock().await;
        Ok(session.snapshot())
    }

    /// Claim a role, or resume an earlier claim when `existing_token`
    /// matches the role's current token.
    pub async fn join(
        &self,
        id: &str,
        role: Role,
        existing_token: Option<&str>,
    ) -> Result<JoinResponse, SessionError> {
        let slot = self.store.get(id).ok_or(SessionError::NotFound)?;
        let mut session = slot.lock().await;

        if let Some(existing) = existing_token {
            if session.resolve_token(existing) == Some(role) {
                // Idempotent re-join: same token back, no state change.
                session.touch();
                return Ok(JoinResponse {
                    token: existing.to_string(),
                    role,
                });
            }
        }

        if session.participants[&role].taken {
            return Err(SessionError::RoleTaken(role));
        }

        let token = new_token();
        session.tokens.insert(token.clone(), role);
        session.participant_mut(role).taken = true;
        session.push_log(format!("Role claimed: {}", role));
        session.touch();

        tracing::info!(session = %id, %role, "role joined");
        self.gateway.broadcast(&session.snapshot());
        Ok(JoinResponse { token, role })
    }

    /// Perform the current step and move the cursor forward by one.
    ///
    /// The single mutating entry point for progression: the role gate is
    /// checked against the step about to be performed, the step's
    /// transform is applied, and the updated snapshot is fanned out.
    pub async fn advance(&self, id: &str, token: &str) -> Result<SessionSnapshot, SessionError> {
        let slot = self.store.get(id).ok_or(SessionError::NotFound)?;
        let mut session = slot.lock().await;

        let role = session
            .resolve_token(token)
            .ok_or(SessionError::InvalidToken)?;

        if session.is_terminal() {
            return Err(SessionError::AlreadyComplete);
        }

        let step = session.current_step();
        if !step.permits(role) {
            return Err(SessionError::NotAllowed { role, step });
        }

        let title = session.steps[session.step_index].title.clone();
        apply_transform(&mut session, step);
        session.step_index += 1;
        session.push_log(format!("Step: {}", title));
        match step {
            Step::SendClassical => {
                session.push_log("Classical bits sent to Bob");
            }
            Step::Reconstruct => {
                session.push_log("State transferred, the original is destroyed.");
            }
            _ => {}
        }
        session.touch();

        tracing::info!(session = %id, %role, %step, step_index = session.step_index, "session advanced");
        let snapshot = session.snapshot();
        self.gateway.broadcast(&snapshot);
        Ok(snapshot)
    }

    /// Release a role and invalidate its token. Live push connections for
    /// the role are closed.
    pub async fn leave(&self, id: &str, token: &str) -> Result<SessionSnapshot, SessionError> {
        let slot = self.store.get(id).ok_or(SessionError::NotFound)?;
        let mut session = slot.lock().await;

        let role = session
            .resolve_token(token)
            .ok_or(SessionError::InvalidToken)?;

        session.tokens.remove(token);
        let participant = session.participant_mut(role);
        participant.taken = false;
        participant.connected = false;
        session.push_log(format!("Role released: {}", role));
        session.touch();

        self.gateway.close_role(id, role);

        tracing::info!(session = %id, %role, "role left");
        let snapshot = session.snapshot();
        self.gateway.broadcast(&snapshot);
        Ok(snapshot)
    }

    /// Validate a gateway handshake and subscribe the connection.
    ///
    /// Marks the participant connected, returns the receiver the
    /// connection forwards from plus the initial `joined` message, and
    /// tells the other subscribers about the connectivity change.
    pub async fn attach(&self, id: &str, token: &str) -> Result<Attached, SessionError> {
        let slot = self.store.get(id).ok_or(SessionError::NotFound)?;
        let mut session = slot.lock().await;

        let role = session
            .resolve_token(token)
            .ok_or(SessionError::InvalidToken)?;

        let (conn_id, rx) = self.gateway.subscribe(id, role);
        session.participant_mut(role).connected = true;
        session.touch();

        let snapshot = session.snapshot();
        let joined = WsMessage::Joined {
            local: snapshot.local_view(role),
            global: snapshot.clone(),
        };
        self.gateway.broadcast(&snapshot);

        tracing::info!(session = %id, %role, conn_id, "push connection attached");
        Ok(Attached {
            conn_id,
            role,
            rx,
            joined,
        })
    }

    /// Drop a push connection. The role stays taken and its token stays
    /// valid; `connected` clears only when the role's last connection is
    /// gone.
    pub async fn detach(&self, id: &str, conn_id: u64) {
        let role = self.gateway.unsubscribe(id, conn_id);

        let Some(slot) = self.store.get(id) else {
            return;
        };
        let mut session = slot.lock().await;

        if let Some(role) = role {
            if !self.gateway.role_connected(id, role) {
                session.participant_mut(role).connected = false;
            }
            tracing::info!(session = %id, %role, conn_id, "push connection detached");
        }
        session.touch();

        self.gateway.broadcast(&session.snapshot());
    }

    /// Remove sessions idle longer than `ttl`. Sessions with live
    /// subscribers or a held lock are skipped. Returns how many were
    /// removed.
    pub async fn sweep_expired(&self, ttl: Duration) -> usize {
        let mut removed = 0;
        for id in self.store.ids() {
            if self.gateway.has_subscribers(&id) {
                continue;
            }
            let Some(slot) = self.store.get(&id) else {
                continue;
            };
            // A locked session is being mutated right now, hence active.
            let expired = match slot.try_lock() {
                Ok(session) => elapsed_duration(session.last_activity) >= ttl,
                Err(_) => false,
            };
            if expired && self.store.remove(&id) {
                self.gateway.drop_session(&id);
                tracing::info!(session = %id, "removed expired session");
                removed += 1;
            }
        }
        removed
    }
}

/// Apply the deterministic state transform of the step being performed.
fn apply_transform(session: &mut Session, step: Step) {
    let hidden = session.hidden;
    match step {
        Step::Entangle => {
            let qubit = session.qubit_mut(Role::Bob);
            qubit.state = "Entangled pair ready".to_string();
            qubit.bloch = BlochState::equator(hidden.phi + PI / 2.0);
        }
        Step::Combine => {
            session.qubit_mut(Role::Alice).state = "Linked with the pair".to_string();
            session.qubit_mut(Role::Bob).bloch = BlochState::equator(hidden.phi + PI / 3.0);
        }
        Step::Measure => {
            let qubit = session.qubit_mut(Role::Alice);
            qubit.state = "Measured".to_string();
            qubit.bloch = BlochState::collapse(&hidden);
        }
        Step::SendClassical => {}
        Step::Reconstruct => {
            let qubit = session.qubit_mut(Role::Bob);
            qubit.state = "State reconstructed".to_string();
            qubit.bloch = hidden;
        }
        // Never performed: the gate rejects the terminal step.
        Step::Complete => {}
    }
}

/// A random full-length state away from the poles, so the unknown vector
/// is visually distinct from both measurement outcomes.
fn random_unknown_state() -> BlochState {
    let mut rng = rand::thread_rng();
    let theta = 0.2 * PI + rng.gen::<f64>() * 0.6 * PI;
    let phi = rng.gen::<f64>() * 2.0 * PI;
    BlochState::new(theta, phi)
}
