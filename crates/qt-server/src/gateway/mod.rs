//! Realtime gateway: per-session subscriber sets and push fan-out
//!
//! Each open WebSocket connection owns a bounded mpsc channel; the
//! gateway keeps the sender side, keyed by session id. Broadcasting a
//! snapshot is a synchronous walk over the session's subscriber set with
//! `try_send` into each channel — a slow or dead connection never blocks
//! the mutation path or delivery to other subscribers. A full channel
//! drops that update for that connection only (the next push carries a
//! complete snapshot anyway); a closed channel gets pruned.

pub mod handler;

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use qt_protocol::{Role, SessionSnapshot, WsMessage};

/// One open push connection.
struct Subscriber {
    conn_id: u64,
    role: Role,
    tx: mpsc::Sender<WsMessage>,
}

/// Fan-out registry for all sessions.
pub struct Gateway {
    subscribers: DashMap<String, Vec<Subscriber>>,
    next_conn_id: AtomicU64,
    push_buffer: usize,
}

impl Gateway {
    /// Create a gateway whose per-connection buffers hold `push_buffer`
    /// pending messages.
    pub fn new(push_buffer: usize) -> Self {
        Self {
            subscribers: DashMap::new(),
            next_conn_id: AtomicU64::new(1),
            push_buffer: push_buffer.max(1),
        }
    }

    /// Register a connection for a session. Returns the connection id and
    /// the receiver the connection forwards from.
    pub fn subscribe(&self, session_id: &str, role: Role) -> (u64, mpsc::Receiver<WsMessage>) {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.push_buffer);
        self.subscribers
            .entry(session_id.to_string())
            .or_default()
            .push(Subscriber { conn_id, role, tx });
        (conn_id, rx)
    }

    /// Remove a connection. Returns the role it was registered under.
    pub fn unsubscribe(&self, session_id: &str, conn_id: u64) -> Option<Role> {
        let mut entry = self.subscribers.get_mut(session_id)?;
        let position = entry.iter().position(|sub| sub.conn_id == conn_id)?;
        let subscriber = entry.remove(position);
        Some(subscriber.role)
    }

    /// Whether any live connection exists for `role` on this session.
    pub fn role_connected(&self, session_id: &str, role: Role) -> bool {
        self.subscribers
            .get(session_id)
            .map(|subs| subs.iter().any(|sub| sub.role == role && !sub.tx.is_closed()))
            .unwrap_or(false)
    }

    /// Whether the session has any subscribers at all.
    pub fn has_subscribers(&self, session_id: &str) -> bool {
        self.subscribers
            .get(session_id)
            .map(|subs| subs.iter().any(|sub| !sub.tx.is_closed()))
            .unwrap_or(false)
    }

    /// Drop every connection registered for `role`: their senders go
    /// away, so each connection's forward loop ends and the socket
    /// closes. Used when a role is released.
    pub fn close_role(&self, session_id: &str, role: Role) {
        if let Some(mut entry) = self.subscribers.get_mut(session_id) {
            entry.retain(|sub| sub.role != role);
        }
    }

    /// Forget a session entirely (expiry).
    pub fn drop_session(&self, session_id: &str) {
        self.subscribers.remove(session_id);
    }

    /// Fan a snapshot out to every open subscriber of its session, each
    /// with its own role-scoped local view. Fire-and-forget per
    /// connection; closed channels are pruned on the way.
    pub fn broadcast(&self, snapshot: &SessionSnapshot) {
        let Some(mut entry) = self.subscribers.get_mut(&snapshot.id) else {
            return;
        };
        entry.retain(|sub| {
            let message = WsMessage::StateUpdate {
                global: snapshot.clone(),
                local: snapshot.local_view(sub.role),
            };
            match sub.tx.try_send(message) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        session = %snapshot.id,
                        conn_id = sub.conn_id,
                        "push buffer full, dropping update for slow subscriber"
                    );
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            }
        });
    }

    /// Total open connections across all sessions.
    pub fn connection_count(&self) -> usize {
        self.subscribers.iter().map(|entry| entry.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qt_protocol::step_table;
    use std::collections::BTreeMap;

    fn snapshot(id: &str) -> SessionSnapshot {
        SessionSnapshot {
            id: id.to_string(),
            step_index: 0,
            steps: step_table(),
            qubits: vec![],
            log: vec![],
            participants: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let gateway = Gateway::new(8);
        let (_, mut rx_a) = gateway.subscribe("s1", Role::Alice);
        let (_, mut rx_b) = gateway.subscribe("s1", Role::Bob);

        gateway.broadcast(&snapshot("s1"));

        for rx in [&mut rx_a, &mut rx_b] {
            let message = rx.recv().await.unwrap();
            assert!(matches!(message, WsMessage::StateUpdate { .. }));
        }
    }

    #[tokio::test]
    async fn test_broadcast_is_scoped_to_the_session() {
        let gateway = Gateway::new(8);
        let (_, mut rx_other) = gateway.subscribe("s2", Role::Alice);

        gateway.broadcast(&snapshot("s1"));
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_subscriber_is_pruned_without_blocking() {
        let gateway = Gateway::new(8);
        let (_, rx_dead) = gateway.subscribe("s1", Role::Alice);
        let (_, mut rx_live) = gateway.subscribe("s1", Role::Bob);
        drop(rx_dead);

        gateway.broadcast(&snapshot("s1"));
        assert!(rx_live.recv().await.is_some());
        assert_eq!(gateway.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_full_buffer_drops_update_but_keeps_subscriber() {
        let gateway = Gateway::new(1);
        let (_, mut rx) = gateway.subscribe("s1", Role::Alice);

        gateway.broadcast(&snapshot("s1"));
        gateway.broadcast(&snapshot("s1")); // buffer full, dropped

        assert_eq!(gateway.connection_count(), 1);
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_close_role_removes_only_that_role() {
        let gateway = Gateway::new(8);
        let (_, _rx_alice) = gateway.subscribe("s1", Role::Alice);
        let (_, _rx_bob) = gateway.subscribe("s1", Role::Bob);

        gateway.close_role("s1", Role::Alice);
        assert!(!gateway.role_connected("s1", Role::Alice));
        assert!(gateway.role_connected("s1", Role::Bob));
    }

    #[tokio::test]
    async fn test_unsubscribe_returns_role() {
        let gateway = Gateway::new(8);
        let (conn_id, _rx) = gateway.subscribe("s1", Role::Bob);
        assert_eq!(gateway.unsubscribe("s1", conn_id), Some(Role::Bob));
        assert_eq!(gateway.unsubscribe("s1", conn_id), None);
    }
}
