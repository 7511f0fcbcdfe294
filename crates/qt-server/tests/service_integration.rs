//! Session service integration tests
//!
//! Exercise the five operations plus gateway attach/detach directly
//! against the service, without the HTTP layer.

use std::sync::Arc;
use std::time::Duration;

use qt_core::config::ServerConfig;
use qt_core::error::SessionError;
use qt_protocol::{Role, Step, WsMessage};
use qt_server::AppState;

fn create_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(ServerConfig::default()))
}

#[tokio::test]
async fn test_create_session_initial_state() {
    let state = create_test_state();

    let session = state.service.create().await;

    assert!(!session.id.is_empty());
    assert_eq!(session.step_index, 0);
    assert_eq!(session.steps.len(), 6);
    assert_eq!(session.current_step(), Some(Step::Entangle));
    assert_eq!(session.participants.len(), 2);
    for participant in session.participants.values() {
        assert!(!participant.taken);
        assert!(!participant.connected);
    }
    assert_eq!(session.qubits.len(), 2);
    assert!(!session.log.is_empty());
}

#[tokio::test]
async fn test_fetch_unknown_session_fails() {
    let state = create_test_state();
    let result = state.service.fetch("missing").await;
    assert_eq!(result.unwrap_err(), SessionError::NotFound);
}

#[tokio::test]
async fn test_join_assigns_token_and_prevents_conflict() {
    let state = create_test_state();
    let session = state.service.create().await;

    let joined = state
        .service
        .join(&session.id, Role::Alice, None)
        .await
        .expect("first join should succeed");
    assert!(!joined.token.is_empty());
    assert_eq!(joined.role, Role::Alice);

    let conflict = state.service.join(&session.id, Role::Alice, None).await;
    assert_eq!(conflict.unwrap_err(), SessionError::RoleTaken(Role::Alice));

    // The session now shows the role as taken but not connected.
    let snapshot = state.service.fetch(&session.id).await.unwrap();
    let alice = &snapshot.participants[&Role::Alice];
    assert!(alice.taken);
    assert!(!alice.connected);
}

#[tokio::test]
async fn test_join_with_matching_token_is_idempotent() {
    let state = create_test_state();
    let session = state.service.create().await;

    let first = state
        .service
        .join(&session.id, Role::Bob, None)
        .await
        .unwrap();
    let rejoin = state
        .service
        .join(&session.id, Role::Bob, Some(&first.token))
        .await
        .expect("re-join with the matching token should succeed");
    assert_eq!(rejoin.token, first.token);

    // A stale token does not bypass the conflict check.
    let stolen = state
        .service
        .join(&session.id, Role::Bob, Some("forged"))
        .await;
    assert_eq!(stolen.unwrap_err(), SessionError::RoleTaken(Role::Bob));
}

#[tokio::test]
async fn test_advance_requires_valid_token() {
    let state = create_test_state();
    let session = state.service.create().await;

    let result = state.service.advance(&session.id, "forged").await;
    assert_eq!(result.unwrap_err(), SessionError::InvalidToken);
}

#[tokio::test]
async fn test_full_protocol_run_restores_the_hidden_state() {
    let state = create_test_state();
    let session = state.service.create().await;
    let original = session.qubits[0].bloch;

    let alice = state
        .service
        .join(&session.id, Role::Alice, None)
        .await
        .unwrap();
    let bob = state
        .service
        .join(&session.id, Role::Bob, None)
        .await
        .unwrap();

    // Alice performs entangle, combine, measure.
    for expected_index in 1..=3 {
        let snapshot = state
            .service
            .advance(&session.id, &alice.token)
            .await
            .expect("alice's steps should succeed");
        assert_eq!(snapshot.step_index, expected_index);
    }

    // After the measurement Alice's qubit no longer carries the original.
    let snapshot = state.service.fetch(&session.id).await.unwrap();
    assert_ne!(snapshot.qubits[0].bloch, original);
    assert_eq!(snapshot.qubits[0].state, "Measured");

    // Alice cannot perform Bob's half.
    let denied = state.service.advance(&session.id, &alice.token).await;
    assert_eq!(
        denied.unwrap_err(),
        SessionError::NotAllowed {
            role: Role::Alice,
            step: Step::SendClassical,
        }
    );

    // Bob performs send_classical and reconstruct.
    let snapshot = state
        .service
        .advance(&session.id, &bob.token)
        .await
        .unwrap();
    assert_eq!(snapshot.step_index, 4);
    let snapshot = state
        .service
        .advance(&session.id, &bob.token)
        .await
        .unwrap();
    assert_eq!(snapshot.step_index, 5);
    assert_eq!(snapshot.current_step(), Some(Step::Complete));

    // The defining guarantee: Bob's qubit holds Alice's original state.
    assert_eq!(snapshot.qubits[1].bloch, original);
    assert_eq!(snapshot.qubits[1].state, "State reconstructed");

    // Terminal: nobody advances further.
    let done = state.service.advance(&session.id, &bob.token).await;
    assert_eq!(done.unwrap_err(), SessionError::AlreadyComplete);
    let done = state.service.advance(&session.id, &alice.token).await;
    assert_eq!(done.unwrap_err(), SessionError::AlreadyComplete);
}

#[tokio::test]
async fn test_gate_blocks_bob_on_alices_steps() {
    let state = create_test_state();
    let session = state.service.create().await;

    let alice = state
        .service
        .join(&session.id, Role::Alice, None)
        .await
        .unwrap();
    let bob = state
        .service
        .join(&session.id, Role::Bob, None)
        .await
        .unwrap();

    // Either party may entangle; let Alice do it.
    state.service.advance(&session.id, &alice.token).await.unwrap();

    // combine and measure are Alice's.
    for expected_step in [Step::Combine, Step::Measure] {
        let denied = state.service.advance(&session.id, &bob.token).await;
        assert_eq!(
            denied.unwrap_err(),
            SessionError::NotAllowed {
                role: Role::Bob,
                step: expected_step,
            }
        );
        state.service.advance(&session.id, &alice.token).await.unwrap();
    }

    let snapshot = state.service.fetch(&session.id).await.unwrap();
    assert_eq!(snapshot.step_index, 3);
}

#[tokio::test]
async fn test_concurrent_advances_only_one_wins_per_step() {
    let state = create_test_state();
    let session = state.service.create().await;

    // Bob may perform entangle but not the combine step that follows, so
    // of many racing advances exactly one can win.
    let bob = state
        .service
        .join(&session.id, Role::Bob, None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = Arc::clone(&state);
        let id = session.id.clone();
        let token = bob.token.clone();
        handles.push(tokio::spawn(async move {
            state.service.advance(&id, &token).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(snapshot) => {
                successes += 1;
                assert_eq!(snapshot.step_index, 1);
            }
            Err(SessionError::NotAllowed { role, step }) => {
                assert_eq!(role, Role::Bob);
                assert_eq!(step, Step::Combine);
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);

    let snapshot = state.service.fetch(&session.id).await.unwrap();
    assert_eq!(snapshot.step_index, 1);
}

#[tokio::test]
async fn test_leave_invalidates_the_token() {
    let state = create_test_state();
    let session = state.service.create().await;

    let alice = state
        .service
        .join(&session.id, Role::Alice, None)
        .await
        .unwrap();

    let snapshot = state
        .service
        .leave(&session.id, &alice.token)
        .await
        .unwrap();
    let participant = &snapshot.participants[&Role::Alice];
    assert!(!participant.taken);
    assert!(!participant.connected);

    // The token is gone for every operation, leave included.
    let advance = state.service.advance(&session.id, &alice.token).await;
    assert_eq!(advance.unwrap_err(), SessionError::InvalidToken);
    let again = state.service.leave(&session.id, &alice.token).await;
    assert_eq!(again.unwrap_err(), SessionError::InvalidToken);

    // The freed role can be claimed anew.
    let rejoined = state.service.join(&session.id, Role::Alice, None).await;
    assert!(rejoined.is_ok());
}

#[tokio::test]
async fn test_attach_marks_connected_and_detach_preserves_the_claim() {
    let state = create_test_state();
    let session = state.service.create().await;

    let alice = state
        .service
        .join(&session.id, Role::Alice, None)
        .await
        .unwrap();

    let attached = state
        .service
        .attach(&session.id, &alice.token)
        .await
        .expect("attach with a valid token should succeed");
    assert_eq!(attached.role, Role::Alice);
    assert!(matches!(attached.joined, WsMessage::Joined { .. }));

    let snapshot = state.service.fetch(&session.id).await.unwrap();
    assert!(snapshot.participants[&Role::Alice].connected);

    // Dropping the connection clears `connected` but not `taken`.
    let step_before = snapshot.step_index;
    state.service.detach(&session.id, attached.conn_id).await;
    let snapshot = state.service.fetch(&session.id).await.unwrap();
    let participant = &snapshot.participants[&Role::Alice];
    assert!(!participant.connected);
    assert!(participant.taken);
    assert_eq!(snapshot.step_index, step_before);

    // Reconnecting with the same token restores `connected`.
    let reattached = state
        .service
        .attach(&session.id, &alice.token)
        .await
        .expect("reconnect with the retained token should succeed");
    let snapshot = state.service.fetch(&session.id).await.unwrap();
    assert!(snapshot.participants[&Role::Alice].connected);
    state.service.detach(&session.id, reattached.conn_id).await;
}

#[tokio::test]
async fn test_attach_rejects_bad_credentials() {
    let state = create_test_state();
    let session = state.service.create().await;

    let result = state.service.attach(&session.id, "forged").await;
    assert!(matches!(result, Err(SessionError::InvalidToken)));

    let result = state.service.attach("missing", "whatever").await;
    assert!(matches!(result, Err(SessionError::NotFound)));
}

#[tokio::test]
async fn test_attached_observer_sees_other_participants_mutations() {
    let state = create_test_state();
    let session = state.service.create().await;

    let alice = state
        .service
        .join(&session.id, Role::Alice, None)
        .await
        .unwrap();
    let bob = state
        .service
        .join(&session.id, Role::Bob, None)
        .await
        .unwrap();

    let mut attached = state
        .service
        .attach(&session.id, &bob.token)
        .await
        .unwrap();

    state.service.advance(&session.id, &alice.token).await.unwrap();

    // Skim pushes until the advance shows up; the local view is scoped
    // to Bob.
    loop {
        let message = tokio::time::timeout(Duration::from_secs(1), attached.rx.recv())
            .await
            .expect("expected a push within a second")
            .expect("channel should stay open");
        if let WsMessage::StateUpdate { global, local } = message {
            assert_eq!(local.role, Role::Bob);
            if global.step_index == 1 {
                break;
            }
        }
    }

    state.service.detach(&session.id, attached.conn_id).await;
}

#[tokio::test]
async fn test_sweeper_removes_only_idle_sessions() {
    let state = create_test_state();
    let idle = state.service.create().await;
    let watched = state.service.create().await;

    let joined = state
        .service
        .join(&watched.id, Role::Alice, None)
        .await
        .unwrap();
    let attached = state
        .service
        .attach(&watched.id, &joined.token)
        .await
        .unwrap();

    // Zero TTL: everything idle is expired immediately, but the session
    // with a live subscriber survives.
    let removed = state.service.sweep_expired(Duration::ZERO).await;
    assert_eq!(removed, 1);
    assert_eq!(
        state.service.fetch(&idle.id).await.unwrap_err(),
        SessionError::NotFound
    );
    assert!(state.service.fetch(&watched.id).await.is_ok());

    state.service.detach(&watched.id, attached.conn_id).await;
}
