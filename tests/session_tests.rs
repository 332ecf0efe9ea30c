//! Tests for the realtime session: lifecycle, ordered dispatch into the
//! store, duplicate and stale-event handling, and outbound commands.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::{event_envelope, request_from, user};
use skillswap_core::api::{CallbackHandler, EventDispatcher, SessionEvent};
use skillswap_core::network::{
    ClientCommand, ConnectionState, MessagePayload, MockTransport, NetworkError, ServerEvent,
    TransportConfig,
};
use skillswap_core::requests::RequestPhase;
use skillswap_core::session::RealtimeSession;
use skillswap_core::store::SessionStore;

fn new_session() -> (RealtimeSession<MockTransport>, Arc<SessionStore>, Arc<EventDispatcher>) {
    let store = Arc::new(SessionStore::new());
    let events = Arc::new(EventDispatcher::new());
    let session = RealtimeSession::new(
        MockTransport::new(),
        TransportConfig::default(),
        store.clone(),
        events.clone(),
    );
    (session, store, events)
}

fn sent_commands(session: &RealtimeSession<MockTransport>) -> Vec<ClientCommand> {
    session
        .transport()
        .sent_messages()
        .iter()
        .filter_map(|envelope| match &envelope.payload {
            MessagePayload::Command(command) => Some(command.clone()),
            MessagePayload::Event(_) => None,
        })
        .collect()
}

#[test]
fn test_connect_presents_user_credential() {
    let (mut session, _, _) = new_session();
    session.connect("alice").unwrap();

    assert!(session.is_connected());
    assert_eq!(session.user_id().map(String::as_str), Some("alice"));
    assert_eq!(
        session.transport().last_auth().map(String::as_str),
        Some("alice")
    );
}

#[test]
fn test_connect_same_user_twice_is_noop() {
    let (mut session, _, _) = new_session();
    session.connect("alice").unwrap();
    session.connect("alice").unwrap();

    assert_eq!(session.transport().connect_count(), 1);
}

#[test]
fn test_connect_new_user_supersedes_previous() {
    let (mut session, store, _) = new_session();
    session.connect("alice").unwrap();

    // An event from the first connection is still queued when the second
    // connect supersedes it; it must never reach the store.
    session
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::UsersUpdate(vec![user("ghost")])));

    session.connect("bob").unwrap();
    assert_eq!(session.transport().connect_count(), 2);

    let handled = session.poll().unwrap();
    assert_eq!(handled, 0);
    assert!(store.online_users().is_empty());
}

#[test]
fn test_disconnect_is_idempotent() {
    let (mut session, _, _) = new_session();
    session.connect("alice").unwrap();
    session.disconnect();
    session.disconnect();

    assert_eq!(session.state(), ConnectionState::Disconnected);
}

#[test]
fn test_poll_applies_events_in_arrival_order() {
    let (mut session, store, _) = new_session();
    session.connect("alice").unwrap();

    session
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::UsersUpdate(vec![
            user("alice"),
            user("bob"),
        ])));
    session
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::ConnectionRequest(request_from("bob"))));
    session
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::ConnectionAccepted("bob".into())));

    let handled = session.poll().unwrap();
    assert_eq!(handled, 3);

    // The accept landed after the request it resolves: one connected user,
    // zero pending requests.
    assert!(store.user("bob").unwrap().connected);
    assert!(store.connection_requests().is_empty());
}

#[test]
fn test_duplicate_envelope_is_dropped() {
    let (mut session, store, _) = new_session();
    session.connect("alice").unwrap();

    let envelope = event_envelope(ServerEvent::ConnectionRequest(request_from("bob")));
    session.transport_mut().queue_receive(envelope.clone());
    session.transport_mut().queue_receive(envelope);

    let handled = session.poll().unwrap();
    assert_eq!(handled, 1);
    assert_eq!(store.connection_requests().len(), 1);
}

#[test]
fn test_request_accept_scenario() {
    let (mut session, store, _) = new_session();
    session.connect("alice").unwrap();

    session
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::UsersUpdate(vec![user("bob")])));
    session
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::ConnectionRequest(request_from("bob"))));
    session.poll().unwrap();

    let requests = store.connection_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].sender.id, "bob");
    assert_eq!(session.request_phase("bob"), RequestPhase::IncomingRequested);

    store.accept_connection("bob");
    session.accept_connection_request("bob").unwrap();

    assert!(store.user("bob").unwrap().connected);
    assert!(store.connection_requests().is_empty());
    assert_eq!(session.request_phase("bob"), RequestPhase::Connected);
}

#[test]
fn test_cancel_for_unknown_sender_is_silent() {
    let (mut session, store, events) = new_session();
    session.connect("alice").unwrap();

    let notified = Arc::new(AtomicUsize::new(0));
    let notified_clone = notified.clone();
    events.add_handler(Arc::new(CallbackHandler::new(move |event| {
        if matches!(event, SessionEvent::ConnectionRequestCancelled { .. }) {
            notified_clone.fetch_add(1, Ordering::SeqCst);
        }
    })));

    let before = store.snapshot();
    session
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::ConnectionCancelled("bob".into())));
    session.poll().unwrap();

    // Store unchanged, derived notice suppressed, nothing thrown.
    assert_eq!(store.snapshot(), before);
    assert_eq!(notified.load(Ordering::SeqCst), 0);
}

#[test]
fn test_accepted_for_unknown_user_suppresses_notice() {
    let (mut session, _, events) = new_session();
    session.connect("alice").unwrap();

    let notified = Arc::new(AtomicUsize::new(0));
    let notified_clone = notified.clone();
    events.add_handler(Arc::new(CallbackHandler::new(move |event| {
        if matches!(event, SessionEvent::ConnectionAccepted { .. }) {
            notified_clone.fetch_add(1, Ordering::SeqCst);
        }
    })));

    session
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::ConnectionAccepted("stranger".into())));
    session.poll().unwrap();

    assert_eq!(notified.load(Ordering::SeqCst), 0);
}

#[test]
fn test_store_mutation_commits_before_handlers_run() {
    let (mut session, store, events) = new_session();
    session.connect("alice").unwrap();

    let seen_len = Arc::new(Mutex::new(None));
    let seen_clone = seen_len.clone();
    let store_clone = store.clone();
    events.add_handler(Arc::new(CallbackHandler::new(move |event| {
        if matches!(event, SessionEvent::ConnectionRequestReceived { .. }) {
            *seen_clone.lock().unwrap() = Some(store_clone.connection_requests().len());
        }
    })));

    session
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::ConnectionRequest(request_from("bob"))));
    session.poll().unwrap();

    assert_eq!(*seen_len.lock().unwrap(), Some(1));
}

#[test]
fn test_outbound_commands_reach_the_wire() {
    let (mut session, _, _) = new_session();
    session.connect("alice").unwrap();

    session.send_connection_request("bob").unwrap();
    session.cancel_connection_request("bob").unwrap();
    session.send_connection_request("carol").unwrap();
    session.accept_connection_request("dave").unwrap();
    session.reject_connection_request("erin").unwrap();

    let commands = sent_commands(&session);
    assert_eq!(
        commands,
        vec![
            ClientCommand::ConnectionRequest { to: "bob".into() },
            ClientCommand::ConnectionCancel { to: "bob".into() },
            ClientCommand::ConnectionRequest { to: "carol".into() },
            ClientCommand::ConnectionAccept { from: "dave".into() },
            ClientCommand::ConnectionReject { from: "erin".into() },
        ]
    );
}

#[test]
fn test_commands_while_disconnected_are_reported() {
    let (mut session, _, _) = new_session();

    let result = session.send_connection_request("bob");
    assert!(matches!(result, Err(NetworkError::NotConnected)));
}

#[test]
fn test_connect_failure_leaves_session_retryable() {
    let (mut session, _, _) = new_session();
    session
        .transport_mut()
        .inject_error(NetworkError::ConnectionFailed("refused".into()));

    assert!(session.connect("alice").is_err());
    assert_eq!(session.state(), ConnectionState::Disconnected);

    // A later attempt succeeds without any special recovery step.
    session.connect("alice").unwrap();
    assert!(session.is_connected());
}

#[test]
fn test_poll_while_disconnected_is_quiet() {
    let (mut session, _, _) = new_session();
    assert_eq!(session.poll().unwrap(), 0);
}

#[test]
fn test_reconnect_reuses_current_user() {
    let (mut session, _, _) = new_session();
    session.connect("alice").unwrap();
    session.transport_mut().set_state(ConnectionState::Disconnected);

    session.reconnect().unwrap();
    assert!(session.is_connected());
    assert_eq!(
        session.transport().last_auth().map(String::as_str),
        Some("alice")
    );
}
