//! Tests for the client facade: login/logout lifecycle, profile persistence,
//! the notification recorder, and the event dispatcher.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{event_envelope, request_from, user};
use skillswap_core::api::{
    CallbackHandler, ClientConfig, ClientError, EventDispatcher, SessionEvent, Skillswap,
};
use skillswap_core::network::{ConnectionState, MockTransport, ServerEvent};
use skillswap_core::signaling::{MockMediaSource, MockPeerConnection};

fn new_client() -> Skillswap<MockTransport> {
    Skillswap::new(MockTransport::new(), ClientConfig::default()).unwrap()
}

#[test]
fn test_login_connects_with_user_credential() {
    let mut client = new_client();
    client.login(user("alice")).unwrap();

    assert_eq!(client.connection_state(), ConnectionState::Connected);
    assert_eq!(
        client.session().transport().last_auth().map(String::as_str),
        Some("alice")
    );
    assert_eq!(client.snapshot().current_user.unwrap().id, "alice");
}

#[test]
fn test_logout_clears_session_and_disconnects() {
    let mut client = new_client();
    client.login(user("alice")).unwrap();

    client
        .session_mut()
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::UsersUpdate(vec![user("bob")])));
    client
        .session_mut()
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::ConnectionRequest(request_from("bob"))));
    client.poll().unwrap();

    client.logout().unwrap();

    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    let snapshot = client.snapshot();
    assert!(snapshot.current_user.is_none());
    assert!(snapshot.connection_requests.is_empty());
    assert!(snapshot.notifications.is_empty());
    // User lists survive logout; only identity-scoped state is cleared.
    assert!(!snapshot.users.is_empty());
}

#[test]
fn test_profile_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::default().with_profile_cache(dir.path().join("profile.json"));

    let mut client = Skillswap::new(MockTransport::new(), config.clone()).unwrap();
    client.login(user("alice")).unwrap();
    drop(client);

    let rehydrated = Skillswap::new(MockTransport::new(), config.clone()).unwrap();
    assert_eq!(rehydrated.snapshot().current_user.unwrap().id, "alice");
    drop(rehydrated);

    // After logout the cache is gone and the next instance starts fresh.
    let mut client = Skillswap::new(MockTransport::new(), config.clone()).unwrap();
    client.logout().unwrap();
    let fresh = Skillswap::new(MockTransport::new(), config).unwrap();
    assert!(fresh.snapshot().current_user.is_none());
}

#[test]
fn test_update_profile_requires_login() {
    let mut client = new_client();
    assert!(matches!(
        client.update_profile(user("alice")),
        Err(ClientError::NotLoggedIn)
    ));
}

#[test]
fn test_notification_recorder_records_requests() {
    let mut client = new_client();
    client.login(user("alice")).unwrap();

    client
        .session_mut()
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::ConnectionRequest(request_from("bob"))));
    client.poll().unwrap();

    let notifications = client.snapshot().notifications;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Connection request");
    assert!(notifications[0].message.contains("user-bob"));
}

#[test]
fn test_accept_pairs_store_mutation_with_emission() {
    let mut client = new_client();
    client.login(user("alice")).unwrap();

    client
        .session_mut()
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::UsersUpdate(vec![user("bob")])));
    client
        .session_mut()
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::ConnectionRequest(request_from("bob"))));
    client.poll().unwrap();

    let sent_before = client.session().transport().sent_messages().len();
    client.accept_connection("bob").unwrap();

    let snapshot = client.snapshot();
    assert!(snapshot.users.iter().any(|u| u.id == "bob" && u.connected));
    assert!(snapshot.connection_requests.is_empty());
    assert_eq!(
        client.session().transport().sent_messages().len(),
        sent_before + 1
    );
}

#[test]
fn test_single_call_at_a_time() {
    let mut client = new_client();
    client.login(user("alice")).unwrap();

    let mut media = MockMediaSource::new();
    client
        .start_call("bob", &mut media, MockPeerConnection::new())
        .unwrap();
    assert!(client.call_in_progress());

    let result = client.start_call("carol", &mut media, MockPeerConnection::new());
    assert!(matches!(result, Err(ClientError::InvalidState(_))));
}

#[test]
fn test_end_call_releases_everything() {
    let mut client = new_client();
    client.login(user("alice")).unwrap();

    let mut media = MockMediaSource::new();
    let peer = MockPeerConnection::new();
    let closed = peer.closed_handle();
    client.start_call("bob", &mut media, peer).unwrap();

    client.end_call();
    assert!(!client.call_in_progress());
    assert!(media.all_stopped());
    assert!(closed.load(Ordering::SeqCst));

    // Idempotent.
    client.end_call();
}

#[test]
fn test_failed_call_start_leaves_no_call() {
    let mut client = new_client();
    client.login(user("alice")).unwrap();

    let mut media = MockMediaSource::new();
    media.fail_next("no camera");
    let result = client.start_call("bob", &mut media, MockPeerConnection::new());

    assert!(matches!(result, Err(ClientError::Signaling(_))));
    assert!(!client.call_in_progress());

    // The route was rolled back; a retry starts cleanly.
    client
        .start_call("bob", &mut media, MockPeerConnection::new())
        .unwrap();
}

#[test]
fn test_logout_ends_active_call() {
    let mut client = new_client();
    client.login(user("alice")).unwrap();

    let mut media = MockMediaSource::new();
    client
        .start_call("bob", &mut media, MockPeerConnection::new())
        .unwrap();

    client.logout().unwrap();
    assert!(!client.call_in_progress());
    assert!(media.all_stopped());
}

#[test]
fn test_event_handler_receives_presence_changes() {
    let mut client = new_client();
    let online_counts = Arc::new(AtomicUsize::new(0));
    let counts_clone = online_counts.clone();
    client.add_event_handler(move |event| {
        if let SessionEvent::PresenceChanged { online_count } = event {
            counts_clone.store(online_count, Ordering::SeqCst);
        }
    });

    client.login(user("alice")).unwrap();
    client
        .session_mut()
        .transport_mut()
        .queue_receive(event_envelope(ServerEvent::UsersUpdate(vec![
            user("bob"),
            user("carol"),
        ])));
    client.poll().unwrap();

    assert_eq!(online_counts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_dispatcher_fans_out_to_all_handlers() {
    let dispatcher = EventDispatcher::new();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let calls = calls.clone();
        dispatcher.add_handler(Arc::new(CallbackHandler::new(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        })));
    }
    assert_eq!(dispatcher.handler_count(), 3);

    dispatcher.dispatch(SessionEvent::Error {
        message: "boom".into(),
    });
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    dispatcher.clear_handlers();
    dispatcher.dispatch(SessionEvent::Error {
        message: "quiet".into(),
    });
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
