//! Realtime Session
//!
//! Owns the single persistent connection to the presence/signaling server.
//! Inbound events are applied to the session store in arrival order and then
//! surfaced to the UI through the event dispatcher; outbound commands are
//! fire-and-forget emissions. Connection lifecycle is keyed to the
//! authenticated user: reconnecting for a new user supersedes the previous
//! connection, and events still queued from a superseded connection are
//! discarded rather than applied.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use crate::api::events::{EventDispatcher, SessionEvent};
use crate::model::{SignalMessage, UserId};
use crate::network::{
    create_envelope, ClientCommand, ConnectionState, MessageEnvelope, MessageId, MessagePayload,
    NetworkError, ServerEvent, Transport, TransportConfig, TransportResult,
};
use crate::requests::{RequestEvent, RequestPhase, RequestTracker};
use crate::signaling::SignalInbox;
use crate::store::SessionStore;

/// Number of recently seen envelope ids retained for duplicate suppression.
const SEEN_ID_CAPACITY: usize = 256;

/// The realtime session.
///
/// Generic over the transport so tests run against a scripted mock and
/// production runs over WebSocket.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use skillswap_core::network::{MockTransport, TransportConfig};
/// use skillswap_core::session::RealtimeSession;
/// use skillswap_core::store::SessionStore;
/// use skillswap_core::api::EventDispatcher;
///
/// let store = Arc::new(SessionStore::new());
/// let events = Arc::new(EventDispatcher::new());
/// let mut session = RealtimeSession::new(
///     MockTransport::new(),
///     TransportConfig::default(),
///     store,
///     events,
/// );
///
/// session.connect("alice")?;
/// session.poll()?;
/// session.send_connection_request("bob")?;
/// ```
pub struct RealtimeSession<T: Transport> {
    transport: T,
    config: TransportConfig,
    store: Arc<SessionStore>,
    events: Arc<EventDispatcher>,
    tracker: RequestTracker,
    /// Open per-peer routes for inbound call signals.
    signal_routes: HashMap<UserId, SignalInbox>,
    /// User the current connection cycle is keyed to.
    user_id: Option<UserId>,
    /// Bumped on every connect/disconnect; events decoded under an older
    /// generation are discarded.
    generation: u64,
    reconnect_attempt: u32,
    /// Ring of recently seen envelope ids (at-least-once tolerance).
    seen_order: VecDeque<MessageId>,
    seen_ids: HashSet<MessageId>,
}

impl<T: Transport> RealtimeSession<T> {
    /// Creates a new session over the given transport.
    pub fn new(
        transport: T,
        config: TransportConfig,
        store: Arc<SessionStore>,
        events: Arc<EventDispatcher>,
    ) -> Self {
        RealtimeSession {
            transport,
            config,
            store,
            events,
            tracker: RequestTracker::new(),
            signal_routes: HashMap::new(),
            user_id: None,
            generation: 0,
            reconnect_attempt: 0,
            seen_order: VecDeque::new(),
            seen_ids: HashSet::new(),
        }
    }

    // === Lifecycle ===

    /// Connects for the given user.
    ///
    /// No-op when already connecting or connected for the same user. Any
    /// other prior connection is torn down first; each call supersedes the
    /// last without leaking the previous transport state.
    pub fn connect(&mut self, user_id: &str) -> TransportResult<()> {
        let already_up = matches!(
            self.transport.state(),
            ConnectionState::Connecting | ConnectionState::Connected
        );
        if already_up && self.user_id.as_deref() == Some(user_id) {
            return Ok(());
        }

        self.teardown();
        self.user_id = Some(user_id.to_string());
        self.config.auth_user_id = Some(user_id.to_string());

        self.transport.connect(&self.config).inspect_err(|e| {
            debug!("connect failed for {}: {}", user_id, e);
        })?;

        self.reconnect_attempt = 0;
        self.events.dispatch(SessionEvent::ConnectionStateChanged {
            state: ConnectionState::Connected,
        });
        Ok(())
    }

    /// Disconnects and releases transport resources. Idempotent.
    pub fn disconnect(&mut self) {
        let was_connected = self.transport.state() != ConnectionState::Disconnected;
        self.teardown();
        if was_connected {
            self.events.dispatch(SessionEvent::ConnectionStateChanged {
                state: ConnectionState::Disconnected,
            });
        }
    }

    fn teardown(&mut self) {
        // Superseding the connection: late events queued under the old
        // generation must never reach the store.
        self.generation = self.generation.wrapping_add(1);
        let _ = self.transport.disconnect();
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// Returns true if connected and ready.
    pub fn is_connected(&self) -> bool {
        self.transport.state() == ConnectionState::Connected
    }

    /// Returns the user the current connection cycle is keyed to.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Attempts to reconnect for the current user.
    ///
    /// Fails with [`NetworkError::MaxRetriesExceeded`] once the configured
    /// attempt budget is spent; [`RealtimeSession::reconnect_delay`] gives
    /// the backoff the caller should sleep before invoking this.
    pub fn reconnect(&mut self) -> TransportResult<()> {
        if self.reconnect_attempt >= self.config.max_reconnect_attempts {
            return Err(NetworkError::MaxRetriesExceeded);
        }
        let user_id = self
            .user_id
            .clone()
            .ok_or(NetworkError::NotConnected)?;

        self.reconnect_attempt += 1;
        let attempt = self.reconnect_attempt;
        let result = self.connect(&user_id);
        if result.is_err() {
            // connect() resets the counter on success only.
            self.reconnect_attempt = attempt;
        }
        result
    }

    /// Exponential backoff delay with jitter for the next reconnect attempt.
    pub fn reconnect_delay(&self) -> Duration {
        let base = self.config.reconnect_base_delay_ms;
        let exp = base.saturating_mul(1u64 << self.reconnect_attempt.min(6));
        let jitter = rand::thread_rng().gen_range(0..=base / 2 + 1);
        Duration::from_millis(exp.saturating_add(jitter))
    }

    /// Returns the current reconnect attempt count.
    pub fn reconnect_attempt(&self) -> u32 {
        self.reconnect_attempt
    }

    // === Inbound dispatch ===

    /// Drains and dispatches every event the transport has queued.
    ///
    /// Events are applied to the store in arrival order. Returns the number
    /// of events handled. A transport-level disconnect is reported as a soft
    /// state-change event, not an error; the session stays retryable.
    pub fn poll(&mut self) -> TransportResult<usize> {
        let generation = self.generation;
        let mut handled = 0;

        loop {
            if self.generation != generation {
                // Superseded while dispatching.
                break;
            }

            match self.transport.receive() {
                Ok(Some(envelope)) => {
                    if self.mark_seen(&envelope.message_id) {
                        self.dispatch(envelope);
                        handled += 1;
                    } else {
                        debug!("dropping duplicate envelope");
                    }
                }
                Ok(None) => break,
                Err(NetworkError::NotConnected) => break,
                Err(NetworkError::ConnectionClosed) => {
                    self.events.dispatch(SessionEvent::ConnectionStateChanged {
                        state: ConnectionState::Disconnected,
                    });
                    break;
                }
                Err(e) => {
                    self.events.dispatch(SessionEvent::Error {
                        message: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }

        Ok(handled)
    }

    /// Records an envelope id; returns false for a duplicate.
    fn mark_seen(&mut self, message_id: &str) -> bool {
        if self.seen_ids.contains(message_id) {
            return false;
        }
        self.seen_ids.insert(message_id.to_string());
        self.seen_order.push_back(message_id.to_string());
        if self.seen_order.len() > SEEN_ID_CAPACITY {
            if let Some(oldest) = self.seen_order.pop_front() {
                self.seen_ids.remove(&oldest);
            }
        }
        true
    }

    fn dispatch(&mut self, envelope: MessageEnvelope) {
        let event = match envelope.payload {
            MessagePayload::Event(event) => event,
            MessagePayload::Command(_) => {
                warn!("server relayed a client command; ignoring");
                return;
            }
        };

        match event {
            ServerEvent::UsersUpdate(users) => {
                let online_count = users.len();
                self.store.set_online_users(users);
                self.events
                    .dispatch(SessionEvent::PresenceChanged { online_count });
            }
            ServerEvent::ConnectionRequest(request) => {
                let sender = request.sender.clone();
                self.tracker.apply(&sender.id, RequestEvent::PeerRequested);
                self.store.add_connection_request(request);
                // Notification delivery rides on handlers; the store mutation
                // above is already committed whatever they do.
                self.events
                    .dispatch(SessionEvent::ConnectionRequestReceived { sender });
            }
            ServerEvent::ConnectionAccepted(user_id) => {
                self.tracker.apply(&user_id, RequestEvent::PeerAccepted);
                match self.store.accept_connection(&user_id) {
                    Some(user) => self.events.dispatch(SessionEvent::ConnectionAccepted { user }),
                    None => debug!("accepted event for unknown user {}; notice suppressed", user_id),
                }
            }
            ServerEvent::ConnectionRejected(user_id) => {
                self.tracker.apply(&user_id, RequestEvent::PeerRejected);
                match self.store.reject_connection(&user_id) {
                    Some(user) => self.events.dispatch(SessionEvent::ConnectionRejected { user }),
                    None => debug!("rejected event for unknown user {}; notice suppressed", user_id),
                }
            }
            ServerEvent::ConnectionCancelled(user_id) => {
                self.tracker.apply(&user_id, RequestEvent::PeerCancelled);
                self.store.remove_connection_request(&user_id);
                match self.store.user(&user_id) {
                    Some(user) => self
                        .events
                        .dispatch(SessionEvent::ConnectionRequestCancelled { user }),
                    None => debug!("cancel event for unknown user {}; notice suppressed", user_id),
                }
            }
            ServerEvent::CallSignal(message) => self.route_signal(message),
        }
    }

    // === Call signal routing ===

    fn route_signal(&mut self, message: SignalMessage) {
        match self.signal_routes.get(&message.from) {
            Some(inbox) => inbox.push(message),
            None => debug!("no open call route for {}; signal dropped", message.from),
        }
    }

    /// Opens (or returns) the inbound signal route for a peer.
    pub fn open_signal_route(&mut self, peer_id: &str) -> SignalInbox {
        self.signal_routes
            .entry(peer_id.to_string())
            .or_default()
            .clone()
    }

    /// Closes the inbound signal route for a peer; later signals from that
    /// peer are dropped.
    pub fn close_signal_route(&mut self, peer_id: &str) {
        self.signal_routes.remove(peer_id);
    }

    // === Outbound commands (fire-and-forget) ===

    /// Asks the server to relay a connection request to `user_id`.
    pub fn send_connection_request(&mut self, user_id: &str) -> TransportResult<()> {
        self.emit(ClientCommand::ConnectionRequest {
            to: user_id.to_string(),
        })?;
        self.tracker.apply(user_id, RequestEvent::SendRequest);
        Ok(())
    }

    /// Accepts the pending request sent by `user_id`.
    pub fn accept_connection_request(&mut self, user_id: &str) -> TransportResult<()> {
        self.emit(ClientCommand::ConnectionAccept {
            from: user_id.to_string(),
        })?;
        self.tracker.apply(user_id, RequestEvent::Accept);
        Ok(())
    }

    /// Rejects the pending request sent by `user_id`.
    pub fn reject_connection_request(&mut self, user_id: &str) -> TransportResult<()> {
        self.emit(ClientCommand::ConnectionReject {
            from: user_id.to_string(),
        })?;
        self.tracker.apply(user_id, RequestEvent::Reject);
        Ok(())
    }

    /// Withdraws our own request to `user_id`.
    pub fn cancel_connection_request(&mut self, user_id: &str) -> TransportResult<()> {
        self.emit(ClientCommand::ConnectionCancel {
            to: user_id.to_string(),
        })?;
        self.tracker.apply(user_id, RequestEvent::Cancel);
        Ok(())
    }

    /// Relays an opaque call-signaling payload to `user_id`.
    pub fn send_call_signal(
        &mut self,
        user_id: &str,
        signal: serde_json::Value,
    ) -> TransportResult<()> {
        self.emit(ClientCommand::CallSignal {
            to: user_id.to_string(),
            signal,
        })
    }

    fn emit(&mut self, command: ClientCommand) -> TransportResult<()> {
        // Commands issued while disconnected are reported, not queued; a
        // stale request flushed after a reconnect could resurrect an
        // interaction the user abandoned.
        self.transport
            .send(&create_envelope(MessagePayload::Command(command)))
    }

    // === Introspection ===

    /// Returns the tracked relationship phase for a peer.
    pub fn request_phase(&self, peer_id: &str) -> RequestPhase {
        self.tracker.phase(peer_id)
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
