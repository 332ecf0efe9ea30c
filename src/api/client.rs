//! Client Orchestrator
//!
//! Main entry point tying the pieces together: the session store, the
//! realtime session, the event dispatcher, the profile cache, and at most
//! one active call. The embedding UI owns exactly one of these; there is no
//! implicit global instance.

use std::sync::Arc;

use crate::model::{User, UserId};
use crate::network::{ConnectionState, Transport};
use crate::session::RealtimeSession;
use crate::signaling::{CallSession, MediaSource, PeerConnection};
use crate::storage::ProfileCache;
use crate::store::{SessionSnapshot, SessionStore};

use super::config::ClientConfig;
use super::error::{ClientError, ClientResult};
use super::events::{CallbackHandler, EventDispatcher, EventHandler, SessionEvent};

/// Main client orchestrator.
///
/// # Example
///
/// ```ignore
/// use skillswap_core::api::{Skillswap, ClientConfig};
/// use skillswap_core::model::User;
/// use skillswap_core::network::MockTransport;
///
/// let mut client = Skillswap::new(MockTransport::new(), ClientConfig::default())?;
///
/// client.add_event_handler(|event| println!("{:?}", event));
///
/// client.login(User::new("alice", "Alice"))?;
/// client.send_connection_request("bob")?;
/// client.poll()?;
/// client.logout()?;
/// ```
pub struct Skillswap<T: Transport> {
    store: Arc<SessionStore>,
    session: RealtimeSession<T>,
    events: Arc<EventDispatcher>,
    profile: Option<ProfileCache>,
    call: Option<CallSession<Box<dyn PeerConnection>>>,
}

impl<T: Transport> Skillswap<T> {
    /// Creates a new client over the given transport.
    ///
    /// Rehydrates the current user from the profile cache when one is
    /// configured; all other collections start empty and are rebuilt from
    /// server events.
    pub fn new(transport: T, config: ClientConfig) -> ClientResult<Self> {
        let profile = config.profile_cache_path.as_ref().map(ProfileCache::new);

        let store = Arc::new(SessionStore::new());
        if let Some(cache) = &profile {
            if let Some(user) = cache.load()? {
                store.upsert_user(user.clone());
                store.set_current_user(Some(user));
            }
        }

        let events = Arc::new(EventDispatcher::new());
        events.add_handler(notification_recorder(store.clone()));

        let session = RealtimeSession::new(transport, config.transport, store.clone(), events.clone());

        Ok(Skillswap {
            store,
            session,
            events,
            profile,
            call: None,
        })
    }

    // === Identity / lifecycle ===

    /// Logs in as the given user: stores the identity, persists it, and
    /// connects the realtime session keyed to the user's id.
    pub fn login(&mut self, user: User) -> ClientResult<()> {
        self.store.upsert_user(user.clone());
        self.store.set_current_user(Some(user.clone()));
        if let Some(cache) = &self.profile {
            cache.save(&user)?;
        }
        self.session.connect(&user.id)?;
        Ok(())
    }

    /// Updates the logged-in user's profile locally and in the cache.
    pub fn update_profile(&mut self, user: User) -> ClientResult<()> {
        if self.store.current_user().is_none() {
            return Err(ClientError::NotLoggedIn);
        }
        self.store.update_current_user(user.clone());
        if let Some(cache) = &self.profile {
            cache.save(&user)?;
        }
        Ok(())
    }

    /// Logs out: ends any active call, disconnects, clears identity,
    /// pending requests, and notifications, and drops the persisted profile.
    pub fn logout(&mut self) -> ClientResult<()> {
        self.end_call();
        self.session.disconnect();
        self.store.logout();
        if let Some(cache) = &self.profile {
            cache.clear()?;
        }
        Ok(())
    }

    /// Drains pending server events into the store. Call on the UI's tick.
    pub fn poll(&mut self) -> ClientResult<usize> {
        Ok(self.session.poll()?)
    }

    /// Returns the realtime connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.session.state()
    }

    // === Connection requests ===

    /// Sends a connection request to `user_id`.
    pub fn send_connection_request(&mut self, user_id: &str) -> ClientResult<()> {
        self.require_login()?;
        self.session.send_connection_request(user_id)?;
        Ok(())
    }

    /// Accepts the pending request from `user_id`: marks the user connected,
    /// removes the pending entry, and notifies the peer.
    pub fn accept_connection(&mut self, user_id: &str) -> ClientResult<()> {
        self.require_login()?;
        self.store.accept_connection(user_id);
        self.session.accept_connection_request(user_id)?;
        Ok(())
    }

    /// Rejects the pending request from `user_id`.
    pub fn reject_connection(&mut self, user_id: &str) -> ClientResult<()> {
        self.require_login()?;
        self.store.reject_connection(user_id);
        self.session.reject_connection_request(user_id)?;
        Ok(())
    }

    /// Withdraws our own request to `user_id` before the peer answers.
    pub fn cancel_connection_request(&mut self, user_id: &str) -> ClientResult<()> {
        self.require_login()?;
        self.session.cancel_connection_request(user_id)?;
        Ok(())
    }

    // === Calls ===

    /// Starts a call toward `user_id` with the given media source and peer
    /// connection. At most one call at a time.
    pub fn start_call<P>(
        &mut self,
        user_id: &str,
        media: &mut dyn MediaSource,
        peer: P,
    ) -> ClientResult<()>
    where
        P: PeerConnection + 'static,
    {
        self.require_login()?;
        if self.call.is_some() {
            return Err(ClientError::InvalidState("call already in progress".into()));
        }

        let inbox = self.session.open_signal_route(user_id);
        match CallSession::start(user_id, media, Box::new(peer) as Box<dyn PeerConnection>, inbox)
        {
            Ok(call) => {
                self.call = Some(call);
                Ok(())
            }
            Err(e) => {
                self.session.close_signal_route(user_id);
                Err(e.into())
            }
        }
    }

    /// Relays call signals in both directions. Call on the UI's tick while
    /// a call is active; a no-op otherwise.
    pub fn pump_call(&mut self) -> ClientResult<()> {
        if let Some(call) = &mut self.call {
            call.pump(&mut self.session)?;
        }
        Ok(())
    }

    /// Ends the active call, releasing media and signaling resources.
    /// Idempotent.
    pub fn end_call(&mut self) {
        if let Some(mut call) = self.call.take() {
            let peer_id: UserId = call.peer_id().to_string();
            call.end();
            self.session.close_signal_route(&peer_id);
        }
    }

    /// Returns true while a call is active.
    pub fn call_in_progress(&self) -> bool {
        self.call.is_some()
    }

    // === Events / state access ===

    /// Registers a callback for session events.
    pub fn add_event_handler<F>(&self, callback: F)
    where
        F: Fn(SessionEvent) + Send + Sync + 'static,
    {
        self.events
            .add_handler(Arc::new(CallbackHandler::new(callback)));
    }

    /// Returns the shared session store.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Returns a copy of the full session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    /// Returns the realtime session for direct access.
    pub fn session(&self) -> &RealtimeSession<T> {
        &self.session
    }

    /// Returns the realtime session mutably.
    pub fn session_mut(&mut self) -> &mut RealtimeSession<T> {
        &mut self.session
    }

    fn require_login(&self) -> ClientResult<()> {
        if self.store.current_user().is_none() {
            return Err(ClientError::NotLoggedIn);
        }
        Ok(())
    }
}

/// Default handler recording connection-lifecycle events as store
/// notifications, mirroring what the notification dropdown shows.
fn notification_recorder(store: Arc<SessionStore>) -> Arc<dyn EventHandler> {
    Arc::new(CallbackHandler::new(move |event| match event {
        SessionEvent::ConnectionRequestReceived { sender } => {
            store.add_notification(
                "Connection request",
                &format!("{} wants to connect with you", sender.name),
            );
        }
        SessionEvent::ConnectionAccepted { user } => {
            store.add_notification(
                "Request accepted",
                &format!("{} accepted your connection request", user.name),
            );
        }
        SessionEvent::ConnectionRejected { user } => {
            store.add_notification(
                "Request declined",
                &format!("{} declined your connection request", user.name),
            );
        }
        SessionEvent::ConnectionRequestCancelled { user } => {
            store.add_notification(
                "Request cancelled",
                &format!("{} cancelled their connection request", user.name),
            );
        }
        _ => {}
    }))
}
