//! Session Store
//!
//! Single source of truth for client-observed application state: the current
//! user, every known user, the online set, pending connection requests, and
//! notifications. All components mutate it only through the methods below;
//! the state struct itself is never handed out mutably.
//!
//! Every method takes the internal lock for its whole duration, so a reader
//! never observes a partially-applied update (e.g. a request removed while
//! the `connected` flag is still stale).

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::model::{unix_now, ConnectionRequest, Notification, User, UserId};

/// A point-in-time copy of the full session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_user: Option<User>,
    pub users: Vec<User>,
    pub online_users: Vec<User>,
    pub connection_requests: Vec<ConnectionRequest>,
    pub notifications: Vec<Notification>,
}

/// The shared session store.
///
/// Cheap to share via `Arc`; every operation is atomic with respect to
/// interleaved event processing.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: Mutex<SessionSnapshot>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        SessionStore::default()
    }

    /// Creates a store rehydrated with a persisted current user.
    ///
    /// All other collections start empty and are rebuilt from server events.
    pub fn with_current_user(user: User) -> Self {
        let store = SessionStore::new();
        store.set_current_user(Some(user));
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionSnapshot> {
        // A poisoned lock means a panic mid-mutation in another thread;
        // the state itself is still a consistent snapshot-in-progress, so
        // recover rather than propagate the poison to every caller.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // === Accessors (cloned snapshots) ===

    /// Returns a copy of the full state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().clone()
    }

    /// Returns the current user, if logged in.
    pub fn current_user(&self) -> Option<User> {
        self.lock().current_user.clone()
    }

    /// Returns all known users.
    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    /// Returns the user with the given id, if known.
    pub fn user(&self, user_id: &str) -> Option<User> {
        self.lock().users.iter().find(|u| u.id == user_id).cloned()
    }

    /// Returns the currently online users.
    pub fn online_users(&self) -> Vec<User> {
        self.lock().online_users.clone()
    }

    /// Returns pending connection requests, most recent first.
    pub fn connection_requests(&self) -> Vec<ConnectionRequest> {
        self.lock().connection_requests.clone()
    }

    /// Returns notifications, most recent first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    // === Mutations ===

    /// Replaces the current identity. Does not clear other collections;
    /// on logout call [`SessionStore::logout`] or [`SessionStore::reset`].
    pub fn set_current_user(&self, user: Option<User>) {
        self.lock().current_user = user;
    }

    /// Replaces the current user and the matching `users` entry by id.
    ///
    /// If the id is not present in `users` the entry is simply not updated
    /// there.
    pub fn update_current_user(&self, user: User) {
        let mut state = self.lock();
        if let Some(existing) = state.users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        }
        state.current_user = Some(user);
    }

    /// Inserts a user, or replaces the existing entry with the same id while
    /// preserving the protocol-owned `connected` flag.
    pub fn upsert_user(&self, user: User) {
        let mut state = self.lock();
        Self::upsert_into(&mut state.users, user);
    }

    fn upsert_into(users: &mut Vec<User>, mut user: User) {
        if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
            user.connected = existing.connected;
            *existing = user;
        } else {
            users.push(user);
        }
    }

    /// Full replacement of the online set from a presence snapshot.
    ///
    /// Idempotent: applying the same snapshot twice yields the same state.
    /// Users seen for the first time are added to `users`; `is_online` is
    /// maintained on every known user, `connected` is never touched here.
    pub fn set_online_users(&self, online: Vec<User>) {
        let mut state = self.lock();

        for user in &online {
            let mut user = user.clone();
            user.is_online = true;
            Self::upsert_into(&mut state.users, user);
        }
        for user in state.users.iter_mut() {
            user.is_online = online.iter().any(|o| o.id == user.id);
        }

        state.online_users = online
            .into_iter()
            .map(|mut u| {
                u.is_online = true;
                u
            })
            .collect();
    }

    /// Inserts a pending request at the head of the list.
    ///
    /// A request from a sender that already has a pending entry replaces it
    /// rather than duplicating it; the replacement takes the head position.
    pub fn add_connection_request(&self, request: ConnectionRequest) {
        let mut state = self.lock();
        state
            .connection_requests
            .retain(|r| r.sender.id != request.sender.id);
        state.connection_requests.insert(0, request);
    }

    /// Removes all pending requests from the given sender. No-op if absent.
    pub fn remove_connection_request(&self, user_id: &str) {
        self.lock()
            .connection_requests
            .retain(|r| r.sender.id != user_id);
    }

    /// Marks the user as connected and removes their pending request, as one
    /// atomic update. Returns the updated user if the id is known.
    pub fn accept_connection(&self, user_id: &str) -> Option<User> {
        self.resolve_connection(user_id, true)
    }

    /// Marks the user as not connected and removes their pending request, as
    /// one atomic update. Returns the updated user if the id is known.
    pub fn reject_connection(&self, user_id: &str) -> Option<User> {
        self.resolve_connection(user_id, false)
    }

    fn resolve_connection(&self, user_id: &str, connected: bool) -> Option<User> {
        let mut state = self.lock();
        state.connection_requests.retain(|r| r.sender.id != user_id);
        let user = state.users.iter_mut().find(|u| u.id == user_id)?;
        user.connected = connected;
        Some(user.clone())
    }

    /// Prepends a notification with a fresh id and the current time.
    /// Returns the created notification.
    pub fn add_notification(&self, title: &str, message: &str) -> Notification {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            message: message.to_string(),
            time: unix_now(),
            read: false,
        };
        self.lock().notifications.insert(0, notification.clone());
        notification
    }

    /// Marks the matching notification as read. No-op if absent.
    pub fn mark_notification_as_read(&self, id: &str) {
        let mut state = self.lock();
        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
    }

    /// Clears identity, pending requests, and notifications.
    ///
    /// `users` and `online_users` are deliberately retained, matching the
    /// product's current logout semantics; use [`SessionStore::reset`] for a
    /// full teardown.
    pub fn logout(&self) {
        let mut state = self.lock();
        state.current_user = None;
        state.connection_requests.clear();
        state.notifications.clear();
    }

    /// Resets the store to its initial empty state.
    pub fn reset(&self) {
        *self.lock() = SessionSnapshot::default();
    }
}
