//! Data Model
//!
//! Core types shared by the session store, the realtime session, and the
//! signaling relay. Identity is always the string `id`; equality of whole
//! records is structural.

use serde::{Deserialize, Serialize};

/// User identifier as issued by the backend.
pub type UserId = String;

/// A user profile as observed by this client.
///
/// `connected` is owned by the connection-request protocol; `is_online` is
/// owned by the presence feed. No other code path writes either flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub connected: bool,
    #[serde(rename = "isOnline", default)]
    pub is_online: bool,
}

impl User {
    /// Creates a minimal user record with the given id and name.
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        User {
            id: id.into(),
            name: name.into(),
            avatar: String::new(),
            title: String::new(),
            location: String::new(),
            bio: String::new(),
            skills: Vec::new(),
            connected: false,
            is_online: false,
        }
    }
}

/// The subset of a sender's profile carried inside a connection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSender {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub title: String,
}

impl From<&User> for RequestSender {
    fn from(user: &User) -> Self {
        RequestSender {
            id: user.id.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            title: user.title.clone(),
        }
    }
}

/// An inbound pending connection request.
///
/// At most one pending request per `sender.id` is retained; a duplicate
/// replaces the existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub id: String,
    pub sender: RequestSender,
    /// Unix timestamp (seconds) when the request was issued.
    pub timestamp: u64,
}

/// A surfaced notification, ordered most-recent-first in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    /// Unix timestamp (seconds) when the notification was created.
    pub time: u64,
    pub read: bool,
}

/// A call-signaling payload in transit between two peers.
///
/// The `signal` body (offer, answer, or ICE candidate) is opaque at this
/// layer; its shape is owned by the media layer. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalMessage {
    /// Originating peer, stamped by the server on relay.
    pub from: UserId,
    pub signal: serde_json::Value,
}

/// Current unix timestamp in seconds.
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
