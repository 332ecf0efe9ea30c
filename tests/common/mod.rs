//! Shared helpers for integration tests.
#![allow(dead_code)]

use skillswap_core::model::{ConnectionRequest, RequestSender, User};
use skillswap_core::network::{create_envelope, MessageEnvelope, MessagePayload, ServerEvent};

/// Builds a user with the given id; name is derived from the id.
pub fn user(id: &str) -> User {
    User::new(id, format!("user-{}", id))
}

/// Builds a pending request from the given sender id.
pub fn request_from(sender_id: &str) -> ConnectionRequest {
    ConnectionRequest {
        id: format!("req-{}", sender_id),
        sender: RequestSender {
            id: sender_id.to_string(),
            name: format!("user-{}", sender_id),
            avatar: String::new(),
            title: String::new(),
        },
        timestamp: 1_700_000_000,
    }
}

/// Wraps a server event in a fresh envelope, as the server would.
pub fn event_envelope(event: ServerEvent) -> MessageEnvelope {
    create_envelope(MessagePayload::Event(event))
}
