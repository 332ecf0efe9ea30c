//! Network Message Types
//!
//! Wire protocol for the presence/signaling server. Every message travels in
//! a versioned envelope; the payload is either a client command (outbound) or
//! a server event (inbound), tagged with the event names the server speaks.

use serde::{Deserialize, Serialize};

use crate::model::{ConnectionRequest, SignalMessage, User, UserId};

/// Unique message identifier for duplicate suppression.
pub type MessageId = String;

/// Wire protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Envelope wrapping all messages on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Protocol version for compatibility checking.
    pub version: u8,
    /// Unique message ID (UUID v4).
    pub message_id: MessageId,
    /// Unix timestamp when the message was created.
    pub timestamp: u64,
    /// The actual message content.
    pub payload: MessagePayload,
}

/// Either direction of the wire protocol.
///
/// Untagged: the inner enums carry their own `event` tags, and no event name
/// is ambiguous between the two directions once its payload shape is
/// considered (the shared `connection:request` name carries `{to}` outbound
/// and a full request object inbound).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessagePayload {
    /// Client-to-server command.
    Command(ClientCommand),
    /// Server-to-client event.
    Event(ServerEvent),
}

/// Commands emitted by this client. All fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientCommand {
    /// Ask the server to relay a connection request to `to`.
    #[serde(rename = "connection:request")]
    ConnectionRequest { to: UserId },

    /// Accept the pending request sent by `from`.
    #[serde(rename = "connection:accept")]
    ConnectionAccept { from: UserId },

    /// Reject the pending request sent by `from`.
    #[serde(rename = "connection:reject")]
    ConnectionReject { from: UserId },

    /// Withdraw our own request to `to`.
    #[serde(rename = "connection:cancel")]
    ConnectionCancel { to: UserId },

    /// Relay an opaque call-signaling payload to `to`.
    #[serde(rename = "call:signal")]
    CallSignal {
        to: UserId,
        signal: serde_json::Value,
    },
}

/// Events delivered by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Full presence snapshot, not a delta.
    #[serde(rename = "users:update")]
    UsersUpdate(Vec<User>),

    /// A peer's connection request, relayed to us.
    #[serde(rename = "connection:request")]
    ConnectionRequest(ConnectionRequest),

    /// A peer accepted our request.
    #[serde(rename = "connection:accepted")]
    ConnectionAccepted(UserId),

    /// A peer rejected our request.
    #[serde(rename = "connection:rejected")]
    ConnectionRejected(UserId),

    /// A peer withdrew their request before we answered.
    #[serde(rename = "connection:cancelled")]
    ConnectionCancelled(UserId),

    /// Call-signaling payload from a peer, opaque at this layer.
    #[serde(rename = "call:signal")]
    CallSignal(SignalMessage),
}
