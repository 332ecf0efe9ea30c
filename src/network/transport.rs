//! Transport Trait
//!
//! Platform-agnostic abstraction for the realtime server connection.

use super::error::NetworkError;
use super::message::MessageEnvelope;
use crate::model::UserId;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Connection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to any server.
    #[default]
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Connected and ready.
    Connected,
}

/// Configuration for transport connections.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Server URL (ws:// or wss://).
    pub server_url: String,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds; bounds how long a `receive` poll blocks.
    pub io_timeout_ms: u64,
    /// Maximum reconnection attempts.
    pub max_reconnect_attempts: u32,
    /// Base delay for exponential backoff (milliseconds).
    pub reconnect_base_delay_ms: u64,
    /// Connection-time credential: the authenticated user's id.
    pub auth_user_id: Option<UserId>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            server_url: String::new(),
            connect_timeout_ms: 10_000,
            io_timeout_ms: 250,
            max_reconnect_attempts: 5,
            reconnect_base_delay_ms: 1_000,
            auth_user_id: None,
        }
    }
}

impl TransportConfig {
    /// Creates a config for the given server URL.
    pub fn for_server(server_url: &str) -> Self {
        TransportConfig {
            server_url: server_url.to_string(),
            ..Default::default()
        }
    }
}

/// Transport trait for realtime server communication.
///
/// Abstracts the underlying mechanism (WebSocket in production, a scripted
/// mock in tests). Synchronous interface: the session polls `receive` on its
/// own cadence; implementations bound the block via `io_timeout_ms`.
pub trait Transport: Send {
    /// Connects to the server, presenting `config.auth_user_id` as the
    /// connection-time credential.
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()>;

    /// Disconnects from the server. Safe to call when not connected.
    fn disconnect(&mut self) -> TransportResult<()>;

    /// Returns the current connection state.
    fn state(&self) -> ConnectionState;

    /// Sends a message envelope. Returns an error if not connected.
    fn send(&mut self, message: &MessageEnvelope) -> TransportResult<()>;

    /// Receives the next message, or `Ok(None)` if none arrived within the
    /// poll window.
    fn receive(&mut self) -> TransportResult<Option<MessageEnvelope>>;

    /// Checks for queued messages without blocking.
    fn has_pending(&self) -> bool;
}
