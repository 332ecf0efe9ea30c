//! Network Error Types
//!
//! Error types for transport and realtime session operations.

use thiserror::Error;

/// Network and transport error types.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timeout")]
    Timeout,

    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Message receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transport not connected")]
    NotConnected,

    #[error("Max retries exceeded")]
    MaxRetriesExceeded,
}
