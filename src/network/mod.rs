//! Network + Transport Layer
//!
//! Wire protocol and transport abstractions for the realtime
//! presence/signaling server.
//!
//! # Architecture
//!
//! - **Transport trait**: platform-agnostic interface for the persistent
//!   server connection
//! - **Message types**: versioned envelopes carrying client commands and
//!   server events
//! - **Protocol layer**: JSON text encoding with version checking
//! - **WebSocket transport**: production implementation (feature-gated)
//! - **Mock transport**: scripted implementation for tests

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod message;
#[cfg(not(feature = "testing"))]
mod message;

#[cfg(feature = "testing")]
pub mod mock;
#[cfg(not(feature = "testing"))]
mod mock;

#[cfg(feature = "testing")]
pub mod protocol;
#[cfg(not(feature = "testing"))]
mod protocol;

#[cfg(feature = "testing")]
pub mod transport;
#[cfg(not(feature = "testing"))]
mod transport;

#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
mod websocket;

// Error types
pub use error::NetworkError;

// Message types
pub use message::{
    ClientCommand, MessageEnvelope, MessageId, MessagePayload, ServerEvent, PROTOCOL_VERSION,
};

// Protocol utilities
pub use protocol::{create_envelope, decode_message, encode_message, MAX_MESSAGE_SIZE};

// Transport abstraction
pub use transport::{ConnectionState, Transport, TransportConfig, TransportResult};

// Mock transport for testing
pub use mock::MockTransport;

// WebSocket transport for production
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use websocket::WebSocketTransport;
