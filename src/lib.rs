//! Skillswap Core Library
//!
//! Client-side realtime core for the Skillswap skill-sharing app: the
//! session store every view reads from, the realtime session that keeps it
//! consistent with the presence/connection-request feed, and the signaling
//! relay that brokers direct peer media channels.

pub mod api;
pub mod model;
pub mod network;
pub mod requests;
pub mod session;
pub mod signaling;
pub mod storage;
pub mod store;

pub use api::{
    CallbackHandler, ClientConfig, ClientError, ClientResult, EventDispatcher, EventHandler,
    SessionEvent, Skillswap,
};
pub use model::{ConnectionRequest, Notification, RequestSender, SignalMessage, User, UserId};
pub use network::{
    ClientCommand, ConnectionState, MessageEnvelope, MockTransport, NetworkError, ServerEvent,
    Transport, TransportConfig,
};
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use network::WebSocketTransport;
pub use requests::{RequestPhase, RequestTracker};
pub use session::RealtimeSession;
pub use signaling::{
    CallSession, MediaSource, MediaStream, MockMediaSource, MockPeerConnection, PeerConnection,
    SignalInbox, SignalingError,
};
pub use storage::{ProfileCache, StorageError};
pub use store::{SessionSnapshot, SessionStore};
