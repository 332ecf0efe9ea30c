//! Call Signaling
//!
//! Everything needed to establish a direct peer media channel: the media
//! layer seam ([`PeerConnection`] / [`MediaSource`]), the per-peer inbound
//! signal queue, and the [`CallSession`] that owns a call attempt end to end.
//!
//! This layer never interprets signaling payloads: offers, answers, and ICE
//! candidates are opaque JSON owned by the media layer.

mod error;
mod peer;
mod relay;

pub use error::SignalingError;
pub use peer::{
    MediaSource, MediaStream, MockMediaSource, MockPeerConnection, PeerConnection,
};
pub use relay::{CallSession, SignalInbox};
