//! Signaling Error Types

use thiserror::Error;

use crate::network::NetworkError;

/// Errors raised while setting up or running a call.
///
/// All of these are fatal to the call attempt only; presence and
/// connection-request handling continue uninterrupted.
#[derive(Error, Debug)]
pub enum SignalingError {
    /// Camera/microphone acquisition failed (permission denied, device busy).
    #[error("Media device unavailable: {0}")]
    MediaUnavailable(String),

    /// The local peer connection failed.
    #[error("Peer connection error: {0}")]
    PeerConnection(String),

    /// The signaling payload could not be relayed.
    #[error("Signal relay failed: {0}")]
    Relay(#[from] NetworkError),

    /// Operation on a call that has already ended.
    #[error("Call already ended")]
    CallEnded,
}
