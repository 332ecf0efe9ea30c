//! Media Layer Abstractions
//!
//! The relay never interprets signaling payloads; it moves opaque blobs
//! between the realtime session and whatever peer-connection implementation
//! the embedding application provides. These traits are that seam, with mock
//! implementations for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::SignalingError;

/// Handle to a local audio/video capture stream.
///
/// The stream stays live until [`MediaStream::stop`] is called or the handle
/// is dropped. Exclusively owned by the active call.
#[derive(Debug)]
pub struct MediaStream {
    id: String,
    live: Arc<AtomicBool>,
}

impl MediaStream {
    /// Creates a live stream handle.
    pub fn new(id: impl Into<String>) -> Self {
        MediaStream {
            id: id.into(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Returns the stream id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns true while capture is running.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stops capture. Idempotent.
    pub fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }

    /// Shared liveness flag, used by tests to observe release after drop.
    pub fn live_handle(&self) -> Arc<AtomicBool> {
        self.live.clone()
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Source of local media capture (camera/microphone).
pub trait MediaSource {
    /// Acquires a capture stream. Failure aborts call setup and is reported
    /// to the user; it never affects presence or connection-request state.
    fn acquire(&mut self) -> Result<MediaStream, SignalingError>;
}

/// A local peer connection in the sense of the media layer.
///
/// Implementations wrap a WebRTC-style offerer/answerer. Signals are opaque
/// JSON values; ordering of `apply_remote_signal` calls matches the arrival
/// order on the transport and must be preserved by implementations.
pub trait PeerConnection: Send {
    /// Attaches the local capture stream before negotiation starts.
    fn add_local_stream(&mut self, stream: &MediaStream) -> Result<(), SignalingError>;

    /// Drains signals produced locally (offer, answer, ICE candidates)
    /// since the last call, in production order.
    fn take_local_signals(&mut self) -> Vec<serde_json::Value>;

    /// Applies a signal received from the remote peer.
    fn apply_remote_signal(&mut self, signal: serde_json::Value) -> Result<(), SignalingError>;

    /// Returns true once the direct media channel is established.
    fn is_established(&self) -> bool;

    /// Releases the peer connection. Idempotent.
    fn close(&mut self);
}

impl<P: PeerConnection + ?Sized> PeerConnection for Box<P> {
    fn add_local_stream(&mut self, stream: &MediaStream) -> Result<(), SignalingError> {
        (**self).add_local_stream(stream)
    }

    fn take_local_signals(&mut self) -> Vec<serde_json::Value> {
        (**self).take_local_signals()
    }

    fn apply_remote_signal(&mut self, signal: serde_json::Value) -> Result<(), SignalingError> {
        (**self).apply_remote_signal(signal)
    }

    fn is_established(&self) -> bool {
        (**self).is_established()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Mock media source for tests.
///
/// Tracks every stream it hands out so tests can assert release.
#[derive(Debug, Default)]
pub struct MockMediaSource {
    fail_with: Option<String>,
    acquired: Vec<Arc<AtomicBool>>,
    counter: u32,
}

impl MockMediaSource {
    /// Creates a mock source that always succeeds.
    pub fn new() -> Self {
        MockMediaSource::default()
    }

    /// Makes the next `acquire` fail (e.g. permission denied).
    pub fn fail_next(&mut self, reason: &str) {
        self.fail_with = Some(reason.to_string());
    }

    /// Returns how many streams were handed out.
    pub fn acquired_count(&self) -> usize {
        self.acquired.len()
    }

    /// Returns true when every handed-out stream has been stopped.
    pub fn all_stopped(&self) -> bool {
        self.acquired.iter().all(|live| !live.load(Ordering::SeqCst))
    }
}

impl MediaSource for MockMediaSource {
    fn acquire(&mut self) -> Result<MediaStream, SignalingError> {
        if let Some(reason) = self.fail_with.take() {
            return Err(SignalingError::MediaUnavailable(reason));
        }
        self.counter += 1;
        let stream = MediaStream::new(format!("mock-stream-{}", self.counter));
        self.acquired.push(stream.live_handle());
        Ok(stream)
    }
}

/// Mock peer connection for tests.
///
/// Locally produced signals are scripted with [`MockPeerConnection::push_local_signal`];
/// applied remote signals are recorded in order.
#[derive(Debug, Default)]
pub struct MockPeerConnection {
    local_signals: Vec<serde_json::Value>,
    applied: Vec<serde_json::Value>,
    apply_error: Option<String>,
    established: bool,
    closed: Arc<AtomicBool>,
}

impl MockPeerConnection {
    /// Creates a new mock peer connection.
    pub fn new() -> Self {
        MockPeerConnection::default()
    }

    /// Scripts a locally produced signal (returned by the next drain).
    pub fn push_local_signal(&mut self, signal: serde_json::Value) {
        self.local_signals.push(signal);
    }

    /// Makes the next `apply_remote_signal` fail.
    pub fn fail_next_apply(&mut self, reason: &str) {
        self.apply_error = Some(reason.to_string());
    }

    /// Remote signals applied so far, in order.
    pub fn applied_signals(&self) -> &[serde_json::Value] {
        &self.applied
    }

    /// Marks the media channel as established.
    pub fn set_established(&mut self, established: bool) {
        self.established = established;
    }

    /// Shared closed flag, observable after the connection is boxed away.
    pub fn closed_handle(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl PeerConnection for MockPeerConnection {
    fn add_local_stream(&mut self, _stream: &MediaStream) -> Result<(), SignalingError> {
        Ok(())
    }

    fn take_local_signals(&mut self) -> Vec<serde_json::Value> {
        std::mem::take(&mut self.local_signals)
    }

    fn apply_remote_signal(&mut self, signal: serde_json::Value) -> Result<(), SignalingError> {
        if let Some(reason) = self.apply_error.take() {
            return Err(SignalingError::PeerConnection(reason));
        }
        self.applied.push(signal);
        Ok(())
    }

    fn is_established(&self) -> bool {
        self.established
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
