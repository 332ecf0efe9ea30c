//! Call Signaling Relay
//!
//! Brokers the offer/answer/ICE exchange between the local peer connection
//! and a remote peer, riding the realtime session as its transport. Payloads
//! stay opaque; per-pair ordering is the transport's per-connection ordering,
//! with no extra sequencing layered on top.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use log::debug;

use super::error::SignalingError;
use super::peer::{MediaSource, MediaStream, PeerConnection};
use crate::model::{SignalMessage, UserId};
use crate::network::Transport;
use crate::session::RealtimeSession;

/// Ordered queue of inbound signals for one peer.
///
/// The realtime session pushes from its dispatch loop; the call session
/// drains during [`CallSession::pump`]. Cloning shares the queue.
#[derive(Debug, Clone, Default)]
pub struct SignalInbox {
    queue: Arc<Mutex<VecDeque<SignalMessage>>>,
}

impl SignalInbox {
    /// Creates an empty inbox.
    pub fn new() -> Self {
        SignalInbox::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<SignalMessage>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Appends a signal in arrival order.
    pub fn push(&self, message: SignalMessage) {
        self.lock().push_back(message);
    }

    /// Removes and returns the oldest queued signal.
    pub fn pop(&self) -> Option<SignalMessage> {
        self.lock().pop_front()
    }

    /// Returns the number of queued signals.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when no signals are queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// An active call attempt with one peer.
///
/// Owns the peer connection and the captured media stream. Both are released
/// on [`CallSession::end`] and, failing that, on drop; teardown is
/// guaranteed on every exit path.
pub struct CallSession<P: PeerConnection> {
    peer_id: UserId,
    peer: P,
    stream: Option<MediaStream>,
    inbox: SignalInbox,
    ended: bool,
}

impl<P: PeerConnection> CallSession<P> {
    /// Starts a call attempt toward `peer_id`.
    ///
    /// Acquires local media first; if acquisition or stream attachment fails
    /// the call never starts and nothing is leaked.
    pub fn start(
        peer_id: &str,
        media: &mut dyn MediaSource,
        mut peer: P,
        inbox: SignalInbox,
    ) -> Result<Self, SignalingError> {
        let stream = media.acquire()?;
        peer.add_local_stream(&stream).inspect_err(|_| {
            peer.close();
        })?;

        Ok(CallSession {
            peer_id: peer_id.to_string(),
            peer,
            stream: Some(stream),
            inbox,
            ended: false,
        })
    }

    /// Returns the remote peer's id.
    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Returns the underlying peer connection.
    pub fn peer(&self) -> &P {
        &self.peer
    }

    /// Returns true once the direct media channel is established.
    pub fn is_established(&self) -> bool {
        !self.ended && self.peer.is_established()
    }

    /// Relays signals in both directions.
    ///
    /// Locally produced signals go out through the session as
    /// `call:signal {to, signal}`; queued inbound signals are applied to the
    /// peer connection in arrival order, never reversed.
    pub fn pump<T: Transport>(
        &mut self,
        session: &mut RealtimeSession<T>,
    ) -> Result<(), SignalingError> {
        if self.ended {
            return Err(SignalingError::CallEnded);
        }

        for signal in self.peer.take_local_signals() {
            session.send_call_signal(&self.peer_id, signal)?;
        }

        while let Some(message) = self.inbox.pop() {
            if message.from != self.peer_id {
                debug!("dropping signal from unexpected peer {}", message.from);
                continue;
            }
            self.peer.apply_remote_signal(message.signal)?;
        }

        Ok(())
    }

    /// Ends the call: stops local capture and releases the peer connection.
    /// Idempotent.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
        self.peer.close();
    }
}

impl<P: PeerConnection> Drop for CallSession<P> {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signaling::peer::{MockMediaSource, MockPeerConnection};

    #[test]
    fn test_media_failure_aborts_start() {
        let mut media = MockMediaSource::new();
        media.fail_next("permission denied");

        let result = CallSession::start(
            "bob",
            &mut media,
            MockPeerConnection::new(),
            SignalInbox::new(),
        );
        assert!(matches!(result, Err(SignalingError::MediaUnavailable(_))));
        assert_eq!(media.acquired_count(), 0);
    }

    #[test]
    fn test_end_is_idempotent_and_releases() {
        let mut media = MockMediaSource::new();
        let peer = MockPeerConnection::new();
        let closed = peer.closed_handle();

        let mut call =
            CallSession::start("bob", &mut media, peer, SignalInbox::new()).unwrap();
        call.end();
        call.end();

        assert!(media.all_stopped());
        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_drop_releases_resources() {
        let mut media = MockMediaSource::new();
        let peer = MockPeerConnection::new();
        let closed = peer.closed_handle();

        {
            let _call =
                CallSession::start("bob", &mut media, peer, SignalInbox::new()).unwrap();
        }

        assert!(media.all_stopped());
        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_inbox_preserves_order() {
        let inbox = SignalInbox::new();
        inbox.push(SignalMessage {
            from: "bob".into(),
            signal: serde_json::json!({"type": "offer"}),
        });
        inbox.push(SignalMessage {
            from: "bob".into(),
            signal: serde_json::json!({"type": "candidate"}),
        });

        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox.pop().unwrap().signal["type"], "offer");
        assert_eq!(inbox.pop().unwrap().signal["type"], "candidate");
        assert!(inbox.pop().is_none());
    }
}
