//! Connection Request Protocol
//!
//! Phase machine for the peer-to-peer "connect" relationship, as seen from
//! the local user. The store holds the durable outcome (`connected` flag,
//! pending request list); this module tracks the in-flight phase so that a
//! duplicate or stale event resolves to a no-op instead of an error, and so
//! the UI can distinguish "declined" from "never asked" within a session.

use std::collections::HashMap;

use crate::model::UserId;

/// Relationship phase between the local user and one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    /// No request in flight and no resolved outcome recorded.
    #[default]
    Idle,
    /// We sent a request and are waiting for the peer's answer.
    OutgoingRequested,
    /// The peer sent a request and is waiting for ours.
    IncomingRequested,
    /// A request was accepted by either side.
    Connected,
    /// A request was rejected by either side.
    Declined,
}

/// Events that drive the phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEvent {
    /// Local user issued a request to the peer.
    SendRequest,
    /// The peer's request arrived.
    PeerRequested,
    /// Local user accepted the peer's pending request.
    Accept,
    /// The peer accepted our pending request.
    PeerAccepted,
    /// Local user rejected the peer's pending request.
    Reject,
    /// The peer rejected our pending request.
    PeerRejected,
    /// Local user withdrew their own request.
    Cancel,
    /// The peer withdrew their request before we answered.
    PeerCancelled,
}

/// Applies one event to a phase.
///
/// Returns `None` when the event does not apply to the current phase (a
/// duplicate delivery or a stale message); the caller treats that as a
/// no-op, never an error.
pub fn transition(phase: RequestPhase, event: RequestEvent) -> Option<RequestPhase> {
    use RequestEvent::*;
    use RequestPhase::*;

    match (phase, event) {
        // Opening an edge. Re-requesting after a resolution starts over.
        (Idle | Declined, SendRequest) => Some(OutgoingRequested),
        (Idle | Declined, PeerRequested) => Some(IncomingRequested),
        // A duplicate of the same pending request replaces, not duplicates.
        (OutgoingRequested, SendRequest) => Some(OutgoingRequested),
        (IncomingRequested, PeerRequested) => Some(IncomingRequested),

        // Resolving an incoming request.
        (IncomingRequested, Accept) => Some(Connected),
        (IncomingRequested, Reject) => Some(Declined),
        (IncomingRequested, PeerCancelled) => Some(Idle),

        // Resolving an outgoing request.
        (OutgoingRequested, PeerAccepted) => Some(Connected),
        (OutgoingRequested, PeerRejected) => Some(Declined),
        (OutgoingRequested, Cancel) => Some(Idle),

        // The server resolves events it relayed before it saw our teardown;
        // a late accept/reject on an idle edge converges on the outcome.
        (Idle, PeerAccepted | Accept) => Some(Connected),
        (Idle, PeerRejected | Reject) => Some(Declined),

        // Anything else is a duplicate of an already-resolved request.
        _ => None,
    }
}

/// Tracks the request phase per peer for the lifetime of a session.
///
/// Purely advisory: store mutations are idempotent on their own and are
/// never gated on the tracker.
#[derive(Debug, Default)]
pub struct RequestTracker {
    phases: HashMap<UserId, RequestPhase>,
}

impl RequestTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        RequestTracker::default()
    }

    /// Returns the phase for a peer (`Idle` when never seen).
    pub fn phase(&self, peer: &str) -> RequestPhase {
        self.phases.get(peer).copied().unwrap_or_default()
    }

    /// Applies an event for a peer. Returns the new phase, or `None` when
    /// the event was a no-op for the current phase.
    pub fn apply(&mut self, peer: &str, event: RequestEvent) -> Option<RequestPhase> {
        let next = transition(self.phase(peer), event)?;
        self.phases.insert(peer.to_string(), next);
        Some(next)
    }

    /// Forgets all tracked phases (session teardown).
    pub fn clear(&mut self) {
        self.phases.clear();
    }
}
