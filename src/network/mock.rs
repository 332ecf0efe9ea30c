//! Mock Transport
//!
//! Scripted implementation of the Transport trait for tests.

use std::collections::VecDeque;

use super::error::NetworkError;
use super::message::MessageEnvelope;
use super::transport::{ConnectionState, Transport, TransportConfig, TransportResult};
use crate::model::UserId;

/// Mock transport for testing.
///
/// Allows injection of inbound events and captures everything sent.
///
/// # Example
///
/// ```ignore
/// use skillswap_core::network::{MockTransport, Transport, TransportConfig};
///
/// let mut transport = MockTransport::new();
/// transport.connect(&TransportConfig::default()).unwrap();
///
/// transport.queue_receive(some_event_envelope);
/// transport.send(&outgoing).unwrap();
/// assert_eq!(transport.sent_messages().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    state: ConnectionState,
    /// Messages that have been sent.
    sent_messages: Vec<MessageEnvelope>,
    /// Messages to return on receive().
    receive_queue: VecDeque<MessageEnvelope>,
    /// Error to inject on the next operation.
    inject_error: Option<NetworkError>,
    /// Credential presented on the most recent connect().
    last_auth: Option<UserId>,
    /// Lifetime connect() count.
    connect_count: u32,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Queues a message to be returned by a later receive() call.
    pub fn queue_receive(&mut self, message: MessageEnvelope) {
        self.receive_queue.push_back(message);
    }

    /// Returns all messages that have been sent.
    pub fn sent_messages(&self) -> &[MessageEnvelope] {
        &self.sent_messages
    }

    /// Clears the sent messages buffer.
    pub fn clear_sent(&mut self) {
        self.sent_messages.clear();
    }

    /// Injects an error to be returned on the next operation.
    pub fn inject_error(&mut self, error: NetworkError) {
        self.inject_error = Some(error);
    }

    /// Manually sets the connection state (for testing transitions).
    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    /// Returns the credential presented on the most recent connect().
    pub fn last_auth(&self) -> Option<&UserId> {
        self.last_auth.as_ref()
    }

    /// Returns how many times connect() succeeded.
    pub fn connect_count(&self) -> u32 {
        self.connect_count
    }

    /// Returns the number of messages waiting in the receive queue.
    pub fn receive_queue_len(&self) -> usize {
        self.receive_queue.len()
    }

    fn check_error(&mut self) -> TransportResult<()> {
        if let Some(err) = self.inject_error.take() {
            return Err(err);
        }
        Ok(())
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()> {
        self.check_error().inspect_err(|_| {
            self.state = ConnectionState::Disconnected;
        })?;
        self.last_auth = config.auth_user_id.clone();
        self.connect_count += 1;
        self.state = ConnectionState::Connected;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        self.state = ConnectionState::Disconnected;
        // A superseded connection takes its undelivered events with it.
        self.receive_queue.clear();
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state.clone()
    }

    fn send(&mut self, message: &MessageEnvelope) -> TransportResult<()> {
        self.check_error()?;

        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }

        self.sent_messages.push(message.clone());
        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<MessageEnvelope>> {
        self.check_error()?;

        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }

        Ok(self.receive_queue.pop_front())
    }

    fn has_pending(&self) -> bool {
        !self.receive_queue.is_empty()
    }
}
