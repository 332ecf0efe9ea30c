//! Protocol Layer
//!
//! JSON text encoding for wire messages, plus envelope construction.

use super::error::NetworkError;
use super::message::{MessageEnvelope, MessagePayload, PROTOCOL_VERSION};
use crate::model::unix_now;

/// Maximum message size (256 KB). Signaling payloads with full ICE candidate
/// lists stay well under this.
pub const MAX_MESSAGE_SIZE: usize = 262_144;

/// Serializes a message envelope to a JSON text frame.
pub fn encode_message(message: &MessageEnvelope) -> Result<String, NetworkError> {
    let json =
        serde_json::to_string(message).map_err(|e| NetworkError::Serialization(e.to_string()))?;

    if json.len() > MAX_MESSAGE_SIZE {
        return Err(NetworkError::InvalidMessage(format!(
            "Message too large: {} bytes (max {})",
            json.len(),
            MAX_MESSAGE_SIZE
        )));
    }

    Ok(json)
}

/// Deserializes a message envelope from a JSON text frame.
pub fn decode_message(data: &str) -> Result<MessageEnvelope, NetworkError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(NetworkError::InvalidMessage(format!(
            "Message too large: {} bytes (max {})",
            data.len(),
            MAX_MESSAGE_SIZE
        )));
    }

    let envelope: MessageEnvelope =
        serde_json::from_str(data).map_err(|e| NetworkError::InvalidMessage(e.to_string()))?;

    if envelope.version != PROTOCOL_VERSION {
        return Err(NetworkError::InvalidMessage(format!(
            "Unsupported protocol version: {} (expected {})",
            envelope.version, PROTOCOL_VERSION
        )));
    }

    Ok(envelope)
}

/// Creates a new message envelope with a fresh ID and timestamp.
pub fn create_envelope(payload: MessagePayload) -> MessageEnvelope {
    MessageEnvelope {
        version: PROTOCOL_VERSION,
        message_id: uuid::Uuid::new_v4().to_string(),
        timestamp: unix_now(),
        payload,
    }
}
