//! API Error Types
//!
//! Unified error type for the client facade.

use thiserror::Error;

use crate::network::NetworkError;
use crate::signaling::SignalingError;
use crate::storage::StorageError;

/// Unified error type for client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network operation failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Call setup or signaling failed.
    #[error("signaling error: {0}")]
    Signaling(#[from] SignalingError),

    /// Profile cache operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Operation requires a logged-in user.
    #[error("not logged in")]
    NotLoggedIn,

    /// Invalid operation in current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
