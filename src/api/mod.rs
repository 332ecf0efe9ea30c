//! Client API
//!
//! High-level entry point for embedding applications: the [`Skillswap`]
//! orchestrator, its configuration, the event system, and the unified error
//! type.

mod client;
mod config;
mod error;
pub mod events;

pub use client::Skillswap;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use events::{CallbackHandler, EventDispatcher, EventHandler, SessionEvent};
