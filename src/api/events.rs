//! Event System
//!
//! Callbacks for session events surfaced to the UI. Handlers run strictly
//! after the store mutation that produced the event, so a slow or panicking
//! handler can delay rendering but never corrupt state.

use std::sync::{Arc, Mutex};

use crate::model::{RequestSender, User};
use crate::network::ConnectionState;

/// Events emitted by the realtime session and the client facade.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Transport connection state changed.
    ConnectionStateChanged {
        /// The new connection state.
        state: ConnectionState,
    },

    /// A presence snapshot was applied.
    PresenceChanged {
        /// Number of users currently online.
        online_count: usize,
    },

    /// A peer's connection request arrived.
    ConnectionRequestReceived {
        /// The requesting peer.
        sender: RequestSender,
    },

    /// A peer accepted our connection request.
    ConnectionAccepted {
        /// The now-connected peer.
        user: User,
    },

    /// A peer declined our connection request.
    ConnectionRejected {
        /// The declining peer.
        user: User,
    },

    /// A peer withdrew their pending request.
    ConnectionRequestCancelled {
        /// The withdrawing peer.
        user: User,
    },

    /// Soft error (transport failure, dropped command). Never fatal.
    Error {
        /// Error description.
        message: String,
    },
}

/// Event handler trait.
///
/// Implement this trait to receive session events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: SessionEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(SessionEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(SessionEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(SessionEvent) + Send + Sync,
{
    fn on_event(&self, event: SessionEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher for managing multiple handlers.
///
/// Shared via `Arc`; registration takes `&self` so handlers can be added
/// after the dispatcher has been handed to the session.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Mutex<Vec<Arc<dyn EventHandler>>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        EventDispatcher::default()
    }

    /// Adds an event handler.
    pub fn add_handler(&self, handler: Arc<dyn EventHandler>) {
        self.lock().push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&self) {
        self.lock().clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.lock().len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: SessionEvent) {
        let handlers = self.lock().clone();
        for handler in handlers {
            handler.on_event(event.clone());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn EventHandler>>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }
}
