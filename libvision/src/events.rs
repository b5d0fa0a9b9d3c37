//! Shell lifecycle events
//!
//! An in-process event bus for observing a shell from the outside (logs,
//! the HTTP front end, tests) without giving observers write access to the
//! view state.
//!
//! The bus uses `tokio::sync::broadcast`: if no subscribers exist events are
//! dropped, and lagging subscribers lose the oldest events rather than
//! blocking the shell.
//!
//! # Example
//!
//! ```
//! use libvision::events::{EventBus, ShellEvent};
//!
//! # async fn example() {
//! let bus = EventBus::new(16);
//! let mut receiver = bus.subscribe();
//!
//! bus.emit(ShellEvent::ConfigLoadStarted { provider: "mock".to_string() });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("{:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::router::PageId;
use crate::shell::ViewKind;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<ShellEvent>;

/// Broadcast bus for shell events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ShellEvent>,
}

impl EventBus {
    /// Create a new event bus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers (never blocks)
    pub fn emit(&self, event: ShellEvent) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }
}

/// Events emitted over a shell's lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellEvent {
    /// The configuration provider was invoked
    ConfigLoadStarted {
        /// Provider description
        provider: String,
    },

    /// The provider resolved
    ConfigLoaded {
        /// Organization named by the loaded configuration
        organization: String,
    },

    /// The provider failed; the shell stays in the error branch
    ConfigLoadFailed {
        /// Failure detail (never shown to visitors)
        error: String,
    },

    /// The external maintenance input changed
    MaintenanceChanged {
        enabled: bool,
    },

    /// The rendered branch changed
    ViewChanged {
        from: ViewKind,
        to: ViewKind,
    },

    /// A lazy page finished loading
    PageLoaded {
        page: PageId,
    },

    /// A lazy page failed to load
    PageFailed {
        page: PageId,
        error: String,
    },

    /// The shell was torn down
    Unmounted,
}
