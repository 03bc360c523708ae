//! Named-event publish/subscribe.
//!
//! Handlers run in subscription order, with no arguments. A failing
//! handler stops the raise and its error is returned to the caller;
//! handlers after it are not invoked.
//!
//! # Example
//!
//! ```rust
//! use waypoint::events::EventDispatcher;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&hits);
//!
//! let mut events = EventDispatcher::new();
//! events.subscribe("StateReached", move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! events.raise("StateReached").unwrap();
//! events.raise("Nobody listens").unwrap();
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use crate::registry::ActionResult;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Raised after every intermediate state and every transition.
pub const STATE_REACHED: &str = "StateReached";

/// Raised when a traversal arrives at its destination.
pub const DESTINATION_REACHED: &str = "DestinationReached";

/// Subscribed callback; cloneable so one handler can be added several times.
pub type EventHandler = Arc<dyn Fn() -> ActionResult + Send + Sync>;

/// Registry of handlers per event name.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<String, Vec<EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with an empty handler list for each of `events`.
    pub fn with_events<'a>(events: impl IntoIterator<Item = &'a str>) -> Self {
        let handlers = events
            .into_iter()
            .map(|event| (event.to_string(), Vec::new()))
            .collect();
        Self { handlers }
    }

    /// Append a handler to `event`. Duplicates are not detected.
    pub fn subscribe<F>(&mut self, event: &str, handler: F)
    where
        F: Fn() -> ActionResult + Send + Sync + 'static,
    {
        self.subscribe_shared(event, Arc::new(handler));
    }

    /// Append an already shared handler to `event`.
    pub fn subscribe_shared(&mut self, event: &str, handler: EventHandler) {
        self.handlers.entry(event.to_string()).or_default().push(handler);
    }

    /// Invoke every handler of `event` in subscription order.
    pub fn raise(&self, event: &str) -> ActionResult {
        let Some(handlers) = self.handlers.get(event) else {
            return Ok(());
        };
        for handler in handlers {
            handler()?;
        }
        Ok(())
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }

    /// Event names known to the dispatcher.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(event, handlers)| (event.as_str(), handlers.len()))
            .collect();
        f.debug_struct("EventDispatcher")
            .field("handlers", &counts)
            .finish()
    }
}
