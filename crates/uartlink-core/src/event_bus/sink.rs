//! Event sinks
//!
//! The receive loop and the session publish through [`EventSink`]. Every sink
//! must deliver events from one publisher in the order they were published.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::events::LinkEvent;

/// Consumer of link events
pub trait EventSink: Send + Sync {
    /// Deliver one event
    fn publish(&self, event: LinkEvent);
}

impl EventSink for mpsc::UnboundedSender<LinkEvent> {
    fn publish(&self, event: LinkEvent) {
        if self.send(event).is_err() {
            tracing::debug!("Event receiver dropped, event discarded");
        }
    }
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn publish(&self, event: LinkEvent) {
        (**self).publish(event)
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn publish(&self, event: LinkEvent) {
        (**self).publish(event)
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LinkEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything published so far
    pub fn events(&self) -> Vec<LinkEvent> {
        self.events.lock().clone()
    }

    /// Number of events published so far
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True if nothing was published
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: LinkEvent) {
        self.events.lock().push(event);
    }
}
