//! Event Queue
//!
//! In-memory FIFO buffer of pending events. Unbounded.
//! `drain_all` is the single serialization point between tracking and flushing.

use parking_lot::Mutex;

use super::event::Event;

/// Ordered buffer of events awaiting delivery
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<Vec<Event>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. Never blocks on I/O.
    pub fn push(&self, event: Event) {
        self.events.lock().push(event);
    }

    /// Atomically remove every queued event, oldest first
    pub fn drain_all(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copy of the pending events (for inspection; does not drain)
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}
