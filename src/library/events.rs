use crate::common::EntryId;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Change notification raised after every successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryEvent {
    Added(EntryId),
    Updated(EntryId),
    Removed(EntryId),
    Cleared,
}

/// Fan-out of library events to any number of receivers
#[derive(Debug, Default)]
pub struct Observers(Vec<Sender<LibraryEvent>>);

impl Observers {
    /// Register a new receiver of future events
    pub fn subscribe(&mut self) -> Receiver<LibraryEvent> {
        let (tx, rx) = channel();
        self.0.push(tx);
        rx
    }

    /// Send an event to every live receiver, forgetting dropped ones
    pub fn notify(&mut self, event: LibraryEvent) {
        tracing::trace!(?event, "library changed");
        self.0.retain(|tx| tx.send(event).is_ok());
    }

    #[cfg(test)]
    /// Internal helper function for testing
    pub fn len(&self) -> usize {
        self.0.len()
    }
}
