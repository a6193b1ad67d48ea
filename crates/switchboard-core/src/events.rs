//! Typed event channels.
//!
//! Every collection layer publishes its changes through an [`Emitter`].
//! Interested layers call `watch()` to obtain an [`EventStream`] and drain it
//! when they are ready to react, so a chain of collections forms an explicit
//! pipeline instead of a web of callbacks.
//!
//! Delivery is synchronous: once `emit` returns, the event is queued on every
//! live stream. Streams that have been dropped are pruned on the next emit.

use std::{
    fmt,
    sync::mpsc::{self, Receiver, Sender},
};

/// Publishing side of a typed event channel.
pub struct Emitter<E> {
    senders: Vec<Sender<E>>,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("watchers", &self.senders.len())
            .finish()
    }
}

impl<E: Clone> Emitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new stream that receives every event emitted from now on.
    pub fn watch(&mut self) -> EventStream<E> {
        let (sender, receiver) = mpsc::channel();
        self.senders.push(sender);
        EventStream { receiver }
    }

    /// Queues `event` on every live stream.
    pub fn emit(&mut self, event: E) {
        self.senders
            .retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Returns the number of streams that were alive at the last emit.
    pub fn watcher_count(&self) -> usize {
        self.senders.len()
    }
}

/// Receiving side of a typed event channel.
pub struct EventStream<E> {
    receiver: Receiver<E>,
}

impl<E> fmt::Debug for EventStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

impl<E> EventStream<E> {
    /// Takes the next queued event, if any.
    pub fn try_next(&self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Takes every queued event in emission order.
    pub fn drain(&self) -> Vec<E> {
        self.receiver.try_iter().collect()
    }
}
