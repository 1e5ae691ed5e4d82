//=========================================================================
// Message Bus
//=========================================================================
//
// Type-safe event queue for deterministic, frame-ordered delivery.
//
// Architecture:
//   Producer → push<M>() → HashMap<TypeId, Vec<M>>
//                               ↓
//   Owner ──────────→ take<M>() (drain once per frame, FIFO)
//
// Pattern: push → take → repeat. `read` / `clear` remain for consumers
// that need to peek without draining.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::message_queue::MessageQueue;

//=== Public API ==========================================================

/// Marker trait for types that can travel through a [`MessageBus`].
///
/// Implemented for every `'static` type.
pub trait Message: 'static {}

impl<T: 'static> Message for T {}

//=========================================================================

/// Event queue keeping one FIFO per message type.
#[derive(Default)]
pub struct MessageBus {
    queues: HashMap<TypeId, Box<dyn MessageQueue>>,
}

impl MessageBus {
    /// Creates a new empty message bus.
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }

    //--- Message Operations -----------------------------------------------

    /// Appends a message to the queue for its type.
    pub fn push<M: Message>(&mut self, msg: M) {
        self.queue_mut::<M>().push(msg);
    }

    /// Removes and returns every queued message of type `M`, oldest first.
    ///
    /// The queue keeps its capacity for the next frame.
    pub fn take<M: Message>(&mut self) -> Vec<M> {
        match self.queues.get_mut(&TypeId::of::<M>()) {
            Some(queue) => queue
                .as_any_mut()
                .downcast_mut::<Vec<M>>()
                .map(|v| v.drain(..).collect())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Returns a slice of all messages of type `M` currently queued.
    pub fn read<M: Message>(&self) -> &[M] {
        self.queues
            .get(&TypeId::of::<M>())
            .and_then(|q| q.as_any().downcast_ref::<Vec<M>>())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    //--- Query API --------------------------------------------------------

    /// Returns true if there are any messages of type `M` queued.
    pub fn has_messages<M: Message>(&self) -> bool {
        !self.read::<M>().is_empty()
    }

    /// Returns the number of messages of type `M` currently queued.
    pub fn count<M: Message>(&self) -> usize {
        self.read::<M>().len()
    }

    /// Returns the number of messages queued across all types.
    pub fn total(&self) -> usize {
        self.queues.values().map(|q| q.len()).sum()
    }

    //--- Clearing ---------------------------------------------------------

    /// Drops all messages of type `M`, preserving allocated capacity.
    pub fn clear<M: Message>(&mut self) {
        if let Some(queue) = self.queues.get_mut(&TypeId::of::<M>()) {
            queue.clear_queue();
        }
    }

    /// Drops all messages of every type, preserving capacity.
    pub fn clear_all(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear_queue();
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn queue_mut<M: Message>(&mut self) -> &mut Vec<M> {
        let queue = self
            .queues
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Box::new(Vec::<M>::new()));

        match queue.as_any_mut().downcast_mut::<Vec<M>>() {
            Some(vec) => vec,
            // Entries are keyed by TypeId::of::<M>, so the downcast cannot fail.
            None => unreachable!("message queue registered under a foreign TypeId"),
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
