//=========================================================================
// Transition Queue
//=========================================================================
//
// Deferred scene stack operations.
//
// Scenes queue transitions here while they update. The stack applies
// them in FIFO order at the tick boundary, so a transition never runs
// inside another scene's lifecycle hook.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::SceneKey;

//=== Scene Transition ====================================================

/// A requested scene stack operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTransition<K: SceneKey> {
    /// Constructs the scene registered under the key and makes it active.
    Push(K),

    /// Destroys the active scene and reactivates the one below.
    Pop,

    /// Pops every scene, top first.
    Clear,
}

//=== Transition Queue ====================================================

/// FIFO of pending [`SceneTransition`]s.
pub struct TransitionQueue<S: SceneKey> {
    queue: Vec<SceneTransition<S>>,
}

impl<S: SceneKey> TransitionQueue<S> {
    /// Creates a new empty transition queue.
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues a scene transition for the next tick boundary.
    pub fn push(&mut self, transition: SceneTransition<S>) {
        self.queue.push(transition);
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of queued transitions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Takes all transitions from the queue, leaving it empty.
    pub fn take(&mut self) -> Vec<SceneTransition<S>> {
        std::mem::take(&mut self.queue)
    }
}

impl<S: SceneKey> Default for TransitionQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
    enum Key {
        Menu,
    }

    impl SceneKey for Key {}

    #[test]
    fn take_preserves_fifo_and_empties() {
        let mut queue = TransitionQueue::new();
        queue.push(SceneTransition::Push(Key::Menu));
        queue.push(SceneTransition::Pop);
        assert_eq!(queue.len(), 2);

        let taken = queue.take();
        assert_eq!(taken, vec![SceneTransition::Push(Key::Menu), SceneTransition::Pop]);
        assert!(queue.is_empty());
    }
}
