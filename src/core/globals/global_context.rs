//=========================================================================
// Global Context
//=========================================================================
//
// Shared data container for scenes.
//
// Contains state data that scenes read/write:
// - input_state: keys, pointer, clicks this frame
// - scene_transitions: command queue for scene changes
// - message_bus: typed cross-scene messages, kept for one frame
// - viewport: current window size
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, StateTracker};
use crate::core::message_bus::MessageBus;
use crate::core::scene::{SceneKey, TransitionQueue};

//=== Viewport ============================================================

/// Window inner size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

//=== GlobalContext =======================================================

/// Shared context data accessible to scenes during lifecycle hooks.
pub struct GlobalContext<S: SceneKey> {
    /// Input state for the current frame.
    pub input_state: StateTracker,

    /// Scene changes requested this frame, applied at the tick boundary.
    pub scene_transitions: TransitionQueue<S>,

    /// Typed message queues shared by every scene. Emptied at the start
    /// of every frame.
    pub message_bus: MessageBus,

    /// Current window size.
    pub viewport: Viewport,

    /// Input batches collected for the current frame. Consumed by
    /// [`GlobalSystems::update`](super::GlobalSystems::update).
    pub(crate) frame_events: Vec<Vec<InputEvent>>,
}

impl<S: SceneKey> GlobalContext<S> {
    /// Creates a context with empty state.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            input_state: StateTracker::new(),
            scene_transitions: TransitionQueue::new(),
            message_bus: MessageBus::new(),
            viewport,
            frame_events: Vec::new(),
        }
    }
}
