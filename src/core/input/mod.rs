//=========================================================================
// Input
//=========================================================================
//
// Platform-independent input events and the per-frame state scenes query.
//
// Architecture:
//   event: InputEvent, KeyCode, MouseButton, Modifiers
//   state_tracker: StateTracker (held keys, pointer, clicks this frame)
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;
mod state_tracker;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, Modifiers, MouseButton};
pub use state_tracker::StateTracker;
