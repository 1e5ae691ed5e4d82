//=========================================================================
// Scene System
//=========================================================================
//
// Stack-based scene lifecycle management.
//
// Architecture:
//   SceneStack
//     ├─ factories: HashMap<S, SceneFactory>   (constructors by key)
//     └─ stack: Vec<SceneEntry>                (live scenes, top = active)
//
// Lifecycle per scene:
//   Created ─on_init→ Initialized ─on_start→ Started ─on_end→ Ended
//                                               ↑               │
//                                               └──on_start─────┤
//                                                               └─on_destroy→ Destroyed
//
//=========================================================================

//=== External Dependencies ===============================================

use std::error::Error;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::globals::{GlobalContext, Viewport};

//=== Module Declarations =================================================

mod scene_stack;
mod transition_queue;

//=== Public API ==========================================================

pub use scene_stack::{SceneError, SceneStack};
pub use transition_queue::{SceneTransition, TransitionQueue};

/// Result of a fallible lifecycle hook.
pub type HookResult = Result<(), Box<dyn Error>>;

//=== Scene Key Trait =====================================================

/// Marker trait for scene identifiers.
///
/// Typically implemented by a game-specific enum.
pub trait SceneKey: Clone + Copy + Eq + Hash + Debug + 'static {}

//=== SceneState ==========================================================

/// Lifecycle state of a scene owned by a [`SceneStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneState {
    Created,
    Initialized,
    Started,
    Ended,
    Destroyed,
}

impl SceneState {
    /// Returns `true` if `self → next` is a legal lifecycle step.
    ///
    /// `Ended → Started` is the reactivation edge taken when a scene above
    /// is popped. Nothing leaves `Destroyed`.
    pub fn can_transition_to(self, next: SceneState) -> bool {
        use SceneState::*;
        matches!(
            (self, next),
            (Created, Initialized)
                | (Initialized, Started)
                | (Started, Ended)
                | (Ended, Started)
                | (Ended, Destroyed)
        )
    }
}

//=== Scene Trait =========================================================

/// A top-level screen managed by a [`SceneStack`].
///
/// Only `update()` is required. Lifecycle hooks default to no-ops.
///
/// Scenes are built by the stack through
/// [`Inject`](crate::core::injector::Inject) inside a child scope of the
/// stack's scope; a scene that keeps that scope owns it and releases it
/// when dropped after `on_destroy`.
pub trait Scene<S: SceneKey> {
    /// Called once after construction.
    ///
    /// An error aborts the push: the scene is dropped and the previously
    /// active scene is started again.
    fn on_init(&mut self, _context: &mut GlobalContext<S>) -> HookResult {
        Ok(())
    }

    /// Called when the scene becomes the active (top) scene.
    fn on_start(&mut self, _context: &mut GlobalContext<S>) {}

    /// Called when the scene stops being active (covered or popped).
    fn on_end(&mut self, _context: &mut GlobalContext<S>) {}

    /// Called once before the scene is dropped.
    fn on_destroy(&mut self, _context: &mut GlobalContext<S>) {}

    /// Called every tick while the scene is active.
    fn update(&mut self, context: &mut GlobalContext<S>, dt: Duration);

    /// Viewport-size-changed sink. Only the active scene is notified.
    fn on_resize(&mut self, _viewport: Viewport) {}
}

//=========================================================================
// Unit Tests
//=========================================================================
