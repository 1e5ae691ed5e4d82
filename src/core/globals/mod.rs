//=========================================================================
// Global Engine State
//=========================================================================
//
// Separates systems (logic components) from context (shared data).
//
// Architecture:
//   GlobalSystems: root Scope + SceneStack (owned by the orchestrator)
//   GlobalContext: StateTracker + TransitionQueue + MessageBus + Viewport
//                  (passed to scenes)
//
//=========================================================================

//=== Module Declarations =================================================

mod global_context;
mod global_systems;

//=== Public API ==========================================================

pub use global_context::{GlobalContext, Viewport};
pub use global_systems::GlobalSystems;
