//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use tilewalk::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder};

// Configuration
pub use crate::config::{Config, ConfigError, GameConfig};

// Global systems and context
pub use crate::core::globals::{GlobalContext, GlobalSystems, Viewport};

// Injection
pub use crate::core::injector::{Inject, InjectError, Scope};

// Input system
pub use crate::core::input::{KeyCode, Modifiers, MouseButton};

// Scene system
pub use crate::core::scene::{HookResult, Scene, SceneKey, SceneTransition};

// Nodes and tasks
pub use crate::core::nodes::{Node, NodeCollection, NodeId};
pub use crate::core::scheduler::{Scheduler, Task, TaskStatus};

// Message bus
pub use crate::core::message_bus::MessageBus;

// Map
pub use crate::map::{Direction, GridPos, MapEngine, MapTable, TileMetrics};
