//=========================================================================
// Map
//=========================================================================
//
// Tile grid, walkability, pathfinding and actor movement.
//
// Architecture:
//   MapTable ──> MapData ──> WalkabilityGrid ──> ObstacleGrid (+ events)
//                                                    ↓
//   MapEngine::walk_to ──> find_path ──> route: VecDeque<Waypoint>
//                                            ↓ one at a time
//   Scheduler<ActorBody> ──> StepTask::tick ──> Continue | Done
//                                            ↓ route empty
//   outbox: MapClickEvent, WalkCompleted
//
//=========================================================================

//=== Module Declarations =================================================

mod actor;
mod character;
mod data;
mod engine;
mod grid;
mod pathfinder;

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Public API ==========================================================

pub use actor::{ActorBody, ActorState, ActorStatus, StepTask};
pub use character::CharacterNode;
pub use data::{CharacterDescriptor, MapData, MapEvent, MapTable, TileTable};
pub use engine::{MapClickEvent, MapEngine, MapRules, TileLayer, TileSprite, WalkCompleted};
pub use grid::{Direction, GridPos, ObstacleGrid, TileMetrics, WalkabilityGrid};
pub use pathfinder::{find_path, Waypoint};

use crate::core::injector::InjectError;

//=== MapError ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("a walk is already in progress")]
    WalkInProgress,

    #[error("cell ({x}, {y}) is outside the map")]
    OutOfBounds { x: usize, y: usize },

    #[error("map `{map}` has {actual} tiles, expected {expected} ({rows}x{cols})")]
    DataLength {
        map: String,
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },

    #[error("map `{map}` is too large ({rows}x{cols})")]
    Oversized { map: String, rows: usize, cols: usize },

    #[error("unknown map `{0}`")]
    UnknownMap(String),

    #[error(transparent)]
    Inject(#[from] InjectError),
}
