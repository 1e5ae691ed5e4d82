//=========================================================================
// Services
//=========================================================================
//
// Application-lifetime collaborators provided in the root scope.
//
// Architecture:
//   ResourceManager: string key → ResourceHandle (sounds, images)
//   AudioManager:    BGM / ME channels over a pluggable AudioBackend
//   GameStorage:     persisted actor record, TOML on disk via `Config`
//
//=========================================================================

//=== Module Declarations =================================================

mod audio;
mod resources;
mod storage;

//=== Public API ==========================================================

pub use audio::{AudioBackend, AudioChannel, AudioManager, SilentAudio};
pub use resources::{Preload, ResourceError, ResourceHandle, ResourceKind, ResourceManager};
pub use storage::{ActorRecord, GameStorage};

#[cfg(test)]
pub(crate) use audio::testing;
