//=========================================================================
// Game Storage
//=========================================================================
//
// Persisted player state. The field scene seeds the actor from here and
// writes the actor back after every completed walk.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::config::{Config, ConfigError};
use crate::map::Direction;

//=== ActorRecord =========================================================

/// Stored actor position (grid cell) and facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
}

impl Default for ActorRecord {
    fn default() -> Self {
        Self { x: 1, y: 1, direction: Direction::Down }
    }
}

/// On-disk layout of a save file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SaveFile {
    actor: ActorRecord,
}

impl Config for SaveFile {}

//=== GameStorage =========================================================

#[derive(Debug, Default)]
pub struct GameStorage {
    actor: Cell<ActorRecord>,
}

impl GameStorage {
    pub fn new(actor: ActorRecord) -> Self {
        Self { actor: Cell::new(actor) }
    }

    pub fn actor(&self) -> ActorRecord {
        self.actor.get()
    }

    pub fn set_actor(&self, record: ActorRecord) {
        self.actor.set(record);
    }

    //--- Persistence ------------------------------------------------------

    /// Reads a save file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let save = SaveFile::load_from_file(path)?;
        info!("Loaded save from {}", path.display());
        Ok(Self::new(save.actor))
    }

    /// Replaces the in-memory record with the one stored at `path`.
    pub fn reload(&self, path: &Path) -> Result<(), ConfigError> {
        let save = SaveFile::load_from_file(path)?;
        self.set_actor(save.actor);
        Ok(())
    }

    /// Writes the current record to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        SaveFile { actor: self.actor() }.save_to_file(path)?;
        info!("Saved game to {}", path.display());
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.toml");

        let storage = GameStorage::default();
        storage.set_actor(ActorRecord { x: 4, y: 2, direction: Direction::Left });
        storage.save(&path).unwrap();

        let loaded = GameStorage::load(&path).unwrap();
        assert_eq!(loaded.actor(), ActorRecord { x: 4, y: 2, direction: Direction::Left });
    }

    #[test]
    fn reload_overwrites_in_memory_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.toml");
        std::fs::write(&path, "[actor]\nx = 7\ny = 3\ndirection = \"Up\"\n").unwrap();

        let storage = GameStorage::default();
        storage.reload(&path).unwrap();
        assert_eq!(storage.actor(), ActorRecord { x: 7, y: 3, direction: Direction::Up });
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = GameStorage::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
