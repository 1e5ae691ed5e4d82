//=========================================================================
// Configuration
//=========================================================================
//
// Game configuration loaded from TOML.
//
// Layout:
// ```toml
// [window]
// title = "tilewalk"
// width = 800
// height = 600
//
// [engine]
// tps = 60.0
// channel_capacity = 128
//
// [map]
// tile_size = 32
// walk_duration_ms = 200
// start_map = "MAP_0"
// interact_distance = 2
//
// [paths]
// assets = "assets"
// save_file = "save.toml"
// ```
//
// Every section and field is optional; missing values take defaults.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Config Trait ========================================================

/// TOML-file load/save for any serde type with defaults.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Loads and parses `path`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnsupportedFormat`] unless the extension is `.toml`
    /// - [`ConfigError::Io`] if the file cannot be read
    /// - [`ConfigError::Parse`] if the contents are not valid
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        ensure_toml(path)?;
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serializes to `path`, replacing any existing file.
    fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        ensure_toml(path)?;
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn ensure_toml(path: &Path) -> Result<(), ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(()),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

//=== ConfigError =========================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

//=== GameConfig ==========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub engine: EngineConfig,
    pub map: MapConfig,
    pub paths: PathsConfig,
}

impl Config for GameConfig {}

impl GameConfig {
    /// Loads `path` and checks value ranges.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.engine.tps > 0.0 && self.engine.tps.is_finite()) {
            return Err(ConfigError::Invalid(format!("engine.tps must be positive and finite, got {}", self.engine.tps)));
        }
        if self.engine.channel_capacity == 0 {
            return Err(ConfigError::Invalid("engine.channel_capacity must be positive".into()));
        }
        if self.map.tile_size == 0 {
            return Err(ConfigError::Invalid("map.tile_size must be positive".into()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be positive".into()));
        }
        Ok(())
    }
}

//--- Sections ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "tilewalk".into(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tps: f64,
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Edge length of one tile in logical pixels.
    pub tile_size: u32,

    /// Time to cross one tile.
    pub walk_duration_ms: u64,

    /// Map shown when the field scene opens.
    pub start_map: String,

    /// Manhattan radius around the walk destination that triggers interact.
    pub interact_distance: usize,
}

impl MapConfig {
    pub fn walk_duration(&self) -> Duration {
        Duration::from_millis(self.walk_duration_ms)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_size: 32,
            walk_duration_ms: 200,
            start_map: "MAP_0".into(),
            interact_distance: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory of `sounds/` and `images/`.
    pub assets: PathBuf,

    /// Save file read by "Load Game" and written after each walk.
    pub save_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets"),
            save_file: PathBuf::from("save.toml"),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
