//=========================================================================
// Map Data
//=========================================================================
//
// Read-only map descriptions and the static tile lookup, loaded once.
//
// TOML layout for an external table:
// ```toml
// [tiles]
// passable = [true, false, false, true]
//
// [[maps]]
// id = "MAP_0"
// rows = 2
// cols = 3
// data = [0, 0, 1, 0, 3, 0]
//
// [[maps.events]]
// id = "elder"
// x = 2
// y = 1
// character = { sprite = "elder.png", direction = "Left" }
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::grid::{Direction, GridPos};
use super::MapError;
use crate::config::{Config, ConfigError};

//=== Map Events ==========================================================

/// Visual description of the character standing on an event cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDescriptor {
    pub sprite: String,
    #[serde(default)]
    pub direction: Direction,
}

/// A fixed, interactable map entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEvent {
    pub id: String,
    pub x: usize,
    pub y: usize,
    pub character: CharacterDescriptor,
}

impl MapEvent {
    pub fn pos(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }
}

//=== MapData =============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    pub id: String,
    pub rows: usize,
    pub cols: usize,
    /// Row-major tile ids, `rows * cols` long.
    pub data: Vec<u32>,
    #[serde(default)]
    pub events: Vec<MapEvent>,
}

impl MapData {
    /// Checks the tile array length and that every event is on the grid.
    pub fn validate(&self) -> Result<(), MapError> {
        let expected = self.rows.checked_mul(self.cols).ok_or_else(|| MapError::Oversized {
            map: self.id.clone(),
            rows: self.rows,
            cols: self.cols,
        })?;
        if self.data.len() != expected {
            return Err(MapError::DataLength {
                map: self.id.clone(),
                rows: self.rows,
                cols: self.cols,
                expected,
                actual: self.data.len(),
            });
        }

        match self.events.iter().find(|e| e.x >= self.cols || e.y >= self.rows) {
            Some(event) => Err(MapError::OutOfBounds { x: event.x, y: event.y }),
            None => Ok(()),
        }
    }

    pub fn tile_id(&self, pos: GridPos) -> Option<u32> {
        if pos.x >= self.cols || pos.y >= self.rows {
            return None;
        }
        self.data.get(pos.y * self.cols + pos.x).copied()
    }

    pub fn event_at(&self, pos: GridPos) -> Option<&MapEvent> {
        self.events.iter().find(|event| event.pos() == pos)
    }
}

//=== TileTable ===========================================================

/// Static tile id → passable lookup. Unknown ids are impassable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTable {
    passable: Vec<bool>,
}

impl TileTable {
    pub fn new(passable: Vec<bool>) -> Self {
        Self { passable }
    }

    pub fn is_passable(&self, id: u32) -> bool {
        self.passable.get(id as usize).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.passable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passable.is_empty()
    }
}

impl Default for TileTable {
    /// 0 grass, 1 wall, 2 water, 3 road.
    fn default() -> Self {
        Self::new(vec![true, false, false, true])
    }
}

//=== MapTable ============================================================

/// Map id → [`MapData`], plus the tile lookup all maps share.
#[derive(Debug, Clone)]
pub struct MapTable {
    tiles: TileTable,
    maps: HashMap<String, MapData>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MapFile {
    #[serde(default)]
    tiles: Option<TileTable>,
    #[serde(default)]
    maps: Vec<MapData>,
}

impl Config for MapFile {}

impl MapTable {
    pub fn new(tiles: TileTable) -> Self {
        Self {
            tiles,
            maps: HashMap::new(),
        }
    }

    /// Validates and adds a map, replacing any map with the same id.
    pub fn insert(&mut self, map: MapData) -> Result<(), MapError> {
        map.validate()?;
        self.maps.insert(map.id.clone(), map);
        Ok(())
    }

    /// Loads a TOML table. Without a `[tiles]` section the built-in
    /// lookup is used.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = MapFile::load_from_file(path)?;
        let mut table = Self::new(file.tiles.unwrap_or_default());

        for map in file.maps {
            table
                .insert(map)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        info!("Loaded {} maps from {}", table.len(), path.display());
        Ok(table)
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Self {
        let mut table = Self::new(TileTable::default());
        table.maps.insert("MAP_0".into(), builtin_map_0());
        table
    }

    pub fn get(&self, id: &str) -> Result<&MapData, MapError> {
        self.maps.get(id).ok_or_else(|| MapError::UnknownMap(id.to_owned()))
    }

    pub fn tiles(&self) -> &TileTable {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl Default for MapTable {
    fn default() -> Self {
        Self::builtin()
    }
}

//--- Built-in Maps -------------------------------------------------------

#[rustfmt::skip]
const MAP_0_TILES: [u32; 120] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    1, 0, 0, 0, 2, 2, 0, 0, 0, 0, 0, 1,
    1, 0, 0, 0, 2, 2, 0, 0, 0, 0, 0, 1,
    1, 3, 3, 3, 3, 3, 3, 3, 3, 3, 0, 1,
    1, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 1,
    1, 0, 1, 1, 1, 0, 0, 0, 0, 3, 0, 1,
    1, 0, 0, 0, 0, 0, 0, 2, 0, 3, 0, 1,
    1, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
];

fn builtin_map_0() -> MapData {
    MapData {
        id: "MAP_0".into(),
        rows: 10,
        cols: 12,
        data: MAP_0_TILES.to_vec(),
        events: vec![
            MapEvent {
                id: "elder".into(),
                x: 8,
                y: 2,
                character: CharacterDescriptor {
                    sprite: "elder.png".into(),
                    direction: Direction::Down,
                },
            },
            MapEvent {
                id: "signpost".into(),
                x: 5,
                y: 7,
                character: CharacterDescriptor {
                    sprite: "signpost.png".into(),
                    direction: Direction::Down,
                },
            },
        ],
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
    fn builtin_table_is_valid() {
        let table = MapTable::builtin();
        let map = table.get("MAP_0").unwrap();

        assert!(map.validate().is_ok());
        assert_eq!(map.tile_id(GridPos::new(0, 0)), Some(1));
        assert_eq!(map.tile_id(GridPos::new(1, 1)), Some(0));
        assert_eq!(map.event_at(GridPos::new(8, 2)).map(|e| e.id.as_str()), Some("elder"));
        assert_eq!(table.get("MAP_9"), Err(MapError::UnknownMap("MAP_9".into())));
    }

    #[test]
    fn unknown_tile_ids_are_impassable() {
        let tiles = TileTable::default();
        assert!(tiles.is_passable(0));
        assert!(!tiles.is_passable(1));
        assert!(tiles.is_passable(3));
        assert!(!tiles.is_passable(99));
    }

    #[test]
    fn short_tile_array_is_rejected() {
        let map = MapData { id: "bad".into(), rows: 2, cols: 2, data: vec![0; 3], events: vec![] };
        assert!(matches!(
            MapTable::new(TileTable::default()).insert(map),
            Err(MapError::DataLength { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        let map = MapData { id: "huge".into(), rows: usize::MAX, cols: 2, data: vec![0; 4], events: vec![] };
        assert_eq!(
            map.validate(),
            Err(MapError::Oversized { map: "huge".into(), rows: usize::MAX, cols: 2 })
        );
    }

    #[test]
    fn event_outside_grid_is_rejected() {
        let mut map = MapTable::builtin().get("MAP_0").unwrap().clone();
        map.events[0].x = 12;
        assert_eq!(map.validate(), Err(MapError::OutOfBounds { x: 12, y: 2 }));
    }

    #[test]
    fn loads_table_from_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("maps.toml");
        std::fs::write(
            &path,
            r#"
[tiles]
passable = [true, false]

[[maps]]
id = "yard"
rows = 2
cols = 3
data = [0, 0, 1, 0, 1, 0]

[[maps.events]]
id = "dog"
x = 2
y = 1
character = { sprite = "dog.png", direction = "Left" }
"#,
        )
        .unwrap();

        let table = MapTable::load(&path).unwrap();
        let yard = table.get("yard").unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(yard.events[0].character.direction, Direction::Left);
        assert!(!table.tiles().is_passable(1));
    }

    #[test]
    fn invalid_map_in_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("maps.toml");
        std::fs::write(&path, "[[maps]]\nid = \"x\"\nrows = 2\ncols = 2\ndata = [0]\n").unwrap();

        assert!(matches!(MapTable::load(&path), Err(ConfigError::Invalid(_))));
    }
}
