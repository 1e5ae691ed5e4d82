//=========================================================================
// Grid
//=========================================================================
//
// Cell coordinates, facing, pixel/grid conversion and the two boolean
// grids movement is decided on.
//
// Coordinates: `x` is the column, `y` the row, origin top-left.
// Flat index: `y * cols + x`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::data::{MapData, TileTable};
use super::MapError;

//=== GridPos =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: GridPos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Neighbouring cell in `direction`, or `None` past the top/left edge.
    pub fn step(self, direction: Direction) -> Option<GridPos> {
        let (dx, dy) = direction.offset();
        Some(GridPos {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

//=== Direction ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Down,
    Left,
    Right,
    Up,
}

impl Direction {
    /// Search order used by the pathfinder.
    pub const ALL: [Direction; 4] = [Direction::Down, Direction::Left, Direction::Right, Direction::Up];

    /// Column/row delta of one step.
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
        }
    }
}

//=== TileMetrics =========================================================

/// The one place the tile size lives.
///
/// Provided in the root scope; every pixel/grid conversion resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMetrics {
    tile_size: u32,
}

impl TileMetrics {
    /// # Panics
    ///
    /// Panics if `tile_size` is zero.
    pub fn new(tile_size: u32) -> Self {
        assert!(tile_size > 0, "Tile size must be positive");
        Self { tile_size }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Integer-divides a local pixel position by the tile size.
    ///
    /// Negative coordinates are left of / above the grid and yield `None`.
    pub fn pixel_to_grid(&self, x: f32, y: f32) -> Option<GridPos> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let size = self.tile_size as usize;
        Some(GridPos::new(x as usize / size, y as usize / size))
    }

    /// Top-left pixel of a cell.
    pub fn grid_to_pixel(&self, pos: GridPos) -> (f32, f32) {
        let size = self.tile_size as f32;
        (pos.x as f32 * size, pos.y as f32 * size)
    }

    /// Pixel extent of a `rows` x `cols` grid as (width, height).
    pub fn extent(&self, rows: usize, cols: usize) -> (f32, f32) {
        let size = self.tile_size as f32;
        (cols as f32 * size, rows as f32 * size)
    }
}

impl Default for TileMetrics {
    fn default() -> Self {
        Self::new(32)
    }
}

//=== WalkabilityGrid =====================================================

/// Passable cells of a map, derived once from its tile ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkabilityGrid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl WalkabilityGrid {
    /// `walkable(x, y) = tiles.is_passable(tile_id(x, y))`.
    ///
    /// Cells without a tile id are not walkable.
    pub fn from_map(map: &MapData, tiles: &TileTable) -> Self {
        let cells = (0..map.rows * map.cols)
            .map(|i| map.data.get(i).is_some_and(|&id| tiles.is_passable(id)))
            .collect();

        Self {
            rows: map.rows,
            cols: map.cols,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x < self.cols && pos.y < self.rows
    }

    /// Out-of-bounds cells are not walkable.
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.contains(pos) && self.cells[pos.y * self.cols + pos.x]
    }

    /// Fresh obstacle grid: every non-walkable cell blocked.
    pub fn obstacles(&self) -> ObstacleGrid {
        ObstacleGrid {
            rows: self.rows,
            cols: self.cols,
            blocked: self.cells.iter().map(|walkable| !walkable).collect(),
        }
    }
}

//=== ObstacleGrid ========================================================

/// Per-request blocked cells: the walkability grid plus caller overlays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleGrid {
    rows: usize,
    cols: usize,
    blocked: Vec<bool>,
}

impl ObstacleGrid {
    /// A grid with nothing blocked.
    ///
    /// # Errors
    ///
    /// [`MapError::Oversized`] if `rows * cols` does not fit in `usize`.
    pub fn open(rows: usize, cols: usize) -> Result<Self, MapError> {
        let cells = rows.checked_mul(cols).ok_or_else(|| MapError::Oversized {
            map: String::from("obstacles"),
            rows,
            cols,
        })?;

        Ok(Self {
            rows,
            cols,
            blocked: vec![false; cells],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x < self.cols && pos.y < self.rows
    }

    /// Marks a cell blocked. Out-of-bounds cells are ignored.
    pub fn block(&mut self, pos: GridPos) {
        if self.contains(pos) {
            self.blocked[pos.y * self.cols + pos.x] = true;
        }
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, pos: GridPos) -> bool {
        !self.contains(pos) || self.blocked[pos.y * self.cols + pos.x]
    }

    pub(crate) fn index(&self, pos: GridPos) -> usize {
        pos.y * self.cols + pos.x
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.blocked.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> MapData {
        MapData {
            id: "test".into(),
            rows: 2,
            cols: 3,
            data: vec![0, 1, 0, 2, 0, 0],
            events: Vec::new(),
        }
    }

    //--- Conversion -------------------------------------------------------

    #[test]
    fn pixel_to_grid_uses_integer_division() {
        let metrics = TileMetrics::new(32);
        assert_eq!(metrics.pixel_to_grid(65.0, 97.0), Some(GridPos::new(2, 3)));
        assert_eq!(metrics.pixel_to_grid(31.9, 0.0), Some(GridPos::new(0, 0)));
        assert_eq!(metrics.pixel_to_grid(-1.0, 5.0), None);
    }

    #[test]
    fn grid_to_pixel_is_top_left_corner() {
        let metrics = TileMetrics::new(32);
        assert_eq!(metrics.grid_to_pixel(GridPos::new(2, 3)), (64.0, 96.0));
        assert_eq!(metrics.extent(10, 12), (384.0, 320.0));
    }

    #[test]
    #[should_panic(expected = "Tile size must be positive")]
    fn zero_tile_size_panics() {
        TileMetrics::new(0);
    }

    //--- Positions --------------------------------------------------------

    #[test]
    fn manhattan_and_step() {
        let a = GridPos::new(1, 1);
        assert_eq!(a.manhattan(GridPos::new(3, 0)), 3);
        assert_eq!(a.step(Direction::Up), Some(GridPos::new(1, 0)));
        assert_eq!(a.step(Direction::Right), Some(GridPos::new(2, 1)));
        assert_eq!(GridPos::new(0, 0).step(Direction::Left), None);
    }

    //--- Walkability ------------------------------------------------------

    #[test]
    fn walkability_mirrors_tile_table_per_cell() {
        let map = sample_map();
        let tiles = TileTable::new(vec![true, false, false]);
        let grid = WalkabilityGrid::from_map(&map, &tiles);

        assert_eq!(grid.len(), map.rows * map.cols);
        for y in 0..map.rows {
            for x in 0..map.cols {
                let id = map.data[y * map.cols + x];
                assert_eq!(grid.is_walkable(GridPos::new(x, y)), tiles.is_passable(id));
            }
        }
        assert!(!grid.is_walkable(GridPos::new(3, 0)));
    }

    #[test]
    fn obstacle_overlay_does_not_touch_base_grid() {
        let grid = WalkabilityGrid::from_map(&sample_map(), &TileTable::new(vec![true, false, false]));

        let mut obstacles = grid.obstacles();
        obstacles.block(GridPos::new(2, 1));

        assert!(obstacles.is_blocked(GridPos::new(2, 1)));
        assert!(obstacles.is_blocked(GridPos::new(1, 0)));
        assert!(!obstacles.is_blocked(GridPos::new(0, 0)));
        assert!(obstacles.is_blocked(GridPos::new(9, 9)));
        assert!(grid.is_walkable(GridPos::new(2, 1)));
        assert!(!grid.obstacles().is_blocked(GridPos::new(2, 1)));
    }

    #[test]
    fn open_obstacle_grid_checks_size() {
        let grid = ObstacleGrid::open(2, 3).unwrap();
        assert_eq!(grid.cell_count(), 6);
        assert!(!grid.is_blocked(GridPos::new(2, 1)));

        assert!(matches!(
            ObstacleGrid::open(usize::MAX, 2),
            Err(MapError::Oversized { rows: usize::MAX, cols: 2, .. })
        ));
    }
}
