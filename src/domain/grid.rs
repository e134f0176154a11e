// Occupancy grid handed over by the scene builder; read-only to the engine.

pub type CellCode = u8;

pub const FREE: CellCode = 0;
pub const WALL: CellCode = 1;
pub const START: CellCode = 2;
pub const EXIT: CellCode = 3;
// Scenario markers: beacons in the tunnel, fires in the city.
pub const BEACON: CellCode = 4;
pub const FIRE: CellCode = 4;
pub const WATER: CellCode = 5;

/// Row-major cell codes (`cells[row][col]`), rows along +z and columns along +x.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    cells: Vec<Vec<CellCode>>,
    cell_size: f32,
    offset_x: f32,
    offset_z: f32,
}

impl OccupancyGrid {
    pub fn new(cells: Vec<Vec<CellCode>>, cell_size: f32, offset_x: f32, offset_z: f32) -> Self {
        Self {
            cells,
            cell_size,
            offset_x,
            offset_z,
        }
    }

    /// Places the grid so its extent is centered on the world origin.
    pub fn centered(cells: Vec<Vec<CellCode>>, cell_size: f32) -> Self {
        let cols = cells.first().map_or(0, Vec::len) as f32;
        let rows = cells.len() as f32;
        Self::new(
            cells,
            cell_size,
            -(cols * cell_size) / 2.0,
            -(rows * cell_size) / 2.0,
        )
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_z)
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// `floor((coord - offset) / cellSize)` on each axis; may fall outside the grid.
    pub fn cell_index(&self, x: f32, z: f32) -> (i64, i64) {
        (self.row_of(z), self.col_of(x))
    }

    pub fn col_of(&self, x: f32) -> i64 {
        ((x - self.offset_x) / self.cell_size).floor() as i64
    }

    pub fn row_of(&self, z: f32) -> i64 {
        ((z - self.offset_z) / self.cell_size).floor() as i64
    }

    /// Code at a cell, `None` when out of bounds.
    pub fn code(&self, row: i64, col: i64) -> Option<CellCode> {
        if row < 0 || col < 0 {
            return None;
        }
        self.cells
            .get(row as usize)
            .and_then(|cells| cells.get(col as usize))
            .copied()
    }

    pub fn code_at(&self, x: f32, z: f32) -> Option<CellCode> {
        let (row, col) = self.cell_index(x, z);
        self.code(row, col)
    }

    /// Out-of-bounds cells count as free space.
    pub fn is_wall(&self, row: i64, col: i64) -> bool {
        self.code(row, col) == Some(WALL)
    }

    pub fn cell_center(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.offset_x + col as f32 * self.cell_size + self.cell_size / 2.0,
            self.offset_z + row as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// Iterates `(row, col, code)` for every cell.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, CellCode)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, code)| (row, col, *code))
        })
    }
}
