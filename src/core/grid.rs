//! Board Grid Geometry
//!
//! Static cell layout of a level plus coordinate helpers.
//! Entities refer to cells by `Position` only, never by reference.

use serde::{Serialize, Deserialize};

// =============================================================================
// POSITION & DIRECTION
// =============================================================================

/// Grid coordinate (row, column), origin at the top-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbouring coordinate one step in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are the grid's concern.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (d_row, d_col) = direction.delta();
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        Some(Position { row, col })
    }
}

/// One of the four movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Left = 1,
    Down = 2,
    Right = 3,
}

impl Direction {
    /// All directions, in index order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Row/column offset of a single step.
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
            Direction::Right => (0, 1),
        }
    }

    /// Get direction from index (0-3).
    pub fn from_index(index: u8) -> Option<Direction> {
        Self::ALL.get(index as usize).copied()
    }
}

// =============================================================================
// CELLS
// =============================================================================

/// Content of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    Wall = 0,
    Floor = 1,
    Pickup = 2,
    Portal = 3,
}

impl Cell {
    /// Level file marker for a wall.
    pub const WALL_MARK: char = 'X';
    /// Level file marker for empty floor.
    pub const FLOOR_MARK: char = '.';
    /// Level file marker for a pickup.
    pub const PICKUP_MARK: char = 'o';
    /// Level file marker for a portal.
    pub const PORTAL_MARK: char = '@';

    /// Parse a level file marker.
    pub fn from_mark(mark: char) -> Option<Cell> {
        match mark {
            Self::WALL_MARK => Some(Cell::Wall),
            Self::FLOOR_MARK => Some(Cell::Floor),
            Self::PICKUP_MARK => Some(Cell::Pickup),
            Self::PORTAL_MARK => Some(Cell::Portal),
            _ => None,
        }
    }

    /// Level file marker for this cell.
    pub fn mark(self) -> char {
        match self {
            Cell::Wall => Self::WALL_MARK,
            Cell::Floor => Self::FLOOR_MARK,
            Cell::Pickup => Self::PICKUP_MARK,
            Cell::Portal => Self::PORTAL_MARK,
        }
    }

    #[inline]
    pub fn is_walkable(self) -> bool {
        self != Cell::Wall
    }
}

// =============================================================================
// GRID
// =============================================================================

/// Rectangular, row-major cell layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from row-major cells.
    ///
    /// Returns `None` if `cells.len() != rows * cols`.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Option<Self> {
        if rows.checked_mul(cols)? != cells.len() {
            return None;
        }
        Some(Self { rows, cols, cells })
    }

    /// Grid of `rows x cols` floor cells.
    pub fn filled(rows: usize, cols: usize, cell: Cell) -> Self {
        Self {
            rows,
            cols,
            cells: vec![cell; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos).then(|| pos.row * self.cols + pos.col)
    }

    /// Cell at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Overwrite the cell at `pos`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// True if `pos` is in bounds and not a wall.
    #[inline]
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(Cell::is_walkable)
    }

    /// Number of pickups still on the grid.
    pub fn pickups_remaining(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Pickup).count()
    }

    /// Iterate rows as cell slices.
    pub fn row_slices(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols.max(1))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_underflow_is_none() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(origin.step(Direction::Left), None);
        assert_eq!(origin.step(Direction::Down), Some(Position::new(1, 0)));
        assert_eq!(origin.step(Direction::Right), Some(Position::new(0, 1)));
    }

    #[test]
    fn test_cell_marks_roundtrip() {
        for cell in [Cell::Wall, Cell::Floor, Cell::Pickup, Cell::Portal] {
            assert_eq!(Cell::from_mark(cell.mark()), Some(cell));
        }
        assert_eq!(Cell::from_mark('?'), None);
    }

    #[test]
    fn test_grid_bounds() {
        let mut grid = Grid::filled(2, 3, Cell::Floor);
        assert!(grid.is_walkable(Position::new(1, 2)));
        assert!(!grid.is_walkable(Position::new(2, 0)));
        assert_eq!(grid.get(Position::new(0, 3)), None);

        grid.set(Position::new(0, 1), Cell::Wall);
        assert!(!grid.is_walkable(Position::new(0, 1)));

        // Ignored
        grid.set(Position::new(9, 9), Cell::Pickup);
        assert_eq!(grid.pickups_remaining(), 0);
    }

    #[test]
    fn test_from_cells_checks_size() {
        assert!(Grid::from_cells(2, 2, vec![Cell::Floor; 3]).is_none());
        let grid = Grid::from_cells(1, 2, vec![Cell::Pickup, Cell::Portal]).unwrap();
        assert_eq!(grid.pickups_remaining(), 1);
        assert_eq!(grid.row_slices().count(), 1);
    }
}
