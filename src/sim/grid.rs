//! Board occupancy grid
//!
//! Every cell holds exactly one `CellState`. Coordinates are (column, row),
//! 0-indexed from the top-left corner.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Occupancy of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Empty,
    Snake,
    Apple,
}

/// A cell coordinate. Signed so that a head stepping off the board can be
/// represented and rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub col: i32,
    pub row: i32,
}

impl Position {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Offset by a (dcol, drow) delta
    pub fn offset(&self, dcol: i32, drow: i32) -> Self {
        Self {
            col: self.col + dcol,
            row: self.row + drow,
        }
    }

    /// Top-left pixel of this cell on a board of `block`-sized cells
    pub fn to_pixels(&self, block: u32) -> (i32, i32) {
        (self.col * block as i32, self.row * block as i32)
    }

    /// Manhattan distance, used by the autopilot
    pub fn manhattan(&self, other: Position) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }
}

/// Fixed-size 2D cell array
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    /// Column-major: index = col * height + row
    cells: Vec<CellState>,
}

impl Grid {
    /// Allocate a `width` x `height` grid with every cell empty
    pub fn new(width: u32, height: u32) -> Self {
        let mut grid = Self::default();
        grid.build(width, height);
        grid
    }

    /// Replace the grid with a fresh, all-empty one
    pub fn build(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(width as usize * height as usize, CellState::Empty);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.col >= 0
            && pos.row >= 0
            && (pos.col as u32) < self.width
            && (pos.row as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.col as usize * self.height as usize + pos.row as usize)
    }

    /// Cell state at `pos`, or None when out of bounds
    pub fn get(&self, pos: Position) -> Option<CellState> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Write `state` at `pos`. Returns false (and writes nothing) when out of bounds.
    pub fn set(&mut self, state: CellState, pos: Position) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = state;
                true
            }
            None => false,
        }
    }

    /// Number of cells currently holding `state`
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Pick a random empty cell.
    ///
    /// Samples uniformly over the whole board for up to `len()` attempts,
    /// then falls back to a uniform pick among the remaining empty cells so
    /// that None means the board is genuinely full.
    pub fn random_empty_cell<R: Rng>(&self, rng: &mut R) -> Option<Position> {
        if self.is_empty() {
            return None;
        }

        for _ in 0..self.len() {
            let pos = Position::new(
                rng.random_range(0..self.width) as i32,
                rng.random_range(0..self.height) as i32,
            );
            if self.get(pos) == Some(CellState::Empty) {
                return Some(pos);
            }
        }

        let empty: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == CellState::Empty)
            .map(|(i, _)| i)
            .collect();
        if empty.is_empty() {
            return None;
        }
        let i = empty[rng.random_range(0..empty.len())];
        let h = self.height as usize;
        Some(Position::new((i / h) as i32, (i % h) as i32))
    }
}
