//! Apple placement and bookkeeping

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{CellState, Grid, Position};
use crate::consts::MAX_APPLES_PER_SPAWN;

/// Identity of an apple for the view layer. Never reused within a session.
pub type AppleId = u32;

/// An apple on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apple {
    pub id: AppleId,
    pub pos: Position,
}

/// Tracks active apples. Every record has exactly one matching `Apple` cell
/// in the grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppleManager {
    apples: Vec<Apple>,
    next_id: AppleId,
}

impl AppleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all apple records. The grid is expected to be rebuilt alongside;
    /// ids keep counting so the view never sees a stale id come back.
    pub fn clear(&mut self) {
        self.apples.clear();
    }

    /// Place up to `count` apples (1..=4) on empty cells.
    ///
    /// Apples that find no empty cell are skipped. Returns the apples actually
    /// placed, in placement order.
    pub fn spawn<R: Rng>(&mut self, count: usize, grid: &mut Grid, rng: &mut R) -> Vec<Apple> {
        if !(1..=MAX_APPLES_PER_SPAWN).contains(&count) {
            log::warn!("Ignoring apple spawn request for {} apples", count);
            return Vec::new();
        }

        let mut placed = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(pos) = grid.random_empty_cell(rng) else {
                log::warn!("No empty cell left for an apple");
                continue;
            };
            placed.extend(self.place(pos, grid));
        }
        placed
    }

    /// Put an apple on a specific cell. Returns None unless the cell is empty.
    pub fn place(&mut self, pos: Position, grid: &mut Grid) -> Option<Apple> {
        if grid.get(pos) != Some(CellState::Empty) {
            return None;
        }
        grid.set(CellState::Apple, pos);

        let apple = Apple {
            id: self.next_id,
            pos,
        };
        self.next_id += 1;
        self.apples.push(apple);
        Some(apple)
    }

    /// Remove the apple at `pos`, clearing its cell. Returns its id, or None
    /// if no apple is recorded there.
    pub fn remove(&mut self, pos: Position, grid: &mut Grid) -> Option<AppleId> {
        let index = self.apples.iter().position(|a| a.pos == pos)?;
        let apple = self.apples.remove(index);
        grid.set(CellState::Empty, pos);
        Some(apple.id)
    }

    /// Active apples in placement order
    pub fn apples(&self) -> &[Apple] {
        &self.apples
    }

    pub fn len(&self) -> usize {
        self.apples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apples.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.apples.iter().any(|a| a.pos == pos)
    }
}
