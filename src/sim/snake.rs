//! The serpent: body, heading and per-tick movement
//!
//! The body is a deque of segments, head at the front. A plain move recycles
//! the tail segment as the new head, so the view only ever relocates one
//! element per tick.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::apples::{AppleId, AppleManager};
use super::grid::{CellState, Grid, Position};
use crate::consts::{INITIAL_SPEED_MS, SPEED_STEP_MS};

/// Direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns the (dcol, drow) step for this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Identity of a body element for the view layer
pub type SegmentId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub pos: Position,
}

/// What the head ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crash {
    Wall,
    SelfCollision,
}

/// Result of one `Snake::tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing moved (no heading, no body, or already dead)
    Idle,
    /// The head would have entered `at`; the snake is now dead
    Crashed { at: Position, kind: Crash },
    /// The tail segment `id` was lifted from `from` and became the head at `to`
    Moved {
        id: SegmentId,
        from: Position,
        to: Position,
    },
    /// A new head segment was added on top of an apple
    Grew {
        segment: Segment,
        apple: Option<AppleId>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    body: VecDeque<Segment>,
    /// Requested direction, applied on the next tick
    direction: Option<Direction>,
    /// Direction of the last completed move
    heading: Option<Direction>,
    alive: bool,
    /// Tick interval (ms)
    speed_ms: u32,
    next_id: SegmentId,
}

impl Default for Snake {
    fn default() -> Self {
        Self::new()
    }
}

impl Snake {
    /// A bodiless snake; call `spawn` to place it
    pub fn new() -> Self {
        Self {
            body: VecDeque::new(),
            direction: None,
            heading: None,
            alive: false,
            speed_ms: INITIAL_SPEED_MS,
            next_id: 0,
        }
    }

    fn reset(&mut self) {
        self.body.clear();
        self.direction = None;
        self.heading = None;
        self.alive = false;
        self.speed_ms = INITIAL_SPEED_MS;
    }

    fn alloc_id(&mut self) -> SegmentId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset to a single head on a random empty cell.
    ///
    /// Returns None (and leaves the snake dead) when the board has no room.
    pub fn spawn<R: Rng>(&mut self, grid: &mut Grid, rng: &mut R) -> Option<Segment> {
        self.reset();
        let Some(pos) = grid.random_empty_cell(rng) else {
            log::warn!("No empty cell to spawn the snake");
            return None;
        };
        self.place(grid, &[pos]);
        self.body.front().copied()
    }

    /// Reset to a body at fixed cells, head first.
    ///
    /// Every cell must be in bounds and empty, and cells must be distinct;
    /// otherwise nothing is placed and false is returned.
    pub fn spawn_at(&mut self, grid: &mut Grid, cells: &[Position]) -> bool {
        self.reset();
        let distinct = cells
            .iter()
            .enumerate()
            .all(|(i, p)| !cells[..i].contains(p));
        let free = cells
            .iter()
            .all(|&p| grid.get(p) == Some(CellState::Empty));
        if cells.is_empty() || !distinct || !free {
            return false;
        }
        self.place(grid, cells);
        true
    }

    fn place(&mut self, grid: &mut Grid, cells: &[Position]) {
        for &pos in cells {
            let id = self.alloc_id();
            grid.set(CellState::Snake, pos);
            self.body.push_back(Segment { id, pos });
        }
        self.alive = true;
    }

    /// Request a new direction. A reversal of the current direction (or of
    /// the last move) is rejected. Returns whether the request was taken.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if !self.alive || self.body.is_empty() {
            return false;
        }
        let reverses = |current: Option<Direction>| current == Some(direction.opposite());
        if reverses(self.direction) || reverses(self.heading) {
            return false;
        }
        self.direction = Some(direction);
        true
    }

    /// Drop the requested direction, halting motion. Returns what it was.
    pub fn clear_direction(&mut self) -> Option<Direction> {
        self.direction.take()
    }

    /// Reinstate a direction saved by `clear_direction`
    pub fn restore_direction(&mut self, direction: Option<Direction>) {
        self.direction = direction;
    }

    /// Mark dead and stop moving
    pub fn kill(&mut self) {
        self.alive = false;
        self.direction = None;
    }

    /// Advance one cell in the requested direction.
    ///
    /// Crashes on leaving the board or entering a body cell other than the
    /// tail (which vacates this tick). Entering an apple eats it through
    /// `apples` and grows the body by one.
    pub fn tick(&mut self, grid: &mut Grid, apples: &mut AppleManager) -> MoveOutcome {
        let (Some(direction), Some(head), Some(tail)) =
            (self.direction, self.head(), self.tail())
        else {
            return MoveOutcome::Idle;
        };
        if !self.alive {
            return MoveOutcome::Idle;
        }

        let (dcol, drow) = direction.delta();
        let to = head.offset(dcol, drow);

        let growth = match grid.get(to) {
            None => return self.crash(to, Crash::Wall),
            Some(CellState::Snake) if to != tail => {
                return self.crash(to, Crash::SelfCollision);
            }
            Some(CellState::Apple) => true,
            Some(CellState::Snake) | Some(CellState::Empty) => false,
        };
        self.heading = Some(direction);

        if growth {
            let apple = apples.remove(to, grid);
            grid.set(CellState::Snake, to);
            let segment = Segment {
                id: self.alloc_id(),
                pos: to,
            };
            self.body.push_front(segment);
            return MoveOutcome::Grew { segment, apple };
        }

        let Some(Segment { id, pos: from }) = self.body.pop_back() else {
            return MoveOutcome::Idle;
        };
        grid.set(CellState::Empty, from);
        grid.set(CellState::Snake, to);
        self.body.push_front(Segment { id, pos: to });
        MoveOutcome::Moved { id, from, to }
    }

    fn crash(&mut self, at: Position, kind: Crash) -> MoveOutcome {
        self.kill();
        MoveOutcome::Crashed { at, kind }
    }

    /// Shorten the tick interval by one step, never reaching zero.
    /// Returns whether the interval changed.
    pub fn increase_speed(&mut self) -> bool {
        if self.speed_ms > SPEED_STEP_MS {
            self.speed_ms -= SPEED_STEP_MS;
            true
        } else {
            false
        }
    }

    pub fn head(&self) -> Option<Position> {
        self.body.front().map(|s| s.pos)
    }

    pub fn tail(&self) -> Option<Position> {
        self.body.back().map(|s| s.pos)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.body.iter()
    }

    /// Body cells, head first
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().map(|s| s.pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.iter().any(|s| s.pos == pos)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn heading(&self) -> Option<Direction> {
        self.heading
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn speed_ms(&self) -> u32 {
        self.speed_ms
    }
}
