//! Idle/demo mode steering
//!
//! Greedy: head for the nearest apple along a move that does not crash this
//! tick, preferring cells with more open neighbours to dodge dead ends.

use super::grid::{CellState, Grid, Position};
use super::session::GameSession;
use super::snake::Direction;

fn is_open(grid: &Grid, pos: Position, tail: Option<Position>) -> bool {
    match grid.get(pos) {
        Some(CellState::Empty) | Some(CellState::Apple) => true,
        Some(CellState::Snake) => Some(pos) == tail,
        None => false,
    }
}

fn open_neighbours(grid: &Grid, pos: Position, tail: Option<Position>) -> usize {
    Direction::ALL
        .iter()
        .map(|d| {
            let (dc, dr) = d.delta();
            pos.offset(dc, dr)
        })
        .filter(|&n| is_open(grid, n, tail))
        .count()
}

/// Pick the next direction for the session's snake, or None if every move
/// crashes (or there is no snake).
pub fn choose_direction(session: &GameSession) -> Option<Direction> {
    let snake = session.snake();
    let grid = session.grid();
    let head = snake.head()?;
    // A one-cell snake leaves its tail cell as it moves; longer ones too,
    // unless they are about to grow, which the greedy search ignores.
    let tail = if snake.len() > 1 { snake.tail() } else { None };
    let current = snake.heading().or(snake.direction());

    let target = session
        .apples()
        .apples()
        .iter()
        .map(|a| a.pos)
        .min_by_key(|p| head.manhattan(*p));

    Direction::ALL
        .iter()
        .copied()
        .filter(|d| current != Some(d.opposite()))
        .filter_map(|d| {
            let (dc, dr) = d.delta();
            let next = head.offset(dc, dr);
            is_open(grid, next, tail).then_some((d, next))
        })
        .min_by_key(|&(d, next)| {
            let distance = target.map(|t| next.manhattan(t)).unwrap_or(0);
            let cramped = 4 - open_neighbours(grid, next, tail);
            let turn = u32::from(current != Some(d));
            // Dead ends first, then distance, then keep going straight
            (u32::from(cramped >= 3), distance, cramped, turn)
        })
        .map(|(d, _)| d)
}
