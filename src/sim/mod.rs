//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - One tick per call, no clocks or timers
//! - No rendering or platform dependencies

pub mod apples;
pub mod autopilot;
pub mod grid;
pub mod level;
pub mod session;
pub mod snake;

pub use apples::{Apple, AppleId, AppleManager};
pub use autopilot::choose_direction;
pub use grid::{CellState, Grid, Position};
pub use level::{Level, Theme};
pub use session::{GameEvent, GameSession, SessionPhase, TimerCommand};
pub use snake::{Crash, Direction, MoveOutcome, Segment, SegmentId, Snake};
