//! Snafu - a grid Snake game for the browser
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, snake, apples, session state machine)
//! - `schedule`: Cancellable repeating tick task
//! - `driver`: Glue between the session and the tick task
//! - `input`: Key mapping for the host surface
//! - `settings`: User preferences

pub mod driver;
pub mod input;
pub mod schedule;
pub mod settings;
pub mod sim;

pub use driver::GameDriver;
pub use input::Input;
pub use settings::{LogLevel, Settings};

/// Game configuration constants
pub mod consts {
    /// Edge length of one grid cell in pixels
    pub const BLOCK_SIZE: u32 = 20;

    /// Tick interval at level 1 (ms)
    pub const INITIAL_SPEED_MS: u32 = 100;
    /// Interval reduction per level-up (ms)
    pub const SPEED_STEP_MS: u32 = 10;

    /// Points per apple eaten
    pub const APPLE_SCORE: u32 = 5;
    /// Apples placed on a fresh board
    pub const INITIAL_APPLES: usize = 3;
    /// Apples placed after one is eaten
    pub const REPLENISH_APPLES: usize = 1;
    /// Largest batch a single spawn call accepts
    pub const MAX_APPLES_PER_SPAWN: usize = 4;

    /// Final level; clearing it wins the game
    pub const MAX_LEVEL: u8 = 5;
    /// Score target per level (level N ends at N * LEVEL_SCORE_STEP)
    pub const LEVEL_SCORE_STEP: u32 = 100;
}

/// Derive grid dimensions from a host surface size in pixels
#[inline]
pub fn board_cells(width_px: u32, height_px: u32) -> (u32, u32) {
    (width_px / consts::BLOCK_SIZE, height_px / consts::BLOCK_SIZE)
}
