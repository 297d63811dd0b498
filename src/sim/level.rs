//! The five fixed levels: score targets and board themes

use serde::{Deserialize, Serialize};

use crate::consts::{LEVEL_SCORE_STEP, MAX_LEVEL};

/// Board background for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Green,
    RoyalBlue,
    Plum,
    Silver,
    Gold,
}

impl Theme {
    /// CSS color name for the board background
    pub fn css_color(&self) -> &'static str {
        match self {
            Theme::Green => "green",
            Theme::RoyalBlue => "royalblue",
            Theme::Plum => "plum",
            Theme::Silver => "silver",
            Theme::Gold => "gold",
        }
    }
}

/// A level number in 1..=MAX_LEVEL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u8);

impl Default for Level {
    fn default() -> Self {
        Self::FIRST
    }
}

impl Level {
    pub const FIRST: Level = Level(1);

    /// Returns None outside 1..=MAX_LEVEL
    pub fn new(n: u8) -> Option<Self> {
        (1..=MAX_LEVEL).contains(&n).then_some(Level(n))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Score that completes this level
    pub fn target_score(&self) -> u32 {
        self.0 as u32 * LEVEL_SCORE_STEP
    }

    pub fn theme(&self) -> Theme {
        match self.0 {
            1 => Theme::Green,
            2 => Theme::RoyalBlue,
            3 => Theme::Plum,
            4 => Theme::Silver,
            _ => Theme::Gold,
        }
    }

    /// The following level, or None when this is the last one
    pub fn next(&self) -> Option<Level> {
        Level::new(self.0 + 1)
    }

    pub fn is_last(&self) -> bool {
        self.0 == MAX_LEVEL
    }
}
