//! Key mapping for the host surface

use crate::sim::Direction;

/// A player command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Steer(Direction),
    /// Pause toggle
    Pause,
    /// Idle/demo mode toggle
    ToggleAutopilot,
}

impl Input {
    /// Map a legacy DOM `keyCode`
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            37 => Some(Input::Steer(Direction::Left)),
            38 => Some(Input::Steer(Direction::Up)),
            39 => Some(Input::Steer(Direction::Right)),
            40 => Some(Input::Steer(Direction::Down)),
            32 => Some(Input::Pause),
            73 => Some(Input::ToggleAutopilot),
            _ => None,
        }
    }

    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Input::Steer(Direction::Up)),
            "ArrowDown" | "s" | "S" => Some(Input::Steer(Direction::Down)),
            "ArrowLeft" | "a" | "A" => Some(Input::Steer(Direction::Left)),
            "ArrowRight" | "d" | "D" => Some(Input::Steer(Direction::Right)),
            " " | "Spacebar" => Some(Input::Pause),
            "i" | "I" => Some(Input::ToggleAutopilot),
            _ => None,
        }
    }
}
