//! Glue between a `GameSession` and its tick timer
//!
//! The session only emits `TimerCommand`s; the driver applies them to a
//! `RepeatingTask` so there is never more than one live tick schedule.
//! Everything else is returned for the view to render.

use crate::board_cells;
use crate::input::Input;
use crate::schedule::{ManualTimer, RepeatingTask, TimerBackend};
use crate::sim::{GameEvent, GameSession, SessionPhase, TimerCommand, choose_direction};

pub struct GameDriver<B: TimerBackend> {
    session: GameSession,
    task: RepeatingTask<B>,
    autopilot: bool,
}

impl<B: TimerBackend> GameDriver<B> {
    pub fn new(session: GameSession, backend: B) -> Self {
        Self {
            session,
            task: RepeatingTask::new(backend),
            autopilot: false,
        }
    }

    /// Start a new game sized to a host surface of the given pixel size
    pub fn new_game(&mut self, width_px: u32, height_px: u32) -> Vec<GameEvent> {
        let (cols, rows) = board_cells(width_px, height_px);
        self.session.new_game(cols, rows);
        self.dispatch()
    }

    pub fn handle_input(&mut self, input: Input) -> Vec<GameEvent> {
        match input {
            Input::Steer(direction) => {
                // Manual steering takes over from the demo
                self.autopilot = false;
                self.session.set_direction(direction);
            }
            Input::Pause => {
                self.session.toggle_pause();
            }
            Input::ToggleAutopilot => {
                self.autopilot = !self.autopilot;
                log::info!("Autopilot: {}", self.autopilot);
            }
        }
        self.dispatch()
    }

    /// Pause a running game (focus loss, hidden tab)
    pub fn auto_pause(&mut self) -> Vec<GameEvent> {
        if self.session.phase() == SessionPhase::Running {
            self.session.toggle_pause();
            log::info!("Auto-paused");
        }
        self.dispatch()
    }

    /// Called by the timer for every scheduled tick
    pub fn on_tick(&mut self) -> Vec<GameEvent> {
        if self.autopilot {
            if let Some(direction) = choose_direction(&self.session) {
                self.session.set_direction(direction);
            }
        }
        self.session.tick();
        self.dispatch()
    }

    /// Apply pending timer commands and hand back the view events
    fn dispatch(&mut self) -> Vec<GameEvent> {
        let mut view_events = Vec::new();
        for event in self.session.drain_events() {
            match event {
                GameEvent::Timer(TimerCommand::Restart { period_ms }) => self.task.restart(period_ms),
                GameEvent::Timer(TimerCommand::Cancel) => self.task.cancel(),
                other => view_events.push(other),
            }
        }
        view_events
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn task(&self) -> &RepeatingTask<B> {
        &self.task
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }
}

impl GameDriver<ManualTimer> {
    /// Move virtual time forward by `ms`, running every tick that falls due
    pub fn advance(&mut self, ms: u64) -> Vec<GameEvent> {
        let deadline = self.task.backend().now_ms() + ms;
        let mut events = Vec::new();
        while self
            .task
            .backend_mut()
            .fire_next_before(deadline)
            .is_some()
        {
            events.extend(self.on_tick());
        }
        events
    }
}
