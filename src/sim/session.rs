//! Game session state machine
//!
//! Owns the grid, snake and apples, and turns ticks and player commands into
//! `GameEvent`s for the view and `TimerCommand`s for whoever drives the tick
//! timer. The session never schedules anything itself.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::apples::{Apple, AppleId, AppleManager};
use super::grid::{Grid, Position};
use super::level::{Level, Theme};
use super::snake::{Direction, MoveOutcome, Segment, SegmentId, Snake};
use crate::consts::{APPLE_SCORE, INITIAL_APPLES, REPLENISH_APPLES};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No game started yet (or the board had no room for a snake)
    Idle,
    /// Ticking
    Running,
    /// Ticking suspended, direction stashed
    Paused,
    /// Crashed or won; frozen until the next new game
    GameOver,
}

/// Instruction for the tick timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Cancel any running timer, then tick every `period_ms`
    Restart { period_ms: u32 },
    /// Cancel any running timer
    Cancel,
}

/// Something the view (or timer driver) must react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Board rebuilt; every old snake/apple element is gone
    BoardReset { width: u32, height: u32 },
    SnakeSpawned(Segment),
    /// Segment `id` relocated from the old tail cell to the new head cell
    SnakeMoved {
        id: SegmentId,
        from: Position,
        to: Position,
    },
    SnakeGrew(Segment),
    AppleSpawned(Apple),
    AppleRemoved { id: AppleId, pos: Position },
    ScoreChanged(u32),
    LevelChanged { level: Level, theme: Theme },
    PauseChanged(bool),
    GameOver {
        won: bool,
        score: u32,
        message: String,
    },
    Timer(TimerCommand),
}

/// One game of Snake from new-game to game-over
pub struct GameSession {
    grid: Grid,
    snake: Snake,
    apples: AppleManager,
    level: Level,
    score: u32,
    phase: SessionPhase,
    won: bool,
    message: Option<String>,
    /// Direction stashed while paused
    last_direction: Option<Direction>,
    seed: u64,
    rng: Pcg32,
    /// Ticks processed while running
    ticks: u64,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create an idle session with the given RNG seed
    pub fn new(seed: u64) -> Self {
        Self {
            grid: Grid::default(),
            snake: Snake::new(),
            apples: AppleManager::new(),
            level: Level::FIRST,
            score: 0,
            phase: SessionPhase::Idle,
            won: false,
            message: None,
            last_direction: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ticks: 0,
            events: Vec::new(),
        }
    }

    /// Start a fresh game on a `width` x `height` board with a randomly
    /// placed snake and the initial apple stock.
    pub fn new_game(&mut self, width: u32, height: u32) {
        self.reset_board(width, height);

        let Some(head) = self.snake.spawn(&mut self.grid, &mut self.rng) else {
            log::warn!("Board {}x{} has no room for a snake", width, height);
            return;
        };
        self.events.push(GameEvent::SnakeSpawned(head));
        self.spawn_apples(INITIAL_APPLES);
        self.start();
    }

    /// Start a fresh game with the snake body (head first) and apples on
    /// fixed cells. Returns false, leaving the session idle, if the layout
    /// does not fit the board.
    pub fn new_game_with_layout(
        &mut self,
        width: u32,
        height: u32,
        body: &[Position],
        apples: &[Position],
    ) -> bool {
        self.reset_board(width, height);

        if !self.snake.spawn_at(&mut self.grid, body) {
            log::warn!("Snake layout does not fit a {}x{} board", width, height);
            return false;
        }
        let segments: Vec<Segment> = self.snake.segments().copied().collect();
        self.events
            .extend(segments.into_iter().map(GameEvent::SnakeSpawned));

        for &pos in apples {
            match self.apples.place(pos, &mut self.grid) {
                Some(apple) => self.events.push(GameEvent::AppleSpawned(apple)),
                None => log::warn!("Skipping apple at occupied cell {:?}", pos),
            }
        }
        self.start();
        true
    }

    fn reset_board(&mut self, width: u32, height: u32) {
        self.events.push(GameEvent::Timer(TimerCommand::Cancel));
        if self.phase == SessionPhase::Paused {
            self.events.push(GameEvent::PauseChanged(false));
        }

        self.score = 0;
        self.level = Level::FIRST;
        self.won = false;
        self.message = None;
        self.last_direction = None;
        self.ticks = 0;
        self.phase = SessionPhase::Idle;

        self.apples.clear();
        self.grid.build(width, height);
        self.snake.kill();
        self.events.push(GameEvent::BoardReset { width, height });
    }

    fn start(&mut self) {
        self.phase = SessionPhase::Running;
        self.events.push(GameEvent::ScoreChanged(self.score));
        self.events.push(GameEvent::LevelChanged {
            level: self.level,
            theme: self.level.theme(),
        });
        self.events.push(GameEvent::Timer(TimerCommand::Restart {
            period_ms: self.snake.speed_ms(),
        }));
        log::info!(
            "New game on {}x{} board (seed {})",
            self.grid.width(),
            self.grid.height(),
            self.seed
        );
    }

    fn spawn_apples(&mut self, count: usize) {
        let placed = self.apples.spawn(count, &mut self.grid, &mut self.rng);
        for apple in placed {
            log::debug!("Apple {} at {:?}", apple.id, apple.pos);
            self.events.push(GameEvent::AppleSpawned(apple));
        }
    }

    /// Steer the snake. Ignored unless the game is running; reversals are
    /// rejected by the snake. Takes effect on the next tick.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        self.phase == SessionPhase::Running && self.snake.set_direction(direction)
    }

    /// Pause a running game or resume a paused one. Returns whether the
    /// phase changed.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            SessionPhase::Running => {
                self.last_direction = self.snake.clear_direction();
                self.phase = SessionPhase::Paused;
                self.events.push(GameEvent::Timer(TimerCommand::Cancel));
                self.events.push(GameEvent::PauseChanged(true));
                log::info!("Paused");
                true
            }
            SessionPhase::Paused => {
                self.snake.restore_direction(self.last_direction.take());
                self.phase = SessionPhase::Running;
                self.events.push(GameEvent::Timer(TimerCommand::Restart {
                    period_ms: self.snake.speed_ms(),
                }));
                self.events.push(GameEvent::PauseChanged(false));
                log::info!("Resumed");
                true
            }
            SessionPhase::Idle | SessionPhase::GameOver => false,
        }
    }

    /// Advance the simulation by one step
    pub fn tick(&mut self) -> MoveOutcome {
        if self.phase != SessionPhase::Running {
            return MoveOutcome::Idle;
        }
        self.ticks += 1;

        let outcome = self.snake.tick(&mut self.grid, &mut self.apples);
        match outcome {
            MoveOutcome::Idle => {}
            MoveOutcome::Crashed { at, kind } => {
                log::debug!("Crash ({:?}) at {:?}", kind, at);
                self.game_over(false);
            }
            MoveOutcome::Moved { id, from, to } => {
                self.events.push(GameEvent::SnakeMoved { id, from, to });
            }
            MoveOutcome::Grew { segment, apple } => {
                self.events.push(GameEvent::SnakeGrew(segment));
                if let Some(id) = apple {
                    log::debug!("Apple {} eaten at {:?}", id, segment.pos);
                    self.events.push(GameEvent::AppleRemoved {
                        id,
                        pos: segment.pos,
                    });
                }
                self.score += APPLE_SCORE;
                self.events.push(GameEvent::ScoreChanged(self.score));
                self.spawn_apples(REPLENISH_APPLES);
                self.check_level();
            }
        }
        outcome
    }

    /// Advance a level once the score reaches the current target; clearing
    /// the last level wins.
    fn check_level(&mut self) {
        if self.score < self.level.target_score() {
            return;
        }
        if self.level.is_last() {
            self.game_over(true);
            return;
        }
        let Some(next) = self.level.next() else {
            return;
        };
        self.level = next;
        self.snake.increase_speed();
        self.events.push(GameEvent::Timer(TimerCommand::Restart {
            period_ms: self.snake.speed_ms(),
        }));
        self.events.push(GameEvent::LevelChanged {
            level: next,
            theme: next.theme(),
        });
        log::info!(
            "Level {} reached ({}ms per tick)",
            next.number(),
            self.snake.speed_ms()
        );
    }

    fn game_over(&mut self, won: bool) {
        self.phase = SessionPhase::GameOver;
        self.won = won;
        self.snake.kill();
        self.last_direction = None;

        let message = if won {
            format!(
                "You are truly an amazing snafu artist and snake wrangler! Your score: {}",
                self.score
            )
        } else {
            format!("Gameover! Your score: {}", self.score)
        };
        log::info!("Game over (won: {}, score: {})", won, self.score);

        self.message = Some(message.clone());
        self.events.push(GameEvent::Timer(TimerCommand::Cancel));
        self.events.push(GameEvent::GameOver {
            won,
            score: self.score,
            message,
        });
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn theme(&self) -> Theme {
        self.level.theme()
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn is_alive(&self) -> bool {
        self.snake.is_alive()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Terminal message, set on game over
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Current tick interval (ms)
    pub fn speed_ms(&self) -> u32 {
        self.snake.speed_ms()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn apples(&self) -> &AppleManager {
        &self.apples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{INITIAL_SPEED_MS, MAX_LEVEL};
    use crate::sim::grid::CellState;

    fn p(col: i32, row: i32) -> Position {
        Position::new(col, row)
    }

    fn timer_commands(events: &[GameEvent]) -> Vec<TimerCommand> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Timer(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    fn spawned_apples(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::AppleSpawned(_)))
            .count()
    }

    #[test]
    fn test_new_game_starts_running() {
        let mut session = GameSession::new(12345);
        assert_eq!(session.phase(), SessionPhase::Idle);

        session.new_game(20, 15);
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), Level::FIRST);
        assert_eq!(session.snake().len(), 1);
        assert_eq!(session.apples().len(), INITIAL_APPLES);
        assert_eq!(session.grid().count(CellState::Snake), 1);
        assert_eq!(session.grid().count(CellState::Apple), INITIAL_APPLES);

        let events = session.drain_events();
        assert_eq!(
            timer_commands(&events),
            vec![
                TimerCommand::Cancel,
                TimerCommand::Restart {
                    period_ms: INITIAL_SPEED_MS
                }
            ]
        );
        assert_eq!(spawned_apples(&events), INITIAL_APPLES);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_new_game_twice_fully_resets() {
        let mut session = GameSession::new(7);
        assert!(session.new_game_with_layout(10, 10, &[p(5, 5)], &[p(6, 5)]));
        session.set_direction(Direction::Right);
        session.tick();
        assert_eq!(session.score(), APPLE_SCORE);

        session.new_game(10, 10);
        session.new_game(10, 10);
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), Level::FIRST);
        assert_eq!(session.snake().len(), 1);
        assert_eq!(session.apples().len(), INITIAL_APPLES);
        assert_eq!(session.grid().count(CellState::Snake), 1);
        assert_eq!(session.grid().count(CellState::Apple), INITIAL_APPLES);
        assert_eq!(session.speed_ms(), INITIAL_SPEED_MS);
        assert_eq!(session.message(), None);
    }

    #[test]
    fn test_new_game_without_room_stays_idle() {
        let mut session = GameSession::new(1);
        session.new_game(0, 0);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.tick(), MoveOutcome::Idle);
        assert!(!session.toggle_pause());
    }

    #[test]
    fn test_eat_apple_scenario() {
        let mut session = GameSession::new(99);
        assert!(session.new_game_with_layout(10, 10, &[p(5, 5)], &[p(6, 5)]));
        session.drain_events();

        assert!(session.set_direction(Direction::Right));
        let outcome = session.tick();
        assert!(matches!(outcome, MoveOutcome::Grew { .. }));

        assert_eq!(session.snake().head(), Some(p(6, 5)));
        assert_eq!(session.score(), 5);
        assert_eq!(session.snake().len(), 2);
        assert_eq!(session.apples().len(), 1);
        assert!(!session.apples().contains(p(6, 5)));

        let events = session.drain_events();
        assert_eq!(spawned_apples(&events), 1);
        assert!(events.contains(&GameEvent::ScoreChanged(5)));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::AppleRemoved { pos, .. } if *pos == p(6, 5)))
        );
    }

    #[test]
    fn test_reverse_direction_rejected() {
        let mut session = GameSession::new(3);
        assert!(session.new_game_with_layout(10, 10, &[p(3, 3), p(3, 4), p(3, 5)], &[]));
        assert!(session.set_direction(Direction::Up));
        assert!(!session.set_direction(Direction::Down));

        session.tick();
        assert_eq!(session.snake().head(), Some(p(3, 2)));
        assert_eq!(session.snake().direction(), Some(Direction::Up));
    }

    #[test]
    fn test_tick_before_direction_is_noop() {
        let mut session = GameSession::new(3);
        assert!(session.new_game_with_layout(10, 10, &[p(4, 4)], &[]));
        assert_eq!(session.tick(), MoveOutcome::Idle);
        assert_eq!(session.snake().head(), Some(p(4, 4)));
    }

    #[test]
    fn test_wall_crash_ends_game() {
        let mut session = GameSession::new(3);
        assert!(session.new_game_with_layout(10, 10, &[p(9, 0)], &[]));
        session.drain_events();
        session.set_direction(Direction::Right);
        session.tick();

        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert!(!session.is_alive());
        assert!(!session.is_won());
        assert_eq!(session.message(), Some("Gameover! Your score: 0"));
        assert_eq!(session.snake().direction(), None);

        let events = session.drain_events();
        assert_eq!(timer_commands(&events), vec![TimerCommand::Cancel]);

        // Frozen after death
        assert!(!session.set_direction(Direction::Down));
        assert_eq!(session.tick(), MoveOutcome::Idle);
        assert!(!session.toggle_pause());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut session = GameSession::new(3);
        assert!(session.new_game_with_layout(10, 10, &[p(2, 2)], &[]));
        session.set_direction(Direction::Down);
        session.drain_events();

        assert!(session.toggle_pause());
        assert!(session.is_paused());
        assert_eq!(session.snake().direction(), None);
        assert_eq!(session.tick(), MoveOutcome::Idle);
        assert!(!session.set_direction(Direction::Left));

        assert!(session.toggle_pause());
        assert!(!session.is_paused());
        assert_eq!(session.snake().direction(), Some(Direction::Down));

        let events = session.drain_events();
        assert_eq!(
            timer_commands(&events),
            vec![
                TimerCommand::Cancel,
                TimerCommand::Restart {
                    period_ms: INITIAL_SPEED_MS
                }
            ]
        );
        assert!(events.contains(&GameEvent::PauseChanged(true)));
        assert!(events.contains(&GameEvent::PauseChanged(false)));

        session.tick();
        assert_eq!(session.snake().head(), Some(p(2, 3)));
    }

    #[test]
    fn test_level_up_on_target() {
        let mut session = GameSession::new(3);
        assert!(session.new_game_with_layout(10, 10, &[p(1, 1)], &[p(2, 1), p(3, 1)]));
        session.score = 95;
        session.drain_events();

        session.set_direction(Direction::Right);
        session.tick();
        assert_eq!(session.score(), 100);
        assert_eq!(session.level().number(), 2);
        assert_eq!(session.speed_ms(), INITIAL_SPEED_MS - 10);
        assert_eq!(session.theme(), Theme::RoyalBlue);

        let events = session.drain_events();
        assert_eq!(
            timer_commands(&events),
            vec![TimerCommand::Restart {
                period_ms: INITIAL_SPEED_MS - 10
            }]
        );

        // The next apple does not bump the level again
        session.tick();
        assert_eq!(session.score(), 105);
        assert_eq!(session.level().number(), 2);
        assert_eq!(session.speed_ms(), INITIAL_SPEED_MS - 10);
    }

    #[test]
    fn test_clearing_last_level_wins() {
        let mut session = GameSession::new(3);
        assert!(session.new_game_with_layout(10, 10, &[p(1, 1)], &[p(2, 1)]));
        session.level = Level::new(MAX_LEVEL).unwrap();
        session.score = 495;
        session.drain_events();

        session.set_direction(Direction::Right);
        session.tick();
        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert!(session.is_won());
        assert_eq!(session.level().number(), MAX_LEVEL);
        assert_eq!(
            session.message(),
            Some("You are truly an amazing snafu artist and snake wrangler! Your score: 500")
        );
        let events = session.drain_events();
        assert_eq!(timer_commands(&events).last(), Some(&TimerCommand::Cancel));
    }

    #[test]
    fn test_each_level_below_last_advances() {
        for n in 1..MAX_LEVEL {
            let mut session = GameSession::new(5);
            assert!(session.new_game_with_layout(10, 10, &[p(1, 1)], &[p(2, 1)]));
            session.level = Level::new(n).unwrap();
            session.score = session.level.target_score() - 5;

            session.set_direction(Direction::Right);
            session.tick();
            assert_eq!(session.phase(), SessionPhase::Running, "level {}", n);
            assert!(!session.is_won());
            assert_eq!(session.level().number(), n + 1);
        }
    }

    #[test]
    fn test_layout_rejects_overlap() {
        let mut session = GameSession::new(3);
        assert!(!session.new_game_with_layout(10, 10, &[p(1, 1), p(1, 1)], &[]));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(!session.new_game_with_layout(4, 4, &[p(4, 0)], &[]));
    }

    #[test]
    fn test_determinism() {
        let mut a = GameSession::new(2024);
        let mut b = GameSession::new(2024);
        a.new_game(30, 20);
        b.new_game(30, 20);
        assert_eq!(a.snake().head(), b.snake().head());
        assert_eq!(a.apples().apples(), b.apples().apples());
    }
}
