//! Board consistency over arbitrary play

use std::collections::HashSet;

use proptest::prelude::*;

use snafu::schedule::ManualTimer;
use snafu::sim::{CellState, Crash, Direction, GameSession, MoveOutcome, Position, SessionPhase};
use snafu::{GameDriver, Input};

#[derive(Debug, Clone)]
enum Action {
    Steer(Direction),
    Pause,
    Autopilot,
    Advance(u64),
    NewGame,
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => direction().prop_map(Action::Steer),
        1 => Just(Action::Pause),
        1 => Just(Action::Autopilot),
        6 => (1u64..800).prop_map(Action::Advance),
        1 => Just(Action::NewGame),
    ]
}

fn check_board(driver: &GameDriver<ManualTimer>) {
    let session = driver.session();
    let grid = session.grid();
    let snake = session.snake();

    let body: Vec<Position> = snake.positions().collect();
    let unique: HashSet<Position> = body.iter().copied().collect();
    assert_eq!(unique.len(), body.len(), "duplicate body cell");
    for pos in &body {
        assert_eq!(grid.get(*pos), Some(CellState::Snake));
    }
    assert_eq!(grid.count(CellState::Snake), body.len());

    for apple in session.apples().apples() {
        assert!(!unique.contains(&apple.pos), "apple under snake");
        assert_eq!(grid.get(apple.pos), Some(CellState::Apple));
    }
    assert_eq!(grid.count(CellState::Apple), session.apples().len());

    assert!(driver.task().backend().outstanding() <= 1);
    assert_eq!(
        driver.task().is_running(),
        session.phase() == SessionPhase::Running
    );
}

proptest! {
    #[test]
    fn board_stays_consistent(
        seed in any::<u64>(),
        cols in 3u32..16,
        rows in 3u32..16,
        actions in prop::collection::vec(action(), 1..120),
    ) {
        let (w, h) = (cols * 20, rows * 20);
        let mut driver = GameDriver::new(GameSession::new(seed), ManualTimer::new());
        driver.new_game(w, h);
        check_board(&driver);

        for action in actions {
            match action {
                Action::Steer(d) => { driver.handle_input(Input::Steer(d)); }
                Action::Pause => { driver.handle_input(Input::Pause); }
                Action::Autopilot => { driver.handle_input(Input::ToggleAutopilot); }
                Action::Advance(ms) => { driver.advance(ms); }
                Action::NewGame => { driver.new_game(w, h); }
            }
            check_board(&driver);
        }
    }

    #[test]
    fn leaving_the_board_crashes(
        width in 2u32..30,
        height in 2u32..30,
        row_seed in any::<u32>(),
        left in any::<bool>(),
    ) {
        let row = (row_seed % height) as i32;
        let (col, direction) = if left {
            (0, Direction::Left)
        } else {
            (width as i32 - 1, Direction::Right)
        };

        let mut session = GameSession::new(1);
        prop_assert!(session.new_game_with_layout(width, height, &[Position::new(col, row)], &[]));
        prop_assert!(session.set_direction(direction));
        let outcome = session.tick();
        let hit_wall = matches!(outcome, MoveOutcome::Crashed { kind: Crash::Wall, .. });
        prop_assert!(hit_wall, "expected a wall crash, got {:?}", outcome);
        prop_assert_eq!(session.phase(), SessionPhase::GameOver);
    }

    #[test]
    fn turning_into_the_body_crashes(
        fold in 2i32..9,
        tail in 1i32..6,
        seed in any::<u64>(),
    ) {
        // Head at (1,1) with the body running right, folding back along row 2
        // and trailing down column 1. The cell below the head holds segment
        // 2 * fold - 1, which is never the neck or the tail.
        let mut body: Vec<Position> = (0..fold).map(|i| Position::new(1 + i, 1)).collect();
        body.extend((0..fold).map(|i| Position::new(fold - i, 2)));
        body.extend((0..tail).map(|i| Position::new(1, 3 + i)));

        let mut session = GameSession::new(seed);
        prop_assert!(session.new_game_with_layout(20, 20, &body, &[]));
        prop_assert!(session.set_direction(Direction::Down));
        let outcome = session.tick();
        let expected = MoveOutcome::Crashed { at: Position::new(1, 2), kind: Crash::SelfCollision };
        prop_assert_eq!(outcome, expected);
        prop_assert_eq!(session.phase(), SessionPhase::GameOver);
        prop_assert!(!session.is_won());
    }

    #[test]
    fn eating_grows_by_one_and_scores_five(
        seed in any::<u64>(),
        col in 1i32..8,
        row in 0i32..10,
    ) {
        let mut session = GameSession::new(seed);
        let head = Position::new(col, row);
        let apple = Position::new(col + 1, row);
        prop_assert!(session.new_game_with_layout(10, 10, &[head], &[apple]));
        session.drain_events();

        session.set_direction(Direction::Right);
        session.tick();
        prop_assert_eq!(session.snake().len(), 2);
        prop_assert_eq!(session.score(), 5);
        prop_assert_eq!(session.apples().len(), 1);
        let spawned = session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, snafu::sim::GameEvent::AppleSpawned(_)))
            .count();
        prop_assert_eq!(spawned, 1);
    }
}
