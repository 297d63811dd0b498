//! Snafu entry point
//!
//! On the web: wires the DOM (board, HUD, buttons, keyboard) to a
//! `GameDriver` ticking on `setInterval`. On native: runs a headless
//! autopilot game on virtual time.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, KeyboardEvent, VisibilityState};

    use snafu::consts::BLOCK_SIZE;
    use snafu::schedule::TimerBackend;
    use snafu::sim::{GameEvent, GameSession, Position};
    use snafu::{GameDriver, Input, Settings};

    /// `setInterval`-backed tick timer. The callback is created once and
    /// reused for every schedule.
    struct IntervalTimer {
        callback: js_sys::Function,
    }

    impl TimerBackend for IntervalTimer {
        type Handle = i32;

        fn schedule_repeating(&mut self, period_ms: u32) -> Option<i32> {
            web_sys::window()?
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    &self.callback,
                    period_ms as i32,
                )
                .ok()
        }

        fn cancel(&mut self, handle: i32) {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(handle);
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        driver: GameDriver<IntervalTimer>,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn board(document: &Document) -> Option<HtmlElement> {
        document
            .get_element_by_id("snafu")?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_display(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = el
                .style()
                .set_property("display", if visible { "block" } else { "none" });
        }
    }

    fn place(el: &HtmlElement, pos: Position) {
        let (x, y) = pos.to_pixels(BLOCK_SIZE);
        let style = el.style();
        let _ = style.set_property("left", &format!("{}px", x));
        let _ = style.set_property("top", &format!("{}px", y));
    }

    fn add_block(document: &Document, board: &HtmlElement, id: &str, class: &str, pos: Position) {
        let Some(el) = document
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        el.set_id(id);
        el.set_class_name(class);
        place(&el, pos);
        let _ = board.append_child(&el);
    }

    fn clear_board(board: &HtmlElement) {
        if let Ok(nodes) = board.query_selector_all(".serpent, .apple") {
            for i in 0..nodes.length() {
                if let Some(el) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    el.remove();
                }
            }
        }
    }

    impl Game {
        fn new_game(&mut self) {
            let Some((w, h)) = document()
                .as_ref()
                .and_then(board)
                .map(|b| (b.offset_width().max(0) as u32, b.offset_height().max(0) as u32))
            else {
                log::error!("Board element #snafu not found");
                return;
            };
            let events = self.driver.new_game(w, h);
            self.render(events);
        }

        fn on_tick(&mut self) {
            let events = self.driver.on_tick();
            self.render(events);
        }

        fn on_input(&mut self, input: Input) {
            let events = self.driver.handle_input(input);
            self.render(events);
        }

        fn on_blur(&mut self) {
            let events = self.driver.auto_pause();
            self.render(events);
        }

        /// Apply view events to the DOM
        fn render(&self, events: Vec<GameEvent>) {
            let Some(document) = document() else {
                return;
            };
            let Some(board) = board(&document) else {
                return;
            };

            for event in events {
                match event {
                    GameEvent::BoardReset { .. } => {
                        clear_board(&board);
                        set_display(&document, "gameover", false);
                        set_display(&document, "gamestats", true);
                    }
                    GameEvent::SnakeSpawned(segment) | GameEvent::SnakeGrew(segment) => {
                        let id = format!("serpent_{}", segment.id);
                        add_block(&document, &board, &id, "serpent", segment.pos);
                    }
                    GameEvent::SnakeMoved { id, to, .. } => {
                        // The old tail element becomes the new head
                        if let Some(el) = document
                            .get_element_by_id(&format!("serpent_{}", id))
                            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                        {
                            place(&el, to);
                        }
                    }
                    GameEvent::AppleSpawned(apple) => {
                        let id = format!("apple_{}", apple.id);
                        add_block(&document, &board, &id, "apple", apple.pos);
                    }
                    GameEvent::AppleRemoved { id, .. } => {
                        if let Some(el) = document.get_element_by_id(&format!("apple_{}", id)) {
                            el.remove();
                        }
                    }
                    GameEvent::ScoreChanged(score) => {
                        set_text(&document, "scoreArea", &format!("Score: {}", score));
                    }
                    GameEvent::LevelChanged { level, theme } => {
                        set_text(&document, "levelArea", &format!("Level: {}", level.number()));
                        let _ = board
                            .style()
                            .set_property("background-color", theme.css_color());
                    }
                    GameEvent::PauseChanged(paused) => {
                        set_display(&document, "paused", paused);
                    }
                    GameEvent::GameOver { message, .. } => {
                        set_text(&document, "gameoverMessage", &message);
                        set_display(&document, "gamestats", false);
                        set_display(&document, "gameover", true);
                    }
                    GameEvent::Timer(_) => {}
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let settings = Settings::load();
        let _ = console_log::init_with_level(settings.log_level.to_level());
        log::info!("Snafu starting...");
        // Write back with defaults filled in so the stored entry lists every option
        settings.save();

        let seed = settings
            .seed
            .unwrap_or_else(|| js_sys::Date::now() as u64);
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new_cyclic(|weak: &Weak<RefCell<Game>>| {
            let weak = weak.clone();
            let tick = Closure::<dyn FnMut()>::new(move || {
                if let Some(game) = weak.upgrade() {
                    game.borrow_mut().on_tick();
                }
            });
            let callback = tick.as_ref().unchecked_ref::<js_sys::Function>().clone();
            tick.forget();

            RefCell::new(Game {
                driver: GameDriver::new(GameSession::new(seed), IntervalTimer { callback }),
            })
        });

        setup_new_game_button(game.clone());
        setup_keyboard(game.clone());
        if settings.pause_on_blur {
            setup_auto_pause(game);
        }
        log::info!("Snafu ready!");
    }

    fn setup_new_game_button(game: Rc<RefCell<Game>>) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id("newGame")) else {
            log::warn!("New game button not found");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            game.borrow_mut().new_game();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let input = Input::from_key(&event.key()).or_else(|| Input::from_key_code(event.key_code()));
            if let Some(input) = input {
                // Keep arrows and space from scrolling the page
                event.prevent_default();
                game.borrow_mut().on_input(input);
            }
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if doc.visibility_state() == VisibilityState::Hidden {
                    log::info!("Tab hidden");
                    game.borrow_mut().on_blur();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                log::info!("Window blur");
                game.borrow_mut().on_blur();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use snafu::schedule::ManualTimer;
    use snafu::sim::{GameSession, SessionPhase};
    use snafu::{GameDriver, Settings};

    let settings = Settings::load();
    env_logger::Builder::new()
        .filter_level(settings.log_level.to_level().to_level_filter())
        .parse_default_env()
        .init();
    log::info!("Snafu (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });

    let mut driver = GameDriver::new(GameSession::new(seed), ManualTimer::new());
    driver.set_autopilot(true);
    driver.new_game(800, 600);

    // Ten minutes of virtual play at most
    for _ in 0..600 {
        driver.advance(1_000);
        if driver.session().phase() == SessionPhase::GameOver {
            break;
        }
    }

    let session = driver.session();
    println!(
        "\nDemo finished after {} ticks (seed {}): level {}, length {}",
        session.ticks(),
        seed,
        session.level().number(),
        session.snake().len()
    );
    match session.message() {
        Some(message) => println!("{}", message),
        None => println!("Still running. Score: {}", session.score()),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
