//! Dragon Egg entry point
//!
//! Handles platform-specific initialization and runs the game loop. On the web
//! the page's UI layer talks to the session through two DOM events:
//! `dragon-egg-command` (detail: command JSON) in, `dragon-egg-event`
//! (detail: event JSON) out.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, CustomEventInit};

    use dragon_egg::api::MockScoreApi;
    use dragon_egg::bridge::{Command, UiEvent};
    use dragon_egg::persistence::{LocalProfileStore, LocalStorageBackend};
    use dragon_egg::platform::{self, telegram};
    use dragon_egg::sim::{GamePhase, Lane};
    use dragon_egg::{GameSession, Settings, Tuning};

    const COMMAND_EVENT: &str = "dragon-egg-command";
    const UI_EVENT: &str = "dragon-egg-event";

    /// Game instance holding the session and frame timing
    struct Game {
        session: GameSession<LocalProfileStore, MockScoreApi>,
        last_time: f64,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let caps = telegram::init();
            let store = LocalProfileStore::new(LocalStorageBackend, seed)
                .with_identity(caps.username, platform::referral_code());
            let session = GameSession::new(
                seed,
                Tuning::default(),
                store,
                MockScoreApi::persistent(seed),
                Settings::load(),
            );
            Self {
                session,
                last_time: 0.0,
            }
        }

        fn command(&mut self, command: Command) {
            self.session.handle(command);
            self.flush();
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                0.0
            };
            self.last_time = time;
            self.session.frame(dt);
            self.flush();
        }

        /// Forward pending UI events to the page
        fn flush(&mut self) {
            let Some(window) = web_sys::window() else { return };
            for event in self.session.drain_events() {
                dispatch(&window, &event);
            }
        }

        fn auto_pause(&mut self, reason: &str) {
            if self.session.phase() == GamePhase::Playing {
                self.command(Command::SetPause { paused: true });
                log::info!("Auto-paused ({reason})");
            }
        }
    }

    fn dispatch(window: &web_sys::Window, event: &UiEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to encode UI event: {e}");
                return;
            }
        };
        let init = CustomEventInit::new();
        init.set_detail(&JsValue::from_str(&json));
        if let Ok(custom) = CustomEvent::new_with_event_init_dict(UI_EVENT, &init) {
            let _ = window.dispatch_event(&custom);
        }
    }

    /// Command JSON from a custom event detail (string or plain object)
    fn command_from_event(event: &web_sys::Event) -> Option<Command> {
        let detail = event.dyn_ref::<CustomEvent>()?.detail();
        let json = match detail.as_string() {
            Some(json) => json,
            None => js_sys::JSON::stringify(&detail).ok()?.as_string()?,
        };
        match Command::from_json(&json) {
            Ok(command) => Some(command),
            Err(e) => {
                log::warn!("Ignoring malformed command {json}: {e}");
                None
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Dragon Egg starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        game.borrow_mut().flush();

        log::info!("Game initialized with seed: {}", seed);

        setup_command_listener(game.clone());
        setup_keyboard(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Dragon Egg running!");
    }

    fn setup_command_listener(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            if let Some(command) = command_from_event(&event) {
                game.borrow_mut().command(command);
            }
        });
        let _ = window.add_event_listener_with_callback(COMMAND_EVENT, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            let command = match event.key().as_str() {
                "q" | "Q" => Command::MoveDragon { lane: Lane::LeftTop },
                "a" | "A" => Command::MoveDragon { lane: Lane::LeftBottom },
                "p" | "P" => Command::MoveDragon { lane: Lane::RightTop },
                "l" | "L" => Command::MoveDragon { lane: Lane::RightBottom },
                " " | "Enter" => match g.session.phase() {
                    GamePhase::WaitingStart => Command::StartGame,
                    GamePhase::StageCleared => Command::NextLevel,
                    GamePhase::GameOver => Command::Restart,
                    _ => return,
                },
                "Escape" => Command::SetPause {
                    paused: g.session.phase() == GamePhase::Playing,
                },
                _ => return,
            };
            g.command(command);
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (app minimized, tab switch)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.auto_pause("tab hidden");
                }
                // The frame after a long gap must not count the hidden time
                g.last_time = 0.0;
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().auto_pause("window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page teardown stops the opponent
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.shutdown();
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
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
    env_logger::init();
    log::info!("Dragon Egg (native) starting...");
    log::info!("Native mode runs a headless autopilot match - serve the wasm build for the real game");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use dragon_egg::api::MockScoreApi;
    use dragon_egg::bridge::{Command, UiEvent};
    use dragon_egg::persistence::{MemoryProfileStore, ProfileStore};
    use dragon_egg::sim::{EggState, GamePhase, MatchMode};
    use dragon_egg::{GameSession, Settings, Tuning};

    const FRAME_MS: f32 = 1000.0 / 60.0;
    const MAX_LEVELS: u32 = 3;
    /// Ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    type DemoSession = GameSession<MemoryProfileStore, MockScoreApi>;

    /// Move under the egg closest to leaving its ramp
    fn steer(session: &mut DemoSession) {
        let target = session
            .controller()
            .eggs()
            .eggs()
            .iter()
            .filter(|e| e.state == EggState::OnRamp && !e.kind.is_hazard())
            .max_by(|a, b| a.t.total_cmp(&b.t))
            .map(|e| e.lane);
        if let Some(lane) = target {
            if session.controller().state().dragon_lane != lane {
                session.handle(Command::MoveDragon { lane });
            }
        }
    }

    pub fn run(seed: u64) {
        let mut session = GameSession::new(
            seed,
            Tuning::default(),
            MemoryProfileStore::in_memory(seed),
            MockScoreApi::new(seed),
            Settings::default(),
        );
        session.handle(Command::StartMatch {
            mode: MatchMode::Bot,
            partner: None,
        });
        session.handle(Command::StartGame);

        let mut caught_events = 0usize;
        let mut frames = 0;
        while frames < MAX_FRAMES {
            steer(&mut session);
            session.frame(FRAME_MS);
            frames += 1;

            for event in session.drain_events() {
                match event {
                    UiEvent::Score(_) => caught_events += 1,
                    UiEvent::StageCleared(level) => println!("Stage {level} cleared"),
                    UiEvent::Opponent(update) => {
                        log::debug!("{} at {} ({} lives)", update.name, update.score, update.lives)
                    }
                    UiEvent::Submitted(response) => {
                        println!("Submitted: best {} rank {:?}", response.high_score, response.rank)
                    }
                    _ => {}
                }
            }

            match session.phase() {
                GamePhase::GameOver => break,
                GamePhase::StageCleared if session.controller().state().level + 1 >= MAX_LEVELS => break,
                GamePhase::StageCleared => session.handle(Command::NextLevel),
                _ => {}
            }
        }

        let state = session.controller().state();
        println!(
            "Finished after {:.1}s: score {}, lives {}, level {}, {} score updates, best {}",
            frames as f32 * FRAME_MS / 1000.0,
            state.score,
            state.lives,
            state.level + 1,
            caught_events,
            session.store().best_score()
        );
        session.shutdown();
    }
}
