//! Rooftop Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! simulation itself is host-agnostic; this shell owns the frame scheduler,
//! raw input capture (including the jump-command cooldown), HUD text, and
//! the delivery of simulation events to the optional audio/background hooks.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use rooftop_rush::consts::*;
    use rooftop_rush::sim::{self, FrameInput, GameEvent, GamePhase, GameSession};
    use rooftop_rush::{HighScores, Settings};

    /// Input-side debounce for the jump command; the core itself accepts
    /// every command it is handed
    const JUMP_COOLDOWN_MS: f64 = 100.0;

    /// Longest frame delta the simulation is fed (tab-switch stalls)
    const MAX_FRAME_MS: f32 = 100.0;

    // Optional host hooks. Both are no-op guards: the simulation keeps
    // running when the page ships without an audio or background module.
    #[wasm_bindgen(inline_js = "
        export function play_sound(name) {
            if (window.gameAudio && typeof window.gameAudio.play === 'function') {
                window.gameAudio.play(name);
            }
        }

        export function set_background_speed(mult) {
            if (window.gameBackground && typeof window.gameBackground.setSpeed === 'function') {
                window.gameBackground.setSpeed(mult);
            }
        }
    ")]
    extern "C" {
        fn play_sound(name: &str);
        fn set_background_speed(mult: f32);
    }

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        settings: Settings,
        highscores: HighScores,
        input: FrameInput,
        last_time: f64,
        /// Timestamp of the last accepted jump command
        last_jump_at: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let highscores = HighScores::load();
            let mut session = GameSession::new(seed);
            session.high_score = highscores.top_score().unwrap_or(0);

            Self {
                session,
                settings,
                highscores,
                input: FrameInput::default(),
                last_time: 0.0,
                last_jump_at: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Accept a raw jump press, applying the command cooldown
        fn queue_jump(&mut self, now: f64) {
            if now - self.last_jump_at >= JUMP_COOLDOWN_MS {
                self.input.jump = true;
                self.last_jump_at = now;
            }
        }

        /// Begin a fresh run with a fresh seed
        fn start_run(&mut self) {
            self.session.reseed(js_sys::Date::now() as u64);
            self.session.start();
        }

        /// Run one frame of simulation
        fn update(&mut self, dt_ms: f32, time: f64) {
            let input = self.input;
            sim::update(&mut self.session, &input, dt_ms.min(MAX_FRAME_MS));

            // Clear one-shot inputs after processing
            self.input.jump = false;
            self.input.pause = false;

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60_000.0 / elapsed).round() as u32;
                }
            }

            self.dispatch_events();
        }

        /// Deliver queued simulation events to sound/background/persistence
        fn dispatch_events(&mut self) {
            let document = web_sys::window().and_then(|w| w.document());

            for event in self.session.drain_events() {
                match event {
                    GameEvent::Jumped => self.sound("jump"),
                    GameEvent::DoubleJumped => self.sound("double-jump"),
                    GameEvent::PowerUpCollected { .. } => self.sound("collect"),
                    GameEvent::PowerUpActivated(_) => self.sound("power-up"),
                    GameEvent::PowerUpExpired(_) => {}
                    GameEvent::ObstaclePassed { .. } => self.sound("score-tick"),
                    GameEvent::PlayerHit => self.sound("hit"),
                    GameEvent::LifeLost { .. } => self.sound("life-lost"),
                    GameEvent::ExtraLife => self.sound("extra-life"),
                    GameEvent::ScoreChanged(_) | GameEvent::LivesChanged(_) => {
                        // HUD text is refreshed from session state every frame
                    }
                    GameEvent::LevelUp { level } => {
                        self.sound("level-up");
                        if self.settings.level_flash {
                            if let Some(ref document) = document {
                                show_level_flash(document, level);
                            }
                        }
                    }
                    GameEvent::SpeedMultiplier(mult) => set_background_speed(mult),
                    GameEvent::NewHighScore(score) => {
                        let level = self.session.level;
                        if let Some(rank) =
                            self.highscores.add_score(score, level, js_sys::Date::now())
                        {
                            log::info!("new high score {score} (rank {rank})");
                        }
                        self.highscores.save();
                    }
                    GameEvent::GameOver { score } => {
                        self.sound("game-over");
                        log::info!("run ended at score {score}");
                    }
                }
            }
        }

        fn sound(&self, name: &str) {
            if self.settings.sound_enabled {
                play_sound(name);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&self.session.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("lives") {
                el.set_text_content(Some(&self.session.lives.to_string()));
            }
            if let Some(el) = document.get_element_by_id("level") {
                el.set_text_content(Some(&self.session.level.to_string()));
            }
            if let Some(el) = document.get_element_by_id("high-score") {
                el.set_text_content(Some(&self.session.high_score.to_string()));
            }

            if self.settings.show_fps {
                if let Some(el) = document.get_element_by_id("fps") {
                    el.set_text_content(Some(&self.fps.to_string()));
                }
            }

            // Show/hide the start screen
            if let Some(el) = document.get_element_by_id("start-screen") {
                if self.session.phase == GamePhase::Menu {
                    let _ = el.set_attribute("class", "");
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }

            // Show/hide pause menu
            if let Some(el) = document.get_element_by_id("pause-menu") {
                if self.session.phase == GamePhase::Paused {
                    let _ = el.set_attribute("class", "");
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }

            // Show/hide game over overlay
            if let Some(el) = document.get_element_by_id("game-over") {
                if self.session.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&self.session.score.to_string()));
                    }
                    if let Some(level_el) = document.get_element_by_id("final-level") {
                        level_el.set_text_content(Some(&self.session.level.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    /// Transient "Level N!" overlay, removed by its own CSS animation end
    fn show_level_flash(document: &web_sys::Document, level: u32) {
        if let Some(el) = document.get_element_by_id("level-flash") {
            el.set_text_content(Some(&format!("Level {level}!")));
            let _ = el.set_attribute("class", "level-up-effect");
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Rooftop Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        let view_width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(VIEW_WIDTH as f64);
        game.borrow_mut().session.set_view_width(view_width as f32);

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_menu_buttons(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Rooftop Rush running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "ArrowUp" | "w" | "W" => {
                        event.prevent_default();
                        g.queue_jump(js_sys::Date::now());
                    }
                    "Escape" | "p" | "P" => g.input.pause = true,
                    "Enter" => {
                        if !g.session.is_playing() && g.session.phase != GamePhase::Paused {
                            g.start_run();
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: any tap is a jump (or starts a run from the menu)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if g.session.is_playing() {
                    g.queue_jump(js_sys::Date::now());
                } else if g.session.phase != GamePhase::Paused {
                    g.start_run();
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Viewport resize moves the spawn edge
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let width = web_sys::window()
                    .and_then(|w| w.inner_width().ok())
                    .and_then(|v| v.as_f64())
                    .unwrap_or(VIEW_WIDTH as f64);
                game.borrow_mut().session.set_view_width(width as f32);
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Start and restart both launch a fresh run
        for id in ["start-btn", "restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    game.borrow_mut().start_run();
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.resume();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Settings toggles persist immediately
        if let Some(btn) = document.get_element_by_id("sound-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.settings.sound_enabled = !g.settings.sound_enabled;
                g.settings.save();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("music-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.settings.music_enabled = !g.settings.music_enabled;
                g.settings.save();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.session.is_playing() {
                        g.session.pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.session.is_playing() {
                    g.session.pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
        {
            let mut g = game.borrow_mut();

            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                FRAME_MS
            };
            g.last_time = time;

            g.update(dt_ms, time);
            g.update_hud();
        }

        request_animation_frame(game);
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
    log::info!("Rooftop Rush (native) starting...");

    // Headless demo run: scripted jumps against a fixed seed. The real host
    // is the browser shell; this exercises the full frame loop end to end.
    use rooftop_rush::consts::FRAME_MS;
    use rooftop_rush::sim::{self, FrameInput, GameSession};

    let mut session = GameSession::new(42);
    session.start();

    for frame in 0..7200u32 {
        let input = FrameInput {
            jump: frame % 85 == 0,
            pause: false,
        };
        sim::update(&mut session, &input, FRAME_MS);

        for event in session.drain_events() {
            log::debug!("{event:?}");
        }
        if !session.is_playing() {
            break;
        }
    }

    println!(
        "demo finished: score {} at level {} after {:.1}s",
        session.score,
        session.level,
        session.game_time_ms / 1000.0
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
