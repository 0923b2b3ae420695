//! Fruit Catcher entry point
//!
//! Native: runs a seeded session headlessly with the autopilot steering.
//! Web: drives the session from requestAnimationFrame and feeds the HUD.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlElement, KeyboardEvent};

    use fruit_catcher::sim::{Callbacks, GameEvent, GameMode, PlayField, Session, StopReason};
    use fruit_catcher::{HighScores, Settings, Tuning};

    /// Largest frame delta fed to the sim (tab switches produce huge gaps)
    const MAX_FRAME_DT: f32 = 0.1;

    struct Game {
        session: Session,
        callbacks: Callbacks,
        settings: Settings,
        high_scores: HighScores,
        field: PlayField,
        last_time: f64,
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    fn with_game(f: impl FnOnce(&mut Game)) {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                f(&mut game.borrow_mut());
            }
        });
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    /// Dim the webcam preview when the keyboard is steering
    fn apply_webcam_opacity(settings: &Settings) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("webcam-container"))
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let opacity = settings.webcam_opacity().to_string();
            let _ = el.style().set_property("opacity", &opacity);
        }
    }

    fn show_best(high_scores: &HighScores) {
        let best = high_scores
            .top_score()
            .map(|score| score.to_string())
            .unwrap_or_else(|| "-".to_string());
        set_text("best", &best);
    }

    fn hud_callbacks() -> Callbacks {
        let mut callbacks = Callbacks::new();
        callbacks.set_score_changed(|score, level| {
            set_text("score", &score.to_string());
            set_text("level", &level.to_string());
        });
        callbacks.set_lives_changed(|lives, has_shield| {
            let hearts = "♥".repeat(lives as usize);
            let text = if has_shield {
                format!("{hearts} 🛡")
            } else {
                hearts
            };
            set_text("lives", &text);
        });
        callbacks.set_miss_streak_changed(|count| {
            set_text("miss-count", &count.to_string());
        });
        callbacks.set_time_changed(|seconds| {
            set_text("time", &seconds.to_string());
        });
        callbacks.set_stage_cleared(|stage| {
            set_text("result", &format!("Stage {stage} cleared!"));
        });
        callbacks.set_session_ended(|score, level| {
            set_text("result", &format!("Final score {score} (level {level})"));
        });
        callbacks
    }

    impl Game {
        fn start(&mut self, mode: GameMode) {
            if let GameMode::Staged { stage } = mode {
                if !self.high_scores.is_unlocked(stage) {
                    log::warn!("Stage {} is locked", stage);
                    return;
                }
            }
            self.settings.last_mode = mode;
            self.settings.save();
            apply_webcam_opacity(&self.settings);

            let config = self.settings.session_config(mode, self.field);
            let events = self.session.start(config);
            self.callbacks.dispatch(&events);
        }

        fn update(&mut self, dt: f32) {
            let events = self.session.tick(dt);
            if events.is_empty() {
                return;
            }
            self.record(&events);
            self.callbacks.dispatch(&events);
        }

        /// Persist end-of-run results
        fn record(&mut self, events: &[GameEvent]) {
            for event in events {
                match *event {
                    GameEvent::StageCleared { stage } => {
                        let last_stage = self.session.tuning().max_stage;
                        self.high_scores.record_stage_clear(stage, last_stage);
                        let score = self.session.progression().score();
                        let level = self.session.progression().level();
                        self.high_scores.add_score(
                            score,
                            level,
                            self.session.config().mode,
                            js_sys::Date::now(),
                        );
                        self.high_scores.save();
                    }
                    GameEvent::SessionEnded {
                        final_score,
                        final_level,
                    } => {
                        if let Some(rank) = self.high_scores.add_score(
                            final_score,
                            final_level,
                            self.session.config().mode,
                            js_sys::Date::now(),
                        ) {
                            log::info!("New high score, rank #{}", rank);
                        }
                        self.high_scores.save();
                    }
                    _ => continue,
                }
                show_best(&self.high_scores);
            }
        }
    }

    /// Start a run; `mode` is "timed", "survival" or "stage"
    #[wasm_bindgen]
    pub fn start_game(mode: &str, stage: u32) {
        match GameMode::from_name(mode, stage) {
            Some(mode) => with_game(|g| g.start(mode)),
            None => log::warn!("Unknown mode: {}", mode),
        }
    }

    /// Leave the current run without an end-of-session notification
    #[wasm_bindgen]
    pub fn return_to_menu() {
        with_game(|g| {
            let events = g.session.stop(StopReason::ReturnToMenu);
            g.callbacks.dispatch(&events);
        });
    }

    /// Pose classifier output: class name plus its probability
    #[wasm_bindgen]
    pub fn on_pose(class_name: &str, probability: f32) {
        with_game(|g| {
            if let Some(lane) = g.settings.pose_lane(class_name, probability) {
                g.session.set_lane(lane);
            }
        });
    }

    /// Switch between "camera" and "keyboard"; applies from the next run
    #[wasm_bindgen]
    pub fn set_input_method(name: &str) {
        with_game(|g| {
            if g.settings.set_input_method(name) {
                g.settings.save();
                apply_webcam_opacity(&g.settings);
                log::info!("Input method: {}", g.settings.input_method.as_str());
            } else {
                log::warn!("Unknown input method: {}", name);
            }
        });
    }

    /// Current frame state as JSON for the canvas renderer
    #[wasm_bindgen]
    pub fn snapshot_json() -> String {
        let mut json = String::new();
        with_game(|g| {
            json = serde_json::to_string(&g.session.snapshot()).unwrap_or_default();
        });
        json
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {err}").into());
        }

        log::info!("Fruit Catcher starting...");

        let Some(window) = web_sys::window() else {
            log::error!("no window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("no document");
            return;
        };

        let field = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .map(|canvas| {
                let (w, h) = (canvas.client_width(), canvas.client_height());
                canvas.set_width(w.max(1) as u32);
                canvas.set_height(h.max(1) as u32);
                PlayField::new(w as f32, h as f32)
            })
            .unwrap_or_default();

        let seed = js_sys::Date::now() as u64;
        log::info!("Seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session: Session::seeded(Tuning::default(), seed),
            callbacks: hud_callbacks(),
            settings: Settings::load(),
            high_scores: HighScores::load(),
            field,
            last_time: 0.0,
        }));
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));
        {
            let g = game.borrow();
            apply_webcam_opacity(&g.settings);
            show_best(&g.high_scores);
        }

        setup_keyboard(game.clone());
        setup_resize(game.clone());
        request_animation_frame(game);
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            let lane = g.session.basket().lane;
            match event.key().as_str() {
                "ArrowLeft" | "a" | "A" => g.session.set_lane(lane.shift_left()),
                "ArrowRight" | "d" | "D" => g.session.set_lane(lane.shift_right()),
                "Escape" => {
                    let events = g.session.stop(StopReason::ReturnToMenu);
                    g.callbacks.dispatch(&events);
                }
                _ => return,
            }
            event.prevent_default();
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            let Some(canvas) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("canvas"))
                .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            else {
                return;
            };
            let (w, h) = (canvas.client_width(), canvas.client_height());
            canvas.set_width(w.max(1) as u32);
            canvas.set_height(h.max(1) as u32);

            let mut g = game.borrow_mut();
            g.field = PlayField::new(w as f32, h as f32);
            g.session.resize(w as f32, h as f32);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt.min(MAX_FRAME_DT));
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::{Parser, ValueEnum};

    use fruit_catcher::sim::{
        GameEvent, GameMode, InputMethod, PlayField, Session, SessionConfig, SessionPhase,
        StopReason, choose_lane,
    };
    use fruit_catcher::{ConfigError, Tuning};

    /// Fixed step for the headless run
    const DT: f32 = 1.0 / 60.0;

    /// Runs that never end on their own (a perfect bot in survival) are cut here
    const MAX_TICKS: u64 = 60 * 60 * 10;

    #[derive(Parser, Debug)]
    #[command(name = "fruit-catcher")]
    #[command(about = "Play a seeded Fruit Catcher session with the autopilot steering")]
    pub struct Cli {
        /// Game mode to play
        #[arg(value_enum, default_value_t = CliMode::Timed)]
        pub mode: CliMode,
        /// Stage for staged runs
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=25))]
        pub stage: u32,
        /// Seed for the item stream
        #[arg(long, default_value_t = 42)]
        pub seed: u64,
        /// Play with keyboard input (faster falling items)
        #[arg(long)]
        pub keyboard: bool,
        /// Balance overrides as JSON
        #[arg(long)]
        pub tuning: Option<PathBuf>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
    pub enum CliMode {
        Timed,
        Survival,
        Stage,
    }

    impl Cli {
        pub fn game_mode(&self) -> GameMode {
            match self.mode {
                CliMode::Timed => GameMode::Timed,
                CliMode::Survival => GameMode::Survival,
                CliMode::Stage => GameMode::Staged { stage: self.stage },
            }
        }

        pub fn input(&self) -> InputMethod {
            if self.keyboard {
                InputMethod::Keyboard
            } else {
                InputMethod::Camera
            }
        }
    }

    pub struct Outcome {
        pub score: u64,
        pub level: u32,
        pub ticks: u64,
        pub reason: Option<StopReason>,
    }

    pub fn run(cli: &Cli) -> Result<Outcome, ConfigError> {
        let tuning = match &cli.tuning {
            Some(path) => Tuning::from_path(path)?,
            None => Tuning::default(),
        };
        let mut session = Session::seeded(tuning, cli.seed);
        let config = SessionConfig {
            mode: cli.game_mode(),
            input: cli.input(),
            field: PlayField::default(),
        };

        log::info!(
            "Autoplay: mode={} input={} seed={}",
            config.mode.as_str(),
            config.input.as_str(),
            cli.seed
        );
        session.start(config);

        while session.is_running() && session.ticks() < MAX_TICKS {
            let lane = choose_lane(session.basket(), session.items(), &session.config().field);
            session.set_lane(lane);

            for event in session.tick(DT) {
                match event {
                    GameEvent::LivesChanged { lives, has_shield } => {
                        log::debug!("Lives {} (shield: {})", lives, has_shield);
                    }
                    GameEvent::StageCleared { stage } => log::info!("Stage {} cleared", stage),
                    _ => {}
                }
            }
        }

        let reason = match session.phase() {
            SessionPhase::Stopped(reason) => Some(reason),
            _ => {
                log::info!("Tick cap reached, leaving the run");
                session.stop(StopReason::ReturnToMenu);
                None
            }
        };

        Ok(Outcome {
            score: session.progression().score(),
            level: session.progression().level(),
            ticks: session.ticks(),
            reason,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    log::info!("Fruit Catcher (native) starting...");

    let cli = headless::Cli::parse();

    match headless::run(&cli) {
        Ok(outcome) => {
            let reason = outcome
                .reason
                .map(|r| format!("{r:?}"))
                .unwrap_or_else(|| "tick cap".to_string());
            println!(
                "{}: score {} level {} after {} ticks ({})",
                cli.game_mode().as_str(),
                outcome.score,
                outcome.level,
                outcome.ticks,
                reason
            );
        }
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
