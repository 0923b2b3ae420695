//! Session controller and per-frame tick
//!
//! One `tick` per frame runs the fixed order: clock, fever decay, spawn,
//! basket glide, item resolution, stop check.

use serde::{Deserialize, Serialize};

use super::collision::{self, Resolution};
use super::events::{GameEvent, StopReason};
use super::progression::Progression;
use super::rng::{RandomSource, SeededRng};
use super::spawner::Spawner;
use super::state::{Basket, FallingItem, GameMode, InputMethod, Lane, Mode, PlayField, Vitals};
use crate::tuning::Tuning;

/// Per-session options
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: GameMode,
    pub input: InputMethod,
    pub field: PlayField,
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Created, never started
    Idle,
    Running,
    Stopped(StopReason),
}

/// What the rendering collaborator reads each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub basket: Basket,
    pub items: Vec<FallingItem>,
    pub field: PlayField,
    pub score: u64,
    pub level: u32,
    pub vitals: Vitals,
    pub shielded: bool,
    pub fever: bool,
    pub fever_remaining: f32,
}

/// A play session: owns progression, basket and items
#[derive(Debug, Clone)]
pub struct Session<R: RandomSource = SeededRng> {
    tuning: Tuning,
    rng: R,
    config: SessionConfig,
    phase: SessionPhase,
    progression: Progression,
    basket: Basket,
    spawner: Spawner,
    /// Ticks that advanced the simulation this session
    ticks: u64,
    /// Events produced since the last drain
    events: Vec<GameEvent>,
}

impl Session<SeededRng> {
    /// Session drawing from a seeded PCG stream
    pub fn seeded(tuning: Tuning, seed: u64) -> Self {
        Self::new(tuning, SeededRng::new(seed))
    }
}

impl<R: RandomSource> Session<R> {
    pub fn new(tuning: Tuning, rng: R) -> Self {
        let config = SessionConfig::default();
        Self {
            progression: Progression::new(&tuning, config.mode, config.input),
            basket: Basket::new(&config.field),
            spawner: Spawner::new(),
            tuning,
            rng,
            config,
            phase: SessionPhase::Idle,
            ticks: 0,
            events: Vec::new(),
        }
    }

    /// Discard any previous run and begin a new one
    ///
    /// Returns the initial HUD events.
    pub fn start(&mut self, mut config: SessionConfig) -> Vec<GameEvent> {
        if let GameMode::Staged { stage } = &mut config.mode {
            *stage = self.tuning.clamp_stage(*stage);
        }
        self.config = config;
        self.progression = Progression::new(&self.tuning, config.mode, config.input);
        self.basket = Basket::new(&config.field);
        self.spawner.reset();
        self.ticks = 0;
        self.events.clear();
        self.phase = SessionPhase::Running;

        log::info!(
            "Session started: mode={} stage={} input={}",
            config.mode.as_str(),
            config.mode.stage(),
            config.input.as_str()
        );
        self.progression.initial_events()
    }

    /// Halt the session. Safe to call at any time; a no-op unless running.
    pub fn stop(&mut self, reason: StopReason) -> Vec<GameEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        self.finish(reason);
        std::mem::take(&mut self.events)
    }

    /// Advance one frame. Zero, negative or non-finite `dt` changes nothing.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        if !self.is_running() || !dt.is_finite() || dt <= 0.0 {
            return Vec::new();
        }
        self.ticks += 1;

        // 1. Clock
        if self.progression.tick_clock(dt, &mut self.events) {
            self.finish(StopReason::TimeExpired);
            return std::mem::take(&mut self.events);
        }

        // 2. Fever decay
        self.progression.tick_fever(dt, &self.tuning);

        // 3. Spawn
        let difficulty = self.progression.difficulty();
        self.spawner.maybe_spawn(
            dt * 1000.0,
            &difficulty,
            &self.tuning,
            &self.config.field,
            &mut self.rng,
        );

        // 4. Basket glide
        self.basket.move_toward_lane(&self.config.field);

        // 5. Items, newest first
        self.resolve_items(dt);

        // 6. Stop check
        if let Some(reason) = self.progression.terminal() {
            self.finish(reason);
        }

        std::mem::take(&mut self.events)
    }

    /// Latest lane from the input collaborator (ignored unless running)
    pub fn set_lane(&mut self, lane: Lane) {
        if self.is_running() {
            self.basket.lane = lane;
        }
    }

    /// Play-field size changed; the basket re-anchors immediately
    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.field = PlayField::new(width, height);
        self.basket.fit_to_field(&self.config.field);
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    pub fn items(&self) -> &[FallingItem] {
        self.spawner.items()
    }

    /// Direct access for scripted scenarios
    pub fn spawner_mut(&mut self) -> &mut Spawner {
        &mut self.spawner
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshot(&self) -> Snapshot {
        let fever_remaining = match self.progression.mode() {
            Mode::Fever { remaining } => remaining,
            Mode::Normal => 0.0,
        };
        Snapshot {
            basket: self.basket.clone(),
            items: self.spawner.items().to_vec(),
            field: self.config.field,
            score: self.progression.score(),
            level: self.progression.level(),
            vitals: self.progression.vitals(),
            shielded: self.progression.is_shielded(),
            fever: self.progression.is_fever(),
            fever_remaining,
        }
    }

    /// Advance every item and settle catches/misses, newest first
    ///
    /// Resolved items are flagged and compacted afterwards so indices stay
    /// stable during the pass. Once a terminal condition is reached the
    /// remaining items are left alone.
    fn resolve_items(&mut self, dt: f32) {
        let field_height = self.config.field.height;
        let items = self.spawner.items_mut();
        let mut resolved = vec![false; items.len()];

        for index in (0..items.len()).rev() {
            let item = &mut items[index];
            collision::advance(item, dt);
            match collision::resolve(item, &self.basket, field_height) {
                Resolution::Falling => continue,
                Resolution::Caught => {
                    log::debug!("Caught {} (id {})", item.kind.as_str(), item.id);
                    self.progression.on_catch(item.kind, &self.tuning, &mut self.events);
                }
                Resolution::Missed => {
                    self.progression.on_miss(item.kind, &mut self.events);
                }
            }
            resolved[index] = true;
            if self.progression.terminal().is_some() {
                break;
            }
        }

        self.spawner.sweep(&resolved);
    }

    fn finish(&mut self, reason: StopReason) {
        self.phase = SessionPhase::Stopped(reason);
        let score = self.progression.score();
        let level = self.progression.level();
        log::info!(
            "Session stopped ({:?}): score={} level={} ticks={}",
            reason,
            score,
            level,
            self.ticks
        );

        match reason {
            StopReason::ReturnToMenu => {}
            StopReason::StageCleared => self.events.push(GameEvent::StageCleared {
                stage: self.progression.stage(),
            }),
            StopReason::TimeExpired | StopReason::LivesDepleted => {
                self.events.push(GameEvent::SessionEnded {
                    final_score: score,
                    final_level: level,
                })
            }
        }
    }
}
