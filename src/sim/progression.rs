//! Player progression state machine
//!
//! Owns score, level, vitals (clock or lives), the shield overlay, fever
//! mode, the miss streak and the stage goal. Only catch/miss outcomes and
//! the per-tick timers mutate it.

use serde::{Deserialize, Serialize};

use super::events::{GameEvent, StopReason};
use super::spawner::Difficulty;
use super::state::{GameMode, InputMethod, ItemKind, Mode, Vitals};
use crate::tuning::Tuning;

/// Consecutive fruit misses that cost a life
pub const MISSES_PER_LIFE: u32 = 2;

/// Mutable record of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    game_mode: GameMode,
    input: InputMethod,
    score: u64,
    level: u32,
    vitals: Vitals,
    shielded: bool,
    mode: Mode,
    miss_streak: u32,
    /// Score that clears the stage (staged runs only)
    stage_goal: Option<u64>,
    level_threshold: u64,
    /// Normal-mode interval, or the fever constant while fever is active
    spawn_interval_ms: f32,
    /// Last whole-second value reported for the clock
    shown_seconds: u32,
}

impl Progression {
    /// Fresh state for a session of the given mode
    pub fn new(tuning: &Tuning, game_mode: GameMode, input: InputMethod) -> Self {
        let vitals = if game_mode.has_lives() {
            Vitals::Lives {
                remaining: tuning.max_lives,
                max: tuning.max_lives,
            }
        } else {
            Vitals::Time {
                remaining: tuning.time_limit_secs,
            }
        };
        let stage_goal = match game_mode {
            GameMode::Staged { .. } => Some(tuning.stage_goal(game_mode.stage())),
            _ => None,
        };

        Self {
            game_mode,
            input,
            score: 0,
            level: 1,
            vitals,
            shielded: false,
            mode: Mode::Normal,
            miss_streak: 0,
            stage_goal,
            level_threshold: tuning.level_threshold(game_mode),
            spawn_interval_ms: tuning.initial_spawn_interval_ms,
            shown_seconds: whole_seconds(tuning.time_limit_secs),
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn vitals(&self) -> Vitals {
        self.vitals
    }

    pub fn lives(&self) -> Option<u8> {
        self.vitals.lives()
    }

    pub fn time_remaining(&self) -> Option<f32> {
        self.vitals.time_remaining()
    }

    pub fn is_shielded(&self) -> bool {
        self.shielded
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_fever(&self) -> bool {
        self.mode.is_fever()
    }

    pub fn miss_streak(&self) -> u32 {
        self.miss_streak
    }

    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    pub fn stage(&self) -> u32 {
        self.game_mode.stage()
    }

    pub fn stage_goal(&self) -> Option<u64> {
        self.stage_goal
    }

    pub fn spawn_interval_ms(&self) -> f32 {
        self.spawn_interval_ms
    }

    /// Snapshot of the parameters the spawner needs
    pub fn difficulty(&self) -> Difficulty {
        Difficulty {
            mode: self.game_mode,
            input: self.input,
            level: self.level,
            fever: self.is_fever(),
            spawn_interval_ms: self.spawn_interval_ms,
        }
    }

    /// Events describing the full HUD state (sent once at session start)
    pub fn initial_events(&self) -> Vec<GameEvent> {
        let mut events = vec![GameEvent::ScoreChanged {
            score: self.score,
            level: self.level,
        }];
        match self.vitals {
            Vitals::Time { .. } => events.push(GameEvent::TimeChanged {
                seconds_remaining: self.shown_seconds,
            }),
            Vitals::Lives { remaining, .. } => {
                events.push(GameEvent::LivesChanged {
                    lives: remaining,
                    has_shield: self.shielded,
                });
                events.push(GameEvent::MissStreakChanged {
                    count: self.miss_streak,
                });
            }
        }
        events
    }

    /// Count the clock down (timed mode). Returns true once time has run out.
    pub fn tick_clock(&mut self, dt: f32, events: &mut Vec<GameEvent>) -> bool {
        let Vitals::Time { remaining } = &mut self.vitals else {
            return false;
        };
        *remaining -= dt;
        let seconds = whole_seconds(*remaining);
        let expired = *remaining <= 0.0;
        if seconds != self.shown_seconds {
            self.shown_seconds = seconds;
            events.push(GameEvent::TimeChanged {
                seconds_remaining: seconds,
            });
        }
        expired
    }

    /// Decay the fever timer; on expiry restore the interval for the current level
    pub fn tick_fever(&mut self, dt: f32, tuning: &Tuning) {
        let Mode::Fever { remaining } = &mut self.mode else {
            return;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.mode = Mode::Normal;
            self.spawn_interval_ms = tuning.spawn_interval_for_level(self.level);
            log::info!(
                "Fever ended at level {} (interval {}ms)",
                self.level,
                self.spawn_interval_ms
            );
        }
    }

    /// Apply the effect of catching an item
    pub fn on_catch(&mut self, kind: ItemKind, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        let before = (self.score, self.level);

        match kind {
            ItemKind::FruitLow | ItemKind::FruitMid | ItemKind::FruitHigh => {
                self.score += kind.score_value();
                self.reset_miss_streak(events);
            }
            ItemKind::Hazard => {
                if self.shielded {
                    self.shielded = false;
                    log::debug!("Shield absorbed a hazard");
                    self.emit_lives(events);
                } else {
                    match self.vitals {
                        Vitals::Lives { .. } => self.lose_life(events),
                        Vitals::Time { .. } => {
                            self.score = self.score.saturating_sub(tuning.hazard_penalty);
                        }
                    }
                    self.reset_miss_streak(events);
                }
            }
            ItemKind::FeverTrigger => {
                self.score += kind.score_value();
                self.enter_fever(tuning);
            }
            ItemKind::Shield => {
                if !self.shielded {
                    self.shielded = true;
                    self.emit_lives(events);
                }
            }
            ItemKind::LifeRestore => {
                if let Vitals::Lives { remaining, max } = &mut self.vitals {
                    if *remaining < *max {
                        *remaining += 1;
                        self.emit_lives(events);
                    }
                }
            }
        }

        self.check_level_up(tuning);
        if (self.score, self.level) != before {
            events.push(GameEvent::ScoreChanged {
                score: self.score,
                level: self.level,
            });
        }
    }

    /// Apply an item falling past the floor. Only fruit counts toward the streak.
    pub fn on_miss(&mut self, kind: ItemKind, events: &mut Vec<GameEvent>) {
        if !kind.is_fruit() || !self.game_mode.has_lives() {
            return;
        }
        self.miss_streak += 1;
        events.push(GameEvent::MissStreakChanged {
            count: self.miss_streak,
        });
        if self.miss_streak >= MISSES_PER_LIFE {
            self.lose_life(events);
            self.reset_miss_streak(events);
        }
    }

    /// Terminal condition reached, if any
    pub fn terminal(&self) -> Option<StopReason> {
        match self.vitals {
            Vitals::Time { remaining } if remaining <= 0.0 => return Some(StopReason::TimeExpired),
            Vitals::Lives { remaining: 0, .. } => return Some(StopReason::LivesDepleted),
            _ => {}
        }
        match self.stage_goal {
            Some(goal) if self.score >= goal => Some(StopReason::StageCleared),
            _ => None,
        }
    }

    /// One level per catch at most, even if the score skipped past several thresholds
    fn check_level_up(&mut self, tuning: &Tuning) {
        if self.score >= u64::from(self.level) * self.level_threshold {
            self.level += 1;
            if !self.is_fever() {
                self.spawn_interval_ms = tuning.spawn_interval_for_level(self.level);
            }
            log::info!("Level up: {} (score {})", self.level, self.score);
        }
    }

    fn enter_fever(&mut self, tuning: &Tuning) {
        self.mode = Mode::Fever {
            remaining: tuning.fever_duration_secs,
        };
        self.spawn_interval_ms = tuning.fever_spawn_interval_ms;
        log::info!("Fever started ({}s)", tuning.fever_duration_secs);
    }

    fn lose_life(&mut self, events: &mut Vec<GameEvent>) {
        if let Vitals::Lives { remaining, .. } = &mut self.vitals {
            *remaining = remaining.saturating_sub(1);
            self.emit_lives(events);
        }
    }

    fn reset_miss_streak(&mut self, events: &mut Vec<GameEvent>) {
        if self.miss_streak != 0 {
            self.miss_streak = 0;
            events.push(GameEvent::MissStreakChanged { count: 0 });
        }
    }

    fn emit_lives(&self, events: &mut Vec<GameEvent>) {
        if let Vitals::Lives { remaining, .. } = self.vitals {
            events.push(GameEvent::LivesChanged {
                lives: remaining,
                has_shield: self.shielded,
            });
        }
    }
}

fn whole_seconds(remaining: f32) -> u32 {
    remaining.max(0.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed() -> (Tuning, Progression) {
        let tuning = Tuning::default();
        let prog = Progression::new(&tuning, GameMode::Timed, InputMethod::Camera);
        (tuning, prog)
    }

    fn survival() -> (Tuning, Progression) {
        let tuning = Tuning::default();
        let prog = Progression::new(&tuning, GameMode::Survival, InputMethod::Camera);
        (tuning, prog)
    }

    fn lives_events(events: &[GameEvent]) -> Vec<&GameEvent> {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::LivesChanged { .. }))
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let (_, prog) = timed();
        assert_eq!(prog.score(), 0);
        assert_eq!(prog.level(), 1);
        assert_eq!(prog.time_remaining(), Some(60.0));
        assert_eq!(prog.lives(), None);
        assert_eq!(prog.spawn_interval_ms(), 2500.0);
        assert!(!prog.is_fever());

        let (_, prog) = survival();
        assert_eq!(prog.lives(), Some(3));
        assert_eq!(prog.time_remaining(), None);
    }

    #[test]
    fn test_fruit_low_levels_up_on_fifth_catch() {
        let (tuning, mut prog) = timed();
        let mut events = Vec::new();
        for _ in 0..4 {
            prog.on_catch(ItemKind::FruitLow, &tuning, &mut events);
        }
        assert_eq!(prog.score(), 400);
        assert_eq!(prog.level(), 1);

        prog.on_catch(ItemKind::FruitLow, &tuning, &mut events);
        assert_eq!(prog.score(), 500);
        assert_eq!(prog.level(), 2);
        assert_eq!(prog.spawn_interval_ms(), tuning.spawn_interval_for_level(2));
        assert_eq!(
            events.last(),
            Some(&GameEvent::ScoreChanged { score: 500, level: 2 })
        );
    }

    #[test]
    fn test_multi_threshold_jump_levels_once() {
        let (tuning, mut prog) = timed();
        let mut events = Vec::new();
        prog.score = 950;
        prog.on_catch(ItemKind::FruitHigh, &tuning, &mut events);
        // 1250 crosses both 500 and 1000, but only one level is granted
        assert_eq!(prog.score(), 1250);
        assert_eq!(prog.level(), 2);

        // The next catch picks up the remaining threshold
        prog.on_catch(ItemKind::FruitLow, &tuning, &mut events);
        assert_eq!(prog.level(), 3);
    }

    #[test]
    fn test_pending_threshold_collected_by_non_scoring_catch() {
        let (tuning, mut prog) = timed();
        let mut events = Vec::new();
        prog.score = 950;
        prog.on_catch(ItemKind::FruitHigh, &tuning, &mut events);
        assert_eq!(prog.level(), 2);

        events.clear();
        prog.on_catch(ItemKind::Shield, &tuning, &mut events);
        assert_eq!(prog.score(), 1250);
        assert_eq!(prog.level(), 3);
        assert_eq!(events, vec![GameEvent::ScoreChanged { score: 1250, level: 3 }]);
    }

    #[test]
    fn test_hazard_penalty_clamps_at_zero() {
        let (tuning, mut prog) = timed();
        let mut events = Vec::new();
        prog.on_catch(ItemKind::FruitMid, &tuning, &mut events);
        prog.on_catch(ItemKind::Hazard, &tuning, &mut events);
        assert_eq!(prog.score(), 0);
        assert_eq!(
            events.last(),
            Some(&GameEvent::ScoreChanged { score: 0, level: 1 })
        );
    }

    #[test]
    fn test_hazard_costs_one_life_without_shield() {
        let (tuning, mut prog) = survival();
        let mut events = Vec::new();
        prog.on_catch(ItemKind::Hazard, &tuning, &mut events);
        assert_eq!(prog.lives(), Some(2));
        assert_eq!(
            lives_events(&events),
            vec![&GameEvent::LivesChanged { lives: 2, has_shield: false }]
        );
    }

    #[test]
    fn test_shield_absorbs_hazard() {
        let (tuning, mut prog) = survival();
        let mut events = Vec::new();
        prog.on_catch(ItemKind::Shield, &tuning, &mut events);
        assert!(prog.is_shielded());

        // Second shield is a no-op
        events.clear();
        prog.on_catch(ItemKind::Shield, &tuning, &mut events);
        assert!(prog.is_shielded());
        assert!(events.is_empty());

        prog.on_catch(ItemKind::Hazard, &tuning, &mut events);
        assert!(!prog.is_shielded());
        assert_eq!(prog.lives(), Some(3));
        assert_eq!(
            events,
            vec![GameEvent::LivesChanged { lives: 3, has_shield: false }]
        );
    }

    #[test]
    fn test_two_consecutive_misses_cost_a_life() {
        let (_, mut prog) = survival();
        let mut events = Vec::new();
        prog.on_miss(ItemKind::FruitLow, &mut events);
        assert_eq!(prog.miss_streak(), 1);
        assert_eq!(prog.lives(), Some(3));

        prog.on_miss(ItemKind::FruitHigh, &mut events);
        assert_eq!(prog.miss_streak(), 0);
        assert_eq!(prog.lives(), Some(2));
        assert_eq!(
            events,
            vec![
                GameEvent::MissStreakChanged { count: 1 },
                GameEvent::MissStreakChanged { count: 2 },
                GameEvent::LivesChanged { lives: 2, has_shield: false },
                GameEvent::MissStreakChanged { count: 0 },
            ]
        );
    }

    #[test]
    fn test_catch_between_misses_forgives() {
        let (tuning, mut prog) = survival();
        let mut events = Vec::new();
        prog.on_miss(ItemKind::FruitLow, &mut events);
        prog.on_catch(ItemKind::FruitLow, &tuning, &mut events);
        prog.on_miss(ItemKind::FruitLow, &mut events);
        assert_eq!(prog.lives(), Some(3));
        assert_eq!(prog.miss_streak(), 1);
    }

    #[test]
    fn test_non_fruit_misses_ignored() {
        let (_, mut prog) = survival();
        let mut events = Vec::new();
        for kind in [ItemKind::Hazard, ItemKind::Shield, ItemKind::FeverTrigger, ItemKind::LifeRestore] {
            prog.on_miss(kind, &mut events);
        }
        assert_eq!(prog.miss_streak(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_misses_ignored_in_timed_mode() {
        let (_, mut prog) = timed();
        let mut events = Vec::new();
        prog.on_miss(ItemKind::FruitLow, &mut events);
        prog.on_miss(ItemKind::FruitLow, &mut events);
        assert_eq!(prog.miss_streak(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_life_restore_clamps_to_max() {
        let (tuning, mut prog) = survival();
        let mut events = Vec::new();
        prog.on_catch(ItemKind::LifeRestore, &tuning, &mut events);
        assert_eq!(prog.lives(), Some(3));
        assert!(events.is_empty());

        prog.on_catch(ItemKind::Hazard, &tuning, &mut events);
        prog.on_catch(ItemKind::LifeRestore, &tuning, &mut events);
        assert_eq!(prog.lives(), Some(3));
    }

    #[test]
    fn test_lives_depleted_is_terminal() {
        let (tuning, mut prog) = survival();
        let mut events = Vec::new();
        for _ in 0..3 {
            assert_eq!(prog.terminal(), None);
            prog.on_catch(ItemKind::Hazard, &tuning, &mut events);
        }
        assert_eq!(prog.lives(), Some(0));
        assert_eq!(prog.terminal(), Some(StopReason::LivesDepleted));
    }

    #[test]
    fn test_fever_forces_and_restores_interval() {
        let (tuning, mut prog) = timed();
        let mut events = Vec::new();
        prog.on_catch(ItemKind::FeverTrigger, &tuning, &mut events);
        assert!(prog.is_fever());
        assert_eq!(prog.spawn_interval_ms(), tuning.fever_spawn_interval_ms);

        // Level up during fever must not touch the fever interval
        for _ in 0..5 {
            prog.on_catch(ItemKind::FruitLow, &tuning, &mut events);
        }
        assert_eq!(prog.level(), 2);
        assert_eq!(prog.spawn_interval_ms(), tuning.fever_spawn_interval_ms);

        prog.tick_fever(4.0, &tuning);
        assert!(prog.is_fever());
        prog.tick_fever(1.0, &tuning);
        assert!(!prog.is_fever());
        // Fresh value for level 2, not the 2500ms cached before fever
        assert_eq!(prog.spawn_interval_ms(), tuning.spawn_interval_for_level(2));
    }

    #[test]
    fn test_fever_trigger_refreshes_duration() {
        let (tuning, mut prog) = timed();
        let mut events = Vec::new();
        prog.on_catch(ItemKind::FeverTrigger, &tuning, &mut events);
        prog.tick_fever(3.0, &tuning);
        prog.on_catch(ItemKind::FeverTrigger, &tuning, &mut events);
        assert_eq!(prog.mode(), Mode::Fever { remaining: tuning.fever_duration_secs });
    }

    #[test]
    fn test_clock_reports_whole_seconds_once() {
        let (_, mut prog) = timed();
        let mut events = Vec::new();
        assert!(!prog.tick_clock(0.5, &mut events));
        assert!(events.is_empty());
        assert!(!prog.tick_clock(0.5, &mut events));
        assert_eq!(events, vec![GameEvent::TimeChanged { seconds_remaining: 59 }]);

        assert!(prog.tick_clock(60.0, &mut events));
        assert_eq!(events.last(), Some(&GameEvent::TimeChanged { seconds_remaining: 0 }));
        assert_eq!(prog.terminal(), Some(StopReason::TimeExpired));
    }

    #[test]
    fn test_stage_goal_terminal() {
        let tuning = Tuning::default();
        let mut prog = Progression::new(&tuning, GameMode::Staged { stage: 1 }, InputMethod::Camera);
        assert_eq!(prog.stage_goal(), Some(2000));
        let mut events = Vec::new();
        prog.score = 1800;
        prog.on_catch(ItemKind::FruitMid, &tuning, &mut events);
        assert_eq!(prog.terminal(), Some(StopReason::StageCleared));
    }

    #[test]
    fn test_initial_events_per_mode() {
        let (_, prog) = timed();
        assert_eq!(
            prog.initial_events(),
            vec![
                GameEvent::ScoreChanged { score: 0, level: 1 },
                GameEvent::TimeChanged { seconds_remaining: 60 },
            ]
        );
        let (_, prog) = survival();
        assert_eq!(prog.initial_events().len(), 3);
    }
}
