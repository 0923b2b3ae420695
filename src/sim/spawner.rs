//! Timed, probability-table-driven item spawning
//!
//! Kind selection evaluates one draw against bands in a fixed order, so the
//! bands are mutually exclusive and the final remainder band makes them
//! exhaustive.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::state::{FallingItem, GameMode, InputMethod, ItemKind, Lane, PlayField};
use crate::consts::{ITEM_SPAWN_Y, LANE_COUNT};
use crate::tuning::Tuning;

/// Ordered probability bands plus a remainder kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTable {
    bands: Vec<(ItemKind, f32)>,
    remainder: ItemKind,
}

impl ItemTable {
    /// Fever table: fruit only, weighted toward the higher tiers
    pub fn fever(tuning: &Tuning) -> Self {
        Self {
            bands: vec![
                (ItemKind::FruitMid, tuning.fever_mid_chance),
                (ItemKind::FruitHigh, tuning.fever_high_chance),
            ],
            remainder: ItemKind::FruitLow,
        }
    }

    /// Normal table for the session's mode and stage
    ///
    /// Order: fever-trigger, shield, life-restore, hazard, then the fruit
    /// tiers split whatever probability is left.
    pub fn normal(tuning: &Tuning, mode: GameMode) -> Self {
        let (fever, shield, life, hazard) = if mode.has_lives() {
            (
                tuning.lives_fever_chance,
                tuning.lives_shield_chance,
                tuning.lives_life_restore_chance,
                tuning.hazard_chance_for_stage(mode.stage()),
            )
        } else {
            (tuning.timed_fever_chance, 0.0, 0.0, tuning.timed_hazard_chance)
        };
        let fruit = (1.0 - fever - shield - life - hazard).max(0.0);

        Self {
            bands: vec![
                (ItemKind::FeverTrigger, fever),
                (ItemKind::Shield, shield),
                (ItemKind::LifeRestore, life),
                (ItemKind::Hazard, hazard),
                (ItemKind::FruitHigh, fruit * tuning.fruit_high_share),
                (ItemKind::FruitMid, fruit * tuning.fruit_mid_share),
            ],
            remainder: ItemKind::FruitLow,
        }
    }

    /// Map a draw in [0, 1) to exactly one kind
    pub fn pick(&self, draw: f32) -> ItemKind {
        let mut cumulative = 0.0;
        for &(kind, chance) in &self.bands {
            cumulative += chance;
            if draw < cumulative {
                return kind;
            }
        }
        self.remainder
    }

    /// Probability of each kind (bands first, remainder last)
    pub fn probabilities(&self) -> Vec<(ItemKind, f32)> {
        let mut out = self.bands.clone();
        let used: f32 = self.bands.iter().map(|(_, p)| p).sum();
        out.push((self.remainder, (1.0 - used).max(0.0)));
        out
    }
}

/// Parameters the spawner reads from progression each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub mode: GameMode,
    pub input: InputMethod,
    pub level: u32,
    pub fever: bool,
    /// Current spawn interval (ms), fever constant while fever is active
    pub spawn_interval_ms: f32,
}

impl Difficulty {
    /// Paired hazard traps only occur in lives-bearing runs outside fever
    pub fn traps_enabled(&self) -> bool {
        self.mode.has_lives() && !self.fever
    }
}

/// Fall speed fixed at spawn time
pub fn fall_speed(tuning: &Tuning, difficulty: &Difficulty) -> f32 {
    let mode_mult = if difficulty.fever {
        tuning.fever_speed_multiplier
    } else {
        1.0
    };
    let input_mult = match difficulty.input {
        InputMethod::Keyboard => tuning.keyboard_speed_multiplier,
        InputMethod::Camera => 1.0,
    };
    tuning.base_speed
        * tuning.stage_speed_factor(difficulty.mode.stage())
        * (1.0 + difficulty.level as f32 * tuning.level_speed_factor)
        * mode_mult
        * input_mult
}

/// Map a draw in [0, 1) to a lane
pub fn pick_lane(draw: f32) -> Lane {
    let index = ((draw * LANE_COUNT as f32) as usize).min(LANE_COUNT - 1);
    Lane::from_index(index).unwrap_or_default()
}

/// Owns the live falling items and the spawn timer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    /// Live items in creation order
    items: Vec<FallingItem>,
    /// Time since the last spawn (ms)
    accumulator_ms: f32,
    next_id: u32,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all items and restart the timer
    pub fn reset(&mut self) {
        self.items.clear();
        self.accumulator_ms = 0.0;
        self.next_id = 0;
    }

    pub fn items(&self) -> &[FallingItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [FallingItem] {
        &mut self.items
    }

    pub fn accumulator_ms(&self) -> f32 {
        self.accumulator_ms
    }

    /// Accumulate elapsed time and spawn once the interval is exceeded
    ///
    /// Returns the number of items created (0, 1, or 2 with a trap).
    pub fn maybe_spawn<R: RandomSource>(
        &mut self,
        elapsed_ms: f32,
        difficulty: &Difficulty,
        tuning: &Tuning,
        field: &PlayField,
        rng: &mut R,
    ) -> usize {
        self.accumulator_ms += elapsed_ms;
        if self.accumulator_ms <= difficulty.spawn_interval_ms {
            return 0;
        }
        self.accumulator_ms = 0.0;
        self.spawn(difficulty, tuning, field, rng)
    }

    /// Spawn immediately. Draw order: lane, kind, then trap (when possible).
    pub fn spawn<R: RandomSource>(
        &mut self,
        difficulty: &Difficulty,
        tuning: &Tuning,
        field: &PlayField,
        rng: &mut R,
    ) -> usize {
        let lane = pick_lane(rng.next_unit());
        let table = if difficulty.fever {
            ItemTable::fever(tuning)
        } else {
            ItemTable::normal(tuning, difficulty.mode)
        };
        let kind = table.pick(rng.next_unit());
        let speed = fall_speed(tuning, difficulty);
        let x = field.lane_center(lane);

        self.push(Vec2::new(x, ITEM_SPAWN_Y), kind, speed);
        log::debug!("Spawned {} in {} lane at {:.1}px/s", kind.as_str(), lane.as_str(), speed);

        if difficulty.traps_enabled() && kind.is_fruit() && rng.next_unit() < tuning.trap_chance {
            self.push(
                Vec2::new(x, ITEM_SPAWN_Y - tuning.trap_offset),
                ItemKind::Hazard,
                speed,
            );
            log::debug!("Trap hazard trailing in {} lane", lane.as_str());
            return 2;
        }
        1
    }

    /// Insert an item directly (scripted scenarios and tests)
    pub fn push(&mut self, pos: Vec2, kind: ItemKind, speed: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(FallingItem { id, pos, kind, speed });
        id
    }

    /// Compact away items flagged as resolved (flags indexed like `items()`)
    pub fn sweep(&mut self, resolved: &[bool]) {
        let mut index = 0;
        self.items.retain(|_| {
            let keep = !resolved.get(index).copied().unwrap_or(false);
            index += 1;
            keep
        });
    }
}
