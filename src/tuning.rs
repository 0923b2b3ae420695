//! Data-driven game balance
//!
//! Every difficulty knob lives here so balance can be tweaked from JSON
//! without touching the simulation. Missing fields fall back to defaults.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::GameMode;

/// Errors raised while loading or validating a [`Tuning`]
#[derive(Debug)]
pub enum ConfigError {
    /// Tuning file could not be read
    Io(std::io::Error),
    /// JSON could not be parsed
    Parse(serde_json::Error),
    /// A value that must be strictly positive was not
    NonPositive { field: &'static str, value: f32 },
    /// A probability outside [0, 1]
    ProbabilityOutOfRange { field: &'static str, value: f32 },
    /// Probabilities of one table add up to more than 1
    TableOverflow { table: &'static str, total: f32 },
    /// A min/max pair is inverted
    InvalidRange { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read tuning file: {err}"),
            Self::Parse(err) => write!(f, "invalid tuning JSON: {err}"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive (got {value})")
            }
            Self::ProbabilityOutOfRange { field, value } => {
                write!(f, "{field} must be within [0, 1] (got {value})")
            }
            Self::TableOverflow { table, total } => {
                write!(f, "{table} probabilities sum to {total}, exceeding 1")
            }
            Self::InvalidRange { field } => write!(f, "{field} range is inverted"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Balance parameters for a play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Session limits ===
    /// Timed mode duration (seconds)
    pub time_limit_secs: f32,
    /// Starting and maximum lives in lives-bearing modes
    pub max_lives: u8,

    // === Spawn cadence (milliseconds) ===
    /// Interval used from session start until the first recompute
    pub initial_spawn_interval_ms: f32,
    /// Interval before per-level reduction
    pub spawn_interval_base_ms: f32,
    /// Reduction per level
    pub spawn_interval_per_level_ms: f32,
    /// Interval never drops below this outside fever
    pub min_spawn_interval_ms: f32,
    /// Interval while fever is active
    pub fever_spawn_interval_ms: f32,

    // === Fall speed ===
    /// Base fall speed (pixels/s)
    pub base_speed: f32,
    /// Speed gain per level (multiplicative on base)
    pub level_speed_factor: f32,
    /// Speed gain per stage beyond the first
    pub stage_speed_step: f32,
    /// Fall speed multiplier while fever is active
    pub fever_speed_multiplier: f32,
    /// Discrete keyboard input is easier, so items fall faster
    pub keyboard_speed_multiplier: f32,

    // === Fever ===
    /// Fever duration (seconds)
    pub fever_duration_secs: f32,
    /// Fever table: mid tier probability (evaluated first)
    pub fever_mid_chance: f32,
    /// Fever table: high tier probability (evaluated second), low takes the rest
    pub fever_high_chance: f32,

    // === Scoring ===
    /// Score penalty for a hazard in score-only modes
    pub hazard_penalty: u64,
    /// Level-up threshold per level in timed mode
    pub timed_level_threshold: u64,
    /// Level-up threshold per level in lives-bearing modes
    pub lives_level_threshold: u64,

    // === Normal item table, timed mode ===
    pub timed_fever_chance: f32,
    pub timed_hazard_chance: f32,

    // === Normal item table, lives-bearing modes ===
    pub lives_fever_chance: f32,
    pub lives_shield_chance: f32,
    pub lives_life_restore_chance: f32,
    /// Hazard chance at stage 1
    pub hazard_chance_base: f32,
    /// Hazard chance added per stage
    pub hazard_chance_per_stage: f32,
    /// Hazard chance cap
    pub hazard_chance_max: f32,

    // === Fruit split (share of whatever the rare/hazard bands leave) ===
    pub fruit_high_share: f32,
    pub fruit_mid_share: f32,

    // === Paired hazard trap (lives-bearing modes) ===
    /// Chance that a fruit spawn drags a hazard along in its lane
    pub trap_chance: f32,
    /// How far above the fruit the trailing hazard starts (pixels)
    pub trap_offset: f32,

    // === Stages ===
    pub max_stage: u32,
    /// Score goal of stage 1
    pub stage_goal_base: u64,
    /// Goal increase per stage
    pub stage_goal_step: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            time_limit_secs: 60.0,
            max_lives: 3,

            initial_spawn_interval_ms: 2500.0,
            spawn_interval_base_ms: 2500.0,
            spawn_interval_per_level_ms: 200.0,
            min_spawn_interval_ms: 500.0,
            fever_spawn_interval_ms: 100.0,

            base_speed: 100.0,
            level_speed_factor: 0.1,
            stage_speed_step: 0.1,
            fever_speed_multiplier: 1.5,
            keyboard_speed_multiplier: 1.2,

            fever_duration_secs: 5.0,
            fever_mid_chance: 0.4,
            fever_high_chance: 0.3,

            hazard_penalty: 500,
            timed_level_threshold: 500,
            lives_level_threshold: 1000,

            timed_fever_chance: 0.1,
            timed_hazard_chance: 0.1,

            lives_fever_chance: 0.05,
            lives_shield_chance: 0.03,
            lives_life_restore_chance: 0.02,
            hazard_chance_base: 0.1,
            hazard_chance_per_stage: 0.02,
            hazard_chance_max: 0.35,

            fruit_high_share: 0.375,
            fruit_mid_share: 0.375,

            trap_chance: 0.15,
            trap_offset: 120.0,

            max_stage: 25,
            stage_goal_base: 2000,
            stage_goal_step: 500,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON (missing fields use defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read and validate a tuning file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Clamp a requested stage into the playable range
    pub fn clamp_stage(&self, stage: u32) -> u32 {
        stage.clamp(1, self.max_stage)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value keeps the simulation well-defined
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("time_limit_secs", self.time_limit_secs),
            ("initial_spawn_interval_ms", self.initial_spawn_interval_ms),
            ("spawn_interval_base_ms", self.spawn_interval_base_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
            ("fever_spawn_interval_ms", self.fever_spawn_interval_ms),
            ("base_speed", self.base_speed),
            ("fever_speed_multiplier", self.fever_speed_multiplier),
            ("keyboard_speed_multiplier", self.keyboard_speed_multiplier),
            ("fever_duration_secs", self.fever_duration_secs),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.max_lives == 0 {
            return Err(ConfigError::NonPositive { field: "max_lives", value: 0.0 });
        }
        if self.max_stage == 0 {
            return Err(ConfigError::NonPositive { field: "max_stage", value: 0.0 });
        }
        if self.min_spawn_interval_ms > self.spawn_interval_base_ms {
            return Err(ConfigError::InvalidRange { field: "spawn_interval" });
        }
        if self.hazard_chance_base > self.hazard_chance_max {
            return Err(ConfigError::InvalidRange { field: "hazard_chance" });
        }

        let probabilities = [
            ("fever_mid_chance", self.fever_mid_chance),
            ("fever_high_chance", self.fever_high_chance),
            ("timed_fever_chance", self.timed_fever_chance),
            ("timed_hazard_chance", self.timed_hazard_chance),
            ("lives_fever_chance", self.lives_fever_chance),
            ("lives_shield_chance", self.lives_shield_chance),
            ("lives_life_restore_chance", self.lives_life_restore_chance),
            ("hazard_chance_base", self.hazard_chance_base),
            ("hazard_chance_per_stage", self.hazard_chance_per_stage),
            ("hazard_chance_max", self.hazard_chance_max),
            ("fruit_high_share", self.fruit_high_share),
            ("fruit_mid_share", self.fruit_mid_share),
            ("trap_chance", self.trap_chance),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { field, value });
            }
        }

        let tables = [
            ("fever", self.fever_mid_chance + self.fever_high_chance),
            ("timed", self.timed_fever_chance + self.timed_hazard_chance),
            (
                "lives",
                self.lives_fever_chance
                    + self.lives_shield_chance
                    + self.lives_life_restore_chance
                    + self.hazard_chance_max,
            ),
            ("fruit split", self.fruit_high_share + self.fruit_mid_share),
        ];
        for (table, total) in tables {
            if total > 1.0 {
                return Err(ConfigError::TableOverflow { table, total });
            }
        }

        Ok(())
    }

    /// Normal-mode spawn interval for a level (floor-clamped)
    pub fn spawn_interval_for_level(&self, level: u32) -> f32 {
        (self.spawn_interval_base_ms - level as f32 * self.spawn_interval_per_level_ms)
            .max(self.min_spawn_interval_ms)
    }

    /// Fall speed scaling for a stage (stage 1 = 1.0)
    pub fn stage_speed_factor(&self, stage: u32) -> f32 {
        1.0 + stage.saturating_sub(1) as f32 * self.stage_speed_step
    }

    /// Hazard probability for a stage in lives-bearing modes
    pub fn hazard_chance_for_stage(&self, stage: u32) -> f32 {
        (self.hazard_chance_base + stage.saturating_sub(1) as f32 * self.hazard_chance_per_stage)
            .min(self.hazard_chance_max)
    }

    /// Score needed to clear a stage
    pub fn stage_goal(&self, stage: u32) -> u64 {
        self.stage_goal_base + u64::from(stage.saturating_sub(1)) * self.stage_goal_step
    }

    /// Score per level before leveling up
    pub fn level_threshold(&self, mode: GameMode) -> u64 {
        if mode.has_lives() {
            self.lives_level_threshold
        } else {
            self.timed_level_threshold
        }
    }
}
