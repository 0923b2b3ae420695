//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Randomness only through an injected `RandomSource`
//! - Stable iteration order (items kept in creation order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod events;
pub mod progression;
pub mod rng;
pub mod spawner;
pub mod state;
pub mod tick;

pub use autopilot::choose_lane;
pub use collision::{Resolution, advance, has_missed, is_caught, resolve};
pub use events::{Callbacks, GameEvent, StopReason};
pub use progression::{MISSES_PER_LIFE, Progression};
pub use rng::{DrawSequence, RandomSource, SeededRng};
pub use spawner::{Difficulty, ItemTable, Spawner, fall_speed, pick_lane};
pub use state::{
    Basket, FallingItem, GameMode, InputMethod, ItemKind, Lane, Mode, PlayField, Vitals,
};
pub use tick::{Session, SessionConfig, SessionPhase, Snapshot};
