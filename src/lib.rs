//! Fruit Catcher - A three-lane falling-fruit arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, progression)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `highscores`: Leaderboard and stage unlock progress

pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::{ConfigError, Tuning};

use sim::Lane;

/// Play-field geometry constants
pub mod consts {
    /// Default play-field size (pixels)
    pub const DEFAULT_FIELD_WIDTH: f32 = 600.0;
    pub const DEFAULT_FIELD_HEIGHT: f32 = 800.0;

    /// Basket defaults
    pub const BASKET_WIDTH: f32 = 80.0;
    pub const BASKET_HEIGHT: f32 = 80.0;
    /// Basket sits this far above the floor
    pub const BASKET_FLOOR_OFFSET: f32 = 100.0;
    /// Fraction of the remaining distance to the lane center covered per tick
    pub const BASKET_SMOOTHING: f32 = 0.2;

    /// Pickup tolerance added to half the basket width
    pub const ITEM_RADIUS: f32 = 20.0;
    /// Items appear above the visible field
    pub const ITEM_SPAWN_Y: f32 = -50.0;

    /// Number of lanes across the field
    pub const LANE_COUNT: usize = 3;
}

/// Horizontal center of a lane for the given field width
#[inline]
pub fn lane_center_x(field_width: f32, lane: Lane) -> f32 {
    let lane_width = field_width / consts::LANE_COUNT as f32;
    lane_width * (lane.index() as f32 + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_centers() {
        assert_eq!(lane_center_x(600.0, Lane::Left), 100.0);
        assert_eq!(lane_center_x(600.0, Lane::Center), 300.0);
        assert_eq!(lane_center_x(600.0, Lane::Right), 500.0);
    }
}
