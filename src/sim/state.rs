//! Game state and core simulation types
//!
//! Everything here is plain data plus small invariant-preserving helpers.
//! Transitions live in `progression`; per-frame orchestration in `tick`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::lane_center_x;

/// Discrete horizontal player position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lane {
    Left,
    #[default]
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::Left, Lane::Center, Lane::Right];

    pub fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Center => 1,
            Lane::Right => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Left => "Left",
            Lane::Center => "Center",
            Lane::Right => "Right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Lane::Left),
            "center" | "centre" => Some(Lane::Center),
            "right" => Some(Lane::Right),
            _ => None,
        }
    }

    /// Neighbor to the left (stays put at the edge)
    pub fn shift_left(self) -> Self {
        Self::from_index(self.index().saturating_sub(1)).unwrap_or(self)
    }

    /// Neighbor to the right (stays put at the edge)
    pub fn shift_right(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(self)
    }
}

/// Falling item types
///
/// Score deltas and effects are fixed per kind, never per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    FruitLow,
    FruitMid,
    FruitHigh,
    /// Costs a life (or score in timed mode) unless shielded
    Hazard,
    /// Starts fever mode
    FeverTrigger,
    /// Absorbs one hazard
    Shield,
    /// Restores one life up to the cap
    LifeRestore,
}

impl ItemKind {
    /// Score awarded on catch (hazard penalties are mode-dependent, see `Tuning`)
    pub const fn score_value(self) -> u64 {
        match self {
            ItemKind::FruitLow => 100,
            ItemKind::FruitMid => 200,
            ItemKind::FruitHigh => 300,
            ItemKind::Hazard
            | ItemKind::FeverTrigger
            | ItemKind::Shield
            | ItemKind::LifeRestore => 0,
        }
    }

    pub const fn is_fruit(self) -> bool {
        matches!(self, ItemKind::FruitLow | ItemKind::FruitMid | ItemKind::FruitHigh)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::FruitLow => "fruit-low",
            ItemKind::FruitMid => "fruit-mid",
            ItemKind::FruitHigh => "fruit-high",
            ItemKind::Hazard => "hazard",
            ItemKind::FeverTrigger => "fever-trigger",
            ItemKind::Shield => "shield",
            ItemKind::LifeRestore => "life-restore",
        }
    }
}

/// A falling item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    /// x is fixed at spawn (a lane center); y grows as the item falls
    pub pos: Vec2,
    pub kind: ItemKind,
    /// Fall speed (pixels/s), fixed at spawn
    pub speed: f32,
}

/// Play-field dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayField {
    fn default() -> Self {
        Self {
            width: DEFAULT_FIELD_WIDTH,
            height: DEFAULT_FIELD_HEIGHT,
        }
    }
}

impl PlayField {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn lane_center(&self, lane: Lane) -> f32 {
        lane_center_x(self.width, lane)
    }

    /// Lane band containing `x`, clamped to the outer lanes
    pub fn lane_at(&self, x: f32) -> Lane {
        let lane_width = self.width / LANE_COUNT as f32;
        let index = (x / lane_width).floor().max(0.0) as usize;
        Lane::from_index(index).unwrap_or(Lane::Right)
    }
}

/// The player's catcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Lane the basket is gliding toward
    pub lane: Lane,
}

impl Basket {
    /// Basket resting in the center lane
    pub fn new(field: &PlayField) -> Self {
        Self {
            pos: Vec2::new(
                field.lane_center(Lane::Center),
                field.height - BASKET_FLOOR_OFFSET,
            ),
            width: BASKET_WIDTH,
            height: BASKET_HEIGHT,
            lane: Lane::Center,
        }
    }

    /// Glide toward the target lane center (exponential smoothing, never teleports)
    pub fn move_toward_lane(&mut self, field: &PlayField) {
        let target_x = field.lane_center(self.lane);
        self.pos.x += (target_x - self.pos.x) * BASKET_SMOOTHING;
        self.pos.y = field.height - BASKET_FLOOR_OFFSET;
    }

    /// Re-anchor to the floor after a field resize
    pub fn fit_to_field(&mut self, field: &PlayField) {
        self.pos.y = field.height - BASKET_FLOOR_OFFSET;
    }
}

/// Session variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Score as much as possible before the clock runs out
    #[default]
    Timed,
    /// Survive on lives with no time limit
    Survival,
    /// Lives-based run with a score goal; difficulty scales with the stage
    Staged { stage: u32 },
}

impl GameMode {
    pub fn has_lives(&self) -> bool {
        !matches!(self, GameMode::Timed)
    }

    /// Difficulty stage (1 outside staged runs)
    pub fn stage(&self) -> u32 {
        match self {
            GameMode::Staged { stage } => (*stage).max(1),
            _ => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Timed => "Timed",
            GameMode::Survival => "Survival",
            GameMode::Staged { .. } => "Staged",
        }
    }

    /// Mode by name; `stage` only applies to staged runs
    pub fn from_name(name: &str, stage: u32) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "timed" => Some(GameMode::Timed),
            "survival" => Some(GameMode::Survival),
            "stage" | "staged" => Some(GameMode::Staged {
                stage: stage.max(1),
            }),
            _ => None,
        }
    }
}

/// How the player feeds lane changes in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMethod {
    /// Pose classification from a webcam
    #[default]
    Camera,
    /// Arrow keys (discrete and easier, so items fall faster)
    Keyboard,
}

impl InputMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMethod::Camera => "camera",
            InputMethod::Keyboard => "keyboard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "camera" | "webcam" => Some(InputMethod::Camera),
            "keyboard" | "keys" => Some(InputMethod::Keyboard),
            _ => None,
        }
    }
}

/// Spawn/scoring sub-mode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Normal,
    /// Bonus round: fruit-only, fast cadence, time-bounded
    Fever { remaining: f32 },
}

impl Mode {
    pub fn is_fever(&self) -> bool {
        matches!(self, Mode::Fever { .. })
    }
}

/// Loss-condition resource: a clock or a life pool, never both
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Vitals {
    Time { remaining: f32 },
    Lives { remaining: u8, max: u8 },
}

impl Vitals {
    pub fn lives(&self) -> Option<u8> {
        match self {
            Vitals::Lives { remaining, .. } => Some(*remaining),
            Vitals::Time { .. } => None,
        }
    }

    pub fn time_remaining(&self) -> Option<f32> {
        match self {
            Vitals::Time { remaining } => Some(*remaining),
            Vitals::Lives { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_shifts_stop_at_edges() {
        assert_eq!(Lane::Left.shift_left(), Lane::Left);
        assert_eq!(Lane::Left.shift_right(), Lane::Center);
        assert_eq!(Lane::Center.shift_right(), Lane::Right);
        assert_eq!(Lane::Right.shift_right(), Lane::Right);
        assert_eq!(Lane::from_str("RIGHT"), Some(Lane::Right));
        assert_eq!(Lane::from_str("up"), None);
    }

    #[test]
    fn test_basket_smooths_toward_lane() {
        let field = PlayField::new(600.0, 800.0);
        let mut basket = Basket::new(&field);
        assert_eq!(basket.pos, Vec2::new(300.0, 700.0));

        basket.lane = Lane::Right;
        basket.move_toward_lane(&field);
        // 20% of the 200px gap
        assert!((basket.pos.x - 340.0).abs() < 1e-4);

        for _ in 0..200 {
            basket.move_toward_lane(&field);
        }
        assert!((basket.pos.x - 500.0).abs() < 0.01);
        assert!(basket.pos.x <= 500.0 + 1e-3, "smoothing must never overshoot");
    }

    #[test]
    fn test_lane_at_maps_back_to_lane() {
        let field = PlayField::new(600.0, 800.0);
        for lane in Lane::ALL {
            assert_eq!(field.lane_at(field.lane_center(lane)), lane);
        }
        assert_eq!(field.lane_at(-10.0), Lane::Left);
        assert_eq!(field.lane_at(650.0), Lane::Right);
    }

    #[test]
    fn test_basket_follows_field_resize() {
        let mut basket = Basket::new(&PlayField::new(600.0, 800.0));
        basket.fit_to_field(&PlayField::new(600.0, 1000.0));
        assert_eq!(basket.pos.y, 900.0);
    }

    #[test]
    fn test_item_kind_constants() {
        assert_eq!(ItemKind::FruitLow.score_value(), 100);
        assert_eq!(ItemKind::FruitMid.score_value(), 200);
        assert_eq!(ItemKind::FruitHigh.score_value(), 300);
        assert!(ItemKind::FruitHigh.is_fruit());
        assert!(!ItemKind::Hazard.is_fruit());
        assert!(!ItemKind::FeverTrigger.is_fruit());
    }

    #[test]
    fn test_game_mode_stage() {
        assert_eq!(GameMode::Timed.stage(), 1);
        assert_eq!(GameMode::Staged { stage: 4 }.stage(), 4);
        assert_eq!(GameMode::Staged { stage: 0 }.stage(), 1);
        assert!(!GameMode::Timed.has_lives());
        assert!(GameMode::Survival.has_lives());
    }

    #[test]
    fn test_game_mode_from_name() {
        assert_eq!(GameMode::from_name("Timed", 0), Some(GameMode::Timed));
        assert_eq!(GameMode::from_name("stage", 0), Some(GameMode::Staged { stage: 1 }));
        assert_eq!(GameMode::from_name("staged", 7), Some(GameMode::Staged { stage: 7 }));
        assert_eq!(GameMode::from_name("arcade", 1), None);
    }

    #[test]
    fn test_vitals_accessors() {
        assert_eq!(Vitals::Time { remaining: 2.5 }.time_remaining(), Some(2.5));
        assert_eq!(Vitals::Lives { remaining: 1, max: 3 }.time_remaining(), None);
        assert_eq!(Vitals::Lives { remaining: 2, max: 3 }.lives(), Some(2));
        assert_eq!(Vitals::Time { remaining: 2.0 }.lives(), None);
    }
}
