//! Item motion and catch/miss detection
//!
//! Items only fall straight down, so a catch is a plain radius test between
//! the basket center and the item.

use serde::{Deserialize, Serialize};

use super::state::{Basket, FallingItem};
use crate::consts::ITEM_RADIUS;

/// What happened to an item this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Still in the air
    Falling,
    /// Overlapped the basket
    Caught,
    /// Fell past the floor
    Missed,
}

/// Move an item down by `speed * dt`
#[inline]
pub fn advance(item: &mut FallingItem, dt: f32) {
    item.pos.y += item.speed * dt;
}

/// True if the item is within pickup range of the basket center
#[inline]
pub fn is_caught(item: &FallingItem, basket: &Basket) -> bool {
    item.pos.distance(basket.pos) < basket.width / 2.0 + ITEM_RADIUS
}

/// True once the item has passed the bottom of the field
#[inline]
pub fn has_missed(item: &FallingItem, field_height: f32) -> bool {
    item.pos.y > field_height
}

/// Classify an item; a catch wins over a floor exit in the same tick
pub fn resolve(item: &FallingItem, basket: &Basket, field_height: f32) -> Resolution {
    if is_caught(item, basket) {
        Resolution::Caught
    } else if has_missed(item, field_height) {
        Resolution::Missed
    } else {
        Resolution::Falling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ItemKind, PlayField};
    use glam::Vec2;

    fn item_at(x: f32, y: f32) -> FallingItem {
        FallingItem {
            id: 0,
            pos: Vec2::new(x, y),
            kind: ItemKind::FruitLow,
            speed: 100.0,
        }
    }

    #[test]
    fn test_advance_moves_down_only() {
        let mut item = item_at(100.0, -50.0);
        advance(&mut item, 0.5);
        assert_eq!(item.pos, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_catch_radius() {
        let basket = Basket::new(&PlayField::new(600.0, 800.0));
        // Pickup range is 40 + 20 = 60 from (300, 700)
        assert!(is_caught(&item_at(300.0, 700.0), &basket));
        assert!(is_caught(&item_at(300.0, 641.0), &basket));
        assert!(!is_caught(&item_at(300.0, 640.0), &basket));
        assert!(!is_caught(&item_at(100.0, 700.0), &basket));
    }

    #[test]
    fn test_miss_only_past_floor() {
        assert!(!has_missed(&item_at(0.0, 800.0), 800.0));
        assert!(has_missed(&item_at(0.0, 800.1), 800.0));
    }

    #[test]
    fn test_catch_beats_miss() {
        let field = PlayField::new(600.0, 100.0);
        let mut basket = Basket::new(&field);
        // Basket hangs just above a very short field floor
        basket.pos.y = 90.0;
        let item = item_at(basket.pos.x, 101.0);
        assert!(has_missed(&item, field.height));
        assert_eq!(resolve(&item, &basket, field.height), Resolution::Caught);
    }

    #[test]
    fn test_falling_when_neither() {
        let field = PlayField::default();
        let basket = Basket::new(&field);
        assert_eq!(resolve(&item_at(100.0, 10.0), &basket, field.height), Resolution::Falling);
        assert_eq!(resolve(&item_at(100.0, 900.0), &basket, field.height), Resolution::Missed);
    }
}
