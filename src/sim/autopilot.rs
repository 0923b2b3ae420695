//! Demo/idle player
//!
//! Chases the lowest fruit still reachable and sidesteps hazards about to
//! land in the chosen lane. Used by the headless runner and attract mode.

use super::state::{Basket, FallingItem, ItemKind, Lane, PlayField};
use crate::consts::ITEM_RADIUS;

/// Hazards closer than this above the basket make a lane unsafe
const DANGER_ZONE: f32 = 180.0;

/// Pick the lane the basket should head for
pub fn choose_lane(basket: &Basket, items: &[FallingItem], field: &PlayField) -> Lane {
    let reach = basket.pos.y + basket.width / 2.0 + ITEM_RADIUS;

    // Lowest reachable non-hazard item wins
    let target = items
        .iter()
        .filter(|item| item.kind != ItemKind::Hazard && item.pos.y < reach)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|item| field.lane_at(item.pos.x))
        .unwrap_or(basket.lane);

    let unsafe_lane = |lane: Lane| {
        items.iter().any(|item| {
            item.kind == ItemKind::Hazard
                && field.lane_at(item.pos.x) == lane
                && item.pos.y < reach
                && item.pos.y > basket.pos.y - DANGER_ZONE
        })
    };

    if !unsafe_lane(target) {
        return target;
    }

    // Stay put if possible, otherwise any safe lane
    std::iter::once(basket.lane)
        .chain(Lane::ALL)
        .find(|&lane| !unsafe_lane(lane))
        .unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn item(field: &PlayField, lane: Lane, y: f32, kind: ItemKind) -> FallingItem {
        FallingItem {
            id: 0,
            pos: Vec2::new(field.lane_center(lane), y),
            kind,
            speed: 100.0,
        }
    }

    #[test]
    fn test_chases_lowest_fruit() {
        let field = PlayField::default();
        let basket = Basket::new(&field);
        let items = vec![
            item(&field, Lane::Left, 100.0, ItemKind::FruitHigh),
            item(&field, Lane::Right, 400.0, ItemKind::FruitLow),
        ];
        assert_eq!(choose_lane(&basket, &items, &field), Lane::Right);
    }

    #[test]
    fn test_dodges_imminent_hazard() {
        let field = PlayField::default();
        let basket = Basket::new(&field);
        let items = vec![
            item(&field, Lane::Center, basket.pos.y - 50.0, ItemKind::Hazard),
            item(&field, Lane::Center, 200.0, ItemKind::FruitLow),
        ];
        assert_ne!(choose_lane(&basket, &items, &field), Lane::Center);
    }

    #[test]
    fn test_holds_lane_when_nothing_falls() {
        let field = PlayField::default();
        let mut basket = Basket::new(&field);
        basket.lane = Lane::Left;
        assert_eq!(choose_lane(&basket, &[], &field), Lane::Left);
    }
}
