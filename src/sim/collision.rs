//! Rectangle overlap tests

use std::collections::BTreeMap;

use glam::Vec2;

use super::entity::{Entity, EntityId, aabb};

/// Axis-aligned rectangle, `min` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Strict overlap; shared edges do not count
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// First object (in spawn order) overlapping the player
pub fn player_hit(player: &Entity, objects: &BTreeMap<EntityId, Entity>) -> Option<EntityId> {
    let bounds = aabb(player);
    objects
        .iter()
        .find(|(_, obj)| bounds.intersects(&aabb(obj)))
        .map(|(id, _)| *id)
}
