//! Player and falling-object data
//!
//! One plain aggregate for both kinds; behaviour lives in free functions
//! that match on `EntityKind` where it matters.

use glam::Vec2;

use super::collision::Aabb;
use super::pose::{self, Pose};
use crate::consts::*;

/// Stable identifier of a falling object (monotonic, spawn order)
pub type EntityId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    FallingObject,
}

/// Colour tag, resolved to RGBA by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Blue,
    Red,
    Orange,
    Yellow,
    Green,
    Magenta,
    Cyan,
}

/// Colours a falling object may spawn with
pub const OBJECT_PALETTE: [ColorTag; 6] = [
    ColorTag::Red,
    ColorTag::Orange,
    ColorTag::Yellow,
    ColorTag::Green,
    ColorTag::Magenta,
    ColorTag::Cyan,
];

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub pose: Pose,
    pub size: Vec2,
    /// Pixels per second
    pub speed: f32,
    pub color: ColorTag,
}

impl Entity {
    pub fn player() -> Self {
        Self {
            kind: EntityKind::Player,
            pose: Pose::at(player_start()),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            speed: PLAYER_SPEED,
            color: ColorTag::Blue,
        }
    }

    pub fn falling_object(x: f32, color: ColorTag) -> Self {
        Self {
            kind: EntityKind::FallingObject,
            pose: Pose::at(Vec2::new(x, -OBJECT_HEIGHT)),
            size: Vec2::new(OBJECT_WIDTH, OBJECT_HEIGHT),
            speed: OBJECT_SPEED,
            color,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pose.current
    }
}

pub fn player_start() -> Vec2 {
    Vec2::new(PLAYER_START_X, PLAYER_START_Y)
}

/// Held movement intents for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heading {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Heading {
    /// Unit-free direction; opposite keys cancel
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Move the player along the held heading. Each axis moves at full speed,
/// so diagonals are faster, matching keyboard-held movement.
pub fn move_player(entity: &mut Entity, heading: Heading, dt: f32) {
    debug_assert_eq!(entity.kind, EntityKind::Player);
    let dir = heading.direction();
    if dir != Vec2::ZERO {
        pose::translate(&mut entity.pose, dir * entity.speed * dt);
    }
}

/// Straight-line fall
pub fn fall(entity: &mut Entity, dt: f32) {
    debug_assert_eq!(entity.kind, EntityKind::FallingObject);
    pose::translate(&mut entity.pose, Vec2::new(0.0, entity.speed * dt));
}

/// Clamp inside `[0, arena]`. Does not touch `previous`.
pub fn keep_within_bounds(entity: &mut Entity, arena: Vec2) {
    let max = (arena - entity.size).max(Vec2::ZERO);
    entity.pose.current = entity.pose.current.clamp(Vec2::ZERO, max);
}

/// Entirely below the bottom edge
pub fn is_off_screen(entity: &Entity, arena_height: f32) -> bool {
    entity.pose.current.y > arena_height
}

pub fn aabb(entity: &Entity) -> Aabb {
    Aabb::new(entity.pose.current, entity.size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pose::settle;

    #[test]
    fn test_heading_cancels() {
        let heading = Heading {
            left: true,
            right: true,
            up: true,
            down: false,
        };
        assert_eq!(heading.direction(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_move_player_right() {
        let mut player = Entity::player();
        settle(&mut player.pose);
        move_player(
            &mut player,
            Heading {
                right: true,
                ..Default::default()
            },
            0.5,
        );
        assert_eq!(player.pos(), Vec2::new(PLAYER_START_X + 150.0, PLAYER_START_Y));
        assert_eq!(player.pose.previous, player_start());
    }

    #[test]
    fn test_keep_within_bounds() {
        let arena = Vec2::new(800.0, 600.0);
        let mut player = Entity::player();
        player.pose.current = Vec2::new(-30.0, 590.0);
        keep_within_bounds(&mut player, arena);
        assert_eq!(player.pos(), Vec2::new(0.0, 600.0 - PLAYER_HEIGHT));
    }

    #[test]
    fn test_fall_and_off_screen() {
        let mut obj = Entity::falling_object(100.0, ColorTag::Red);
        assert_eq!(obj.pos().y, -OBJECT_HEIGHT);
        assert!(!is_off_screen(&obj, 600.0));
        fall(&mut obj, 1.0);
        assert_eq!(obj.pos().y, OBJECT_SPEED - OBJECT_HEIGHT);
        obj.pose.current.y = 600.5;
        assert!(is_off_screen(&obj, 600.0));
    }
}
