//! Interpolation-aware position
//!
//! `previous` is the position at the start of the latest tick; `current` is
//! where the simulation left the entity. Rendering blends the two.

use glam::Vec2;

/// Current and previous position of one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub current: Vec2,
    pub previous: Vec2,
}

impl Pose {
    /// A pose at rest at `pos`
    pub fn at(pos: Vec2) -> Self {
        Self {
            current: pos,
            previous: pos,
        }
    }
}

/// Start-of-tick snapshot: previous = current.
///
/// Only the simulation calls this, before it mutates any position.
#[inline]
pub fn settle(pose: &mut Pose) {
    pose.previous = pose.current;
}

/// Move by `delta`, leaving `previous` untouched
#[inline]
pub fn translate(pose: &mut Pose, delta: Vec2) {
    pose.current += delta;
}

/// Jump to `pos` with no interpolated motion
#[inline]
pub fn teleport(pose: &mut Pose, pos: Vec2) {
    *pose = Pose::at(pos);
}

/// Displayed position at blend factor `alpha`.
///
/// Linear between `previous` (alpha 0) and `current` (alpha 1). Alpha is
/// clamped to [0, 1]. Blending happens in f64 so both endpoints come back
/// exactly and the result is monotonic in alpha.
#[inline]
pub fn interpolate(pose: &Pose, alpha: f64) -> Vec2 {
    let a = alpha.clamp(0.0, 1.0);
    Vec2::new(
        lerp_axis(pose.previous.x, pose.current.x, a),
        lerp_axis(pose.previous.y, pose.current.y, a),
    )
}

#[inline]
fn lerp_axis(from: f32, to: f32, a: f64) -> f32 {
    let from = f64::from(from);
    let to = f64::from(to);
    (from + (to - from) * a) as f32
}
