//! Shape generation for 2D primitives

use glam::Vec2;

use super::vertex::Vertex;

/// Two triangles covering the axis-aligned rectangle at `pos` (top-left)
pub fn rect(pos: Vec2, size: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    let min = pos;
    let max = pos + size;
    [
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Axis-aligned bounds of a vertex list, `None` when empty
pub fn bounds(vertices: &[Vertex]) -> Option<(Vec2, Vec2)> {
    let mut iter = vertices.iter().map(|v| Vec2::from(v.position));
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
}
