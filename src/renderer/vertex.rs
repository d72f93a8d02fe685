//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::ColorTag;

/// Simple 2D vertex with position and color, ready for a GPU vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const ORANGE: [f32; 4] = [1.0, 0.78, 0.0, 1.0];
    pub const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
    pub const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
    pub const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
}

/// RGBA for a simulation colour tag
pub fn rgba(tag: ColorTag) -> [f32; 4] {
    match tag {
        ColorTag::Blue => colors::BLUE,
        ColorTag::Red => colors::RED,
        ColorTag::Orange => colors::ORANGE,
        ColorTag::Yellow => colors::YELLOW,
        ColorTag::Green => colors::GREEN,
        ColorTag::Magenta => colors::MAGENTA,
        ColorTag::Cyan => colors::CYAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let verts = [Vertex::new(1.0, 2.0, colors::RED); 2];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 48);
    }
}
