//! Presentation step: world + blend factor -> drawable frame
//!
//! Runs on the render thread while it holds the world lock, so it only
//! copies and interpolates. Anything slow belongs in `Surface::draw`.

use glam::Vec2;

use super::shapes::rect;
use super::vertex::{Vertex, rgba};
use crate::sim::{Entity, SimulationState, interpolate};

/// Text overlay for one frame
#[derive(Debug, Clone, PartialEq)]
pub enum Hud {
    Playing { score: u32 },
    GameOver { final_score: u32 },
}

impl Hud {
    pub fn score_text(&self) -> String {
        match self {
            Hud::Playing { score } => format!("Score: {score}"),
            Hud::GameOver { final_score } => format!("Final Score: {final_score}"),
        }
    }

    /// Lines of the centred overlay, empty while playing
    pub fn overlay_lines(&self) -> Vec<String> {
        match self {
            Hud::Playing { .. } => Vec::new(),
            Hud::GameOver { .. } => vec![
                "GAME OVER!".to_string(),
                self.score_text(),
                "Press R to restart".to_string(),
            ],
        }
    }
}

/// Everything needed to draw one frame, detached from the world
#[derive(Debug, Clone)]
pub struct Frame {
    /// Interpolated entity quads (objects first, player last)
    pub vertices: Vec<Vertex>,
    pub hud: Hud,
    /// Blend factor the frame was built with
    pub alpha: f64,
    pub arena: Vec2,
}

impl Frame {
    /// Number of rectangles in the frame
    pub fn rect_count(&self) -> usize {
        self.vertices.len() / 6
    }
}

fn push_entity(vertices: &mut Vec<Vertex>, entity: &Entity, alpha: f64) {
    let pos = interpolate(&entity.pose, alpha);
    vertices.extend_from_slice(&rect(pos, entity.size, rgba(entity.color)));
}

/// Build a frame at blend factor `alpha`. Never mutates the world.
pub fn present(state: &SimulationState, alpha: f64) -> Frame {
    if state.is_game_over() {
        return Frame {
            vertices: Vec::new(),
            hud: Hud::GameOver {
                final_score: state.score,
            },
            alpha,
            arena: state.arena,
        };
    }

    let mut vertices = Vec::with_capacity((state.objects.len() + 1) * 6);
    for obj in state.objects.values() {
        push_entity(&mut vertices, obj, alpha);
    }
    push_entity(&mut vertices, &state.player, alpha);

    Frame {
        vertices,
        hud: Hud::Playing { score: state.score },
        alpha,
        arena: state.arena,
    }
}
