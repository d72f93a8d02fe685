//! Draw contract
//!
//! A `Surface` receives finished frames on the render thread, after the
//! world lock has been released.

use std::time::{Duration, Instant};

use super::frame::Frame;
use crate::perf::PerformanceSnapshot;

/// Anything that can put a frame in front of the player
pub trait Surface: Send + 'static {
    /// Must finish well within one frame period
    fn draw(&mut self, frame: &Frame, perf: PerformanceSnapshot);
}

/// Surface with no display: counts frames and logs the HUD and metrics
#[derive(Debug)]
pub struct HeadlessSurface {
    show_metrics: bool,
    frames: u64,
    last_report: Option<Instant>,
    report_every: Duration,
    last_hud: Option<String>,
}

impl HeadlessSurface {
    pub fn new(show_metrics: bool) -> Self {
        Self {
            show_metrics,
            frames: 0,
            last_report: None,
            report_every: Duration::from_secs(1),
            last_hud: None,
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }
}

impl Surface for HeadlessSurface {
    fn draw(&mut self, frame: &Frame, perf: PerformanceSnapshot) {
        self.frames += 1;

        let hud = frame.hud.score_text();
        if self.last_hud.as_deref() != Some(hud.as_str()) {
            log::debug!("{hud} ({} rects, alpha {:.2})", frame.rect_count(), frame.alpha);
            for line in frame.hud.overlay_lines() {
                log::info!("{line}");
            }
            self.last_hud = Some(hud);
        }

        if !self.show_metrics {
            return;
        }
        let now = Instant::now();
        let due = self
            .last_report
            .is_none_or(|t| now.duration_since(t) >= self.report_every);
        if due {
            log::info!("{perf}");
            self.last_report = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::frame::Hud;
    use glam::Vec2;

    #[test]
    fn test_counts_frames() {
        let mut surface = HeadlessSurface::new(false);
        let frame = Frame {
            vertices: Vec::new(),
            hud: Hud::Playing { score: 3 },
            alpha: 0.5,
            arena: Vec2::new(800.0, 600.0),
        };
        for _ in 0..5 {
            surface.draw(&frame, PerformanceSnapshot::default());
        }
        assert_eq!(surface.frames_drawn(), 5);
    }
}
