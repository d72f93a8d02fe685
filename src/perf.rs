//! Rolling FPS/TPS counters
//!
//! Both loop contexts record into the same monitor. Counters, averages and
//! the rollover instant share one mutex so whichever context crosses a
//! one-second boundary performs the whole rollover as a single unit.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Length of one sampling window
pub const ROLLOVER_INTERVAL: Duration = Duration::from_secs(1);

/// Latest published metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceSnapshot {
    pub fps: u32,
    pub tps: u32,
    pub avg_fps: f64,
    pub avg_tps: f64,
    pub samples: u32,
}

impl fmt::Display for PerformanceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FPS: {} | TPS: {} | Avg FPS: {:.1} | Avg TPS: {:.1}",
            self.fps, self.tps, self.avg_fps, self.avg_tps
        )
    }
}

#[derive(Debug)]
struct Counters {
    frames: u32,
    ticks: u32,
    last_rollover: Instant,
    snapshot: PerformanceSnapshot,
}

impl Counters {
    fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            ticks: 0,
            last_rollover: now,
            snapshot: PerformanceSnapshot::default(),
        }
    }

    fn roll_if_due(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_rollover) < ROLLOVER_INTERVAL {
            return;
        }

        let s = &mut self.snapshot;
        s.fps = self.frames;
        s.tps = self.ticks;
        s.samples += 1;
        let n = f64::from(s.samples);
        s.avg_fps = (s.avg_fps * (n - 1.0) + f64::from(s.fps)) / n;
        s.avg_tps = (s.avg_tps * (n - 1.0) + f64::from(s.tps)) / n;

        self.frames = 0;
        self.ticks = 0;
        self.last_rollover = now;
    }
}

/// Thread-safe throughput monitor
#[derive(Debug)]
pub struct PerformanceMonitor {
    inner: Mutex<Counters>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters::new(Instant::now())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        // Counters stay consistent even if a recorder panicked mid-update
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one simulation tick
    pub fn record_tick(&self) {
        self.record_tick_at(Instant::now());
    }

    /// Count one rendered frame
    pub fn record_frame(&self) {
        self.record_frame_at(Instant::now());
    }

    pub(crate) fn record_tick_at(&self, now: Instant) {
        let mut counters = self.lock();
        counters.ticks += 1;
        counters.roll_if_due(now);
    }

    pub(crate) fn record_frame_at(&self, now: Instant) {
        let mut counters = self.lock();
        counters.frames += 1;
        counters.roll_if_due(now);
    }

    /// Zero everything and start a fresh window
    pub fn reset(&self) {
        self.reset_at(Instant::now());
    }

    pub(crate) fn reset_at(&self, now: Instant) {
        *self.lock() = Counters::new(now);
    }

    pub fn snapshot(&self) -> PerformanceSnapshot {
        self.lock().snapshot
    }

    pub fn fps(&self) -> u32 {
        self.snapshot().fps
    }

    pub fn tps(&self) -> u32 {
        self.snapshot().tps
    }

    pub fn average_fps(&self) -> f64 {
        self.snapshot().avg_fps
    }

    pub fn average_tps(&self) -> f64 {
        self.snapshot().avg_tps
    }
}
