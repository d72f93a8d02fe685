//! Fixed timestep accumulator and high-precision pacing
//!
//! The accumulator works in whole nanoseconds (`Duration`) so tick counts are
//! exact: feeding deltas that sum to `T` always yields `floor(T / tick)` ticks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Waits longer than this get a coarse OS sleep before spinning
pub const COARSE_SLEEP_THRESHOLD: Duration = Duration::from_millis(2);
/// Portion of the wait always left to the spin phase
pub const SPIN_MARGIN: Duration = Duration::from_millis(1);

/// Fixed-timestep accumulator with a per-measurement clamp
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick: Duration,
    max_frame_time: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    /// `tick` must be non-zero; `max_frame_time` is the anti spiral-of-death ceiling.
    pub fn new(tick: Duration, max_frame_time: Duration) -> Self {
        debug_assert!(!tick.is_zero(), "tick duration must be non-zero");
        Self {
            tick,
            max_frame_time,
            accumulator: Duration::ZERO,
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Tick duration in seconds, as handed to the simulation
    pub fn tick_secs(&self) -> f32 {
        self.tick.as_secs_f32()
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Add one wall-clock measurement, clamped to the ceiling
    pub fn accumulate(&mut self, elapsed: Duration) {
        self.accumulator += elapsed.min(self.max_frame_time);
    }

    /// Take one tick out of the accumulator if a whole one is available
    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.tick {
            self.accumulator -= self.tick;
            true
        } else {
            false
        }
    }

    /// Fraction of a tick elapsed but not yet simulated
    pub fn alpha(&self) -> f64 {
        self.accumulator.as_secs_f64() / self.tick.as_secs_f64()
    }

    /// Accumulate `elapsed` and run `step` once per whole tick. Returns the tick count.
    pub fn advance(&mut self, elapsed: Duration, mut step: impl FnMut()) -> u32 {
        self.accumulate(elapsed);
        let mut ticks = 0;
        while self.consume_tick() {
            step();
            ticks += 1;
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

/// Sleep until `duration` has passed, trading CPU for precision.
///
/// The bulk of a long wait is a plain `thread::sleep`; the last stretch is a
/// spin that yields the processor each iteration. OS sleeps routinely
/// overshoot by a millisecond or more, which is a visible fraction of a
/// 120 Hz frame; spinning only for the final `SPIN_MARGIN` keeps that cost
/// bounded. Shrink `SPIN_MARGIN` to burn less CPU at the cost of precision.
pub fn precise_sleep(duration: Duration) {
    let deadline = Instant::now() + duration;
    sleep_until(deadline);
}

/// Two-phase wait until `deadline`
pub fn sleep_until(deadline: Instant) {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining > COARSE_SLEEP_THRESHOLD {
        thread::sleep(remaining - SPIN_MARGIN);
    }
    while Instant::now() < deadline {
        thread::yield_now();
    }
}

/// An `f64` that can be shared between threads without a lock.
///
/// Stored as its bit pattern in a single `AtomicU64`, so a load always
/// observes one complete store.
#[derive(Debug, Default)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }
}
