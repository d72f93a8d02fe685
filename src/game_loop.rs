//! Decoupled update/render loop
//!
//! Two OS threads share one world:
//! - the update thread advances it in fixed ticks from a clamped wall-clock
//!   accumulator and publishes the leftover fraction as the blend factor;
//! - the render thread builds a frame from the world and the blend factor,
//!   hands it to the draw contract and paces itself to the target FPS.
//!
//! Every world access (one tick, or one frame build) holds the single world
//! mutex for the whole step, so a frame never sees a half-applied tick.
//! Slow work (audio, drawing) runs after the lock is released.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::consts::{SHUTDOWN_TIMEOUT, UPDATE_YIELD};
use crate::perf::{PerformanceMonitor, PerformanceSnapshot};
use crate::settings::Settings;
use crate::timing::{AtomicF64, FixedTimestep, sleep_until};

/// Simulation side of the loop
pub trait UpdateHandler<W>: Send + 'static {
    /// Produced under the lock, consumed after it is released
    type Output;

    /// Advance the world by exactly one tick of `dt` seconds. Runs under the world lock.
    fn update(&mut self, world: &mut W, dt: f32) -> Self::Output;

    /// Follow-up work for one tick (audio, logging). Runs without the lock.
    fn after_update(&mut self, _output: Self::Output) {}
}

/// Presentation side of the loop
pub trait RenderHandler<W>: Send + 'static {
    type Frame;

    /// Build a frame from the world at blend factor `alpha`. Runs under the
    /// world lock and must not mutate anything the simulation owns.
    fn present(&mut self, world: &W, alpha: f64) -> Self::Frame;

    /// Put the frame on screen. Runs without the lock.
    fn draw(&mut self, frame: Self::Frame, perf: PerformanceSnapshot);
}

/// The world plus the one mutex that guards it.
///
/// Access is scoped to a closure, so the guard is released on every exit
/// path, panics included.
pub struct SharedWorld<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for SharedWorld<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W> fmt::Debug for SharedWorld<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedWorld").finish_non_exhaustive()
    }
}

impl<W> SharedWorld<W> {
    pub fn new(world: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Read the world under the lock
    pub fn with<T>(&self, f: impl FnOnce(&W) -> T) -> T {
        f(&self.lock())
    }

    /// Mutate the world under the lock
    pub fn with_mut<T>(&self, f: impl FnOnce(&mut W) -> T) -> T {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        lock_or_recover(&self.inner, "world")
    }
}

fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        log::warn!("{what} lock poisoned by a panicked step; continuing with last state");
        let guard = poisoned.into_inner();
        mutex.clear_poison();
        guard
    })
}

/// One of the two loop threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Update,
    Render,
}

impl ContextKind {
    fn thread_name(self) -> &'static str {
        match self {
            ContextKind::Update => "dodger-update",
            ContextKind::Render => "dodger-render",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKind::Update => f.write_str("update"),
            ContextKind::Render => f.write_str("render"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("failed to spawn the {context} thread")]
    Spawn {
        context: ContextKind,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of `GameLoop::stop`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Exited before the deadline
    pub exited: Vec<ContextKind>,
    /// Still running at the deadline; abandoned, not killed
    pub timed_out: Vec<ContextKind>,
    /// Exited by panicking
    pub panicked: Vec<ContextKind>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.timed_out.is_empty() && self.panicked.is_empty()
    }
}

/// Timing inputs for one loop, taken from `Settings`
#[derive(Debug, Clone, Copy)]
struct LoopTiming {
    tick: Duration,
    frame: Duration,
    max_frame_time: Duration,
    uncapped: bool,
}

impl From<&Settings> for LoopTiming {
    fn from(settings: &Settings) -> Self {
        Self {
            tick: settings.tick_duration(),
            frame: settings.frame_duration(),
            max_frame_time: settings.max_frame_duration(),
            uncapped: settings.uncapped,
        }
    }
}

/// Sends the context's kind when dropped, so exit is reported even on panic
struct ExitNotice {
    kind: ContextKind,
    tx: flume::Sender<ContextKind>,
    stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl Drop for ExitNotice {
    fn drop(&mut self) {
        // Unwinding without a stop request means the context died
        if thread::panicking() && !self.stop.load(Ordering::Acquire) {
            log::error!("{} thread exited unexpectedly; loop no longer running", self.kind);
            self.running.store(false, Ordering::Release);
        }
        let _ = self.tx.send(self.kind);
    }
}

/// Threads belonging to one `start()`
struct Session {
    stop: Arc<AtomicBool>,
    handles: Vec<(ContextKind, JoinHandle<()>)>,
    exited: flume::Receiver<ContextKind>,
}

/// Fixed-timestep update thread plus paced render thread over one shared world
pub struct GameLoop<W, U, R> {
    timing: LoopTiming,
    shutdown_timeout: Duration,
    world: SharedWorld<W>,
    update: Arc<Mutex<U>>,
    render: Arc<Mutex<R>>,
    running: Arc<AtomicBool>,
    alpha: Arc<AtomicF64>,
    perf: Arc<PerformanceMonitor>,
    session: Option<Session>,
}

impl<W, U, R> GameLoop<W, U, R>
where
    W: Send + 'static,
    U: UpdateHandler<W>,
    R: RenderHandler<W>,
{
    pub fn new(settings: &Settings, world: SharedWorld<W>, update: U, render: R) -> Self {
        Self::with_monitor(settings, world, update, render, Arc::new(PerformanceMonitor::new()))
    }

    /// Like `new`, recording into an existing monitor
    pub fn with_monitor(
        settings: &Settings,
        world: SharedWorld<W>,
        update: U,
        render: R,
        perf: Arc<PerformanceMonitor>,
    ) -> Self {
        Self {
            timing: LoopTiming::from(settings),
            shutdown_timeout: SHUTDOWN_TIMEOUT,
            world,
            update: Arc::new(Mutex::new(update)),
            render: Arc::new(Mutex::new(render)),
            running: Arc::new(AtomicBool::new(false)),
            alpha: Arc::new(AtomicF64::new(0.0)),
            perf,
            session: None,
        }
    }

    /// Override how long `stop` waits for the threads
    pub fn set_shutdown_timeout(&mut self, timeout: Duration) {
        self.shutdown_timeout = timeout;
    }

    /// Launch both threads. A no-op when already running.
    pub fn start(&mut self) -> Result<(), LoopError> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if self.session.is_some() {
            // A context died on its own; reap what is left before relaunching
            let report = self.stop();
            log::info!("Reaped previous session: {report:?}");
            self.running.store(true, Ordering::Release);
        }

        self.perf.reset();
        self.alpha.store(0.0);

        let stop = Arc::new(AtomicBool::new(false));
        let (tx, exited) = flume::unbounded();
        let mut session = Session {
            stop: Arc::clone(&stop),
            handles: Vec::with_capacity(2),
            exited,
        };

        let update = UpdateContext {
            timing: self.timing,
            world: self.world.clone(),
            handler: Arc::clone(&self.update),
            alpha: Arc::clone(&self.alpha),
            perf: Arc::clone(&self.perf),
            stop: Arc::clone(&stop),
        };
        let render = RenderContext {
            timing: self.timing,
            world: self.world.clone(),
            handler: Arc::clone(&self.render),
            alpha: Arc::clone(&self.alpha),
            perf: Arc::clone(&self.perf),
            stop,
        };

        let notice = |kind| ExitNotice {
            kind,
            tx: tx.clone(),
            stop: Arc::clone(&session.stop),
            running: Arc::clone(&self.running),
        };
        let update_notice = notice(ContextKind::Update);
        let render_notice = notice(ContextKind::Render);

        let spawned = spawn_context(update_notice, move || update.run())
            .map(|h| session.handles.push((ContextKind::Update, h)))
            .and_then(|()| spawn_context(render_notice, move || render.run()))
            .map(|h| session.handles.push((ContextKind::Render, h)));

        self.session = Some(session);
        if let Err(err) = spawned {
            log::error!("{err}");
            self.stop();
            return Err(err);
        }

        log::info!(
            "Game loop started: tick {:?}, frame {:?}{}",
            self.timing.tick,
            self.timing.frame,
            if self.timing.uncapped { " (uncapped)" } else { "" }
        );
        Ok(())
    }

    /// Ask both threads to finish their current step and wait, bounded by
    /// the shutdown timeout. Threads still running at the deadline are
    /// abandoned (detached), not killed.
    pub fn stop(&mut self) -> ShutdownReport {
        self.running.store(false, Ordering::Release);
        let Some(session) = self.session.take() else {
            return ShutdownReport::default();
        };
        session.stop.store(true, Ordering::Release);

        let mut pending: Vec<ContextKind> = session.handles.iter().map(|(k, _)| *k).collect();
        let deadline = Instant::now() + self.shutdown_timeout;
        while !pending.is_empty() {
            match session.exited.recv_deadline(deadline) {
                Ok(kind) => pending.retain(|k| *k != kind),
                // Timed out, or every sender is gone (all threads finished)
                Err(_) => break,
            }
        }

        let mut report = ShutdownReport::default();
        for (kind, handle) in session.handles {
            if pending.contains(&kind) && !handle.is_finished() {
                log::warn!(
                    "{kind} thread did not exit within {:?}; abandoning it",
                    self.shutdown_timeout
                );
                report.timed_out.push(kind);
                continue;
            }
            match handle.join() {
                Ok(()) => report.exited.push(kind),
                Err(_) => {
                    log::error!("{kind} thread panicked");
                    report.panicked.push(kind);
                }
            }
        }

        log::info!("Game loop stopped ({})", self.perf.snapshot());
        report
    }

    /// Whether the loop is active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Latest blend factor; advisory, for rendering only
    pub fn alpha(&self) -> f64 {
        self.alpha.load()
    }

    pub fn performance(&self) -> Arc<PerformanceMonitor> {
        Arc::clone(&self.perf)
    }

    pub fn world(&self) -> SharedWorld<W> {
        self.world.clone()
    }
}

impl<W, U, R> Drop for GameLoop<W, U, R> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            // Best effort: signal and give the threads the usual grace period
            session.stop.store(true, Ordering::Release);
            self.running.store(false, Ordering::Release);
            let deadline = Instant::now() + self.shutdown_timeout;
            for _ in 0..session.handles.len() {
                if session.exited.recv_deadline(deadline).is_err() {
                    log::warn!("Game loop dropped with threads still running");
                    break;
                }
            }
        }
    }
}

fn spawn_context(
    notice: ExitNotice,
    body: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>, LoopError> {
    let kind = notice.kind;
    thread::Builder::new()
        .name(kind.thread_name().to_string())
        .spawn(move || {
            let _notice = notice;
            log::debug!("{kind} thread running");
            body();
            log::debug!("{kind} thread exiting");
        })
        .map_err(|source| LoopError::Spawn {
            context: kind,
            source,
        })
}

struct UpdateContext<W, U> {
    timing: LoopTiming,
    world: SharedWorld<W>,
    handler: Arc<Mutex<U>>,
    alpha: Arc<AtomicF64>,
    perf: Arc<PerformanceMonitor>,
    stop: Arc<AtomicBool>,
}

impl<W, U: UpdateHandler<W>> UpdateContext<W, U> {
    fn run(self) {
        let mut handler = lock_or_recover(&self.handler, "update handler");
        let mut step = FixedTimestep::new(self.timing.tick, self.timing.max_frame_time);
        let dt = step.tick_secs();
        let mut last = Instant::now();

        while !self.stop.load(Ordering::Acquire) {
            let now = Instant::now();
            step.accumulate(now - last);
            last = now;

            while step.consume_tick() {
                let output = self.world.with_mut(|world| handler.update(world, dt));
                handler.after_update(output);
                self.perf.record_tick();
            }

            self.alpha.store(step.alpha());
            thread::sleep(UPDATE_YIELD);
        }
    }
}

struct RenderContext<W, R> {
    timing: LoopTiming,
    world: SharedWorld<W>,
    handler: Arc<Mutex<R>>,
    alpha: Arc<AtomicF64>,
    perf: Arc<PerformanceMonitor>,
    stop: Arc<AtomicBool>,
}

impl<W, R: RenderHandler<W>> RenderContext<W, R> {
    fn run(self) {
        let mut handler = lock_or_recover(&self.handler, "render handler");

        while !self.stop.load(Ordering::Acquire) {
            let frame_start = Instant::now();

            let alpha = self.alpha.load();
            let frame = self.world.with(|world| handler.present(world, alpha));
            handler.draw(frame, self.perf.snapshot());
            self.perf.record_frame();

            if !self.timing.uncapped {
                sleep_until(frame_start + self.timing.frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Two counters that a tick bumps one after the other
    #[derive(Debug, Default)]
    struct Pair {
        a: u64,
        b: u64,
    }

    struct PairUpdate;

    impl UpdateHandler<Pair> for PairUpdate {
        type Output = ();

        fn update(&mut self, world: &mut Pair, _dt: f32) {
            world.a += 1;
            // Widen the window in which a torn read could be observed
            std::hint::black_box(&world.a);
            thread::yield_now();
            world.b += 1;
        }
    }

    struct PairRender {
        frames: Arc<AtomicUsize>,
        torn: Arc<AtomicUsize>,
        draw_delay: Duration,
    }

    impl RenderHandler<Pair> for PairRender {
        type Frame = (u64, u64, f64);

        fn present(&mut self, world: &Pair, alpha: f64) -> Self::Frame {
            (world.a, world.b, alpha)
        }

        fn draw(&mut self, (a, b, alpha): Self::Frame, _perf: PerformanceSnapshot) {
            if a != b || !(0.0..=1.0).contains(&alpha) {
                self.torn.fetch_add(1, Ordering::Relaxed);
            }
            self.frames.fetch_add(1, Ordering::Relaxed);
            if !self.draw_delay.is_zero() {
                thread::sleep(self.draw_delay);
            }
        }
    }

    fn pair_loop(
        settings: &Settings,
        draw_delay: Duration,
    ) -> (GameLoop<Pair, PairUpdate, PairRender>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let frames = Arc::new(AtomicUsize::new(0));
        let torn = Arc::new(AtomicUsize::new(0));
        let render = PairRender {
            frames: Arc::clone(&frames),
            torn: Arc::clone(&torn),
            draw_delay,
        };
        let game_loop = GameLoop::new(settings, SharedWorld::new(Pair::default()), PairUpdate, render);
        (game_loop, frames, torn)
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let (mut game_loop, frames, _) = pair_loop(&Settings::default(), Duration::ZERO);
        assert!(!game_loop.is_running());

        game_loop.start().unwrap();
        assert!(game_loop.is_running());
        // Second start is a no-op
        game_loop.start().unwrap();

        thread::sleep(Duration::from_millis(150));
        let report = game_loop.stop();

        assert!(!game_loop.is_running());
        assert!(report.is_clean(), "{report:?}");
        assert_eq!(report.exited.len(), 2);
        assert!(frames.load(Ordering::Relaxed) > 0);
        assert!(game_loop.world().with(|w| w.a) > 0);
    }

    #[test]
    fn test_stop_when_idle_is_clean() {
        let (mut game_loop, _, _) = pair_loop(&Settings::default(), Duration::ZERO);
        let report = game_loop.stop();
        assert_eq!(report, ShutdownReport::default());
    }

    #[test]
    fn test_render_never_sees_partial_tick() {
        let settings = Settings {
            target_tps: 1000,
            uncapped: true,
            ..Default::default()
        };
        let (mut game_loop, frames, torn) = pair_loop(&settings, Duration::ZERO);
        game_loop.start().unwrap();
        thread::sleep(Duration::from_millis(300));
        game_loop.stop();

        assert!(frames.load(Ordering::Relaxed) > 10);
        assert_eq!(torn.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_alpha_stays_in_unit_range() {
        let (mut game_loop, _, _) = pair_loop(&Settings::default(), Duration::ZERO);
        game_loop.start().unwrap();
        for _ in 0..50 {
            let alpha = game_loop.alpha();
            assert!((0.0..1.0).contains(&alpha), "alpha {alpha}");
            thread::sleep(Duration::from_millis(2));
        }
        game_loop.stop();
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut game_loop, _, _) = pair_loop(&Settings::default(), Duration::ZERO);
        game_loop.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(game_loop.stop().is_clean());

        let ticks_before = game_loop.world().with(|w| w.a);
        game_loop.start().unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(game_loop.stop().is_clean());
        assert!(game_loop.world().with(|w| w.a) > ticks_before);
    }

    #[test]
    fn test_stuck_render_is_abandoned() {
        let (mut game_loop, frames, _) = pair_loop(&Settings::default(), Duration::from_secs(2));
        game_loop.set_shutdown_timeout(Duration::from_millis(100));
        game_loop.start().unwrap();
        // Wait until the render thread is inside its slow draw
        while frames.load(Ordering::Relaxed) == 0 {
            thread::sleep(Duration::from_millis(1));
        }

        let started = Instant::now();
        let report = game_loop.stop();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(report.timed_out, vec![ContextKind::Render]);
        assert_eq!(report.exited, vec![ContextKind::Update]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_unvalidated_clamp_still_ticks() {
        for max_frame_time in [f64::INFINITY, 0.0] {
            let settings = Settings {
                max_frame_time,
                ..Default::default()
            };
            let (mut game_loop, _, _) = pair_loop(&settings, Duration::ZERO);
            game_loop.start().unwrap();
            thread::sleep(Duration::from_millis(100));
            assert!(game_loop.stop().is_clean());
            assert!(game_loop.world().with(|w| w.a) > 0, "{max_frame_time}");
        }
    }

    /// Panics on its third tick, then behaves
    struct FaultyUpdate {
        ticks: u32,
    }

    impl UpdateHandler<Pair> for FaultyUpdate {
        type Output = ();

        fn update(&mut self, world: &mut Pair, _dt: f32) {
            self.ticks += 1;
            world.a += 1;
            if self.ticks == 3 {
                panic!("tick failed");
            }
            world.b += 1;
        }
    }

    fn faulty_loop() -> GameLoop<Pair, FaultyUpdate, PairRender> {
        let render = PairRender {
            frames: Arc::new(AtomicUsize::new(0)),
            torn: Arc::new(AtomicUsize::new(0)),
            draw_delay: Duration::ZERO,
        };
        GameLoop::new(
            &Settings::default(),
            SharedWorld::new(Pair::default()),
            FaultyUpdate { ticks: 0 },
            render,
        )
    }

    #[test]
    fn test_panicking_update_is_reported() {
        let mut game_loop = faulty_loop();
        game_loop.start().unwrap();
        thread::sleep(Duration::from_millis(300));

        // Update died; the render thread has since recovered the world lock
        assert!(!game_loop.is_running());
        assert!(!game_loop.world().inner.is_poisoned());

        let report = game_loop.stop();
        assert_eq!(report.panicked, vec![ContextKind::Update]);
        assert_eq!(report.exited, vec![ContextKind::Render]);
        assert!(report.timed_out.is_empty());
    }

    #[test]
    fn test_start_after_panic_relaunches() {
        let mut game_loop = faulty_loop();
        game_loop.start().unwrap();
        thread::sleep(Duration::from_millis(200));
        assert!(!game_loop.is_running());

        let ticks_before = game_loop.world().with(|w| w.a);
        game_loop.start().unwrap();
        assert!(game_loop.is_running());
        thread::sleep(Duration::from_millis(150));
        let report = game_loop.stop();

        assert!(report.is_clean(), "{report:?}");
        assert!(game_loop.world().with(|w| w.a) > ticks_before);
        assert!(!game_loop.update.is_poisoned());
    }
}
