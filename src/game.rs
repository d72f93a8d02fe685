//! Dodger wiring
//!
//! Binds the simulation, presentation, input and audio to the generic
//! `GameLoop`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Vec2;

use crate::audio::{AudioManager, SoundEffect};
use crate::game_loop::{GameLoop, LoopError, RenderHandler, SharedWorld, ShutdownReport, UpdateHandler};
use crate::input::{self, InputHandler, InputQueue};
use crate::perf::{PerformanceMonitor, PerformanceSnapshot};
use crate::renderer::{Frame, Surface, present};
use crate::settings::Settings;
use crate::sim::{GameEvent, SimulationState, tick};

/// Audio shared by the session (music on start/stop) and the update thread (effects)
pub type SharedAudio = Arc<Mutex<AudioManager>>;

fn audio_lock(audio: &SharedAudio) -> MutexGuard<'_, AudioManager> {
    audio.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Update side: input in, events out
pub struct DodgerUpdate {
    input: InputQueue,
    audio: SharedAudio,
    perf: Arc<PerformanceMonitor>,
}

impl DodgerUpdate {
    pub fn new(input: InputQueue, audio: SharedAudio, perf: Arc<PerformanceMonitor>) -> Self {
        Self { input, audio, perf }
    }
}

impl UpdateHandler<SimulationState> for DodgerUpdate {
    type Output = Vec<GameEvent>;

    fn update(&mut self, world: &mut SimulationState, dt: f32) -> Vec<GameEvent> {
        let input = self.input.drain();
        tick(world, &input, dt)
    }

    fn after_update(&mut self, events: Vec<GameEvent>) {
        if events.is_empty() {
            return;
        }
        let mut audio = audio_lock(&self.audio);
        for event in events {
            match event {
                GameEvent::Scored { score } => {
                    log::trace!("score {score}");
                    audio.play(SoundEffect::Score);
                }
                GameEvent::Collision {
                    object,
                    final_score,
                } => {
                    log::info!("Game over! Hit object {object}, final score {final_score}");
                    audio.play(SoundEffect::Collision);
                    audio.stop_music();
                }
                GameEvent::Restarted => {
                    log::info!("Round restarted");
                    self.input.reset();
                    self.perf.reset();
                    audio.start_music();
                }
            }
        }
    }
}

/// Render side: interpolated frame out to a surface
pub struct DodgerRender {
    surface: Box<dyn Surface>,
}

impl DodgerRender {
    pub fn new(surface: impl Surface) -> Self {
        Self {
            surface: Box::new(surface),
        }
    }
}

impl RenderHandler<SimulationState> for DodgerRender {
    type Frame = Frame;

    fn present(&mut self, world: &SimulationState, alpha: f64) -> Frame {
        present(world, alpha)
    }

    fn draw(&mut self, frame: Frame, perf: PerformanceSnapshot) {
        self.surface.draw(&frame, perf);
    }
}

/// A complete game session
pub struct Dodger {
    game_loop: GameLoop<SimulationState, DodgerUpdate, DodgerRender>,
    input: InputHandler,
    audio: SharedAudio,
}

impl Dodger {
    pub fn new(settings: &Settings, surface: impl Surface, mut audio: AudioManager) -> Self {
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_music_volume(settings.music_volume);

        let arena = Vec2::new(settings.arena_width as f32, settings.arena_height as f32);
        let world = SharedWorld::new(SimulationState::new(arena, settings.seed));
        let perf = Arc::new(PerformanceMonitor::new());
        let (input, queue) = input::channel();

        let audio = Arc::new(Mutex::new(audio));

        let update = DodgerUpdate::new(queue, Arc::clone(&audio), Arc::clone(&perf));
        let render = DodgerRender::new(surface);
        let game_loop = GameLoop::with_monitor(settings, world, update, render, perf);

        Self {
            game_loop,
            input,
            audio,
        }
    }

    /// Handle for feeding key events from any thread
    pub fn input(&self) -> InputHandler {
        self.input.clone()
    }

    pub fn world(&self) -> SharedWorld<SimulationState> {
        self.game_loop.world()
    }

    /// Start the loop and the background music
    pub fn start(&mut self) -> Result<(), LoopError> {
        self.game_loop.start()?;
        let over = self.world().with(|state| state.is_game_over());
        if !over {
            audio_lock(&self.audio).start_music();
        }
        Ok(())
    }

    /// Stop the loop, then the music
    pub fn stop(&mut self) -> ShutdownReport {
        let report = self.game_loop.stop();
        audio_lock(&self.audio).stop_music();
        report
    }

    pub fn is_music_playing(&self) -> bool {
        audio_lock(&self.audio).is_music_playing()
    }

    pub fn is_running(&self) -> bool {
        self.game_loop.is_running()
    }

    pub fn alpha(&self) -> f64 {
        self.game_loop.alpha()
    }

    pub fn performance(&self) -> Arc<PerformanceMonitor> {
        self.game_loop.performance()
    }
}
