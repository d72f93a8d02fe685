//! Dodger - avoid the falling blocks
//!
//! Core modules:
//! - `game_loop`: Decoupled fixed-timestep update thread and paced render thread
//! - `sim`: Deterministic simulation (poses, spawning, collisions, scoring)
//! - `renderer`: Interpolated presentation and the draw contract
//! - `perf`: FPS/TPS monitor shared by both loop threads
//! - `timing`: Accumulator, precise sleep and the atomic blend factor
//! - `input` / `audio`: Collaborator boundaries

pub mod audio;
pub mod game;
pub mod game_loop;
pub mod input;
pub mod perf;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod timing;

pub use game::Dodger;
pub use game_loop::{GameLoop, RenderHandler, SharedWorld, ShutdownReport, UpdateHandler};
pub use perf::{PerformanceMonitor, PerformanceSnapshot};
pub use settings::{ConfigError, Settings};

/// Game configuration constants
pub mod consts {
    /// Bounded wait for each loop thread during shutdown
    pub const SHUTDOWN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);
    /// Pause between update-loop measurements
    pub const UPDATE_YIELD: std::time::Duration = std::time::Duration::from_micros(100);

    /// Player defaults
    pub const PLAYER_START_X: f32 = 200.0;
    pub const PLAYER_START_Y: f32 = 350.0;
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    /// Pixels per second
    pub const PLAYER_SPEED: f32 = 300.0;

    /// Falling object defaults
    pub const OBJECT_WIDTH: f32 = 40.0;
    pub const OBJECT_HEIGHT: f32 = 40.0;
    pub const OBJECT_SPEED: f32 = 200.0;

    /// Spawn curve (seconds)
    pub const INITIAL_SPAWN_INTERVAL: f32 = 1.0;
    pub const MIN_SPAWN_INTERVAL: f32 = 0.25;
    /// Interval shrink per simulated second
    pub const DIFFICULTY_INCREASE_RATE: f32 = 0.02;
}
