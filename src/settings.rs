//! Session settings
//!
//! Fixed for the lifetime of a session; there is no hot reload.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{OBJECT_HEIGHT, OBJECT_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH};

/// Clamp ceiling used when `max_frame_time` is unusable
const DEFAULT_MAX_FRAME_TIME: Duration = Duration::from_millis(250);

/// Reasons a settings value is rejected
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    ZeroRate { name: &'static str },
    #[error("max_frame_time must be finite and at least one tick ({tick:?}), got {value}s")]
    ClampTooSmall { value: f64, tick: Duration },
    #[error("arena {width}x{height} cannot fit a {min_width}x{min_height} entity")]
    ArenaTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
    #[error("{name} must be within 0.0..=1.0, got {value}")]
    VolumeOutOfRange { name: &'static str, value: f32 },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loop timing, arena and audio preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Loop ===
    /// Simulation ticks per second
    pub target_tps: u32,
    /// Render frames per second when capped
    pub target_fps: u32,
    /// Ceiling on one wall-clock measurement, in seconds
    pub max_frame_time: f64,
    /// Render as fast as possible (or as fast as the display presents)
    pub uncapped: bool,
    /// Show live FPS/TPS metrics
    pub show_metrics: bool,

    // === World ===
    pub arena_width: u32,
    pub arena_height: u32,
    /// Spawner RNG seed
    pub seed: u64,

    // === Audio ===
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub music_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_tps: 60,
            target_fps: 120,
            max_frame_time: 0.25,
            uncapped: false,
            show_metrics: true,

            arena_width: 800,
            arena_height: 600,
            seed: 0x5eed,

            master_volume: 0.8,
            sfx_volume: 0.8,
            music_volume: 0.7,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_tps == 0 {
            return Err(ConfigError::ZeroRate { name: "target_tps" });
        }
        if self.target_fps == 0 {
            return Err(ConfigError::ZeroRate { name: "target_fps" });
        }

        let tick = self.tick_duration();
        let usable = matches!(
            Duration::try_from_secs_f64(self.max_frame_time),
            Ok(ceiling) if ceiling >= tick
        );
        if !usable {
            return Err(ConfigError::ClampTooSmall {
                value: self.max_frame_time,
                tick,
            });
        }

        let min_width = PLAYER_WIDTH.max(OBJECT_WIDTH) as u32;
        let min_height = PLAYER_HEIGHT.max(OBJECT_HEIGHT) as u32;
        if self.arena_width < min_width || self.arena_height < min_height {
            return Err(ConfigError::ArenaTooSmall {
                width: self.arena_width,
                height: self.arena_height,
                min_width,
                min_height,
            });
        }

        for (name, value) in [
            ("master_volume", self.master_volume),
            ("sfx_volume", self.sfx_volume),
            ("music_volume", self.music_volume),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::VolumeOutOfRange { name, value });
            }
        }

        Ok(())
    }

    /// Duration of one simulation tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.target_tps.max(1)))
    }

    /// Target duration of one rendered frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.target_fps.max(1)))
    }

    /// Frame-time clamp ceiling.
    ///
    /// A `max_frame_time` that `validate` would reject (not finite, negative,
    /// too large for a `Duration`, or shorter than one tick) falls back to
    /// the default ceiling, widened to one tick if needed.
    pub fn max_frame_duration(&self) -> Duration {
        let tick = self.tick_duration();
        Duration::try_from_secs_f64(self.max_frame_time)
            .ok()
            .filter(|ceiling| *ceiling >= tick)
            .unwrap_or_else(|| DEFAULT_MAX_FRAME_TIME.max(tick))
    }
}
