//! Dodger entry point
//!
//! Runs a headless session with the autopilot at the controls, then shuts
//! the loop down and reports how it went.

use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

use dodger::audio::AudioManager;
use dodger::input::Autopilot;
use dodger::renderer::HeadlessSurface;
use dodger::{Dodger, Settings};

/// Length of the unattended session
const SESSION_LENGTH: Duration = Duration::from_secs(10);
/// How often the autopilot looks at the world
const AUTOPILOT_PERIOD: Duration = Duration::from_millis(50);

fn load_settings() -> Result<Settings, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading settings from {path}");
            let json = std::fs::read_to_string(&path)?;
            Ok(Settings::from_json(&json)?)
        }
        None => Ok(Settings::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let settings = load_settings()?;
    log::info!(
        "Dodger starting: {} TPS, {} FPS{}",
        settings.target_tps,
        settings.target_fps,
        if settings.uncapped { " (uncapped)" } else { "" }
    );

    let surface = HeadlessSurface::new(settings.show_metrics);
    let mut game = Dodger::new(&settings, surface, AudioManager::default());
    let world = game.world();
    let mut pilot = Autopilot::new(game.input());

    game.start()?;

    let deadline = Instant::now() + SESSION_LENGTH;
    while Instant::now() < deadline {
        world.with(|state| pilot.steer(state));
        thread::sleep(AUTOPILOT_PERIOD);
    }

    let perf = game.performance().snapshot();
    let report = game.stop();
    if report.is_clean() {
        log::info!("Shutdown clean: {:?}", report.exited);
    } else {
        log::warn!(
            "Shutdown incomplete: timed out {:?}, panicked {:?}",
            report.timed_out,
            report.panicked
        );
    }

    let (score, ticks) = world.with(|state| (state.score, state.time_ticks));
    log::info!("Final: score {score} after {ticks} ticks | {perf}");

    Ok(())
}
