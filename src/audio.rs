//! Audio boundary
//!
//! Decoding and mixing live behind `AudioSink`. The game only decides what
//! to play and at what volume; the default sink just logs.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// An object left the arena
    Score,
    /// Player was hit
    Collision,
}

/// Playback backend
pub trait AudioSink: Send + 'static {
    fn play(&mut self, effect: SoundEffect, volume: f32);
    fn start_music(&mut self, volume: f32);
    fn stop_music(&mut self);
}

/// Sink that logs what would be played
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("sfx {effect:?} at {volume:.2}");
    }

    fn start_music(&mut self, volume: f32) {
        log::debug!("music start at {volume:.2}");
    }

    fn stop_music(&mut self) {
        log::debug!("music stop");
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    music_playing: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(LogSink))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 0.8,
            music_volume: 0.7,
            muted: false,
            music_playing: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * channel
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective(self.sfx_volume);
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    pub fn start_music(&mut self) {
        if self.music_playing {
            return;
        }
        let vol = self.effective(self.music_volume);
        self.sink.start_music(vol);
        self.music_playing = true;
    }

    pub fn stop_music(&mut self) {
        if self.music_playing {
            self.sink.stop_music();
            self.music_playing = false;
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every call for assertions
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Played {
        Effect(SoundEffect, f32),
        MusicStart(f32),
        MusicStop,
    }

    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink(pub Arc<Mutex<Vec<Played>>>);

    impl AudioSink for RecordingSink {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.lock().unwrap().push(Played::Effect(effect, volume));
        }

        fn start_music(&mut self, volume: f32) {
            self.0.lock().unwrap().push(Played::MusicStart(volume));
        }

        fn stop_music(&mut self) {
            self.0.lock().unwrap().push(Played::MusicStop);
        }
    }

    #[test]
    fn test_volume_scaling() {
        let sink = RecordingSink::default();
        let mut audio = AudioManager::new(Box::new(sink.clone()));
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(2.0);
        audio.play(SoundEffect::Score);
        assert_eq!(
            sink.0.lock().unwrap().as_slice(),
            &[Played::Effect(SoundEffect::Score, 0.5)]
        );
    }

    #[test]
    fn test_muted_skips_effects() {
        let sink = RecordingSink::default();
        let mut audio = AudioManager::new(Box::new(sink.clone()));
        audio.set_muted(true);
        audio.play(SoundEffect::Collision);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_music_start_stop_idempotent() {
        let sink = RecordingSink::default();
        let mut audio = AudioManager::new(Box::new(sink.clone()));
        audio.start_music();
        audio.start_music();
        audio.stop_music();
        audio.stop_music();
        let calls = sink.0.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], Played::MusicStop);
    }
}
