//! Falling-object spawn curve
//!
//! The interval shrinks linearly with simulated time down to a floor. All
//! randomness comes from a seeded PCG so a seed reproduces a run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{ColorTag, Entity, OBJECT_PALETTE};
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct Spawner {
    seed: u64,
    rng: Pcg32,
    timer: f32,
    interval: f32,
    game_time: f32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            timer: 0.0,
            interval: INITIAL_SPAWN_INTERVAL,
            game_time: 0.0,
        }
    }

    /// Current seconds between spawns
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Simulated seconds this round
    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    /// Advance by `dt`; returns a new object when one is due
    pub fn update(&mut self, dt: f32, arena_width: f32) -> Option<Entity> {
        self.game_time += dt;
        self.interval = (self.interval - DIFFICULTY_INCREASE_RATE * dt).max(MIN_SPAWN_INTERVAL);

        self.timer += dt;
        if self.timer >= self.interval {
            self.timer = 0.0;
            Some(self.spawn(arena_width))
        } else {
            None
        }
    }

    fn spawn(&mut self, arena_width: f32) -> Entity {
        let max_x = ((arena_width - OBJECT_WIDTH) as u32).max(1);
        let x = self.rng.random_range(0..max_x) as f32;
        let color: ColorTag = OBJECT_PALETTE[self.rng.random_range(0..OBJECT_PALETTE.len())];
        Entity::falling_object(x, color)
    }

    /// Back to the round-start curve, same seed
    pub fn reset(&mut self) {
        *self = Self::new(self.seed);
    }
}
