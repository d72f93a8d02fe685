//! World state and round bookkeeping

use std::collections::BTreeMap;

use glam::Vec2;

use super::entity::{Entity, EntityId, player_start};
use super::pose::{self, teleport};
use super::spawner::Spawner;

/// Things that happened during a tick, for audio and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Objects left the arena; carries the new score
    Scored { score: u32 },
    /// The player was hit; the round is over
    Collision { object: EntityId, final_score: u32 },
    /// A new round began
    Restarted,
}

/// Complete simulation state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Arena width and height in pixels
    pub arena: Vec2,
    pub player: Entity,
    /// Live falling objects keyed by id; ids grow in spawn order
    pub objects: BTreeMap<EntityId, Entity>,
    pub score: u32,
    game_over: bool,
    restart_requested: bool,
    pub spawner: Spawner,
    /// Ticks simulated this round
    pub time_ticks: u64,
    next_id: EntityId,
}

impl SimulationState {
    pub fn new(arena: Vec2, seed: u64) -> Self {
        Self {
            arena,
            player: Entity::player(),
            objects: BTreeMap::new(),
            score: 0,
            game_over: false,
            restart_requested: false,
            spawner: Spawner::new(seed),
            time_ticks: 0,
            next_id: 1,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Ends the round. Stays set until `reset_round`.
    pub fn set_game_over(&mut self) {
        self.game_over = true;
    }

    pub fn is_restart_requested(&self) -> bool {
        self.restart_requested
    }

    /// Queue a restart; ignored while a round is in progress
    pub fn request_restart(&mut self) -> bool {
        if self.game_over {
            self.restart_requested = true;
        }
        self.restart_requested
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Insert a spawned object and return its id
    pub fn insert_object(&mut self, entity: Entity) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, entity);
        id
    }

    /// Start-of-tick snapshot for every live entity
    pub fn settle_all(&mut self) {
        pose::settle(&mut self.player.pose);
        for obj in self.objects.values_mut() {
            pose::settle(&mut obj.pose);
        }
    }

    /// Fresh round: player back at start, no objects, zero score
    pub fn reset_round(&mut self) {
        teleport(&mut self.player.pose, player_start());
        self.objects.clear();
        self.score = 0;
        self.game_over = false;
        self.restart_requested = false;
        self.spawner.reset();
        self.time_ticks = 0;
    }
}
