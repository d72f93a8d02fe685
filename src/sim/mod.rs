//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or threading dependencies

pub mod collision;
pub mod entity;
pub mod pose;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Aabb, player_hit};
pub use entity::{ColorTag, Entity, EntityId, EntityKind, Heading};
pub use pose::{Pose, interpolate};
pub use spawner::Spawner;
pub use state::{GameEvent, SimulationState};
pub use tick::{TickInput, tick};
