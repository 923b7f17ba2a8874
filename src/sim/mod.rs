//! Deterministic combat simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, audio, or platform dependencies (side effects surface
//!   as `SimEvent`s for the host to act on)

pub mod collision;
pub mod data;
pub mod entity;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use data::{
    DataError, DataResult, Difficulty, ObstacleArchetype, ShipArchetype, ShipStats,
    WeaponArchetype,
};
pub use entity::{EntityId, Faction, Obstacle, Projectile, Ship};
pub use state::{Phase, RoundConfig, RoundState, SimEvent};
pub use tick::{InputState, Key, tick};
