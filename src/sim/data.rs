//! Static archetype dataset for ships, weapons, and obstacles
//!
//! Lookups are explicit key-to-record mappings with a typed error for
//! unknown keys. Unknown archetypes abort entity creation; they are a
//! configuration mistake, not a runtime condition to paper over.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Base combat stats shared by every ship archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipStats {
    /// Effectiveness at doing damage
    pub attack: f32,
    /// Top speed; also scales acceleration and turning
    pub speed: f32,
    /// Maximum damage the ship can sustain
    pub hp: f32,
    /// Ammunition capacity
    pub ammo: u32,
}

/// A named ship template: skin, stats, and the weapon it mounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipArchetype {
    pub key: &'static str,
    pub skin: &'static str,
    /// Skin swapped in when the ship explodes
    pub destroyed_skin: &'static str,
    /// Sound effect played on explosion
    pub destroyed_sfx: &'static str,
    pub stats: ShipStats,
    /// Key into the weapon table
    pub weapon: &'static str,
}

/// A named weapon template
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponArchetype {
    pub key: &'static str,
    pub skin: &'static str,
    /// Sound effect requested on each successful shot
    pub sfx: &'static str,
    /// Projectile speed, in playfield units per tick
    pub speed: f32,
    /// Seconds the weapon needs between shots
    pub recharge: f32,
}

/// A named obstacle template
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleArchetype {
    pub key: &'static str,
    pub skin: &'static str,
    pub destroyed_skin: &'static str,
    pub destroyed_sfx: &'static str,
}

/// Difficulty setting; its modifier scales hostile stat reads only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Multiplier applied to hostile stats
    pub fn modifier(self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 2.0,
        }
    }
}

/// Lookup failure against the static dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// The key does not name an archetype in the given table
    UnknownArchetype {
        dataset: &'static str,
        key: String,
    },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::UnknownArchetype { dataset, key } => {
                write!(f, "\"{}\" is not an archetype in the {} dataset", key, dataset)
            }
        }
    }
}

impl std::error::Error for DataError {}

/// Convenience alias for dataset lookups
pub type DataResult<T> = Result<T, DataError>;

const PLAYER_SHIPS: [ShipArchetype; 3] = [
    ShipArchetype {
        key: "fast",
        skin: "ship1.png",
        destroyed_skin: "boom.png",
        destroyed_sfx: "explosion.ogg",
        stats: ShipStats { attack: 1.0, speed: 9.0, hp: 3.0, ammo: 50 },
        weapon: "lasers",
    },
    ShipArchetype {
        key: "basic",
        skin: "ship2.png",
        destroyed_skin: "boom.png",
        destroyed_sfx: "explosion.ogg",
        stats: ShipStats { attack: 6.0, speed: 5.0, hp: 5.0, ammo: 75 },
        weapon: "lasers",
    },
    ShipArchetype {
        key: "tank",
        skin: "ship3.png",
        destroyed_skin: "boom.png",
        destroyed_sfx: "explosion.ogg",
        stats: ShipStats { attack: 5.0, speed: 3.0, hp: 8.0, ammo: 100 },
        weapon: "lasers",
    },
];

const HOSTILE_SHIPS: [ShipArchetype; 3] = [
    ShipArchetype {
        key: "fast",
        skin: "hostile1.png",
        destroyed_skin: "boom.png",
        destroyed_sfx: "explosion.ogg",
        stats: ShipStats { attack: 1.0, speed: 9.0, hp: 3.0, ammo: 50 },
        weapon: "lasers",
    },
    ShipArchetype {
        key: "basic",
        skin: "hostile2.png",
        destroyed_skin: "boom.png",
        destroyed_sfx: "explosion.ogg",
        stats: ShipStats { attack: 5.0, speed: 5.0, hp: 5.0, ammo: 75 },
        weapon: "lasers",
    },
    ShipArchetype {
        key: "tank",
        skin: "hostile3.png",
        destroyed_skin: "boom.png",
        destroyed_sfx: "explosion.ogg",
        stats: ShipStats { attack: 7.0, speed: 1.0, hp: 8.0, ammo: 100 },
        weapon: "lasers",
    },
];

const WEAPONS: [WeaponArchetype; 1] = [WeaponArchetype {
    key: "lasers",
    skin: "shot1.png",
    sfx: "laser.ogg",
    speed: 10.0,
    recharge: 1.0,
}];

const OBSTACLES: [ObstacleArchetype; 1] = [ObstacleArchetype {
    key: "lg_asteroid",
    skin: "asteroid.png",
    destroyed_skin: "boom.png",
    destroyed_sfx: "explosion.ogg",
}];

fn find<T>(table: &'static [T], dataset: &'static str, key: &str, table_key: impl Fn(&T) -> &str) -> DataResult<&'static T> {
    table
        .iter()
        .find(|entry| table_key(entry) == key)
        .ok_or_else(|| DataError::UnknownArchetype { dataset, key: key.to_owned() })
}

/// Look up a player ship archetype
pub fn player_ship(key: &str) -> DataResult<&'static ShipArchetype> {
    find(&PLAYER_SHIPS, "player ships", key, |a| a.key)
}

/// Look up a hostile ship archetype
pub fn hostile_ship(key: &str) -> DataResult<&'static ShipArchetype> {
    find(&HOSTILE_SHIPS, "hostile ships", key, |a| a.key)
}

/// Look up a weapon archetype
pub fn weapon(key: &str) -> DataResult<&'static WeaponArchetype> {
    find(&WEAPONS, "weapons", key, |a| a.key)
}

/// Look up an obstacle archetype
pub fn obstacle(key: &str) -> DataResult<&'static ObstacleArchetype> {
    find(&OBSTACLES, "obstacles", key, |a| a.key)
}
