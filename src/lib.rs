//! Space Skirmish - headless combat core for a 2D arcade space shooter
//!
//! Core modules:
//! - `sim`: Deterministic combat simulation (kinematics, collisions, round state)
//! - `audio`: Reference-counted sound resource manager
//! - `settings`: Data-driven physics and volume configuration
//!
//! The crate owns no window, renderer, or input device. A host drives the
//! simulation at a fixed rate, feeds it a held-keys set, and consumes the
//! events each tick emits (shots, explosions, player death).

pub mod audio;
pub mod settings;
pub mod sim;

pub use audio::{AudioSink, Channel, NullSink, SoundManager};
pub use settings::{PhysicsConfig, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Wrap thresholds: a coordinate below the undershoot wraps to the far
    /// edge; one beyond the edge plus the overshoot wraps back to zero.
    pub const WRAP_UNDERSHOOT: f32 = -5.0;
    pub const WRAP_OVERSHOOT: f32 = 10.0;

    /// Projectiles expire once a coordinate leaves [EXPIRY_MARGIN, edge]
    pub const EXPIRY_MARGIN: f32 = -5.0;

    /// Collision box sizes (position is the bottom-left corner)
    pub const SHIP_BOX: Vec2 = Vec2::new(20.0, 20.0);
    pub const PROJECTILE_BOX: Vec2 = Vec2::new(5.0, 5.0);
    pub const OBSTACLE_BOX: Vec2 = Vec2::new(30.0, 30.0);

    /// Ticks an exploded entity lingers on the field before removal
    pub const EXPLOSION_DELAY_TICKS: u32 = 60;

    /// Obstacles spawned at round start
    pub const OBSTACLE_COUNT: usize = 4;
    /// Minimum per-axis distance between a spawned obstacle and the player
    pub const SPAWN_CLEARANCE: f32 = 100.0;
}

/// Unit displacement for a heading given in degrees
#[inline]
pub fn heading_vector(angle_degrees: f32) -> Vec2 {
    Vec2::from_angle(angle_degrees.to_radians())
}
