//! Game settings and tuning
//!
//! Physics modifiers and volume levels, loadable from a JSON file so
//! balance changes need no recompile.

use serde::{Deserialize, Serialize};

/// Physics modifiers that shape every ship's handling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Scales every ship's ability to accelerate
    pub acceleration: f32,
    /// Scales every ship's ability to turn. Higher is faster.
    pub turning: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            acceleration: 0.25,
            turning: 25.0,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub physics: PhysicsConfig,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            master_volume: 1.0,
            sfx_volume: 1.0,
            music_volume: 1.0,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.physics.turning = 40.0;
        settings.sfx_volume = 0.5;

        let json = settings.to_json().unwrap();
        let restored = Settings::from_json(&json).unwrap();
        assert_eq!(restored, settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"master_volume": 0.25}"#).unwrap();
        assert_eq!(settings.master_volume, 0.25);
        assert_eq!(settings.physics, PhysicsConfig::default());
        assert_eq!(settings.sfx_volume, 1.0);
    }
}
