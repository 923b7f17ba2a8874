//! Space Skirmish entry point
//!
//! Headless demo driver: seeds a combat round, steps it at the fixed
//! simulation rate with a scripted input tape, and routes the events each
//! tick emits to the sound manager the way a UI layer would.

use std::error::Error;
use std::fs;

use log::{info, warn};

use space_skirmish::consts::SIM_DT;
use space_skirmish::sim::{
    InputState, Key, Phase, RoundConfig, RoundState, SimEvent, tick,
};
use space_skirmish::{Channel, Settings, SoundManager};

/// Subscriber tag for tracks held by the round itself (soundtrack)
const ROUND_SUBSCRIBER: u64 = 0;

const COMBAT_MUSIC: &str = "space1.ogg";

/// Longest demo run before giving up on the hostile ever winning
const MAX_TICKS: u64 = 60 * 120;

fn load_settings() -> Settings {
    let Some(path) = std::env::args().nth(1) else {
        return Settings::default();
    };
    match fs::read_to_string(&path).map_err(|e| e.to_string()).and_then(|json| {
        Settings::from_json(&json).map_err(|e| e.to_string())
    }) {
        Ok(settings) => {
            info!("loaded settings from {}", path);
            settings
        }
        Err(err) => {
            warn!("could not load settings from {}: {}; using defaults", path, err);
            Settings::default()
        }
    }
}

/// Scripted stand-in for a keyboard: fly forward, weave, hold the trigger
fn scripted_input(input: &mut InputState, tick_no: u64) {
    input.press(Key::Forward);
    input.press(Key::Fire);
    if (tick_no / 90) % 2 == 0 {
        input.press(Key::TurnLeft);
        input.release(Key::TurnRight);
    } else {
        input.press(Key::TurnRight);
        input.release(Key::TurnLeft);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let settings = load_settings();
    let mut sounds = SoundManager::default();
    sounds.set_sfx_volume(settings.sfx_volume);
    sounds.set_music_volume(settings.music_volume);
    sounds.set_master_volume(settings.master_volume);

    let config = RoundConfig {
        physics: settings.physics,
        seed: 0xFACE,
        ..Default::default()
    };
    let mut round = RoundState::new(config)?;

    // Each combatant subscribes to the tracks it can trigger
    sounds.acquire(Channel::Music, COMBAT_MUSIC, ROUND_SUBSCRIBER);
    sounds.play(Channel::Music, COMBAT_MUSIC);
    for ship in std::iter::once(&round.player).chain(round.hostiles.iter()) {
        sounds.acquire(Channel::Sfx, ship.weapon.sfx, ship.id as u64);
        sounds.acquire(Channel::Sfx, ship.archetype.destroyed_sfx, ship.id as u64);
    }
    for rock in &round.obstacles {
        sounds.acquire(Channel::Sfx, rock.archetype.destroyed_sfx, rock.id as u64);
    }

    let mut input = InputState::default();
    while round.time_ticks < MAX_TICKS {
        scripted_input(&mut input, round.time_ticks);
        tick(&mut round, &input, SIM_DT);

        for event in round.drain_events() {
            match event {
                SimEvent::ShotFired { sfx, .. } => sounds.play(Channel::Sfx, sfx),
                SimEvent::Explosion { sfx, .. } => sounds.play(Channel::Sfx, sfx),
                SimEvent::EntityRemoved { entity } => {
                    sounds.release(Channel::Sfx, "laser.ogg", entity as u64);
                    sounds.release(Channel::Sfx, "explosion.ogg", entity as u64);
                }
                SimEvent::PlayerDestroyed => {
                    // A UI layer would raise its game-over modal here
                    info!("you crashed after {} ticks", round.time_ticks);
                }
            }
        }

        if round.phase == Phase::GameOver && round.pending_removals() == 0 {
            break;
        }
    }

    if round.phase == Phase::Running {
        info!(
            "demo ended after {} ticks with the player still flying ({} hostile(s) left)",
            round.time_ticks,
            round.hostiles.len()
        );
    }

    sounds.release(Channel::Music, COMBAT_MUSIC, ROUND_SUBSCRIBER);
    Ok(())
}
