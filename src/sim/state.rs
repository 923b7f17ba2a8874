//! Per-round combat state
//!
//! Each combat round owns its own entities, its own collidable-id set, and
//! its own seeded RNG. Nothing here is shared across rounds: dropping the
//! state drops every pending explosion timer with it, so a torn-down round
//! can never fire a stale removal.

use std::collections::HashSet;

use glam::Vec2;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::settings::PhysicsConfig;
use crate::sim::data::{DataResult, Difficulty};
use crate::sim::entity::{EntityId, Obstacle, Ship};

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Combat in progress
    Running,
    /// The player ship was destroyed; the round is over
    GameOver,
}

/// Side effects a tick asks the host to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// A weapon fired; play its sound effect
    ShotFired { ship: EntityId, sfx: &'static str },
    /// An entity exploded: skin already swapped, play the sound now
    Explosion { entity: EntityId, sfx: &'static str },
    /// A previously exploded entity left the field (delay elapsed)
    EntityRemoved { entity: EntityId },
    /// The player ship was destroyed; show the game-over presentation
    PlayerDestroyed,
}

/// Parameters for starting a combat round
#[derive(Debug, Clone)]
pub struct RoundConfig {
    pub bounds: Vec2,
    pub player_kind: String,
    /// One entry per hostile ship to spawn
    pub hostile_kinds: Vec<String>,
    pub difficulty: Difficulty,
    pub obstacle_count: usize,
    pub physics: PhysicsConfig,
    pub seed: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            bounds: Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
            player_kind: "basic".into(),
            hostile_kinds: vec!["basic".into()],
            difficulty: Difficulty::Medium,
            obstacle_count: OBSTACLE_COUNT,
            physics: PhysicsConfig::default(),
            seed: 0,
        }
    }
}

struct ExplosionTimer {
    entity: EntityId,
    ticks_left: u32,
}

/// Complete state of one combat round
pub struct RoundState {
    pub bounds: Vec2,
    pub physics: PhysicsConfig,
    pub phase: Phase,
    pub time_ticks: u64,
    pub player: Ship,
    pub hostiles: Vec<Ship>,
    pub obstacles: Vec<Obstacle>,
    /// Ids still participating in collision passes this round
    collidables: HashSet<EntityId>,
    /// Exploded entities awaiting removal from the field
    explosions: Vec<ExplosionTimer>,
    /// Side effects accumulated since the last drain
    events: Vec<SimEvent>,
    pub(crate) rng: Pcg32,
    next_id: EntityId,
}

impl RoundState {
    /// Start a round: one player ship, the configured hostiles, and a
    /// field of drifting obstacles. Fails fast on unknown archetype keys.
    pub fn new(config: RoundConfig) -> DataResult<Self> {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let mut next_id: EntityId = 1;
        let alloc = |next_id: &mut EntityId| {
            let id = *next_id;
            *next_id += 1;
            id
        };

        let player = Ship::player(
            alloc(&mut next_id),
            &config.player_kind,
            Vec2::new(config.bounds.x * 0.25, config.bounds.y * 0.5),
        )?;

        let mut hostiles = Vec::with_capacity(config.hostile_kinds.len());
        for (slot, kind) in config.hostile_kinds.iter().enumerate() {
            let mut hostile = Ship::hostile(
                alloc(&mut next_id),
                kind,
                config.difficulty,
                Vec2::new(
                    config.bounds.x * 0.75,
                    config.bounds.y * (slot as f32 + 1.0) / (config.hostile_kinds.len() as f32 + 1.0),
                ),
            )?;
            hostile.angle = 180.0;
            hostiles.push(hostile);
        }

        let mut obstacles = Vec::with_capacity(config.obstacle_count);
        for _ in 0..config.obstacle_count {
            let pos = spawn_position(&mut rng, config.bounds, player.pos);
            let mut rock = Obstacle::new(alloc(&mut next_id), "lg_asteroid", pos)?;
            rock.randomize_trajectory(&mut rng);
            obstacles.push(rock);
        }

        let mut collidables = HashSet::new();
        collidables.insert(player.id);
        collidables.extend(hostiles.iter().map(|s| s.id));
        collidables.extend(obstacles.iter().map(|o| o.id));

        info!(
            "round start: player \"{}\", {} hostile(s), {} obstacle(s), seed {}",
            player.archetype.key,
            hostiles.len(),
            obstacles.len(),
            config.seed
        );

        Ok(Self {
            bounds: config.bounds,
            physics: config.physics,
            phase: Phase::Running,
            time_ticks: 0,
            player,
            hostiles,
            obstacles,
            collidables,
            explosions: Vec::new(),
            events: Vec::new(),
            rng,
            next_id,
        })
    }

    /// Allocate a fresh entity id
    pub(crate) fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Whether an entity still participates in collision passes
    pub fn is_collidable(&self, id: EntityId) -> bool {
        self.collidables.contains(&id)
    }

    /// Ids currently in the round's collidable set
    pub fn collidables(&self) -> &HashSet<EntityId> {
        &self.collidables
    }

    /// Exploded entities still waiting out their removal delay
    pub fn pending_removals(&self) -> usize {
        self.explosions.len()
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Resolve a collision hit against an entity: pull it out of the
    /// collidable set, swap its skin, emit the explosion event, and start
    /// the delayed-removal clock. Idempotent; returns false if the entity
    /// was already resolved this tick (or never collidable).
    pub(crate) fn destroy(&mut self, id: EntityId) -> bool {
        if !self.collidables.remove(&id) {
            return false;
        }
        let Some(sfx) = self.swap_destroyed(id) else {
            // Collidable set only ever holds known ids
            return false;
        };
        debug!("entity {} exploded", id);
        self.events.push(SimEvent::Explosion { entity: id, sfx });
        self.explosions.push(ExplosionTimer {
            entity: id,
            ticks_left: EXPLOSION_DELAY_TICKS,
        });
        if id == self.player.id {
            info!("player ship destroyed; round over");
            self.events.push(SimEvent::PlayerDestroyed);
            self.phase = Phase::GameOver;
        }
        true
    }

    /// Swap an entity to its destroyed representation; returns the
    /// explosion sfx to play, or None for an unknown id.
    fn swap_destroyed(&mut self, id: EntityId) -> Option<&'static str> {
        if id == self.player.id {
            self.player.destroyed = true;
            self.player.skin = self.player.archetype.destroyed_skin;
            return Some(self.player.archetype.destroyed_sfx);
        }
        if let Some(ship) = self.hostiles.iter_mut().find(|s| s.id == id) {
            ship.destroyed = true;
            ship.skin = ship.archetype.destroyed_skin;
            return Some(ship.archetype.destroyed_sfx);
        }
        if let Some(rock) = self.obstacles.iter_mut().find(|o| o.id == id) {
            rock.destroyed = true;
            rock.skin = rock.archetype.destroyed_skin;
            return Some(rock.archetype.destroyed_sfx);
        }
        None
    }

    /// Count down explosion timers and purge entities whose delay elapsed.
    /// The player ship is never purged; it stays on the field showing its
    /// destroyed skin while the host presents the game-over state.
    pub(crate) fn tick_explosions(&mut self) {
        let mut elapsed = Vec::new();
        for timer in &mut self.explosions {
            timer.ticks_left -= 1;
            if timer.ticks_left == 0 {
                elapsed.push(timer.entity);
            }
        }
        self.explosions.retain(|t| t.ticks_left > 0);

        for id in elapsed {
            if id != self.player.id {
                // Removing a ship drops the shells it still owns
                self.hostiles.retain(|s| s.id != id);
                self.obstacles.retain(|o| o.id != id);
            }
            debug!("entity {} removed from the field", id);
            self.events.push(SimEvent::EntityRemoved { entity: id });
        }
    }
}

/// Pick an obstacle spawn position clear of the player on both axes.
/// Mirrors the original rejection-sampling: gather candidates, pick one.
fn spawn_position<R: Rng>(rng: &mut R, bounds: Vec2, player_pos: Vec2) -> Vec2 {
    let mut candidates = Vec::new();
    let mut attempts = 0;
    while candidates.len() < 10 && attempts < 1000 {
        attempts += 1;
        let candidate = Vec2::new(
            rng.random_range(1.0..=bounds.x),
            rng.random_range(1.0..=bounds.y),
        );
        if (player_pos.x - candidate.x).abs() < SPAWN_CLEARANCE {
            continue;
        }
        if (player_pos.y - candidate.y).abs() < SPAWN_CLEARANCE {
            continue;
        }
        candidates.push(candidate);
    }
    if candidates.is_empty() {
        // Playfield too small for the clearance rule; spawn anywhere
        warn!("no clear obstacle spawn found; ignoring clearance");
        return Vec2::new(
            rng.random_range(1.0..=bounds.x),
            rng.random_range(1.0..=bounds.y),
        );
    }
    candidates[rng.random_range(0..candidates.len())]
}
