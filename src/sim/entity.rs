//! Ship, projectile, and obstacle entities
//!
//! Entities share the same kinematic contract: a position, a heading in
//! degrees, and a signed speed magnitude along that heading. Ships and
//! obstacles wrap at the playfield edges; projectiles expire instead.

use glam::Vec2;
use log::debug;
use rand::Rng;

use crate::consts::*;
use crate::heading_vector;
use crate::sim::collision::Aabb;
use crate::sim::data::{
    self, DataResult, Difficulty, ObstacleArchetype, ShipArchetype, WeaponArchetype,
};

pub type EntityId = u32;

/// Which side an entity fights for; governs the friendly-fire exemption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Hostile,
}

/// Advance a position along a heading, wrapping each axis independently at
/// the playfield edges.
fn advance_wrapping(pos: Vec2, angle: f32, speed: f32, bounds: Vec2) -> Vec2 {
    let mut pos = pos + heading_vector(angle) * speed;
    for axis in 0..2 {
        if pos[axis] < WRAP_UNDERSHOOT {
            pos[axis] = bounds[axis];
        } else if pos[axis] > bounds[axis] + WRAP_OVERSHOOT {
            pos[axis] = 0.0;
        }
    }
    pos
}

/// A player or hostile ship
#[derive(Debug, Clone)]
pub struct Ship {
    pub id: EntityId,
    pub faction: Faction,
    pub archetype: &'static ShipArchetype,
    pub weapon: &'static WeaponArchetype,
    pub pos: Vec2,
    /// Heading in degrees, unbounded (0 points along +x)
    pub angle: f32,
    /// Current speed in playfield units per tick
    pub speed: f32,
    /// Current skin; swapped to the destroyed skin on explosion
    pub skin: &'static str,
    /// Seconds since the weapon last fired
    pub last_fired: f32,
    /// Difficulty modifier; 1.0 for the player
    pub modifier: f32,
    /// Set once the ship has exploded; a destroyed ship no longer moves
    pub destroyed: bool,
    /// Projectiles this ship fired and still owns
    pub shells: Vec<Projectile>,
}

impl Ship {
    /// Create the player ship from an archetype key
    pub fn player(id: EntityId, kind: &str, pos: Vec2) -> DataResult<Self> {
        Self::new(id, Faction::Player, data::player_ship(kind)?, 1.0, pos)
    }

    /// Create a hostile ship from an archetype key and difficulty
    pub fn hostile(id: EntityId, kind: &str, difficulty: Difficulty, pos: Vec2) -> DataResult<Self> {
        Self::new(
            id,
            Faction::Hostile,
            data::hostile_ship(kind)?,
            difficulty.modifier(),
            pos,
        )
    }

    fn new(
        id: EntityId,
        faction: Faction,
        archetype: &'static ShipArchetype,
        modifier: f32,
        pos: Vec2,
    ) -> DataResult<Self> {
        let weapon = data::weapon(archetype.weapon)?;
        debug!(
            "loading {:?} ship \"{}\" (stats {:?}, modifier {})",
            faction, archetype.key, archetype.stats, modifier
        );
        Ok(Self {
            id,
            faction,
            archetype,
            weapon,
            pos,
            angle: 0.0,
            speed: 0.0,
            skin: archetype.skin,
            last_fired: 0.0,
            modifier,
            destroyed: false,
            shells: Vec::new(),
        })
    }

    /// Top speed with the difficulty modifier applied
    pub fn top_speed(&self) -> f32 {
        self.archetype.stats.speed * self.modifier
    }

    /// Attack rating with the difficulty modifier applied
    pub fn attack(&self) -> f32 {
        self.archetype.stats.attack * self.modifier
    }

    /// Hull points with the difficulty modifier applied
    pub fn hull(&self) -> f32 {
        self.archetype.stats.hp * self.modifier
    }

    /// Ammunition capacity (unmodified)
    pub fn ammo(&self) -> u32 {
        self.archetype.stats.ammo
    }

    /// Advance one tick along the heading, wrapping at the playfield edges
    pub fn advance(&mut self, bounds: Vec2) {
        if !self.destroyed {
            self.pos = advance_wrapping(self.pos, self.angle, self.speed, bounds);
        }
    }

    /// Whether enough time has passed since the last shot
    pub fn weapon_charged(&self) -> bool {
        self.last_fired >= self.weapon.recharge
    }

    /// Fire the mounted weapon. Silent no-op while the weapon is still
    /// charging; on success the recharge clock resets and the new shell
    /// joins this ship's shell list.
    pub fn fire(&mut self, shell_id: EntityId) -> bool {
        if !self.weapon_charged() {
            debug!("ship {}: weapons are not charged", self.id);
            return false;
        }
        self.last_fired = 0.0;
        self.shells.push(Projectile::new(
            shell_id,
            self.faction,
            self.weapon,
            self.pos,
            self.angle,
        ));
        debug!("ship {}: fired {} (shell {})", self.id, self.weapon.key, shell_id);
        true
    }

    /// Drop shells flagged expired; returns how many were removed
    pub fn prune_expired_shells(&mut self) -> usize {
        let before = self.shells.len();
        self.shells.retain(|shell| !shell.expired);
        before - self.shells.len()
    }

    pub fn bounds_box(&self) -> Aabb {
        Aabb::new(self.pos, SHIP_BOX)
    }
}

/// A fired shell, owned by its ship until it expires or hits something
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: Faction,
    pub skin: &'static str,
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    /// Set when the shell leaves the playfield; pruned the same tick
    pub expired: bool,
}

impl Projectile {
    fn new(
        id: EntityId,
        owner: Faction,
        weapon: &'static WeaponArchetype,
        pos: Vec2,
        angle: f32,
    ) -> Self {
        Self {
            id,
            owner,
            skin: weapon.skin,
            pos,
            angle,
            speed: weapon.speed,
            expired: false,
        }
    }

    /// Advance one tick. Projectiles never wrap: leaving the playfield
    /// flags them expired for removal before the collision pass.
    pub fn advance(&mut self, bounds: Vec2) {
        self.pos += heading_vector(self.angle) * self.speed;
        for axis in 0..2 {
            if self.pos[axis] < EXPIRY_MARGIN || self.pos[axis] > bounds[axis] {
                self.expired = true;
                break;
            }
        }
    }

    pub fn bounds_box(&self) -> Aabb {
        Aabb::new(self.pos, PROJECTILE_BOX)
    }
}

/// A drifting obstacle (asteroid)
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: EntityId,
    pub archetype: &'static ObstacleArchetype,
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub skin: &'static str,
    pub destroyed: bool,
}

impl Obstacle {
    pub fn new(id: EntityId, kind: &str, pos: Vec2) -> DataResult<Self> {
        let archetype = data::obstacle(kind)?;
        Ok(Self {
            id,
            archetype,
            pos,
            angle: 0.0,
            speed: 0.0,
            skin: archetype.skin,
            destroyed: false,
        })
    }

    /// Choose a random heading and drift speed
    pub fn randomize_trajectory<R: Rng>(&mut self, rng: &mut R) {
        self.angle = rng.random_range(-360..=360) as f32;
        self.speed = rng.random_range(1..=5) as f32 / 2.5;
    }

    /// Advance one tick along the heading, wrapping at the playfield edges
    pub fn advance(&mut self, bounds: Vec2) {
        if !self.destroyed {
            self.pos = advance_wrapping(self.pos, self.angle, self.speed, bounds);
        }
    }

    pub fn bounds_box(&self) -> Aabb {
        Aabb::new(self.pos, OBSTACLE_BOX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    fn test_ship() -> Ship {
        Ship::player(1, "basic", Vec2::new(400.0, 300.0)).unwrap()
    }

    #[test]
    fn test_wrap_is_idempotent_at_boundary() {
        // Zero velocity at the exact wrap boundary moves nothing
        let mut ship = test_ship();
        ship.pos = Vec2::new(0.0, BOUNDS.y);
        ship.speed = 0.0;
        ship.advance(BOUNDS);
        assert_eq!(ship.pos, Vec2::new(0.0, BOUNDS.y));
    }

    #[test]
    fn test_wrap_below_undershoot() {
        let mut ship = test_ship();
        ship.pos = Vec2::new(-4.0, 100.0);
        ship.angle = 180.0;
        ship.speed = 3.0;
        ship.advance(BOUNDS);
        assert_eq!(ship.pos.x, BOUNDS.x);
    }

    #[test]
    fn test_wrap_past_far_edge() {
        let mut ship = test_ship();
        ship.pos = Vec2::new(BOUNDS.x + 9.0, 100.0);
        ship.angle = 0.0;
        ship.speed = 3.0;
        ship.advance(BOUNDS);
        assert_eq!(ship.pos.x, 0.0);
    }

    #[test]
    fn test_fire_rate_gating() {
        let mut ship = test_ship();

        // Fresh ship: recharge has not elapsed yet
        assert!(!ship.fire(10));
        assert!(ship.shells.is_empty());

        ship.last_fired = ship.weapon.recharge;
        assert!(ship.fire(10));
        assert_eq!(ship.shells.len(), 1);
        assert_eq!(ship.last_fired, 0.0);

        // Immediately again: still charging
        assert!(!ship.fire(11));
        assert_eq!(ship.shells.len(), 1);

        ship.last_fired = ship.weapon.recharge;
        assert!(ship.fire(11));
        assert_eq!(ship.shells.len(), 2);
    }

    #[test]
    fn test_shell_inherits_heading_and_position() {
        let mut ship = test_ship();
        ship.angle = 42.0;
        ship.last_fired = ship.weapon.recharge;
        assert!(ship.fire(7));

        let shell = &ship.shells[0];
        assert_eq!(shell.pos, ship.pos);
        assert_eq!(shell.angle, 42.0);
        assert_eq!(shell.speed, ship.weapon.speed);
        assert_eq!(shell.owner, Faction::Player);
    }

    #[test]
    fn test_projectile_straight_line_advance() {
        let mut ship = test_ship();
        ship.pos = Vec2::new(100.0, 100.0);
        ship.last_fired = ship.weapon.recharge;
        ship.fire(7);

        let shell = &mut ship.shells[0];
        shell.speed = 5.0;
        shell.angle = 0.0;
        shell.advance(BOUNDS);
        assert!((shell.pos.x - 105.0).abs() < 1e-4);
        assert!((shell.pos.y - 100.0).abs() < 1e-4);
        assert!(!shell.expired);
    }

    #[test]
    fn test_projectile_expires_off_screen() {
        let mut ship = test_ship();
        ship.pos = Vec2::new(BOUNDS.x - 1.0, 100.0);
        ship.angle = 0.0;
        ship.last_fired = ship.weapon.recharge;
        ship.fire(7);

        ship.shells[0].advance(BOUNDS);
        assert!(ship.shells[0].expired);
        assert_eq!(ship.prune_expired_shells(), 1);
        assert!(ship.shells.is_empty());
    }

    #[test]
    fn test_hostile_modifier_scales_stats() {
        let hostile = Ship::hostile(2, "basic", Difficulty::Hard, Vec2::ZERO).unwrap();
        assert_eq!(hostile.top_speed(), 10.0);
        assert_eq!(hostile.attack(), 10.0);

        let easy = Ship::hostile(3, "basic", Difficulty::Easy, Vec2::ZERO).unwrap();
        assert_eq!(easy.top_speed(), 2.5);
    }

    #[test]
    fn test_unknown_archetype_fails_fast() {
        assert!(Ship::player(1, "dreadnought", Vec2::ZERO).is_err());
        assert!(Obstacle::new(1, "comet", Vec2::ZERO).is_err());
    }
}
