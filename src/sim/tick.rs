//! Fixed timestep combat tick
//!
//! One tick runs the full update in a fixed order: elapsed-time
//! accumulation, steering and acceleration, position integration,
//! projectile expiry, collision resolution, explosion timers. Nothing
//! suspends mid-tick; the host never re-enters while a tick is in flight.

use std::collections::HashSet;

use log::{debug, info};
use rand::Rng;

use crate::sim::collision::Aabb;
use crate::sim::entity::{EntityId, Faction};
use crate::sim::state::{Phase, RoundState, SimEvent};

/// Recognized input tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Reverse,
    TurnLeft,
    TurnRight,
    Fire,
}

/// The set of currently held keys, updated by key-down/key-up events.
/// Level-triggered: the tick reads it without consuming anything.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
}

impl InputState {
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}

/// Advance the round by one fixed timestep
pub fn tick(state: &mut RoundState, input: &InputState, dt: f32) {
    if state.phase == Phase::GameOver {
        // Round is over; only let pending explosions finish resolving
        state.tick_explosions();
        return;
    }

    state.time_ticks += 1;

    // Elapsed-time accumulation
    state.player.last_fired += dt;
    for ship in &mut state.hostiles {
        ship.last_fired += dt;
    }

    // Steering and acceleration
    accelerate_player(state, input, dt);
    steer_hostiles(state, dt);

    // Position integration for every entity
    let bounds = state.bounds;
    state.player.advance(bounds);
    for shell in &mut state.player.shells {
        shell.advance(bounds);
    }
    for ship in &mut state.hostiles {
        ship.advance(bounds);
        for shell in &mut ship.shells {
            shell.advance(bounds);
        }
    }
    for rock in &mut state.obstacles {
        rock.advance(bounds);
    }

    // Expired projectiles leave before the collision pass
    let mut dropped = state.player.prune_expired_shells();
    for ship in &mut state.hostiles {
        dropped += ship.prune_expired_shells();
    }
    if dropped > 0 {
        debug!("{} shell(s) left the playfield", dropped);
    }

    detect_collisions(state);

    state.tick_explosions();
}

/// Apply the held-keys set to the player ship. Exactly one forward/reverse
/// and one turn adjustment per tick, however long the keys have been held.
fn accelerate_player(state: &mut RoundState, input: &InputState, dt: f32) {
    if !state.is_collidable(state.player.id) {
        return;
    }

    let physics = state.physics;
    let topspeed = state.player.top_speed();
    let speed_delta = physics.acceleration * dt * topspeed;
    let angle_delta = physics.turning * dt * topspeed;

    let ship = &mut state.player;
    let mut speed = ship.speed;
    let mut rotation = 0.0;

    if input.is_held(Key::Forward) && speed < topspeed {
        speed = (speed + speed_delta).min(topspeed);
    }
    if input.is_held(Key::Reverse) && speed > 0.0 {
        speed = (speed - speed_delta).max(0.0);
    }
    if input.is_held(Key::TurnLeft) {
        rotation += angle_delta;
    }
    if input.is_held(Key::TurnRight) {
        rotation -= angle_delta;
    }
    ship.angle += rotation;
    ship.speed = speed;

    if input.is_held(Key::Fire) && state.player.weapon_charged() {
        let shell_id = state.next_entity_id();
        if state.player.fire(shell_id) {
            let ship_id = state.player.id;
            let sfx = state.player.weapon.sfx;
            state.push_event(SimEvent::ShotFired { ship: ship_id, sfx });
        }
    }
}

/// Weighted random steering for hostile ships. Bands over a 1..=100 roll:
/// turn left, turn right, accelerate, decelerate, or idle; a roll of
/// exactly 20 also pulls the trigger.
fn steer_hostiles(state: &mut RoundState, dt: f32) {
    let physics = state.physics;
    for i in 0..state.hostiles.len() {
        if !state.is_collidable(state.hostiles[i].id) {
            continue;
        }
        let roll: u32 = state.rng.random_range(1..=100);

        let ship = &mut state.hostiles[i];
        let topspeed = ship.top_speed();
        let speed_delta = physics.acceleration * dt * topspeed;
        let angle_delta = physics.turning * dt * topspeed;

        if roll < 20 {
            ship.angle += angle_delta;
        } else if roll < 40 {
            ship.angle -= angle_delta;
        } else if roll < 80 {
            if ship.speed < topspeed {
                ship.speed = (ship.speed + speed_delta).min(topspeed);
            }
        } else if roll < 90 && ship.speed > 0.0 {
            ship.speed = (ship.speed - speed_delta).max(0.0);
        }

        if roll == 20 && state.hostiles[i].weapon_charged() {
            let shell_id = state.next_entity_id();
            let ship = &mut state.hostiles[i];
            if ship.fire(shell_id) {
                let ship_id = ship.id;
                let sfx = ship.weapon.sfx;
                state.push_event(SimEvent::ShotFired { ship: ship_id, sfx });
            }
        }
    }
}

/// Pairwise collision detection and resolution.
///
/// First pass: every pair of distinct collidable non-projectile entities;
/// an overlapping pair explodes both parties. Second pass: every surviving
/// collidable against every active shell, skipping same-faction pairs.
/// `RoundState::destroy` is idempotent, so an entity resolved in the pair
/// pass is never re-evaluated here.
fn detect_collisions(state: &mut RoundState) {
    // Pair pass over ships and obstacles
    let snapshot = collidable_boxes(state);
    for i in 0..snapshot.len() {
        for j in (i + 1)..snapshot.len() {
            let (a, abox, _) = snapshot[i];
            let (b, bbox, _) = snapshot[j];
            if !state.is_collidable(a) || !state.is_collidable(b) {
                continue;
            }
            if abox.overlaps(&bbox) {
                info!("collision: entities {} and {}", a, b);
                state.destroy(a);
                state.destroy(b);
            }
        }
    }

    // Projectile pass over the survivors
    let mut shells: Vec<(EntityId, Faction, Aabb)> = Vec::new();
    for shell in &state.player.shells {
        shells.push((shell.id, shell.owner, shell.bounds_box()));
    }
    for ship in &state.hostiles {
        for shell in &ship.shells {
            shells.push((shell.id, shell.owner, shell.bounds_box()));
        }
    }

    let mut consumed: HashSet<EntityId> = HashSet::new();
    for (target, tbox, faction) in collidable_boxes(state) {
        if !state.is_collidable(target) {
            continue;
        }
        for (shell_id, owner, sbox) in &shells {
            if consumed.contains(shell_id) {
                continue;
            }
            // No friendly fire: a shell never harms its own faction
            if faction == Some(*owner) {
                continue;
            }
            if tbox.overlaps(sbox) {
                info!("collision: shell {} struck entity {}", shell_id, target);
                consumed.insert(*shell_id);
                state.destroy(target);
                break;
            }
        }
    }

    if !consumed.is_empty() {
        state.player.shells.retain(|s| !consumed.contains(&s.id));
        for ship in &mut state.hostiles {
            ship.shells.retain(|s| !consumed.contains(&s.id));
        }
    }
}

/// Snapshot of every collidable non-projectile entity: id, box, and
/// faction (None for obstacles, which any shell may strike).
fn collidable_boxes(state: &RoundState) -> Vec<(EntityId, Aabb, Option<Faction>)> {
    let mut boxes = Vec::new();
    if state.is_collidable(state.player.id) {
        boxes.push((state.player.id, state.player.bounds_box(), Some(Faction::Player)));
    }
    for ship in &state.hostiles {
        if state.is_collidable(ship.id) {
            boxes.push((ship.id, ship.bounds_box(), Some(Faction::Hostile)));
        }
    }
    for rock in &state.obstacles {
        if state.is_collidable(rock.id) {
            boxes.push((rock.id, rock.bounds_box(), None));
        }
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::RoundConfig;
    use glam::Vec2;
    use proptest::prelude::*;

    /// A quiet round: no obstacles, hostile parked far away
    fn quiet_round(seed: u64) -> RoundState {
        let mut state = RoundState::new(RoundConfig {
            obstacle_count: 0,
            seed,
            ..Default::default()
        })
        .unwrap();
        state.hostiles[0].pos = Vec2::new(700.0, 500.0);
        state
    }

    fn hold(keys: &[Key]) -> InputState {
        let mut input = InputState::default();
        for &key in keys {
            input.press(key);
        }
        input
    }

    #[test]
    fn test_forward_acceleration_and_clamp() {
        let mut state = quiet_round(1);
        let input = hold(&[Key::Forward]);

        // dt = 1 makes the deltas legible: top 5.0, accel 0.25 -> +1.25/tick
        tick(&mut state, &input, 1.0);
        assert!((state.player.speed - 1.25).abs() < 1e-4);

        for _ in 0..20 {
            tick(&mut state, &input, 1.0);
            assert!(state.player.speed <= state.player.top_speed());
        }
        assert!((state.player.speed - state.player.top_speed()).abs() < 1e-4);
    }

    #[test]
    fn test_reverse_clamps_at_zero() {
        let mut state = quiet_round(1);
        state.player.speed = 1.0;
        let input = hold(&[Key::Reverse]);
        for _ in 0..10 {
            tick(&mut state, &input, 1.0);
            assert!(state.player.speed >= 0.0);
        }
        assert_eq!(state.player.speed, 0.0);
    }

    #[test]
    fn test_turning_applies_once_per_tick() {
        let mut state = quiet_round(1);
        let angle_delta = state.physics.turning * SIM_DT * state.player.top_speed();

        let input = hold(&[Key::TurnLeft]);
        tick(&mut state, &input, SIM_DT);
        assert!((state.player.angle - angle_delta).abs() < 1e-4);

        let input = hold(&[Key::TurnRight]);
        tick(&mut state, &input, SIM_DT);
        assert!(state.player.angle.abs() < 1e-4);
    }

    #[test]
    fn test_held_fire_respects_recharge() {
        let mut state = quiet_round(1);
        let input = hold(&[Key::Fire]);
        // 200 ticks at 60 Hz spans three 1-second recharge windows but
        // not a fourth
        let player_id = state.player.id;
        for _ in 0..200 {
            tick(&mut state, &input, SIM_DT);
        }
        let shots = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SimEvent::ShotFired { ship, .. } if *ship == player_id))
            .count();
        assert_eq!(shots, 3);
    }

    #[test]
    fn test_hostile_steering_is_deterministic() {
        let mut a = quiet_round(99);
        let mut b = quiet_round(99);
        let input = InputState::default();
        for _ in 0..600 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.hostiles.len(), b.hostiles.len());
        if let (Some(ha), Some(hb)) = (a.hostiles.first(), b.hostiles.first()) {
            assert_eq!(ha.pos, hb.pos);
            assert_eq!(ha.angle, hb.angle);
            assert_eq!(ha.shells.len(), hb.shells.len());
        }
        assert_eq!(a.time_ticks, b.time_ticks);
    }

    #[test]
    fn test_ship_pair_collision_resolves_both() {
        let mut state = quiet_round(1);
        state.player.pos = Vec2::new(100.0, 100.0);
        state.hostiles[0].pos = Vec2::new(105.0, 105.0);

        detect_collisions(&mut state);

        assert!(!state.is_collidable(state.player.id));
        assert!(!state.is_collidable(state.hostiles[0].id));
        assert_eq!(state.phase, Phase::GameOver);

        let events = state.drain_events();
        let deaths = events
            .iter()
            .filter(|e| matches!(e, SimEvent::PlayerDestroyed))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_no_double_removal_across_passes() {
        // Hostile overlaps an obstacle AND a player shell in the same tick
        let mut state = RoundState::new(RoundConfig {
            obstacle_count: 1,
            seed: 1,
            ..Default::default()
        })
        .unwrap();
        state.player.pos = Vec2::new(50.0, 50.0);
        let hostile_pos = Vec2::new(400.0, 300.0);
        state.hostiles[0].pos = hostile_pos;
        state.obstacles[0].pos = hostile_pos + Vec2::new(5.0, 5.0);

        state.player.last_fired = state.player.weapon.recharge;
        let shell_id = state.next_entity_id();
        state.player.fire(shell_id);
        state.player.shells[0].pos = hostile_pos;

        let hostile_id = state.hostiles[0].id;
        detect_collisions(&mut state);

        assert!(!state.is_collidable(hostile_id));
        let explosions = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SimEvent::Explosion { entity, .. } if *entity == hostile_id))
            .count();
        assert_eq!(explosions, 1);
    }

    #[test]
    fn test_shell_consumed_on_hit() {
        let mut state = quiet_round(1);
        state.player.pos = Vec2::new(50.0, 50.0);
        state.player.last_fired = state.player.weapon.recharge;
        let shell_id = state.next_entity_id();
        state.player.fire(shell_id);
        state.player.shells[0].pos = state.hostiles[0].pos;

        detect_collisions(&mut state);

        assert!(state.player.shells.is_empty());
        assert!(!state.is_collidable(state.hostiles[0].id));
    }

    #[test]
    fn test_game_over_freezes_the_round() {
        let mut state = quiet_round(1);
        state.player.pos = Vec2::new(100.0, 100.0);
        state.hostiles[0].pos = Vec2::new(105.0, 105.0);

        let input = InputState::default();
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, Phase::GameOver);
        let ticks_then = state.time_ticks;

        // Further ticks only drain explosion timers
        for _ in 0..120 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.time_ticks, ticks_then);
        assert_eq!(state.pending_removals(), 0);
        assert!(state.hostiles.is_empty());
    }

    proptest! {
        /// A player shell never destroys the player ship, wherever their
        /// boxes overlap
        #[test]
        fn prop_friendly_fire_exemption(dx in -4.9f32..4.9, dy in -4.9f32..4.9) {
            let mut state = quiet_round(1);
            state.player.pos = Vec2::new(300.0, 300.0);
            state.player.last_fired = state.player.weapon.recharge;
            let shell_id = state.next_entity_id();
            state.player.fire(shell_id);
            state.player.shells[0].pos = state.player.pos + Vec2::new(dx, dy);

            detect_collisions(&mut state);

            prop_assert!(state.is_collidable(state.player.id));
            prop_assert_eq!(state.player.shells.len(), 1);
        }

        /// Speed stays inside [0, topspeed] under any input sequence
        #[test]
        fn prop_speed_clamp(inputs in proptest::collection::vec(0u8..4, 1..120)) {
            let mut state = quiet_round(1);
            for choice in inputs {
                let keys: &[Key] = match choice {
                    0 => &[Key::Forward],
                    1 => &[Key::Reverse],
                    2 => &[Key::Forward, Key::Reverse],
                    _ => &[],
                };
                let input = hold(keys);
                tick(&mut state, &input, SIM_DT);
                prop_assert!(state.player.speed >= 0.0);
                prop_assert!(state.player.speed <= state.player.top_speed());
            }
        }
    }
}
