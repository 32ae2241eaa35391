//! Entity spawning
//!
//! Runner entities appear at (a fraction of) the far plane in a uniformly
//! chosen lane. Static obstacles speed up with the world; everything else runs
//! on fixed intervals or per-tick Bernoulli draws.

use glam::Vec3;
use rand::Rng;

use super::state::{
    BurstKind, Collectible, CollectibleKind, LetterPickup, MovingKind, MovingObstacle, Obstacle,
    ObstacleKind, Particle, PowerUp, PowerUpKind, RunnerState, Sprinkle,
};

/// Heights above the ground at which pickups float
const COLLECTIBLE_HEIGHT: f32 = 30.0;
const LETTER_HEIGHT: f32 = 20.0;
const POWER_UP_HEIGHT: f32 = 25.0;

/// Run every spawner for one tick
pub fn run_spawners(state: &mut RunnerState) {
    state.timers.obstacle += 1;
    if state.timers.obstacle as f32 > state.tuning.obstacle_interval(state.world_speed) {
        spawn_obstacle(state);
        state.timers.obstacle = 0;
    }

    state.timers.moving += 1;
    if state.timers.moving > state.tuning.moving_interval_ticks {
        spawn_moving_obstacle(state);
        state.timers.moving = 0;
    }

    state.timers.collectible += 1;
    if state.timers.collectible > state.tuning.collectible_interval_ticks {
        spawn_collectible(state);
        state.timers.collectible = 0;
    }

    state.timers.letter += 1;
    if state.timers.letter > state.tuning.letter_interval_ticks {
        spawn_letter(state);
        state.timers.letter = 0;
    }

    if state.rng.random_bool(state.tuning.power_up_chance) {
        spawn_power_up(state);
    }

    if state.cosmetics
        && !state.first_person
        && state.rng.random_bool(state.tuning.sprinkle_chance)
    {
        spawn_sprinkle(state);
    }
}

/// Horizontal position of a uniformly chosen lane
fn random_lane_x(state: &mut RunnerState) -> f32 {
    let lane = state.rng.random_range(0..state.tuning.lane_count);
    state.tuning.lane_x(lane)
}

pub fn spawn_obstacle(state: &mut RunnerState) {
    let x = random_lane_x(state);
    let kind = ObstacleKind::ALL[state.rng.random_range(0..ObstacleKind::ALL.len())];
    let id = state.next_entity_id();
    let z = state.tuning.view_distance;
    state.obstacles.push(Obstacle {
        id,
        kind,
        pos: Vec3::new(x, 0.0, z),
    });
    log::debug!("Spawned {} at x={x}", kind.name());
}

pub fn spawn_moving_obstacle(state: &mut RunnerState) {
    let kind = MovingKind::ALL[state.rng.random_range(0..MovingKind::ALL.len())];
    let x = random_lane_x(state);
    let id = state.next_entity_id();
    let z = state.tuning.moving_spawn_depth;
    state.moving_obstacles.push(MovingObstacle {
        id,
        kind,
        pos: Vec3::new(x, 0.0, z),
        age_ticks: 0,
    });
    log::debug!("Spawned moving {} at x={x}", kind.name());
}

pub fn spawn_collectible(state: &mut RunnerState) {
    let x = random_lane_x(state);
    let kind = CollectibleKind::ALL[state.rng.random_range(0..CollectibleKind::ALL.len())];
    let id = state.next_entity_id();
    let z = state.tuning.view_distance * 0.9;
    state.collectibles.push(Collectible {
        id,
        kind,
        pos: Vec3::new(x, COLLECTIBLE_HEIGHT, z),
    });
}

/// Spawn a letter the player still needs; nothing spawns once the set is full
pub fn spawn_letter(state: &mut RunnerState) {
    let x = random_lane_x(state);
    let missing = state.letter_set.missing();
    if missing.is_empty() {
        return;
    }
    let letter = missing[state.rng.random_range(0..missing.len())];
    let id = state.next_entity_id();
    let z = state.tuning.view_distance * 0.95;
    state.letters.push(LetterPickup {
        id,
        letter,
        pos: Vec3::new(x, LETTER_HEIGHT, z),
    });
}

pub fn spawn_power_up(state: &mut RunnerState) {
    let x = random_lane_x(state);
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    let id = state.next_entity_id();
    let z = state.tuning.view_distance * 0.85;
    state.power_ups.push(PowerUp {
        id,
        kind,
        pos: Vec3::new(x, POWER_UP_HEIGHT, z),
    });
    log::debug!("Spawned power-up {}", kind.name());
}

/// Drop a sprinkle just behind the player
fn spawn_sprinkle(state: &mut RunnerState) {
    if state.sprinkles.len() >= state.tuning.max_particles {
        return;
    }
    let rng = &mut state.rng;
    let pos = Vec3::new(
        state.player.x + (rng.random::<f32>() - 0.5) * 30.0,
        state.player.jump_height + rng.random::<f32>() * 10.0,
        -20.0,
    );
    let vel = Vec3::new(
        (rng.random::<f32>() - 0.5) * 2.0,
        rng.random::<f32>() * 2.0,
        rng.random::<f32>() * 2.0,
    );
    state.sprinkles.push(Sprinkle {
        pos,
        vel,
        life: state.tuning.sprinkle_life,
    });
}

/// Emit a particle burst at a pickup position
pub fn spawn_burst(state: &mut RunnerState, at: Vec3, kind: BurstKind) {
    if !state.cosmetics {
        return;
    }
    let room = state
        .tuning
        .max_particles
        .saturating_sub(state.particles.len());
    for _ in 0..state.tuning.particle_burst.min(room) {
        let rng = &mut state.rng;
        let vel = Vec3::new(
            (rng.random::<f32>() - 0.5) * 10.0,
            (rng.random::<f32>() - 0.5) * 10.0,
            (rng.random::<f32>() - 0.5) * 5.0,
        );
        state.particles.push(Particle {
            pos: at,
            vel,
            kind,
            life: state.tuning.particle_life,
        });
    }
}
