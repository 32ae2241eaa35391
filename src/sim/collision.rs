//! Collision judgment for the runner
//!
//! An entity is judged only while its depth lies inside the hit band around
//! the player's plane. Inside the band a contact is declared when the
//! horizontal distance drops below the category's threshold.

use glam::Vec3;

use super::spawn::spawn_burst;
use super::state::{
    Avoidance, BurstKind, Collectible, GameOverReason, Obstacle, Player, PlayerMotion,
    PowerUpKind, RunnerEvent, RunnerPhase, RunnerState,
};
use crate::progression::Currency;

/// True when a depth has reached the player's plane this frame
#[inline]
pub fn in_hit_band(z: f32, band: f32) -> bool {
    z < band && z > -band
}

/// Band test plus horizontal proximity
#[inline]
pub fn touches(pos: Vec3, player_x: f32, band: f32, distance: f32) -> bool {
    in_hit_band(pos.z, band) && (pos.x - player_x).abs() < distance
}

/// Whether the player's current motion bypasses an obstacle
pub fn avoids(avoidance: Avoidance, motion: PlayerMotion) -> bool {
    matches!(
        (avoidance, motion),
        (Avoidance::Jump, PlayerMotion::Jumping) | (Avoidance::Roll, PlayerMotion::Rolling)
    )
}

/// Whether touching this obstacle ends the run
pub fn obstacle_is_fatal(obstacle: &Obstacle, player: &Player) -> bool {
    !player.invulnerable && !avoids(obstacle.kind.avoidance(), player.motion)
}

/// Judge every list against the player for one tick
pub fn judge(state: &mut RunnerState) {
    if let Some(reason) = find_fatal_contact(state) {
        end_run(state, reason);
        return;
    }

    collect_pickups(state);
    collect_letters(state);
    collect_power_ups(state);
}

fn find_fatal_contact(state: &RunnerState) -> Option<GameOverReason> {
    let t = &state.tuning;
    let player = &state.player;

    let hit_static = state.obstacles.iter().find(|o| {
        touches(o.pos, player.x, t.hit_band, t.obstacle_hit_distance)
            && obstacle_is_fatal(o, player)
    });
    if let Some(o) = hit_static {
        return Some(GameOverReason::Obstacle(o.kind));
    }

    if player.invulnerable {
        return None;
    }
    state
        .moving_obstacles
        .iter()
        .find(|m| touches(m.pos, player.x, t.hit_band, t.moving_hit_distance))
        .map(|m| GameOverReason::Moving(m.kind))
}

fn end_run(state: &mut RunnerState, reason: GameOverReason) {
    state.phase = RunnerPhase::GameOver;
    state.game_over = Some(reason);
    state.events.push(RunnerEvent::GameOver { reason });
    log::info!(
        "Game over: {reason} (score {}, distance {:.0})",
        state.score,
        state.distance
    );
}

/// Take the entries of a list that satisfy `hit`, leaving the rest in place
fn take_where<T>(list: &mut Vec<T>, mut hit: impl FnMut(&T) -> bool) -> Vec<T> {
    let (taken, kept): (Vec<T>, Vec<T>) = std::mem::take(list).into_iter().partition(|e| hit(e));
    *list = kept;
    taken
}

fn collect_pickups(state: &mut RunnerState) {
    let (x, band, reach) = (
        state.player.x,
        state.tuning.hit_band,
        state.tuning.pickup_distance,
    );
    let taken = take_where(&mut state.collectibles, |c| touches(c.pos, x, band, reach));
    for c in taken {
        state.score += c.kind.points();
        credit(state, &c);
        state.events.push(RunnerEvent::Collected { kind: c.kind });
    }
}

fn collect_letters(state: &mut RunnerState) {
    let (x, band, reach) = (
        state.player.x,
        state.tuning.hit_band,
        state.tuning.pickup_distance,
    );
    let taken = take_where(&mut state.letters, |l| touches(l.pos, x, band, reach));
    for pickup in taken {
        state.score += state.tuning.letter_points;
        let fresh = state.letter_set.insert(pickup.letter);
        state.events.push(RunnerEvent::LetterCollected {
            letter: pickup.letter,
            fresh,
        });
        spawn_burst(state, pickup.pos, BurstKind::Letter);

        if state.letter_set.is_complete() {
            let bonus = state.tuning.letter_set_bonus;
            for currency in Currency::ALL {
                state.player.wallet.add(currency, bonus);
            }
            state.letter_set.clear();
            state.letter_sets_completed += 1;
            state.events.push(RunnerEvent::LetterSetComplete);
            log::info!("Letter set complete (+{bonus} of each currency)");
        }
    }
}

fn collect_power_ups(state: &mut RunnerState) {
    let (x, band, reach) = (
        state.player.x,
        state.tuning.hit_band,
        state.tuning.pickup_distance,
    );
    let taken = take_where(&mut state.power_ups, |p| touches(p.pos, x, band, reach));
    for power_up in taken {
        state.player.activate_power_up(power_up.kind, &state.tuning);
        state.events.push(RunnerEvent::PowerUp {
            kind: power_up.kind,
        });
        if power_up.kind == PowerUpKind::IcingGun {
            icing_gun_sweep(state);
        }
        spawn_burst(state, power_up.pos, BurstKind::PowerUp);
    }
}

/// Credit and remove every collectible inside the extended depth band
pub fn icing_gun_sweep(state: &mut RunnerState) {
    let (near, far) = (-state.tuning.hit_band, state.tuning.icing_gun_depth);
    let swept = take_where(&mut state.collectibles, |c| c.pos.z > near && c.pos.z < far);
    let count = swept.len();
    for c in swept {
        credit(state, &c);
    }
    state.events.push(RunnerEvent::IcingGunSweep { count });
}

fn credit(state: &mut RunnerState, c: &Collectible) {
    state.player.wallet.add(c.kind.currency(), 1);
    spawn_burst(state, c.pos, c.kind.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{
        CollectibleKind, Letter, LetterPickup, MovingKind, MovingObstacle, ObstacleKind, PowerUp,
    };
    use crate::tuning::RunnerTuning;

    fn state() -> RunnerState {
        let mut s = RunnerState::new(1, RunnerTuning::default());
        s.cosmetics = false;
        s
    }

    fn put_obstacle(s: &mut RunnerState, kind: ObstacleKind, x: f32, z: f32) {
        let id = s.next_entity_id();
        s.obstacles.push(Obstacle {
            id,
            kind,
            pos: Vec3::new(x, 0.0, z),
        });
    }

    fn put_letter(s: &mut RunnerState, letter: Letter) {
        let id = s.next_entity_id();
        s.letters.push(LetterPickup {
            id,
            letter,
            pos: Vec3::new(0.0, 20.0, 0.0),
        });
    }

    #[test]
    fn test_hit_band_is_open_interval() {
        assert!(in_hit_band(0.0, 50.0));
        assert!(in_hit_band(49.9, 50.0));
        assert!(!in_hit_band(50.0, 50.0));
        assert!(!in_hit_band(-50.0, 50.0));
    }

    #[test]
    fn test_cone_ends_run() {
        let mut s = state();
        put_obstacle(&mut s, ObstacleKind::Cone, 0.0, 10.0);
        s.player.jump(&s.tuning.clone());
        judge(&mut s);
        assert_eq!(s.phase, RunnerPhase::GameOver);
        assert_eq!(s.game_over, Some(GameOverReason::Obstacle(ObstacleKind::Cone)));
    }

    #[test]
    fn test_jump_avoids_manhole() {
        let mut s = state();
        put_obstacle(&mut s, ObstacleKind::Manhole, 0.0, 10.0);
        let tuning = s.tuning.clone();
        s.player.jump(&tuning);
        judge(&mut s);
        assert_eq!(s.phase, RunnerPhase::Playing);
    }

    #[test]
    fn test_roll_avoids_fork_but_not_manhole() {
        let mut s = state();
        put_obstacle(&mut s, ObstacleKind::Fork, 0.0, 0.0);
        s.player.roll();
        judge(&mut s);
        assert_eq!(s.phase, RunnerPhase::Playing);

        put_obstacle(&mut s, ObstacleKind::Manhole, 0.0, 0.0);
        judge(&mut s);
        assert_eq!(s.phase, RunnerPhase::GameOver);
    }

    #[test]
    fn test_other_lane_is_safe() {
        let mut s = state();
        put_obstacle(&mut s, ObstacleKind::Cone, 150.0, 0.0);
        judge(&mut s);
        assert_eq!(s.phase, RunnerPhase::Playing);
    }

    #[test]
    fn test_moving_obstacle_not_avoidable_by_jump() {
        let mut s = state();
        s.moving_obstacles.push(MovingObstacle {
            id: 99,
            kind: MovingKind::Car,
            pos: Vec3::new(70.0, 0.0, 5.0),
            age_ticks: 10,
        });
        let tuning = s.tuning.clone();
        s.player.jump(&tuning);
        judge(&mut s);
        assert_eq!(s.game_over, Some(GameOverReason::Moving(MovingKind::Car)));
    }

    #[test]
    fn test_invulnerability_ignores_everything() {
        let mut s = state();
        s.player.invulnerable = true;
        put_obstacle(&mut s, ObstacleKind::Cone, 0.0, 0.0);
        s.moving_obstacles.push(MovingObstacle {
            id: 99,
            kind: MovingKind::Feet,
            pos: Vec3::new(0.0, 0.0, 0.0),
            age_ticks: 0,
        });
        judge(&mut s);
        assert_eq!(s.phase, RunnerPhase::Playing);
    }

    #[test]
    fn test_collectible_credits_and_is_removed() {
        let mut s = state();
        s.collectibles.push(Collectible {
            id: 5,
            kind: CollectibleKind::Coin,
            pos: Vec3::new(20.0, 30.0, -10.0),
        });
        s.collectibles.push(Collectible {
            id: 6,
            kind: CollectibleKind::Strawberry,
            pos: Vec3::new(0.0, 30.0, 300.0),
        });
        judge(&mut s);
        assert_eq!(s.score, 100);
        assert_eq!(s.player.wallet.coins, 1);
        assert_eq!(s.collectibles.len(), 1);
        assert_eq!(s.collectibles[0].id, 6);
    }

    #[test]
    fn test_letter_set_bonus_once_then_resets() {
        let mut s = state();
        for letter in [Letter::D, Letter::O, Letter::N, Letter::U] {
            put_letter(&mut s, letter);
            judge(&mut s);
        }
        assert_eq!(s.letter_set.len(), 4);
        assert_eq!(s.player.wallet.coins, 0);

        // Duplicate before completion only earns its pickup value
        let score_before = s.score;
        put_letter(&mut s, Letter::D);
        judge(&mut s);
        assert_eq!(s.letter_set.len(), 4);
        assert_eq!(s.score, score_before + s.tuning.letter_points);
        assert_eq!(s.player.wallet.coins, 0);

        put_letter(&mut s, Letter::T);
        judge(&mut s);
        assert!(s.letter_set.is_empty());
        assert_eq!(s.letter_sets_completed, 1);
        assert_eq!(s.player.wallet.coins, 100);
        assert_eq!(s.player.wallet.strawberries, 100);
        assert_eq!(s.player.wallet.chocolates, 100);
    }

    #[test]
    fn test_icing_gun_sweeps_band() {
        let mut s = state();
        for (id, z) in [(1, 150.0), (2, -40.0), (3, 250.0), (4, -60.0)] {
            s.collectibles.push(Collectible {
                id,
                kind: CollectibleKind::Chocolate,
                pos: Vec3::new(150.0, 30.0, z),
            });
        }
        s.power_ups.push(PowerUp {
            id: 10,
            kind: PowerUpKind::IcingGun,
            pos: Vec3::new(0.0, 25.0, 0.0),
        });
        judge(&mut s);
        assert_eq!(s.player.wallet.chocolates, 2);
        let left: Vec<u32> = s.collectibles.iter().map(|c| c.id).collect();
        assert_eq!(left, vec![3, 4]);
        assert!(s.events.contains(&RunnerEvent::IcingGunSweep { count: 2 }));
    }

    #[test]
    fn test_glaze_pickup_grants_invulnerability() {
        let mut s = state();
        s.power_ups.push(PowerUp {
            id: 10,
            kind: PowerUpKind::Glaze,
            pos: Vec3::new(0.0, 25.0, 0.0),
        });
        judge(&mut s);
        assert!(s.player.invulnerable);
        assert_eq!(s.player.power_up, Some(PowerUpKind::Glaze));
        assert!(s.power_ups.is_empty());
    }
}
