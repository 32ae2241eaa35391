use donut_arcade::persistence::{KeyValueStore, MemoryStore};
use donut_arcade::sim::spawn::{spawn_collectible, spawn_obstacle};
use donut_arcade::sim::state::Obstacle;
use donut_arcade::sim::tick::simulate;
use donut_arcade::sim::{
    ObstacleKind, PlayerMotion, RunnerPhase, RunnerState, TickInput, avoids, judge, tick,
};
use donut_arcade::{Profile, RunnerTuning, Tuning};
use glam::Vec3;
use proptest::prelude::*;

fn motion_strategy() -> impl Strategy<Value = PlayerMotion> {
    prop_oneof![
        Just(PlayerMotion::Grounded),
        Just(PlayerMotion::Jumping),
        Just(PlayerMotion::Rolling),
    ]
}

/// Depths of obstacles then collectibles
fn depths(state: &RunnerState) -> Vec<f32> {
    state
        .obstacles
        .iter()
        .map(|o| o.pos.z)
        .chain(state.collectibles.iter().map(|c| c.pos.z))
        .collect()
}

proptest! {
    #[test]
    fn prop_depth_decreases_by_world_speed(seed in any::<u64>(), speed in 1.0f32..30.0) {
        let mut state = RunnerState::new(seed, RunnerTuning::default());
        state.world_speed = speed;
        spawn_obstacle(&mut state);
        spawn_collectible(&mut state);
        let before = depths(&state);
        simulate(&mut state);
        let after = depths(&state);
        prop_assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(&after) {
            prop_assert!((b - speed - a).abs() < 1e-3);
        }
    }

    #[test]
    fn prop_in_lane_obstacle_is_fatal_unless_avoided(
        kind_index in 0usize..ObstacleKind::ALL.len(),
        motion in motion_strategy(),
        z in -49.0f32..49.0,
    ) {
        let kind = ObstacleKind::ALL[kind_index];
        let mut state = RunnerState::new(1, RunnerTuning::default());
        state.player.motion = motion;
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind,
            pos: Vec3::new(state.player.x, 0.0, z),
        });
        judge(&mut state);
        prop_assert_eq!(state.is_game_over(), !avoids(kind.avoidance(), motion));
    }

    #[test]
    fn prop_runs_are_reproducible(seed in any::<u64>()) {
        let input = TickInput { actions: Vec::new(), autopilot: true };
        let mut a = RunnerState::new(seed, RunnerTuning::default());
        let mut b = RunnerState::new(seed, RunnerTuning::default());
        for _ in 0..300 {
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        prop_assert_eq!(a.score, b.score);
        prop_assert_eq!(a.entity_count(), b.entity_count());
        prop_assert_eq!(a.player.wallet, b.player.wallet);
    }
}

#[test]
fn test_full_session_persists_earnings() {
    let mut store = MemoryStore::default();
    let tuning = Tuning::default();

    let mut profile = Profile::load(&store);
    let mut state = profile.new_run(7, &tuning);
    let input = TickInput {
        actions: Vec::new(),
        autopilot: true,
    };
    for _ in 0..3600 {
        tick(&mut state, &input);
        if state.phase == RunnerPhase::GameOver {
            break;
        }
    }
    assert!(state.distance > 0.0);
    let earned = state.player.wallet;
    profile.finish_run(&state);
    profile.save(&mut store);

    let reloaded = Profile::load(&store);
    assert_eq!(reloaded, profile);
    assert_eq!(reloaded.progression.wallet, earned);
    assert_eq!(store.get("donut_coins"), Some(earned.coins.to_string()));
    // Zero scores never make the board
    assert_eq!(
        reloaded.high_scores.runner.top_score(),
        (state.score > 0).then_some(state.score)
    );
}
