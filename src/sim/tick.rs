//! Fixed timestep runner tick
//!
//! One call advances the run by one frame: input, then Spawner, Simulator and
//! Judge in that order.

use serde::{Deserialize, Serialize};

use super::collision::{avoids, judge};
use super::spawn::run_spawners;
use super::state::{Avoidance, PlayerMotion, RunnerEvent, RunnerPhase, RunnerState};

/// Discrete player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerAction {
    LaneLeft,
    LaneRight,
    Jump,
    RollStart,
    RollStop,
    /// Short countdown pause; ticks are no-ops until it runs out
    TimedPause,
    /// Open or close the pause menu
    TogglePause,
    Restart,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Actions applied before the tick, in order
    pub actions: Vec<RunnerAction>,
    /// Idle/demo mode - the autopilot plays the run
    pub autopilot: bool,
}

impl TickInput {
    pub fn with(action: RunnerAction) -> Self {
        Self {
            actions: vec![action],
            autopilot: false,
        }
    }
}

/// Apply one player command immediately
pub fn handle_action(state: &mut RunnerState, action: RunnerAction) {
    match action {
        RunnerAction::Restart => {
            state.restart();
            return;
        }
        RunnerAction::TogglePause => {
            match state.phase {
                RunnerPhase::Playing => state.phase = RunnerPhase::Paused,
                RunnerPhase::Paused => state.phase = RunnerPhase::Playing,
                RunnerPhase::GameOver => {}
            }
            return;
        }
        _ => {}
    }

    if state.phase != RunnerPhase::Playing {
        return;
    }

    let tuning = &state.tuning;
    let player = &mut state.player;
    match action {
        RunnerAction::LaneLeft => player.move_left(tuning),
        RunnerAction::LaneRight => player.move_right(tuning),
        RunnerAction::Jump => player.jump(tuning),
        RunnerAction::RollStart => player.roll(),
        RunnerAction::RollStop => player.stop_rolling(),
        RunnerAction::TimedPause => {
            if state.pause_ticks == 0 {
                state.pause_ticks = tuning.timed_pause_ticks;
            }
        }
        RunnerAction::TogglePause | RunnerAction::Restart => {}
    }
}

/// Advance the run by one fixed timestep
pub fn tick(state: &mut RunnerState, input: &TickInput) {
    for action in &input.actions {
        handle_action(state, *action);
    }

    // Don't tick if paused or game over
    if state.phase != RunnerPhase::Playing {
        return;
    }
    if state.pause_ticks > 0 {
        state.pause_ticks -= 1;
        return;
    }

    if input.autopilot {
        for action in autopilot(state) {
            handle_action(state, action);
        }
    }

    state.time_ticks += 1;
    advance_progress(state);
    run_spawners(state);
    simulate(state);
    judge(state);
}

/// Distance, per-tick score and the difficulty ramp
fn advance_progress(state: &mut RunnerState) {
    let step = state.world_speed * 0.1;
    state.distance += step;
    state.score += step.floor() as u64;

    if state.time_ticks % state.tuning.speed_ramp_interval_ticks == 0 {
        state.world_speed += state.tuning.speed_ramp_increment;
        state.events.push(RunnerEvent::SpeedUp {
            speed: state.world_speed,
        });
        log::debug!("World speed now {}", state.world_speed);
    }
}

/// Move every entity one tick and prune what has expired
pub fn simulate(state: &mut RunnerState) {
    let speed = state.world_speed;
    let floor = state.tuning.removal_depth;
    let lifetime = state.tuning.moving_lifetime_ticks;

    state.player.update(&state.tuning);

    for o in &mut state.obstacles {
        o.pos.z -= speed;
    }
    for m in &mut state.moving_obstacles {
        m.pos.z -= speed;
        m.age_ticks += 1;
    }
    for c in &mut state.collectibles {
        c.pos.z -= speed;
    }
    for l in &mut state.letters {
        l.pos.z -= speed;
    }
    for p in &mut state.power_ups {
        p.pos.z -= speed;
    }
    for p in &mut state.particles {
        p.pos += p.vel;
        p.vel.y -= 0.3;
        p.life = p.life.saturating_sub(1);
    }
    for s in &mut state.sprinkles {
        s.pos += s.vel;
        s.pos.z -= speed;
        s.life = s.life.saturating_sub(1);
    }

    state.obstacles.retain(|o| o.pos.z > floor);
    state
        .moving_obstacles
        .retain(|m| m.pos.z > floor && m.age_ticks <= lifetime);
    state.collectibles.retain(|c| c.pos.z > floor);
    state.letters.retain(|l| l.pos.z > floor);
    state.power_ups.retain(|p| p.pos.z > floor);
    state.particles.retain(|p| p.life > 0);
    state.sprinkles.retain(|s| s.pos.z > floor && s.life > 0);
}

/// Ticks ahead the autopilot starts reacting to a threat
const AUTOPILOT_LOOKAHEAD_TICKS: f32 = 6.0;

/// Demo-mode controller: dodge or bypass whatever is coming in the current
/// lane, then drift toward a lane with a pickup.
pub fn autopilot(state: &RunnerState) -> Vec<RunnerAction> {
    let t = &state.tuning;
    let player = &state.player;
    let horizon = t.hit_band + state.world_speed * AUTOPILOT_LOOKAHEAD_TICKS;
    let mut actions = Vec::new();

    // Threats per lane within the reaction horizon: (avoidance, depth)
    let threats_in = |lane: usize| -> Vec<(Avoidance, f32)> {
        let lane_x = t.lane_x(lane);
        let statics = state
            .obstacles
            .iter()
            .filter(|o| (o.pos.x - lane_x).abs() < t.obstacle_hit_distance)
            .map(|o| (o.kind.avoidance(), o.pos.z));
        let moving = state
            .moving_obstacles
            .iter()
            .filter(|m| (m.pos.x - lane_x).abs() < t.moving_hit_distance)
            .map(|m| (Avoidance::None, m.pos.z));
        statics
            .chain(moving)
            .filter(|(_, z)| *z > -t.hit_band && *z < horizon + state.world_speed * 40.0)
            .collect()
    };

    let here = threats_in(player.lane);
    let blocking = here.iter().any(|(a, z)| *a == Avoidance::None && *z < horizon * 2.0);

    if blocking && !player.invulnerable {
        // Pick the nearest lane without an unavoidable threat
        let safe = (0..t.lane_count)
            .filter(|l| *l != player.lane)
            .filter(|l| {
                !threats_in(*l)
                    .iter()
                    .any(|(a, z)| *a == Avoidance::None && *z < horizon * 2.0)
            })
            .min_by_key(|l| l.abs_diff(player.lane));
        if let Some(lane) = safe {
            actions.push(if lane < player.lane {
                RunnerAction::LaneLeft
            } else {
                RunnerAction::LaneRight
            });
        }
        return actions;
    }

    let imminent = |wanted: Avoidance| {
        here.iter()
            .any(|(a, z)| *a == wanted && *z < horizon && *z > -t.hit_band)
    };

    if imminent(Avoidance::Roll) {
        if player.motion == PlayerMotion::Grounded {
            actions.push(RunnerAction::RollStart);
        }
        return actions;
    }
    if player.is_rolling() {
        actions.push(RunnerAction::RollStop);
    }
    if imminent(Avoidance::Jump) && !avoids(Avoidance::Jump, player.motion) {
        actions.push(RunnerAction::Jump);
        return actions;
    }

    // Nothing to dodge: steer toward the nearest pickup if its lane is clear
    if here.is_empty() {
        let target = state
            .collectibles
            .iter()
            .map(|c| (c.pos.x, c.pos.z))
            .chain(state.letters.iter().map(|l| (l.pos.x, l.pos.z)))
            .filter(|(_, z)| *z > t.hit_band)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((x, _)) = target {
            let lane_x = t.lane_x(player.lane);
            if x < lane_x - t.lane_width / 2.0
                && threats_in(player.lane.saturating_sub(1)).is_empty()
            {
                actions.push(RunnerAction::LaneLeft);
            } else if x > lane_x + t.lane_width / 2.0
                && player.lane + 1 < t.lane_count
                && threats_in(player.lane + 1).is_empty()
            {
                actions.push(RunnerAction::LaneRight);
            }
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GameOverReason, MovingKind, MovingObstacle, Obstacle, ObstacleKind};
    use crate::tuning::RunnerTuning;
    use glam::Vec3;

    fn quiet_state(seed: u64) -> RunnerState {
        let mut tuning = RunnerTuning::default();
        // Keep the spawners out of the way so tests control every entity
        tuning.obstacle_base_interval = 1.0e9;
        tuning.obstacle_min_interval = 1.0e9;
        tuning.moving_interval_ticks = u32::MAX;
        tuning.collectible_interval_ticks = u32::MAX;
        tuning.letter_interval_ticks = u32::MAX;
        tuning.power_up_chance = 0.0;
        tuning.sprinkle_chance = 0.0;
        RunnerState::new(seed, tuning)
    }

    #[test]
    fn test_depth_decreases_by_world_speed() {
        let mut state = quiet_state(1);
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Cone,
            pos: Vec3::new(150.0, 0.0, 1000.0),
        });
        tick(&mut state, &TickInput::default());
        assert_eq!(state.obstacles[0].pos.z, 996.0);
    }

    #[test]
    fn test_manhole_scenario_while_jumping() {
        let mut state = quiet_state(2);
        let id = state.next_entity_id();
        // Placed so it crosses the whole band during one jump
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Manhole,
            pos: Vec3::new(0.0, 0.0, 60.0),
        });
        tick(&mut state, &TickInput::with(RunnerAction::Jump));
        for _ in 0..40 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, RunnerPhase::Playing);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_manhole_without_jump_ends_run() {
        let mut state = quiet_state(2);
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Manhole,
            pos: Vec3::new(0.0, 0.0, 60.0),
        });
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(
            state.game_over,
            Some(GameOverReason::Obstacle(ObstacleKind::Manhole))
        );
        // Frozen after game over
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut state = quiet_state(3);
        state.phase = RunnerPhase::GameOver;
        tick(&mut state, &TickInput::with(RunnerAction::Restart));
        assert_eq!(state.phase, RunnerPhase::Playing);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_timed_pause_freezes_ticks() {
        let mut state = quiet_state(4);
        tick(&mut state, &TickInput::with(RunnerAction::TimedPause));
        assert_eq!(state.time_ticks, 0);
        for _ in 0..state.tuning.timed_pause_ticks - 1 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.time_ticks, 0);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_pause_menu_toggle() {
        let mut state = quiet_state(5);
        tick(&mut state, &TickInput::with(RunnerAction::TogglePause));
        assert_eq!(state.phase, RunnerPhase::Paused);
        tick(&mut state, &TickInput::with(RunnerAction::Jump));
        assert!(!state.player.is_jumping());
        tick(&mut state, &TickInput::with(RunnerAction::TogglePause));
        assert_eq!(state.phase, RunnerPhase::Playing);
    }

    #[test]
    fn test_difficulty_ramp() {
        let mut state = quiet_state(6);
        for _ in 0..600 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.world_speed, 4.5);
        for _ in 0..600 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.world_speed, 5.0);
    }

    #[test]
    fn test_moving_obstacle_expires() {
        let mut state = quiet_state(7);
        state.moving_obstacles.push(MovingObstacle {
            id: 1,
            kind: MovingKind::Feet,
            pos: Vec3::new(150.0, 0.0, 5000.0),
            age_ticks: 0,
        });
        for _ in 0..180 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.moving_obstacles.len(), 1);
        tick(&mut state, &TickInput::default());
        assert!(state.moving_obstacles.is_empty());
    }

    #[test]
    fn test_autopilot_leaves_lane_with_cone() {
        let mut state = quiet_state(8);
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Cone,
            pos: Vec3::new(0.0, 0.0, 70.0),
        });
        let actions = autopilot(&state);
        assert_eq!(actions.len(), 1);
        assert!(matches!(
            actions[0],
            RunnerAction::LaneLeft | RunnerAction::LaneRight
        ));
    }

    #[test]
    fn test_autopilot_advances_run() {
        let mut state = RunnerState::new(42, RunnerTuning::default());
        let input = TickInput {
            actions: Vec::new(),
            autopilot: true,
        };
        for _ in 0..300 {
            tick(&mut state, &input);
        }
        assert!(state.time_ticks > 0);
        assert!(state.distance > 0.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = RunnerState::new(99999, RunnerTuning::default());
        let mut b = RunnerState::new(99999, RunnerTuning::default());
        let input = TickInput {
            actions: Vec::new(),
            autopilot: true,
        };
        for _ in 0..1000 {
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.entity_count(), b.entity_count());
        assert_eq!(a.player.lane, b.player.lane);
    }
}
