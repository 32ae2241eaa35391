//! Read-only view of a run for the rendering collaborator

use glam::Vec3;
use serde::Serialize;

use super::state::{PlayerMotion, PowerUpKind, RunnerPhase, RunnerState};
use crate::progression::{Costume, Wallet};

/// Entity list an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Obstacle,
    MovingObstacle,
    Collectible,
    PowerUp,
    Letter,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: u32,
    pub category: EntityCategory,
    /// Kind name, or the letter symbol for letters
    pub tag: String,
    pub pos: Vec3,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub lane: usize,
    pub x: f32,
    pub height: f32,
    pub motion: PlayerMotion,
    pub invulnerable: bool,
    pub power_up: Option<PowerUpKind>,
    pub costume: Costume,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunnerSnapshot {
    pub phase: RunnerPhase,
    pub pause_ticks: u32,
    pub score: u64,
    pub distance: f32,
    pub world_speed: f32,
    pub wallet: Wallet,
    pub letters: String,
    pub player: PlayerView,
    /// Far to near, the order a painter's renderer draws in
    pub entities: Vec<EntityView>,
    pub particles: Vec<Vec3>,
    pub game_over: Option<String>,
}

impl RunnerSnapshot {
    pub fn capture(state: &RunnerState) -> Self {
        let mut entities: Vec<EntityView> = Vec::with_capacity(state.entity_count());
        entities.extend(state.obstacles.iter().map(|o| EntityView {
            id: o.id,
            category: EntityCategory::Obstacle,
            tag: o.kind.name().to_string(),
            pos: o.pos,
        }));
        entities.extend(state.moving_obstacles.iter().map(|m| EntityView {
            id: m.id,
            category: EntityCategory::MovingObstacle,
            tag: m.kind.name().to_string(),
            pos: m.pos,
        }));
        entities.extend(state.collectibles.iter().map(|c| EntityView {
            id: c.id,
            category: EntityCategory::Collectible,
            tag: c.kind.name().to_string(),
            pos: c.pos,
        }));
        entities.extend(state.power_ups.iter().map(|p| EntityView {
            id: p.id,
            category: EntityCategory::PowerUp,
            tag: p.kind.name().to_string(),
            pos: p.pos,
        }));
        entities.extend(state.letters.iter().map(|l| EntityView {
            id: l.id,
            category: EntityCategory::Letter,
            tag: l.letter.symbol().to_string(),
            pos: l.pos,
        }));
        entities.sort_by(|a, b| b.pos.z.total_cmp(&a.pos.z));

        let particles = state
            .particles
            .iter()
            .map(|p| p.pos)
            .chain(state.sprinkles.iter().map(|s| s.pos))
            .collect();

        let player = &state.player;
        Self {
            phase: state.phase,
            pause_ticks: state.pause_ticks,
            score: state.score,
            distance: state.distance,
            world_speed: state.world_speed,
            wallet: player.wallet,
            letters: state.letter_set.progress(),
            player: PlayerView {
                lane: player.lane,
                x: player.x,
                height: player.jump_height,
                motion: player.motion,
                invulnerable: player.invulnerable,
                power_up: player.power_up,
                costume: player.costume,
            },
            entities,
            particles,
            game_over: state.game_over.map(|r| r.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawn::{spawn_collectible, spawn_obstacle};
    use crate::tuning::RunnerTuning;

    #[test]
    fn test_snapshot_sorted_far_to_near() {
        let mut state = RunnerState::new(9, RunnerTuning::default());
        spawn_collectible(&mut state);
        spawn_obstacle(&mut state);
        let snap = RunnerSnapshot::capture(&state);
        assert_eq!(snap.entities.len(), 2);
        assert_eq!(snap.entities[0].category, EntityCategory::Obstacle);
        assert!(snap.entities[0].pos.z >= snap.entities[1].pos.z);
        assert_eq!(snap.letters, "-----");
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = RunnerState::new(9, RunnerTuning::default());
        let json = serde_json::to_string(&RunnerSnapshot::capture(&state)).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
    }
}
