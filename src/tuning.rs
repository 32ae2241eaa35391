//! Data-driven game balance
//!
//! Every band width, interval and point value lives here rather than in the
//! simulation code. Files may specify any subset of fields; the rest fall back
//! to the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::rhythm::MissPolicy;

/// Configuration problems detected before a session starts
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} must have at least one lane")]
    NoLanes(&'static str),
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("{0} must be a probability between 0 and 1")]
    Probability(&'static str),
    #[error("rhythm tiers must satisfy perfect <= great <= tolerance")]
    TierOrder,
}

/// Runner balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    // Track geometry
    pub lane_count: usize,
    pub lane_width: f32,
    pub view_distance: f32,
    pub removal_depth: f32,

    // Difficulty ramp
    pub base_speed: f32,
    pub speed_ramp_interval_ticks: u64,
    pub speed_ramp_increment: f32,

    // Spawner
    pub obstacle_base_interval: f32,
    pub obstacle_speed_factor: f32,
    pub obstacle_min_interval: f32,
    pub moving_interval_ticks: u32,
    pub moving_spawn_depth: f32,
    pub moving_lifetime_ticks: u32,
    pub collectible_interval_ticks: u32,
    pub letter_interval_ticks: u32,
    pub power_up_chance: f64,
    pub sprinkle_chance: f64,

    // Judge
    pub hit_band: f32,
    pub obstacle_hit_distance: f32,
    pub moving_hit_distance: f32,
    pub pickup_distance: f32,
    pub icing_gun_depth: f32,

    // Player
    pub jump_velocity: f32,
    pub gravity: f32,
    pub lane_lerp: f32,
    pub power_up_ticks: u32,
    pub timed_pause_ticks: u32,

    // Rewards
    pub letter_points: u64,
    pub letter_set_bonus: u64,

    // Cosmetics
    pub particle_burst: usize,
    pub particle_life: u32,
    pub sprinkle_life: u32,
    pub max_particles: usize,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            lane_count: LANE_COUNT,
            lane_width: LANE_WIDTH,
            view_distance: VIEW_DISTANCE,
            removal_depth: REMOVAL_DEPTH,

            base_speed: BASE_WORLD_SPEED,
            speed_ramp_interval_ticks: 600,
            speed_ramp_increment: 0.5,

            obstacle_base_interval: 90.0,
            obstacle_speed_factor: 5.0,
            obstacle_min_interval: 20.0,
            moving_interval_ticks: 300,
            moving_spawn_depth: 200.0,
            moving_lifetime_ticks: 180,
            collectible_interval_ticks: 120,
            letter_interval_ticks: 300,
            power_up_chance: 0.005,
            sprinkle_chance: 0.3,

            hit_band: 50.0,
            obstacle_hit_distance: 60.0,
            moving_hit_distance: 80.0,
            pickup_distance: 50.0,
            icing_gun_depth: 200.0,

            jump_velocity: 15.0,
            gravity: 0.8,
            lane_lerp: 0.4,
            power_up_ticks: 300,
            timed_pause_ticks: 2 * TICKS_PER_SECOND,

            letter_points: 50,
            letter_set_bonus: 100,

            particle_burst: 10,
            particle_life: 30,
            sprinkle_life: 60,
            max_particles: 256,
        }
    }
}

impl RunnerTuning {
    /// Horizontal position of a lane center
    pub fn lane_x(&self, lane: usize) -> f32 {
        crate::lane_x(lane, self.lane_count, self.lane_width)
    }

    /// Ticks between static obstacle spawns at the given world speed
    pub fn obstacle_interval(&self, world_speed: f32) -> f32 {
        (self.obstacle_base_interval - world_speed * self.obstacle_speed_factor)
            .max(self.obstacle_min_interval)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.lane_count == 0 {
            return Err(TuningError::NoLanes("runner"));
        }
        if self.view_distance <= 0.0 {
            return Err(TuningError::NonPositive("view_distance"));
        }
        if self.base_speed <= 0.0 {
            return Err(TuningError::NonPositive("base_speed"));
        }
        if self.speed_ramp_interval_ticks == 0 {
            return Err(TuningError::NonPositive("speed_ramp_interval_ticks"));
        }
        if self.obstacle_min_interval <= 0.0 {
            return Err(TuningError::NonPositive("obstacle_min_interval"));
        }
        if self.hit_band <= 0.0 {
            return Err(TuningError::NonPositive("hit_band"));
        }
        for (name, p) in [
            ("power_up_chance", self.power_up_chance),
            ("sprinkle_chance", self.sprinkle_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(TuningError::Probability(name));
            }
        }
        Ok(())
    }
}

/// Rhythm game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmTuning {
    pub lane_count: usize,
    /// Largest |tap time - tile time| that still counts as a hit (ms)
    pub tolerance_ms: f64,
    pub perfect_ms: f64,
    pub great_ms: f64,
    pub perfect_points: u64,
    pub great_points: u64,
    pub good_points: u64,
    /// Consecutive hits per +1 multiplier step
    pub combo_step: u32,
    pub hold_multiplier: u64,
    /// Screen-space geometry for the renderer
    pub hit_line_y: f32,
    pub pixels_per_ms: f32,
    /// Resolved tiles are dropped this long after they leave the window
    pub prune_after_ms: f64,
    pub miss_policy: MissPolicy,
}

impl Default for RhythmTuning {
    fn default() -> Self {
        Self {
            lane_count: 4,
            tolerance_ms: 40.0,
            perfect_ms: 10.0,
            great_ms: 25.0,
            perfect_points: 100,
            great_points: 75,
            good_points: 50,
            combo_step: 10,
            hold_multiplier: 2,
            hit_line_y: 500.0,
            pixels_per_ms: 0.5,
            prune_after_ms: 600.0,
            miss_policy: MissPolicy::strict(),
        }
    }
}

impl RhythmTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.lane_count == 0 {
            return Err(TuningError::NoLanes("rhythm"));
        }
        if self.tolerance_ms <= 0.0 {
            return Err(TuningError::NonPositive("tolerance_ms"));
        }
        if self.combo_step == 0 {
            return Err(TuningError::NonPositive("combo_step"));
        }
        if !(self.perfect_ms <= self.great_ms && self.great_ms <= self.tolerance_ms) {
            return Err(TuningError::TierOrder);
        }
        Ok(())
    }
}

/// Complete balance configuration for both games
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub runner: RunnerTuning,
    pub rhythm: RhythmTuning,
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        self.runner.validate()?;
        self.rhythm.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_obstacle_interval_shrinks_with_speed() {
        let t = RunnerTuning::default();
        assert!((t.obstacle_interval(4.0) - 70.0).abs() < 1e-4);
        assert!(t.obstacle_interval(8.0) < t.obstacle_interval(4.0));
        // Floor holds at high speed
        assert!((t.obstacle_interval(100.0) - t.obstacle_min_interval).abs() < 1e-4);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "runner": { "lane_count": 5 } }"#).unwrap();
        assert_eq!(tuning.runner.lane_count, 5);
        assert_eq!(tuning.runner.lane_width, LANE_WIDTH);
        assert_eq!(tuning.rhythm, RhythmTuning::default());
    }

    #[test]
    fn test_zero_lanes_rejected() {
        let err = Tuning::from_json(r#"{ "runner": { "lane_count": 0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::NoLanes("runner")));
    }

    #[test]
    fn test_tier_order_rejected() {
        let mut tuning = RhythmTuning::default();
        tuning.perfect_ms = 30.0;
        assert!(matches!(tuning.validate(), Err(TuningError::TierOrder)));
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
    }
}
