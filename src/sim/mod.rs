//! Donut Escape runner simulation
//!
//! All gameplay logic for the runner lives here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Tuning passed in explicitly, no global state
//! - No rendering or platform dependencies

pub mod collision;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{avoids, in_hit_band, judge};
pub use snapshot::RunnerSnapshot;
pub use state::{
    Avoidance, CollectibleKind, GameOverReason, Letter, LetterSet, MovingKind, ObstacleKind,
    Player, PlayerMotion, PowerUpKind, RunnerEvent, RunnerPhase, RunnerState,
};
pub use tick::{RunnerAction, TickInput, autopilot, handle_action, tick};
