//! Donut Arcade - simulation cores for two small arcade games
//!
//! Core modules:
//! - `sim`: Donut Escape endless runner (spawning, motion, collision, scoring)
//! - `rhythm`: Magic Tiles rhythm game (charts, hit-window judgment)
//! - `progression`: Currencies and costume unlocks that outlive a run
//! - `profile`: Progression, settings and high scores loaded and settled together
//! - `persistence`: Key-value storage back ends (file, memory, LocalStorage)
//! - `tuning`: Data-driven game balance
//! - `platform`: Keyboard mapping shared by the native and web front ends

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod profile;
pub mod progression;
pub mod rhythm;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::HighScores;
pub use profile::Profile;
pub use progression::{Costume, Progression, Wallet};
pub use settings::Settings;
pub use tuning::{RhythmTuning, RunnerTuning, Tuning};

/// Game configuration constants
pub mod consts {
    /// Simulation rate; one tick per display refresh
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Milliseconds covered by one tick
    pub const TICK_MS: f64 = 1000.0 / TICKS_PER_SECOND as f64;
    /// Max ticks per frame (prevents spiral of death after a stall)
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Depth of the far plane where runner entities appear
    pub const VIEW_DISTANCE: f32 = 1000.0;
    /// Entities behind this depth are pruned
    pub const REMOVAL_DEPTH: f32 = -100.0;

    /// Lane defaults (three lanes, centered on x = 0)
    pub const LANE_COUNT: usize = 3;
    pub const LANE_WIDTH: f32 = 150.0;

    /// Starting world speed (depth units per tick)
    pub const BASE_WORLD_SPEED: f32 = 4.0;

    /// Size of the collectible letter set
    pub const LETTER_SET_SIZE: usize = 5;
}

/// Horizontal position of a lane center, lanes laid out symmetrically around 0
#[inline]
pub fn lane_x(lane: usize, lane_count: usize, lane_width: f32) -> f32 {
    let center = (lane_count as f32 - 1.0) / 2.0;
    (lane as f32 - center) * lane_width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_x_three_lanes() {
        assert_eq!(lane_x(0, 3, 150.0), -150.0);
        assert_eq!(lane_x(1, 3, 150.0), 0.0);
        assert_eq!(lane_x(2, 3, 150.0), 150.0);
    }

    #[test]
    fn test_lane_x_even_lane_count() {
        assert_eq!(lane_x(0, 4, 100.0), -150.0);
        assert_eq!(lane_x(3, 4, 100.0), 150.0);
    }
}
