//! Magic Tiles rhythm game
//!
//! Tiles are created from a chart when the session loads and judged by the
//! time distance between a lane tap and the tile's scheduled time. The clock
//! is advanced by the host; nothing here reads wall time.

pub mod chart;
pub mod judge;
pub mod session;
pub mod state;

pub use chart::{
    Chart, ChartDifficulty, ChartError, ChartNote, ChartParams, NoteKind, generate_chart,
};
pub use judge::{MissPolicy, award_points, classify, combo_multiplier};
pub use session::{
    FailReason, RhythmEvent, RhythmInput, RhythmPhase, RhythmSession, RhythmSnapshot, TierCounts,
    autoplay,
};
pub use state::{Tier, Tile, TileState};
