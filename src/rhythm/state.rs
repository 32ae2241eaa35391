//! Tile state for the Magic Tiles session

use serde::Serialize;

use super::chart::{ChartNote, NoteKind};
use crate::tuning::RhythmTuning;

/// Accuracy tier of a successful judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    Perfect,
    Great,
    Good,
}

impl Tier {
    pub fn base_points(&self, tuning: &RhythmTuning) -> u64 {
        match self {
            Tier::Perfect => tuning.perfect_points,
            Tier::Great => tuning.great_points,
            Tier::Good => tuning.good_points,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Perfect => "perfect",
            Tier::Great => "great",
            Tier::Good => "good",
        }
    }
}

/// Lifecycle of one tile.
///
/// `Pending` goes to `Hit` or `Missed` exactly once. Hold tiles pass through
/// `Holding` while the lane is pressed; an early release parks them in
/// `Released` until they fall out of the window and are missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TileState {
    Pending,
    Holding { tier: Tier },
    Released { tier: Tier },
    Hit { tier: Tier },
    Missed,
}

impl TileState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, TileState::Hit { .. } | TileState::Missed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: u32,
    pub lane: usize,
    pub time_ms: f64,
    pub kind: NoteKind,
    pub state: TileState,
}

impl Tile {
    pub fn from_note(id: u32, note: &ChartNote) -> Self {
        Self {
            id,
            lane: note.lane,
            time_ms: note.time_ms,
            kind: note.kind,
            state: TileState::Pending,
        }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self.kind, NoteKind::Hold { .. })
    }

    /// Time the lane may be released for a hold to count
    pub fn end_ms(&self) -> f64 {
        self.time_ms + self.kind.duration_ms()
    }

    /// Screen y of the tile's leading edge. Reaches the hit line exactly at
    /// `time_ms` whatever the frame timing was.
    pub fn screen_y(&self, now_ms: f64, tuning: &RhythmTuning) -> f32 {
        tuning.hit_line_y - ((self.time_ms - now_ms) as f32) * tuning.pixels_per_ms
    }

    /// Drawn length in pixels, zero for taps
    pub fn screen_length(&self, tuning: &RhythmTuning) -> f32 {
        self.kind.duration_ms() as f32 * tuning.pixels_per_ms
    }
}
