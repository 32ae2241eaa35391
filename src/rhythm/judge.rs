//! Hit-window judgment
//!
//! Tiles are judged by the distance in time between an input and the tile's
//! scheduled time. Because tile positions are a pure function of the clock,
//! this equals the on-screen distance from the hit line divided by scroll
//! speed.

use serde::{Deserialize, Serialize};

use super::session::{FailReason, RhythmEvent, RhythmPhase, RhythmSession};
use super::state::{Tier, TileState};
use crate::tuning::RhythmTuning;

/// What ends a session. Earlier game revisions only reset the combo; later
/// ones ended the run on any stray tap or missed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissPolicy {
    /// A tap that matches no tile ends the session
    pub unmatched_tap_fails: bool,
    /// A tile passing the hit line unhit ends the session
    pub missed_tile_fails: bool,
}

impl MissPolicy {
    pub const fn strict() -> Self {
        Self {
            unmatched_tap_fails: true,
            missed_tile_fails: true,
        }
    }

    pub const fn lenient() -> Self {
        Self {
            unmatched_tap_fails: false,
            missed_tile_fails: false,
        }
    }
}

impl Default for MissPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// Accuracy tier for a distance from the hit line, or `None` outside tolerance
pub fn classify(distance_ms: f64, tuning: &RhythmTuning) -> Option<Tier> {
    let d = distance_ms.abs();
    if d > tuning.tolerance_ms {
        None
    } else if d <= tuning.perfect_ms {
        Some(Tier::Perfect)
    } else if d <= tuning.great_ms {
        Some(Tier::Great)
    } else {
        Some(Tier::Good)
    }
}

/// floor(combo / step) + 1
pub fn combo_multiplier(combo: u32, step: u32) -> u64 {
    (combo / step.max(1)) as u64 + 1
}

/// Points for one successful judgment at the current combo
pub fn award_points(tier: Tier, hold: bool, combo: u32, tuning: &RhythmTuning) -> u64 {
    let base = tier.base_points(tuning);
    let base = if hold { base * tuning.hold_multiplier } else { base };
    base * combo_multiplier(combo, tuning.combo_step)
}

/// Handle a tap in `lane` at the session's current time
pub fn tap(session: &mut RhythmSession, lane: usize) {
    match session.phase {
        RhythmPhase::Waiting => {
            if lane == session.start_lane {
                session.start();
            }
            return;
        }
        RhythmPhase::Running => {}
        _ => return,
    }

    let now = session.now_ms;
    let tolerance = session.tuning.tolerance_ms;
    let target = session
        .tiles
        .iter()
        .enumerate()
        .filter(|(_, t)| t.lane == lane && t.state == TileState::Pending)
        .map(|(i, t)| (i, (t.time_ms - now).abs()))
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let Some((index, distance)) = target else {
        session.events.push(RhythmEvent::StrayTap { lane });
        if session.tuning.miss_policy.unmatched_tap_fails {
            session.fail(FailReason::UnmatchedTap { lane });
        }
        return;
    };

    // Inside tolerance, so a tier always exists
    let tier = classify(distance, &session.tuning).unwrap_or(Tier::Good);
    let tile_id = session.tiles[index].id;
    if session.tiles[index].is_hold() {
        session.tiles[index].state = TileState::Holding { tier };
        session.events.push(RhythmEvent::HoldStarted { tile_id, tier });
    } else {
        session.tiles[index].state = TileState::Hit { tier };
        session.credit_hit(tile_id, tier, false);
    }
}

/// Handle a lane release. Only a held tile cares.
pub fn release(session: &mut RhythmSession, lane: usize) {
    if session.phase != RhythmPhase::Running {
        return;
    }
    let now = session.now_ms;
    let Some(index) = session
        .tiles
        .iter()
        .position(|t| t.lane == lane && matches!(t.state, TileState::Holding { .. }))
    else {
        return;
    };

    let tile = &mut session.tiles[index];
    let TileState::Holding { tier } = tile.state else {
        return;
    };
    let tile_id = tile.id;
    if now >= tile.end_ms() {
        tile.state = TileState::Hit { tier };
        session.credit_hit(tile_id, tier, true);
    } else {
        tile.state = TileState::Released { tier };
        session.events.push(RhythmEvent::HoldBroken { tile_id });
    }
}

/// Mark tiles that have left their window unresolved as missed.
///
/// A hold still pressed past its end is released late, not missed, until its
/// tail has scrolled out of view (`prune_after_ms` past the end).
pub fn sweep_misses(session: &mut RhythmSession) {
    if session.phase != RhythmPhase::Running {
        return;
    }
    let now = session.now_ms;
    let tolerance = session.tuning.tolerance_ms;
    let hold_grace = session.tuning.prune_after_ms.max(tolerance);
    let expired: Vec<usize> = session
        .tiles
        .iter()
        .enumerate()
        .filter(|(_, t)| match t.state {
            TileState::Pending => now - t.time_ms > tolerance,
            TileState::Holding { .. } => now - t.end_ms() > hold_grace,
            TileState::Released { .. } => now - t.end_ms() > tolerance,
            TileState::Hit { .. } | TileState::Missed => false,
        })
        .map(|(i, _)| i)
        .collect();

    for index in expired {
        let tile = &mut session.tiles[index];
        tile.state = TileState::Missed;
        let (tile_id, lane) = (tile.id, tile.lane);
        session.register_miss(tile_id);
        if session.tuning.miss_policy.missed_tile_fails {
            session.fail(FailReason::MissedTile { lane });
            return;
        }
    }
}
