//! Magic Tiles session: clock, tiles, score and phase

use std::fmt;

use serde::Serialize;

use super::chart::Chart;
use super::judge;
use super::state::{Tier, Tile, TileState};
use crate::tuning::RhythmTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RhythmPhase {
    /// Start tile on the hit line, clock stopped
    Waiting,
    Running,
    Paused,
    GameOver,
    /// Every tile resolved
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailReason {
    UnmatchedTap { lane: usize },
    MissedTile { lane: usize },
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::UnmatchedTap { lane } => write!(f, "tapped empty lane {}", lane + 1),
            FailReason::MissedTile { lane } => write!(f, "missed a tile in lane {}", lane + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RhythmEvent {
    Started,
    Hit {
        tile_id: u32,
        tier: Tier,
        points: u64,
        hold: bool,
    },
    HoldStarted { tile_id: u32, tier: Tier },
    HoldBroken { tile_id: u32 },
    Missed { tile_id: u32 },
    StrayTap { lane: usize },
    GameOver { reason: FailReason },
    Cleared { score: u64 },
}

/// Input from the lane keys or touch zones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhythmInput {
    TapDown { lane: usize },
    TapUp { lane: usize },
    /// Toggle pause while running
    Pause,
    Restart,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub missed: u32,
}

impl TierCounts {
    fn record(&mut self, tier: Tier) {
        match tier {
            Tier::Perfect => self.perfect += 1,
            Tier::Great => self.great += 1,
            Tier::Good => self.good += 1,
        }
    }

    pub fn hits(&self) -> u32 {
        self.perfect + self.great + self.good
    }

    pub fn judged(&self) -> u32 {
        self.hits() + self.missed
    }
}

#[derive(Debug, Clone)]
pub struct RhythmSession {
    pub chart: Chart,
    pub tuning: RhythmTuning,
    pub phase: RhythmPhase,
    /// Milliseconds since the start tile was tapped
    pub now_ms: f64,
    pub start_lane: usize,
    /// Live tiles, time ordered; resolved tiles are pruned once off screen
    pub tiles: Vec<Tile>,
    pub total_tiles: usize,
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub counts: TierCounts,
    pub failure: Option<FailReason>,
    pub events: Vec<RhythmEvent>,
}

impl RhythmSession {
    pub fn new(chart: Chart, tuning: RhythmTuning) -> Self {
        let chart = chart.normalized(tuning.lane_count);
        let tiles: Vec<Tile> = chart
            .notes
            .iter()
            .enumerate()
            .map(|(i, note)| Tile::from_note(i as u32, note))
            .collect();
        log::info!(
            "Loaded chart {:?}: {} tiles over {:.1}s",
            chart.title,
            tiles.len(),
            chart.length_ms() / 1000.0
        );
        Self {
            start_lane: chart.start_lane,
            total_tiles: tiles.len(),
            tiles,
            chart,
            tuning,
            phase: RhythmPhase::Waiting,
            now_ms: 0.0,
            score: 0,
            combo: 0,
            max_combo: 0,
            counts: TierCounts::default(),
            failure: None,
            events: Vec::new(),
        }
    }

    /// Reset to the waiting state with the same chart
    pub fn restart(&mut self) {
        *self = Self::new(self.chart.clone(), self.tuning.clone());
    }

    pub fn handle_input(&mut self, input: RhythmInput) {
        match input {
            RhythmInput::TapDown { lane } => {
                if lane >= self.tuning.lane_count {
                    log::debug!("Ignoring tap in lane {lane}");
                    return;
                }
                judge::tap(self, lane);
            }
            RhythmInput::TapUp { lane } => judge::release(self, lane),
            RhythmInput::Pause => match self.phase {
                RhythmPhase::Running => self.phase = RhythmPhase::Paused,
                RhythmPhase::Paused => self.phase = RhythmPhase::Running,
                _ => {}
            },
            RhythmInput::Restart => self.restart(),
        }
    }

    /// Move the clock forward. The clock only runs in `Running`.
    pub fn advance(&mut self, dt_ms: f64) {
        if self.phase != RhythmPhase::Running {
            return;
        }
        self.now_ms += dt_ms.max(0.0);
        judge::sweep_misses(self);
        if self.phase != RhythmPhase::Running {
            return;
        }
        if self.tiles.iter().all(|t| t.state.is_resolved()) {
            self.phase = RhythmPhase::Cleared;
            self.events.push(RhythmEvent::Cleared { score: self.score });
            log::info!(
                "Chart cleared: score {}, accuracy {:.1}%, max combo {}",
                self.score,
                self.accuracy(),
                self.max_combo
            );
        }
        self.prune();
    }

    fn prune(&mut self) {
        let now = self.now_ms;
        let keep_ms = self.tuning.prune_after_ms;
        self.tiles
            .retain(|t| !(t.state.is_resolved() && now - t.end_ms() > keep_ms));
    }

    pub(crate) fn start(&mut self) {
        self.phase = RhythmPhase::Running;
        self.now_ms = 0.0;
        self.events.push(RhythmEvent::Started);
        log::info!("Tiles session started");
    }

    pub(crate) fn fail(&mut self, reason: FailReason) {
        self.phase = RhythmPhase::GameOver;
        self.failure = Some(reason);
        self.events.push(RhythmEvent::GameOver { reason });
        log::info!("Tiles session over: {reason} (score {})", self.score);
    }

    /// Score a completed tile, then extend the combo
    pub(crate) fn credit_hit(&mut self, tile_id: u32, tier: Tier, hold: bool) {
        let points = judge::award_points(tier, hold, self.combo, &self.tuning);
        self.score += points;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.counts.record(tier);
        self.events.push(RhythmEvent::Hit {
            tile_id,
            tier,
            points,
            hold,
        });
    }

    pub(crate) fn register_miss(&mut self, tile_id: u32) {
        self.combo = 0;
        self.counts.missed += 1;
        self.events.push(RhythmEvent::Missed { tile_id });
    }

    /// Share of judged tiles that were hit, as a percentage
    pub fn accuracy(&self) -> f32 {
        let judged = self.counts.judged();
        if judged == 0 {
            return 100.0;
        }
        self.counts.hits() as f32 * 100.0 / judged as f32
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, RhythmPhase::GameOver | RhythmPhase::Cleared)
    }

    pub fn drain_events(&mut self) -> Vec<RhythmEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> RhythmSnapshot {
        RhythmSnapshot::capture(self)
    }
}

/// Inputs a perfect player would give this frame
pub fn autoplay(session: &RhythmSession) -> Vec<RhythmInput> {
    match session.phase {
        RhythmPhase::Waiting => {
            return vec![RhythmInput::TapDown {
                lane: session.start_lane,
            }];
        }
        RhythmPhase::Running => {}
        _ => return Vec::new(),
    }
    let now = session.now_ms;
    let mut inputs = Vec::new();
    for tile in &session.tiles {
        match tile.state {
            TileState::Pending if (tile.time_ms - now).abs() <= session.tuning.perfect_ms => {
                inputs.push(RhythmInput::TapDown { lane: tile.lane });
                if !tile.is_hold() {
                    inputs.push(RhythmInput::TapUp { lane: tile.lane });
                }
            }
            TileState::Holding { .. } if now >= tile.end_ms() => {
                inputs.push(RhythmInput::TapUp { lane: tile.lane });
            }
            _ => {}
        }
    }
    inputs
}

#[derive(Debug, Clone, Serialize)]
pub struct TileView {
    pub id: u32,
    pub lane: usize,
    pub y: f32,
    pub length: f32,
    pub state: TileState,
}

/// Read-only view of a session for the renderer
#[derive(Debug, Clone, Serialize)]
pub struct RhythmSnapshot {
    pub phase: RhythmPhase,
    pub now_ms: f64,
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub accuracy: f32,
    pub counts: TierCounts,
    /// Lane of the start tile while waiting
    pub start_lane: Option<usize>,
    /// Tiles at or below the top of the screen
    pub tiles: Vec<TileView>,
    pub failure: Option<String>,
}

impl RhythmSnapshot {
    pub fn capture(session: &RhythmSession) -> Self {
        let tuning = &session.tuning;
        let tiles = session
            .tiles
            .iter()
            .map(|t| TileView {
                id: t.id,
                lane: t.lane,
                y: t.screen_y(session.now_ms, tuning),
                length: t.screen_length(tuning),
                state: t.state,
            })
            .filter(|v| v.y >= 0.0)
            .collect();
        Self {
            phase: session.phase,
            now_ms: session.now_ms,
            score: session.score,
            combo: session.combo,
            max_combo: session.max_combo,
            accuracy: session.accuracy(),
            counts: session.counts,
            start_lane: (session.phase == RhythmPhase::Waiting).then_some(session.start_lane),
            tiles,
            failure: session.failure.map(|r| r.to_string()),
        }
    }
}
