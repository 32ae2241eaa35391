//! Note charts
//!
//! A chart is the time-ordered list of notes for one song. Charts come from
//! JSON documents or from [`generate_chart`], which stands in for hand-authored
//! songs by laying notes on a tempo grid.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("chart has no playable notes")]
    Empty,
}

/// Tap or held note
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NoteKind {
    Tap,
    Hold {
        #[serde(rename = "duration")]
        duration_ms: f64,
    },
}

impl NoteKind {
    pub fn duration_ms(&self) -> f64 {
        match self {
            NoteKind::Tap => 0.0,
            NoteKind::Hold { duration_ms } => *duration_ms,
        }
    }
}

/// One note: `{ "lane": 2, "time": 1500, "type": "hold", "duration": 400 }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartNote {
    pub lane: usize,
    /// Scheduled hit time, ms after the start tile is tapped
    #[serde(rename = "time")]
    pub time_ms: f64,
    #[serde(flatten)]
    pub kind: NoteKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub title: String,
    /// Lane of the stationary start tile
    #[serde(default)]
    pub start_lane: usize,
    #[serde(default)]
    pub notes: Vec<ChartNote>,
}

impl Default for Chart {
    fn default() -> Self {
        generate_chart(&ChartParams::default())
    }
}

impl Chart {
    /// Parse a chart and normalize it for `lane_count` lanes
    pub fn from_json(json: &str, lane_count: usize) -> Result<Self, ChartError> {
        let chart: Chart = serde_json::from_str(json)?;
        let chart = chart.normalized(lane_count);
        if chart.notes.is_empty() {
            return Err(ChartError::Empty);
        }
        Ok(chart)
    }

    /// Parse a chart, falling back to the default chart on any problem
    pub fn from_json_or_default(json: &str, lane_count: usize) -> Self {
        match Self::from_json(json, lane_count) {
            Ok(chart) => chart,
            Err(e) => {
                log::warn!("Using default chart: {e}");
                ChartParams {
                    lane_count,
                    ..ChartParams::default()
                }
                .generate()
            }
        }
    }

    /// Drop notes that cannot be played, demote zero-length holds to taps and
    /// sort by time.
    pub fn normalized(mut self, lane_count: usize) -> Self {
        let before = self.notes.len();
        self.notes
            .retain(|n| n.lane < lane_count && n.time_ms.is_finite() && n.time_ms >= 0.0);
        for note in &mut self.notes {
            if let NoteKind::Hold { duration_ms } = note.kind {
                if !(duration_ms.is_finite() && duration_ms > 0.0) {
                    note.kind = NoteKind::Tap;
                }
            }
        }
        self.notes.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        if self.notes.len() != before {
            log::warn!(
                "Dropped {} unplayable notes from chart {:?}",
                before - self.notes.len(),
                self.title
            );
        }
        if self.start_lane >= lane_count {
            self.start_lane = 0;
        }
        self
    }

    /// Time of the last note end
    pub fn length_ms(&self) -> f64 {
        self.notes
            .iter()
            .map(|n| n.time_ms + n.kind.duration_ms())
            .fold(0.0, f64::max)
    }
}

/// Note density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChartDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl ChartDifficulty {
    /// Grid subdivisions per beat
    fn subdivisions(&self) -> u32 {
        match self {
            ChartDifficulty::Easy => 1,
            ChartDifficulty::Normal => 2,
            ChartDifficulty::Hard => 4,
        }
    }

    /// Chance a note is placed on an off-beat grid slot
    fn offbeat_chance(&self) -> f64 {
        match self {
            ChartDifficulty::Easy => 0.0,
            ChartDifficulty::Normal => 0.3,
            ChartDifficulty::Hard => 0.5,
        }
    }

    fn hold_chance(&self) -> f64 {
        match self {
            ChartDifficulty::Easy => 0.1,
            ChartDifficulty::Normal => 0.15,
            ChartDifficulty::Hard => 0.2,
        }
    }
}

/// Parameters for [`generate_chart`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartParams {
    pub title: String,
    pub bpm: f64,
    pub beats: u32,
    pub lane_count: usize,
    pub difficulty: ChartDifficulty,
    /// Gap between the start tap and the first note
    pub lead_in_ms: f64,
    pub seed: u64,
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            title: "Sugar Rush".to_string(),
            bpm: 120.0,
            beats: 64,
            lane_count: 4,
            difficulty: ChartDifficulty::Normal,
            lead_in_ms: 2000.0,
            seed: 1,
        }
    }
}

impl ChartParams {
    pub fn generate(&self) -> Chart {
        generate_chart(self)
    }
}

/// Lay notes on a tempo grid. Every beat gets a note; off-beat slots get one
/// with the difficulty's probability. Holds last one or two beats and block
/// their lane until released, so notes never overlap within a lane.
pub fn generate_chart(params: &ChartParams) -> Chart {
    let mut rng = Pcg32::seed_from_u64(params.seed);
    let lane_count = params.lane_count.max(1);
    let beat_ms = 60_000.0 / params.bpm.max(1.0);
    let subdivisions = params.difficulty.subdivisions();
    let slot_ms = beat_ms / subdivisions as f64;

    let mut notes = Vec::new();
    let mut lane_free_at = vec![f64::NEG_INFINITY; lane_count];
    let mut last_lane: Option<usize> = None;

    for slot in 0..params.beats * subdivisions {
        let on_beat = slot % subdivisions == 0;
        if !on_beat && !rng.random_bool(params.difficulty.offbeat_chance()) {
            continue;
        }
        let time_ms = params.lead_in_ms + slot as f64 * slot_ms;

        // Free lanes, avoiding an immediate repeat when there is a choice
        let free: Vec<usize> = (0..lane_count)
            .filter(|l| lane_free_at[*l] < time_ms)
            .collect();
        let choices: Vec<usize> = if free.len() > 1 {
            free.iter().copied().filter(|l| Some(*l) != last_lane).collect()
        } else {
            free
        };
        if choices.is_empty() {
            continue;
        }
        let lane = choices[rng.random_range(0..choices.len())];

        let kind = if on_beat && rng.random_bool(params.difficulty.hold_chance()) {
            let beats_held = rng.random_range(1..=2) as f64;
            NoteKind::Hold {
                duration_ms: beat_ms * beats_held,
            }
        } else {
            NoteKind::Tap
        };
        lane_free_at[lane] = time_ms + kind.duration_ms();
        last_lane = Some(lane);
        notes.push(ChartNote {
            lane,
            time_ms,
            kind,
        });
    }

    Chart {
        title: params.title.clone(),
        start_lane: rng.random_range(0..lane_count),
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_json() {
        let json = r#"{
            "title": "Test",
            "start_lane": 1,
            "notes": [
                { "lane": 2, "time": 1500, "type": "hold", "duration": 400 },
                { "lane": 0, "time": 1000, "type": "tap" }
            ]
        }"#;
        let chart = Chart::from_json(json, 4).unwrap();
        assert_eq!(chart.start_lane, 1);
        assert_eq!(chart.notes.len(), 2);
        // Sorted by time
        assert_eq!(chart.notes[0].time_ms, 1000.0);
        assert_eq!(chart.notes[1].kind, NoteKind::Hold { duration_ms: 400.0 });
        assert_eq!(chart.length_ms(), 1900.0);
    }

    #[test]
    fn test_unplayable_notes_dropped() {
        let json = r#"{ "notes": [
            { "lane": 9, "time": 100, "type": "tap" },
            { "lane": 1, "time": -5, "type": "tap" },
            { "lane": 1, "time": 200, "type": "hold", "duration": 0 }
        ] }"#;
        let chart = Chart::from_json(json, 4).unwrap();
        assert_eq!(chart.notes.len(), 1);
        assert_eq!(chart.notes[0].kind, NoteKind::Tap);
    }

    #[test]
    fn test_malformed_chart_falls_back() {
        let chart = Chart::from_json_or_default("{ broken", 4);
        assert!(!chart.notes.is_empty());
        let chart = Chart::from_json_or_default(r#"{ "notes": [] }"#, 4);
        assert!(!chart.notes.is_empty());
    }

    #[test]
    fn test_generated_chart_is_deterministic() {
        let params = ChartParams::default();
        assert_eq!(generate_chart(&params), generate_chart(&params));
        let other = ChartParams {
            seed: 2,
            ..ChartParams::default()
        };
        assert_ne!(generate_chart(&params), generate_chart(&other));
    }

    #[test]
    fn test_generated_chart_has_every_beat_and_no_overlap() {
        for difficulty in [
            ChartDifficulty::Easy,
            ChartDifficulty::Normal,
            ChartDifficulty::Hard,
        ] {
            let params = ChartParams {
                difficulty,
                ..ChartParams::default()
            };
            let chart = generate_chart(&params);
            assert!(chart.notes.len() >= params.beats as usize / 2);
            assert!(chart.notes.windows(2).all(|w| w[0].time_ms <= w[1].time_ms));
            assert!(chart.start_lane < params.lane_count);

            for lane in 0..params.lane_count {
                let in_lane: Vec<_> = chart.notes.iter().filter(|n| n.lane == lane).collect();
                for pair in in_lane.windows(2) {
                    assert!(pair[0].time_ms + pair[0].kind.duration_ms() < pair[1].time_ms);
                }
            }
        }
    }
}
