//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Keyboard input mapping (`KeyboardEvent.code` strings)

use crate::rhythm::RhythmInput;
use crate::sim::RunnerAction;

/// Lane keys for the tiles game, left to right
pub const TILE_KEYS: [&str; 4] = ["KeyD", "KeyF", "KeyJ", "KeyK"];

/// Map a key transition to a runner command
pub fn runner_key(code: &str, pressed: bool) -> Option<RunnerAction> {
    let action = match (code, pressed) {
        ("ArrowLeft" | "KeyA", true) => RunnerAction::LaneLeft,
        ("ArrowRight" | "KeyD", true) => RunnerAction::LaneRight,
        ("ArrowUp" | "KeyW", true) => RunnerAction::Jump,
        ("ArrowDown" | "KeyS", true) => RunnerAction::RollStart,
        ("ArrowDown" | "KeyS", false) => RunnerAction::RollStop,
        ("Space", true) => RunnerAction::TimedPause,
        ("Escape", true) => RunnerAction::TogglePause,
        ("Enter", true) => RunnerAction::Restart,
        _ => return None,
    };
    Some(action)
}

/// Map a key transition to a tiles input
pub fn rhythm_key(code: &str, pressed: bool) -> Option<RhythmInput> {
    if let Some(lane) = TILE_KEYS.iter().position(|k| *k == code) {
        return Some(if pressed {
            RhythmInput::TapDown { lane }
        } else {
            RhythmInput::TapUp { lane }
        });
    }
    match (code, pressed) {
        ("Escape" | "Space", true) => Some(RhythmInput::Pause),
        ("Enter", true) => Some(RhythmInput::Restart),
        _ => None,
    }
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
