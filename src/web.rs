//! Browser bindings
//!
//! The page owns rendering, DOM and audio. It forwards key events and
//! `requestAnimationFrame` timestamps here and draws from JSON snapshots.

use wasm_bindgen::prelude::*;

use crate::consts::{MAX_SUBSTEPS, TICK_MS};
use crate::persistence::{KeyValueStore, LocalStore, MemoryStore};
use crate::platform::{rhythm_key, runner_key};
use crate::profile::Profile;
use crate::progression::Costume;
use crate::rhythm::{Chart, RhythmInput, RhythmSession};
use crate::sim::{RunnerAction, RunnerPhase, RunnerSnapshot, RunnerState, TickInput, tick};
use crate::tuning::Tuning;

/// Longest frame gap fed to the simulation, in ms
const MAX_FRAME_MS: f64 = 100.0;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Donut Arcade loaded");
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// LocalStorage when the browser allows it, otherwise an in-memory store so
/// private browsing still plays.
fn open_store() -> Box<dyn KeyValueStore> {
    match LocalStore::new() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("LocalStorage unavailable, progress will not be kept");
            Box::new(MemoryStore::default())
        }
    }
}

/// Milliseconds elapsed since the previous frame timestamp
fn frame_delta(last_time: &mut Option<f64>, time_ms: f64) -> f64 {
    let dt = last_time.map_or(0.0, |last| (time_ms - last).clamp(0.0, MAX_FRAME_MS));
    *last_time = Some(time_ms);
    dt
}

#[wasm_bindgen]
pub struct WebRunner {
    state: RunnerState,
    input: TickInput,
    accumulator: f64,
    last_time: Option<f64>,
    store: Box<dyn KeyValueStore>,
    profile: Profile,
    settled: bool,
}

#[wasm_bindgen]
impl WebRunner {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, tuning_json: Option<String>) -> Result<WebRunner, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(js_error)?,
            None => Tuning::default(),
        };
        let store = open_store();
        let profile = Profile::load(store.as_ref());
        let state = profile.new_run(seed as u64, &tuning);
        log::info!("Runner started with seed: {seed}");
        Ok(Self {
            state,
            input: TickInput::default(),
            accumulator: 0.0,
            last_time: None,
            store,
            profile,
            settled: false,
        })
    }

    /// Queue the command bound to a key, if any. Returns whether it was used.
    pub fn key(&mut self, code: &str, pressed: bool) -> bool {
        match runner_key(code, pressed) {
            Some(RunnerAction::Restart) => {
                self.profile.restart_run(&mut self.state);
                self.settled = false;
                true
            }
            Some(action) => {
                self.input.actions.push(action);
                true
            }
            None => false,
        }
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    /// Run the ticks owed for this animation frame
    pub fn frame(&mut self, time_ms: f64) {
        self.accumulator += frame_delta(&mut self.last_time, time_ms);

        let mut substeps = 0;
        while self.accumulator >= TICK_MS && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input);
            // Commands are one-shot
            self.input.actions.clear();
            self.accumulator -= TICK_MS;
            substeps += 1;
        }

        match (self.state.phase, self.settled) {
            (RunnerPhase::GameOver, false) => {
                self.profile.finish_run(&self.state);
                self.profile.save(self.store.as_mut());
                self.settled = true;
            }
            (RunnerPhase::Playing | RunnerPhase::Paused, true) => self.settled = false,
            _ => {}
        }
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&RunnerSnapshot::capture(&self.state)).map_err(js_error)
    }

    /// Events since the last call, for sound effects and HUD popups
    pub fn events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.drain_events()).map_err(js_error)
    }

    pub fn wallet_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.profile.progression.wallet).map_err(js_error)
    }

    pub fn high_scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.profile.high_scores.runner).map_err(js_error)
    }

    /// Buy (if needed) and wear a costume from the next run on
    pub fn choose_costume(&mut self, name: &str) -> Result<(), JsValue> {
        let costume = Costume::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown costume {name:?}")))?;
        self.profile
            .progression
            .acquire(costume)
            .map_err(js_error)?;
        self.profile
            .settings
            .select_costume(costume, &self.profile.progression);
        self.profile.save(self.store.as_mut());
        if self.state.phase != RunnerPhase::Playing {
            self.state.player.costume = costume;
        }
        Ok(())
    }

    pub fn set_first_person(&mut self, enabled: bool) {
        self.profile.settings.first_person = enabled;
        self.state.first_person = enabled;
        self.profile.save(self.store.as_mut());
    }
}

#[wasm_bindgen]
pub struct WebTiles {
    session: RhythmSession,
    last_time: Option<f64>,
    store: Box<dyn KeyValueStore>,
    profile: Profile,
    settled: bool,
}

#[wasm_bindgen]
impl WebTiles {
    /// Load a chart document, or the built-in chart when none is given
    #[wasm_bindgen(constructor)]
    pub fn new(chart_json: Option<String>) -> WebTiles {
        let tuning = Tuning::default();
        let chart = match chart_json {
            Some(json) => Chart::from_json_or_default(&json, tuning.rhythm.lane_count),
            None => Chart::default(),
        };
        let store = open_store();
        let profile = Profile::load(store.as_ref());
        let session = profile.new_tiles(chart, &tuning);
        Self {
            session,
            last_time: None,
            store,
            profile,
            settled: false,
        }
    }

    pub fn key(&mut self, code: &str, pressed: bool) -> bool {
        match rhythm_key(code, pressed) {
            Some(input) => {
                self.input(input);
                true
            }
            None => false,
        }
    }

    /// Touch zones report lanes directly
    pub fn touch(&mut self, lane: usize, pressed: bool) {
        self.input(if pressed {
            RhythmInput::TapDown { lane }
        } else {
            RhythmInput::TapUp { lane }
        });
    }

    pub fn frame(&mut self, time_ms: f64) {
        let dt = frame_delta(&mut self.last_time, time_ms);
        self.session.advance(dt);
        self.settle();
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(js_error)
    }

    pub fn events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.drain_events()).map_err(js_error)
    }

    pub fn high_scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.profile.high_scores.tiles).map_err(js_error)
    }
}

impl WebTiles {
    fn input(&mut self, input: RhythmInput) {
        self.session.handle_input(input);
        if input == RhythmInput::Restart {
            self.settled = false;
        }
        // Taps can end the session before the next frame
        self.settle();
    }

    fn settle(&mut self) {
        if self.session.is_finished() && !self.settled {
            self.profile.finish_tiles(&self.session);
            self.profile.save(self.store.as_mut());
            self.settled = true;
        }
    }
}
