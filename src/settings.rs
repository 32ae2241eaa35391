//! Player preferences
//!
//! Persisted separately from progression under their own key.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};
use crate::progression::{Costume, Progression};
use crate::rhythm::MissPolicy;
use crate::sim::RunnerState;
use crate::tuning::RhythmTuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Costume worn on the next run
    pub selected_costume: Costume,
    /// Camera behind the donut instead of the third-person view
    pub first_person: bool,

    // === Accessibility ===
    /// Disables sprinkles and pickup bursts
    pub reduced_motion: bool,

    /// Overrides the tuned miss policy for tiles sessions when set
    pub miss_policy: Option<MissPolicy>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_costume: Costume::Default,
            first_person: false,
            reduced_motion: false,
            miss_policy: None,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "donut_settings";

    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Select a costume the player owns
    pub fn select_costume(&mut self, costume: Costume, progression: &Progression) -> bool {
        if !progression.is_unlocked(costume) {
            return false;
        }
        self.selected_costume = costume;
        true
    }

    /// Costume to wear, falling back to the default if it was never unlocked
    pub fn effective_costume(&self, progression: &Progression) -> Costume {
        if progression.is_unlocked(self.selected_costume) {
            self.selected_costume
        } else {
            Costume::Default
        }
    }

    /// Configure a fresh run from these preferences
    pub fn apply_to_runner(&self, state: &mut RunnerState, progression: &Progression) {
        state.player.costume = self.effective_costume(progression);
        state.first_person = self.first_person;
        state.cosmetics = !self.reduced_motion;
    }

    pub fn apply_to_rhythm(&self, tuning: &mut RhythmTuning) {
        if let Some(policy) = self.miss_policy {
            tuning.miss_policy = policy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::tuning::RunnerTuning;

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::default();
        let settings = Settings {
            selected_costume: Costume::Chef,
            first_person: true,
            reduced_motion: true,
            miss_policy: Some(MissPolicy::lenient()),
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let mut store = MemoryStore::default();
        store
            .set("donut_settings", r#"{ "first_person": true }"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert!(settings.first_person);
        assert_eq!(settings.selected_costume, Costume::Default);
        assert_eq!(settings.miss_policy, None);
    }

    #[test]
    fn test_locked_costume_not_worn() {
        let progression = Progression::default();
        let mut settings = Settings::default();
        assert!(!settings.select_costume(Costume::Alien, &progression));

        // A stale selection from another profile falls back too
        settings.selected_costume = Costume::Alien;
        let mut state = RunnerState::new(1, RunnerTuning::default());
        settings.reduced_motion = true;
        settings.apply_to_runner(&mut state, &progression);
        assert_eq!(state.player.costume, Costume::Default);
        assert!(!state.cosmetics);
    }

    #[test]
    fn test_unset_miss_policy_keeps_tuning() {
        let mut tuning = RhythmTuning {
            miss_policy: MissPolicy::lenient(),
            ..RhythmTuning::default()
        };
        Settings::default().apply_to_rhythm(&mut tuning);
        assert_eq!(tuning.miss_policy, MissPolicy::lenient());

        let strict = Settings {
            miss_policy: Some(MissPolicy::strict()),
            ..Settings::default()
        };
        strict.apply_to_rhythm(&mut tuning);
        assert_eq!(tuning.miss_policy, MissPolicy::strict());
    }
}
