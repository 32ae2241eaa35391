//! Everything that persists between sessions, loaded and saved as one unit
//!
//! Front ends create sessions from the profile and hand finished sessions
//! back for settlement.

use crate::highscores::HighScores;
use crate::persistence::KeyValueStore;
use crate::platform::now_ms;
use crate::progression::Progression;
use crate::rhythm::{Chart, RhythmSession};
use crate::settings::Settings;
use crate::sim::RunnerState;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub progression: Progression,
    pub settings: Settings,
    pub high_scores: HighScores,
}

/// Result of settling one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub score: u64,
    /// Leaderboard position, if the score made it
    pub rank: Option<usize>,
}

impl Profile {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            progression: Progression::load(store),
            settings: Settings::load(store),
            high_scores: HighScores::load(store),
        }
    }

    /// Write everything back. Failures are logged and dropped.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        self.progression.save(store);
        if let Err(e) = self.settings.save(store) {
            log::warn!("Failed to save settings: {e}");
        }
        if let Err(e) = self.high_scores.save(store) {
            log::warn!("Failed to save high scores: {e}");
        }
    }

    pub fn new_run(&self, seed: u64, tuning: &Tuning) -> RunnerState {
        let mut state = RunnerState::new(seed, tuning.runner.clone());
        self.settings.apply_to_runner(&mut state, &self.progression);
        state
    }

    /// Start the run over, wearing whatever was chosen since it began
    pub fn restart_run(&self, state: &mut RunnerState) {
        state.restart();
        self.settings.apply_to_runner(state, &self.progression);
    }

    pub fn new_tiles(&self, chart: Chart, tuning: &Tuning) -> RhythmSession {
        let mut rhythm = tuning.rhythm.clone();
        self.settings.apply_to_rhythm(&mut rhythm);
        RhythmSession::new(chart, rhythm)
    }

    /// Bank a finished run's currencies and record its score
    pub fn finish_run(&mut self, state: &RunnerState) -> Settlement {
        self.progression.settle(&state.player.wallet);
        let rank = self
            .high_scores
            .runner
            .add_score(state.score, state.distance, now_ms());
        if let Some(rank) = rank {
            log::info!("Runner high score #{rank}: {}", state.score);
        }
        Settlement {
            score: state.score,
            rank,
        }
    }

    pub fn finish_tiles(&mut self, session: &RhythmSession) -> Settlement {
        let rank = self
            .high_scores
            .tiles
            .add_score(session.score, session.accuracy(), now_ms());
        if let Some(rank) = rank {
            log::info!("Tiles high score #{rank}: {}", session.score);
        }
        Settlement {
            score: session.score,
            rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::progression::{Costume, Wallet};

    #[test]
    fn test_finish_run_banks_wallet_and_score() {
        let mut profile = Profile::default();
        let mut state = profile.new_run(3, &Tuning::default());
        state.score = 420;
        state.distance = 88.0;
        state.player.wallet = Wallet {
            coins: 12,
            strawberries: 3,
            chocolates: 1,
        };
        let settlement = profile.finish_run(&state);
        assert_eq!(settlement.rank, Some(1));
        assert_eq!(profile.progression.wallet.coins, 12);
        assert_eq!(profile.high_scores.runner.top_score(), Some(420));
    }

    #[test]
    fn test_profile_round_trip() {
        let mut store = MemoryStore::default();
        let mut profile = Profile::default();
        profile.progression.wallet.coins = 250;
        profile.progression.wallet.strawberries = 100;
        profile.progression.wallet.chocolates = 100;
        profile.progression.purchase(Costume::Police).unwrap();
        assert!(
            profile
                .settings
                .select_costume(Costume::Police, &profile.progression)
        );
        profile.save(&mut store);

        let loaded = Profile::load(&store);
        assert_eq!(loaded, profile);
        let state = loaded.new_run(1, &Tuning::default());
        assert_eq!(state.player.costume, Costume::Police);
    }

    #[test]
    fn test_costume_chosen_mid_run_worn_after_restart() {
        let mut profile = Profile::default();
        profile.progression.wallet = Wallet {
            coins: 250,
            strawberries: 100,
            chocolates: 100,
        };
        let mut state = profile.new_run(5, &Tuning::default());
        assert_eq!(state.player.costume, Costume::Default);

        profile.progression.acquire(Costume::Police).unwrap();
        assert!(
            profile
                .settings
                .select_costume(Costume::Police, &profile.progression)
        );
        assert_eq!(state.player.costume, Costume::Default);

        profile.restart_run(&mut state);
        assert_eq!(state.player.costume, Costume::Police);
        assert_eq!(state.score, 0);
    }
}
