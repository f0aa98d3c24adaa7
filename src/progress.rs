//! Career progress across runs
//!
//! Persisted to LocalStorage: high score, total distance, shootout wins and
//! the character unlock set. Last write wins.

use serde::{Deserialize, Serialize};

use crate::characters::{CharacterId, ROSTER, Unlock, starters};

/// Persisted career counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Best single-run score
    pub high_score: u64,
    /// Distance driven across all runs
    pub total_km: f64,
    /// Shootouts won across all runs
    pub shootout_wins: u32,
    #[serde(default = "starters")]
    pub unlocked: Vec<CharacterId>,
    #[serde(default)]
    pub selected: CharacterId,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "street_pursuit_progress";

    pub fn new() -> Self {
        Self {
            high_score: 0,
            total_km: 0.0,
            shootout_wins: 0,
            unlocked: starters(),
            selected: CharacterId::default(),
        }
    }

    /// Fold a finished run in. Returns true on a new high score.
    pub fn record_run(&mut self, score: u64, distance_km: f32) -> bool {
        self.total_km += f64::from(distance_km.max(0.0));
        if score > self.high_score {
            self.high_score = score;
            return true;
        }
        false
    }

    pub fn record_shootout_win(&mut self) {
        self.shootout_wins += 1;
    }

    pub fn is_unlocked(&self, id: CharacterId) -> bool {
        self.unlocked.contains(&id)
    }

    /// Unlock every character whose condition is now met; returns the new ones
    pub fn check_unlocks(&mut self) -> Vec<CharacterId> {
        let mut newly = Vec::new();
        for character in &ROSTER {
            if self.is_unlocked(character.id) {
                continue;
            }
            let met = match character.unlock {
                Unlock::Starter => true,
                Unlock::ShootoutWins(n) => self.shootout_wins >= n,
                Unlock::HighScore(s) => self.high_score >= s,
                Unlock::TotalKm(km) => self.total_km >= km,
            };
            if met {
                self.unlocked.push(character.id);
                newly.push(character.id);
            }
        }
        if !newly.is_empty() {
            log::info!("Unlocked characters: {:?}", newly);
        }
        newly
    }

    /// Pick a character; refused while it is still locked
    pub fn select(&mut self, id: CharacterId) -> bool {
        if !self.is_unlocked(id) {
            return false;
        }
        self.selected = id;
        true
    }

    /// The selected character, or the first starter if the save is stale
    pub fn selected_character(&self) -> CharacterId {
        if self.is_unlocked(self.selected) {
            self.selected
        } else {
            CharacterId::default()
        }
    }

    /// Parse a saved blob, falling back to a fresh profile
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Progress>(json) {
            Ok(progress) => progress,
            Err(e) => {
                log::warn!("Discarding unreadable progress: {}", e);
                Self::new()
            }
        }
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                let progress = Self::from_json(&json);
                log::info!(
                    "Loaded progress (high score {}, {:.1} km)",
                    progress.high_score,
                    progress.total_km
                );
                return progress;
            }
        }

        log::info!("No progress found, starting fresh");
        Self::new()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Progress saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_run() {
        let mut progress = Progress::new();
        assert!(progress.record_run(120, 1.5));
        assert!(!progress.record_run(100, 2.0));
        assert_eq!(progress.high_score, 120);
        assert!((progress.total_km - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_unlocks() {
        let mut progress = Progress::new();
        assert!(progress.check_unlocks().is_empty());
        assert!(!progress.is_unlocked(CharacterId::Zack));

        for _ in 0..3 {
            progress.record_shootout_win();
        }
        assert_eq!(progress.check_unlocks(), vec![CharacterId::Zack]);

        progress.record_run(5000, 10.0);
        assert_eq!(
            progress.check_unlocks(),
            vec![CharacterId::Diamond, CharacterId::Maria]
        );
        // Already unlocked: nothing new
        assert!(progress.check_unlocks().is_empty());
    }

    #[test]
    fn test_select_requires_unlock() {
        let mut progress = Progress::new();
        assert!(!progress.select(CharacterId::Maria));
        assert_eq!(progress.selected_character(), CharacterId::Byron);
        assert!(progress.select(CharacterId::Ray));
        assert_eq!(progress.selected_character(), CharacterId::Ray);
    }

    #[test]
    fn test_stale_selection_falls_back() {
        let mut progress = Progress::new();
        progress.selected = CharacterId::Diamond;
        assert_eq!(progress.selected_character(), CharacterId::Byron);
    }

    #[test]
    fn test_json_roundtrip_and_corrupt_fallback() {
        let mut progress = Progress::new();
        progress.record_run(42, 0.7);
        let json = serde_json::to_string(&progress).expect("serialize");
        assert_eq!(Progress::from_json(&json), progress);

        assert_eq!(Progress::from_json("{not json"), Progress::new());
    }

    #[test]
    fn test_old_save_without_unlocks_gets_starters() {
        let progress =
            Progress::from_json(r#"{"high_score":10,"total_km":1.0,"shootout_wins":0}"#);
        assert_eq!(progress.unlocked, starters());
        assert_eq!(progress.selected, CharacterId::Byron);
    }
}
