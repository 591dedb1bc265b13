use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::slots::SaveSlots;

/// Game loop tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Delay between two ticks in milliseconds (default: 15).
    pub period_ms: u64,
    /// Ticks covered by one honored jump (default: 2).
    pub jump_debounce_ticks: u32,
    /// Number of save slots (default: 3).
    pub slots: usize,
    /// Where save slots live. `None` uses the user's data directory.
    pub save_dir: Option<PathBuf>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            period_ms: 15,
            jump_debounce_ticks: 2,
            slots: 3,
            save_dir: None,
        }
    }
}

impl LoopConfig {
    /// Parse a config from JSON. Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.period_ms.max(1))
    }

    pub fn save_slots(&self) -> SaveSlots {
        match &self.save_dir {
            Some(dir) => SaveSlots::new(dir.clone(), self.slots),
            None => SaveSlots::user_default(self.slots),
        }
    }
}
