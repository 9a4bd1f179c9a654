//! Persisted session schema
//!
//! ```json
//! { "score": 12, "bestScore": 40, "isGameOver": false,
//!   "fruits": [ { "type": "grape", "x": 120.5, "y": 610.0 } ] }
//! ```
//!
//! The held fruit is never saved; a restored session hands out a fresh one.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One released fruit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FruitRecord {
    /// Tier key
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub score: u64,
    pub best_score: u64,
    pub is_game_over: bool,
    #[serde(default)]
    pub fruits: Vec<FruitRecord>,
}

impl PersistedSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Outcome of a restore: how many saved fruits came back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: usize,
    /// Entries whose tier key no longer exists
    pub skipped: usize,
}
