//! Game configuration
//!
//! Arena geometry, physics tuning and timer lengths. Every field falls back
//! to its default so partial JSON files are accepted.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;
use crate::secs_to_ticks;

/// Tunable game parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Arena ===
    /// Canvas width in pixels
    pub canvas_width: f32,
    /// Canvas height in pixels
    pub canvas_height: f32,
    /// Thickness of the side walls and ground
    pub wall_thickness: f32,
    /// Extra gap between a held fruit and a wall
    pub drop_buffer: f32,
    /// Gap between a held fruit and the top of the play area
    pub spawn_clearance: f32,
    /// Scoreline position as a fraction of the play-area height
    pub scoreline_fraction: f32,
    /// Distance below the canvas at which fruits are discarded
    pub out_of_bounds_margin: f32,

    // === Physics ===
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Speed (px/s) below which a fruit counts as settled
    pub stillness_speed: f32,

    // === Rules ===
    /// Number of smallest tiers the player can be handed
    pub starter_tiers: usize,
    /// Seconds between a drop and the next held fruit
    pub drop_cooldown_secs: f32,
    /// Seconds fruits must sit above the scoreline before game over
    pub game_over_grace_secs: f32,
    /// Seconds between autosaves
    pub autosave_interval_secs: f32,
    /// Rows fetched for the leaderboard
    pub leaderboard_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            drop_buffer: DROP_BUFFER,
            spawn_clearance: SPAWN_CLEARANCE,
            scoreline_fraction: SCORELINE_FRACTION,
            out_of_bounds_margin: OUT_OF_BOUNDS_MARGIN,

            gravity: GRAVITY,
            stillness_speed: STILLNESS_SPEED,

            starter_tiers: STARTER_TIERS,
            drop_cooldown_secs: DROP_COOLDOWN_SECS,
            game_over_grace_secs: GAME_OVER_GRACE_SECS,
            autosave_interval_secs: AUTOSAVE_INTERVAL_SECS,
            leaderboard_size: LEADERBOARD_SIZE,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn drop_cooldown_ticks(&self) -> u64 {
        secs_to_ticks(self.drop_cooldown_secs)
    }

    pub fn game_over_grace_ticks(&self) -> u64 {
        secs_to_ticks(self.game_over_grace_secs)
    }

    pub fn autosave_interval_ticks(&self) -> u64 {
        secs_to_ticks(self.autosave_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "gravity": 500.0, "starter_tiers": 3 }"#).unwrap();
        assert_eq!(config.gravity, 500.0);
        assert_eq!(config.starter_tiers, 3);
        assert_eq!(config.canvas_width, CANVAS_WIDTH);
        assert_eq!(config.drop_cooldown_ticks(), 120);
        assert_eq!(config.game_over_grace_ticks(), 360);
    }

    #[test]
    fn test_bad_json_is_malformed() {
        assert!(GameConfig::from_json("{ gravity: ").is_err());
    }
}
