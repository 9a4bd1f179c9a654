//! Fruit Merge - merge-and-session engine for a falling-fruit puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tiers, registry, drops, merges, game over)
//! - `persistence`: Session/best-score storage backends
//! - `leaderboard`: Named score table
//! - `config`: Data-driven arena geometry and timings
//! - `runtime`: Fixed-timestep driver that glues the session to storage

pub mod config;
pub mod error;
pub mod leaderboard;
pub mod persistence;
pub mod runtime;
pub mod sim;

pub use config::GameConfig;
pub use error::{GameError, Result};
pub use leaderboard::LocalLeaderboard;
pub use runtime::{Runner, TickInput};
pub use sim::{GameSession, SimpleWorld, TierCatalog};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default canvas dimensions
    pub const CANVAS_WIDTH: f32 = 400.0;
    pub const CANVAS_HEIGHT: f32 = 900.0;

    /// Side walls and ground
    pub const WALL_THICKNESS: f32 = 15.0;
    /// Extra gap kept between a held fruit and the walls
    pub const DROP_BUFFER: f32 = 5.0;
    /// Gap between a held fruit and the top of the play area
    pub const SPAWN_CLEARANCE: f32 = 20.0;
    /// Scoreline sits this far down the play area (fraction of its height)
    pub const SCORELINE_FRACTION: f32 = 0.2;
    /// Fruits this far below the canvas are discarded
    pub const OUT_OF_BOUNDS_MARGIN: f32 = 100.0;

    /// Speed (px/s) below which a fruit counts as settled
    pub const STILLNESS_SPEED: f32 = 6.0;
    /// Downward acceleration (px/s²)
    pub const GRAVITY: f32 = 1200.0;

    /// Only the smallest tiers are handed to the player
    pub const STARTER_TIERS: usize = 5;

    /// Timers (seconds)
    pub const DROP_COOLDOWN_SECS: f32 = 1.0;
    pub const GAME_OVER_GRACE_SECS: f32 = 3.0;
    pub const AUTOSAVE_INTERVAL_SECS: f32 = 1.0;

    /// Rows shown by the leaderboard
    pub const LEADERBOARD_SIZE: usize = 10;
}

/// Convert a duration in seconds to whole simulation ticks (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    ((secs / consts::SIM_DT).round() as u64).max(1)
}
