//! Game state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::BodyHandle;

/// A fruit is identified by its physics body
pub type FruitId = BodyHandle;

/// One physical piece, as seen at the time it was read from the registry
#[derive(Debug, Clone, PartialEq)]
pub struct Fruit {
    pub id: FruitId,
    /// Tier ordinal
    pub tier: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Under player control, pinned and not eligible for merging
    pub held: bool,
}

impl Fruit {
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.held
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Score bookkeeping for one play session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    /// Never decreases; tracks `max(best, score)`
    pub best_score: u64,
    pub game_over: bool,
    /// Highest score already submitted to the leaderboard
    pub last_saved_score: u64,
}

impl Session {
    /// Add merge points, keeping the best score in lockstep
    pub fn award(&mut self, points: u64) {
        self.score += points;
        self.best_score = self.best_score.max(self.score);
    }

    /// Raise the best score from an external source (never lowers it)
    pub fn offer_best(&mut self, best: u64) {
        self.best_score = self.best_score.max(best).max(self.score);
    }

    /// Replace score and flags wholesale (restore/restart)
    pub fn reset_to(&mut self, score: u64, best_score: u64, game_over: bool) {
        self.score = score;
        self.best_score = best_score.max(score);
        self.game_over = game_over;
    }

    /// Whether `score` still needs a leaderboard write
    pub fn needs_submit(&self) -> bool {
        self.score > self.last_saved_score
    }
}

/// Notable things that happened during a step or frame, for the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A new fruit is in hand
    Held { id: FruitId, tier: usize },
    /// The held fruit was released at `x`
    Dropped { id: FruitId, x: f32 },
    /// Two fruits combined into one of `tier`
    Merged { id: FruitId, tier: usize, pos: Vec2, points: u64 },
    /// A fruit left the play area and was discarded
    FellOut { id: FruitId },
    /// The session ended with this score
    GameOver { score: u64 },
    /// The session should be written to storage
    AutosaveDue,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_award_tracks_best() {
        let mut session = Session::default();
        session.award(3);
        session.award(6);
        assert_eq!(session.score, 9);
        assert_eq!(session.best_score, 9);

        session.reset_to(0, 9, false);
        session.award(1);
        assert_eq!(session.score, 1);
        assert_eq!(session.best_score, 9);
    }

    #[test]
    fn test_offer_best_never_lowers() {
        let mut session = Session::default();
        session.award(10);
        session.offer_best(4);
        assert_eq!(session.best_score, 10);
        session.offer_best(40);
        assert_eq!(session.best_score, 40);
    }

    #[test]
    fn test_needs_submit() {
        let mut session = Session::default();
        assert!(!session.needs_submit());
        session.award(5);
        assert!(session.needs_submit());
        session.last_saved_score = 5;
        assert!(!session.needs_submit());
    }

    proptest! {
        #[test]
        fn prop_best_is_running_max(
            points in prop::collection::vec(0u64..100, 0..40),
            restart_at in 0usize..40,
        ) {
            let mut session = Session::default();
            let mut peak = 0;
            for (i, p) in points.into_iter().enumerate() {
                if i == restart_at {
                    session.reset_to(0, session.best_score, false);
                }
                session.award(p);
                peak = peak.max(session.score);
                prop_assert!(session.best_score >= session.score);
                prop_assert_eq!(session.best_score, peak);
            }
        }
    }
}
