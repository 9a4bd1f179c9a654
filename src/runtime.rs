//! Fixed-timestep driver
//!
//! `Runner` owns a `GameSession` plus the stores it reports to. Each host frame
//! it applies input, runs as many fixed physics steps as the elapsed time
//! covers (capped at `MAX_SUBSTEPS`), runs the per-frame pass, then reacts to
//! the session's events: autosaves, best-score writes and leaderboard
//! submission. Storage failures are logged and retried on the next autosave,
//! and so is a leaderboard submission that failed after game over.
//!
//! A paused runner ignores input and elapsed time until it is resumed.

use rand::Rng;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::Result;
use crate::leaderboard::{ScoreBoard, ScoreEntry};
use crate::persistence::{SessionStore, Storage};
use crate::sim::{GameEvent, GameSession, PersistedSnapshot, PhysicsWorld};

/// Largest frame delta accepted; longer stalls are dropped, not replayed
const MAX_FRAME_DT: f32 = 0.1;

/// Player input for one host frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Drop-carriage target x, if the pointer moved
    pub target_x: Option<f32>,
    /// Release the held fruit
    pub release: bool,
    /// Start a fresh game
    pub restart: bool,
}

pub struct Runner<W: PhysicsWorld, S: Storage, L: ScoreBoard> {
    game: GameSession<W>,
    store: SessionStore<S>,
    scores: L,
    user_id: String,
    accumulator: f32,
    paused: bool,
    /// Best score most recently written to the store
    persisted_best: u64,
}

impl<W: PhysicsWorld, S: Storage, L: ScoreBoard> Runner<W, S, L> {
    /// Resume the saved session (if any) and pick up the stored best score
    pub fn new<R: Rng>(
        game: GameSession<W>,
        mut store: SessionStore<S>,
        scores: L,
        rng: &mut R,
    ) -> Self {
        let user_id = store.user_id(rng);
        let mut runner = Self {
            game,
            store,
            scores,
            user_id,
            accumulator: 0.0,
            paused: false,
            persisted_best: 0,
        };
        runner.load_saved();
        runner
    }

    fn load_saved(&mut self) {
        match self.store.load_session() {
            Ok(Some(json)) => match PersistedSnapshot::from_json(&json) {
                Ok(snapshot) => {
                    self.game.restore(&snapshot);
                }
                Err(e) => log::warn!("Ignoring malformed saved session: {e}"),
            },
            Ok(None) => log::info!("No saved session, starting fresh"),
            Err(e) => log::warn!("Could not load saved session: {e}"),
        }

        match self.store.load_best_score() {
            Ok(Some(best)) => {
                self.persisted_best = best;
                self.game.offer_best_score(best);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Could not load best score: {e}"),
        }
    }

    pub fn game(&self) -> &GameSession<W> {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameSession<W> {
        &mut self.game
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn scores(&self) -> &L {
        &self.scores
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop the clock and save right away (page hidden, window blurred)
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        log::info!("Paused at tick {}", self.game.time_ticks());
        if let Err(e) = self.autosave() {
            log::warn!("Save on pause failed: {e}");
        }
    }

    /// Continue from where `pause` stopped; time spent paused is not replayed
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.accumulator = 0.0;
        log::info!("Resumed at tick {}", self.game.time_ticks());
    }

    /// Run one host frame of `dt` seconds; returns the events it produced
    pub fn update(&mut self, dt: f32, input: &TickInput) -> Vec<GameEvent> {
        if self.paused {
            return Vec::new();
        }
        if input.restart {
            self.game.restart();
        }
        if let Some(x) = input.target_x {
            self.game.move_drop(x);
        }
        if input.release {
            if let Err(e) = self.game.drop_fruit() {
                log::debug!("Release ignored: {e}");
            }
        }

        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.game.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        self.game.frame();

        let events = self.game.drain_events();
        for event in &events {
            match event {
                GameEvent::AutosaveDue => {
                    if let Err(e) = self.autosave() {
                        log::warn!("Autosave failed: {e}");
                    }
                    if self.game.is_game_over() {
                        self.submit_score();
                    }
                }
                GameEvent::GameOver { .. } => self.submit_score(),
                _ => {}
            }
        }
        events
    }

    /// Write the session snapshot and, if it improved, the best score
    pub fn autosave(&mut self) -> Result<()> {
        let json = self.game.snapshot().to_json()?;
        self.store.save_session(&json)?;

        let best = self.game.best_score();
        if best > self.persisted_best {
            self.store.save_best_score(best)?;
            self.persisted_best = best;
        }
        Ok(())
    }

    /// Send the score to the leaderboard unless it was already sent.
    /// Called on game over and again on every later autosave until it lands.
    fn submit_score(&mut self) {
        if !self.game.session().needs_submit() {
            return;
        }
        let score = self.game.score();
        match self.scores.submit_score(&self.user_id, score) {
            Ok(()) => self.game.mark_score_submitted(score),
            Err(e) => log::warn!("Score submission failed: {e}"),
        }
    }

    /// Top rows of the leaderboard; empty if it cannot be read
    pub fn top_scores(&self) -> Vec<ScoreEntry> {
        let limit = self.game.config().leaderboard_size;
        self.scores.fetch_top_scores(limit).unwrap_or_else(|e| {
            log::warn!("Could not fetch leaderboard: {e}");
            Vec::new()
        })
    }
}
