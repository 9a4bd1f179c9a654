//! Game-over monitor
//!
//! Runs once per frame. When settled fruits sit above the scoreline it opens
//! a confirmation window over exactly those fruits; the session schedules a
//! check for when the window elapses. If any watched fruit moves, sinks or
//! disappears first, the window closes and its pending check goes stale.

use std::collections::BTreeSet;

use super::arena::Arena;
use super::state::{Fruit, FruitId};

#[derive(Debug, Clone)]
struct Window {
    id: u64,
    watched: Vec<FruitId>,
}

#[derive(Debug, Clone)]
pub struct GameOverMonitor {
    stillness_speed: f32,
    window: Option<Window>,
    /// Window ids are never reused, so stale checks cannot match
    last_window: u64,
    /// Live fruits that touched the top sensor and are still above the scoreline
    boundary: BTreeSet<FruitId>,
}

impl GameOverMonitor {
    pub fn new(stillness_speed: f32) -> Self {
        Self {
            stillness_speed,
            window: None,
            last_window: 0,
            boundary: BTreeSet::new(),
        }
    }

    /// Released, above the scoreline and (nearly) at rest
    pub fn qualifies(&self, fruit: &Fruit, arena: &Arena) -> bool {
        fruit.is_live() && fruit.pos.y < arena.scoreline_y && fruit.speed() < self.stillness_speed
    }

    fn all_qualify(&self, watched: &[FruitId], live: &[Fruit], arena: &Arena) -> bool {
        watched.iter().all(|id| {
            live.iter()
                .find(|f| f.id == *id)
                .is_some_and(|f| self.qualifies(f, arena))
        })
    }

    /// Per-frame pass. Returns the id of a newly opened window, if any.
    pub fn observe(&mut self, live: &[Fruit], arena: &Arena, game_over: bool) -> Option<u64> {
        self.boundary.retain(|id| {
            live.iter()
                .any(|f| f.id == *id && f.pos.y < arena.scoreline_y)
        });

        if game_over {
            self.window = None;
            return None;
        }

        let holding = self
            .window
            .as_ref()
            .map(|w| self.all_qualify(&w.watched, live, arena));
        match holding {
            Some(true) => return None,
            Some(false) => {
                if let Some(window) = self.window.take() {
                    log::debug!("Game-over window {} interrupted", window.id);
                }
            }
            None => {}
        }

        let watched: Vec<FruitId> = live
            .iter()
            .filter(|f| self.qualifies(f, arena))
            .map(|f| f.id)
            .collect();
        if watched.is_empty() {
            return None;
        }

        self.last_window += 1;
        log::debug!(
            "Game-over window {} opened ({} fruits above scoreline)",
            self.last_window,
            watched.len()
        );
        self.window = Some(Window {
            id: self.last_window,
            watched,
        });
        Some(self.last_window)
    }

    /// The check for `window_id` fired: true if every watched fruit still qualifies
    pub fn confirm(&mut self, window_id: u64, live: &[Fruit], arena: &Arena) -> bool {
        match self.window.take() {
            Some(window) if window.id == window_id => self.all_qualify(&window.watched, live, arena),
            other => {
                self.window = other;
                log::debug!("Stale game-over check {window_id} ignored");
                false
            }
        }
    }

    pub fn pending_window(&self) -> Option<u64> {
        self.window.as_ref().map(|w| w.id)
    }

    /// Advisory top-sensor contact
    pub fn note_boundary_touch(&mut self, id: FruitId) {
        self.boundary.insert(id);
    }

    /// Some fruit touched the top sensor and has not sunk below the scoreline
    pub fn in_danger(&self) -> bool {
        !self.boundary.is_empty()
    }

    pub fn reset(&mut self) {
        self.window = None;
        self.boundary.clear();
    }
}

/// Fruits that fell past the bottom of the play area
pub fn fallen_out(fruits: &[Fruit], arena: &Arena) -> Vec<FruitId> {
    fruits
        .iter()
        .filter(|f| f.pos.y > arena.out_of_bounds_y)
        .map(|f| f.id)
        .collect()
}
