//! Game session
//!
//! One explicit context object owning every component: the registry (and
//! through it the physics world), the drop controller, the game-over monitor,
//! the task scheduler and the score record. Hosts drive it with `step` at the
//! fixed physics rate and `frame` once per rendered frame.
//!
//! Restart and restore bump `generation`; tasks scheduled under an older
//! generation are discarded when they fire.

use glam::Vec2;

use super::arena::Arena;
use super::drop::{DropController, DropState};
use super::merge::{StepOutcome, resolve_step};
use super::monitor::{GameOverMonitor, fallen_out};
use super::physics::{BodyHandle, PhysicsWorld};
use super::registry::FruitRegistry;
use super::schedule::{Scheduler, TaskKind};
use super::snapshot::{FruitRecord, PersistedSnapshot, RestoreSummary};
use super::state::{Fruit, FruitId, GameEvent, Session};
use super::tier::TierCatalog;
use crate::config::GameConfig;
use crate::consts::SIM_DT;
use crate::error::{GameError, Result};

pub struct GameSession<W: PhysicsWorld> {
    config: GameConfig,
    catalog: TierCatalog,
    arena: Arena,
    registry: FruitRegistry<W>,
    dropper: DropController,
    monitor: GameOverMonitor,
    scheduler: Scheduler,
    session: Session,
    top_sensor: BodyHandle,
    /// Bumped on restart/restore to invalidate pending tasks
    generation: u64,
    /// Physics steps since the session was created
    time_ticks: u64,
    events: Vec<GameEvent>,
}

impl<W: PhysicsWorld> GameSession<W> {
    /// Build the arena in `world` and hand out the first fruit
    pub fn new(mut world: W, catalog: TierCatalog, config: GameConfig, seed: u64) -> Self {
        let arena = Arena::from_config(&config);
        let top_sensor = arena.build(&mut world);
        let dropper = DropController::new(seed, config.starter_tiers, &catalog);
        let monitor = GameOverMonitor::new(config.stillness_speed);

        let mut game = Self {
            config,
            catalog,
            arena,
            registry: FruitRegistry::new(world),
            dropper,
            monitor,
            scheduler: Scheduler::new(),
            session: Session::default(),
            top_sensor,
            generation: 0,
            time_ticks: 0,
            events: Vec::new(),
        };
        log::info!(
            "Session started (seed {seed}, {} tiers)",
            game.catalog.tier_count()
        );
        game.schedule_autosave();
        game.request_next();
        game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn registry(&self) -> &FruitRegistry<W> {
        &self.registry
    }

    pub fn world(&self) -> &W {
        self.registry.world()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    pub fn best_score(&self) -> u64 {
        self.session.best_score
    }

    pub fn is_game_over(&self) -> bool {
        self.session.game_over
    }

    pub fn drop_state(&self) -> DropState {
        self.dropper.state()
    }

    /// The fruit currently in hand
    pub fn held_fruit(&self) -> Option<Fruit> {
        self.dropper.held().and_then(|id| self.registry.get(id))
    }

    /// Tier ordinal of the fruit after the held one
    pub fn preview_tier(&self) -> usize {
        self.dropper.preview()
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A fruit touched the top of the well and is still above the scoreline
    pub fn in_danger(&self) -> bool {
        self.monitor.in_danger()
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Raise the best score from storage
    pub fn offer_best_score(&mut self, best: u64) {
        self.session.offer_best(best);
    }

    /// Record that `score` reached the leaderboard
    pub fn mark_score_submitted(&mut self, score: u64) {
        self.session.last_saved_score = self.session.last_saved_score.max(score);
    }

    fn schedule(&mut self, delay: u64, kind: TaskKind) {
        self.scheduler
            .schedule(self.time_ticks + delay, self.generation, kind);
    }

    fn schedule_autosave(&mut self) {
        self.schedule(self.config.autosave_interval_ticks(), TaskKind::Autosave);
    }

    // === Drop controller ===

    /// Put the previewed fruit in hand (no-op unless the hand is empty)
    pub fn request_next(&mut self) -> Option<FruitId> {
        let id = self
            .dropper
            .request_next(&mut self.registry, &self.catalog, &self.arena)?;
        let tier = self.registry.get(id).map_or(0, |f| f.tier);
        self.events.push(GameEvent::Held { id, tier });
        Some(id)
    }

    /// Move the held fruit toward drop-carriage `x`
    pub fn move_drop(&mut self, x: f32) {
        self.dropper
            .move_to(&mut self.registry, &self.catalog, &self.arena, x);
    }

    /// Release the held fruit and start the cooldown
    pub fn drop_fruit(&mut self) -> Result<FruitId> {
        if self.session.game_over {
            return Err(GameError::InvalidState("game is over".into()));
        }
        let (id, x) = self.dropper.drop(&mut self.registry)?;
        self.schedule(self.config.drop_cooldown_ticks(), TaskKind::DropCooldown);
        self.events.push(GameEvent::Dropped { id, x });
        Ok(id)
    }

    // === Simulation ===

    /// Advance physics one fixed step and resolve its collisions
    pub fn step(&mut self) {
        self.time_ticks += 1;
        let pairs = self.registry.world_mut().step(SIM_DT);
        if pairs.is_empty() {
            return;
        }
        let outcome = resolve_step(
            &pairs,
            &self.registry.all(),
            &self.catalog,
            Some(self.top_sensor),
        );
        self.apply(outcome);
    }

    /// Merges and score keep applying after game over; only the
    /// boundary touches are ignored then
    fn apply(&mut self, outcome: StepOutcome) {
        for &id in &outcome.removals {
            self.registry.remove(id);
        }
        for merge in &outcome.merges {
            let Ok(tier) = self.catalog.tier_at(merge.tier) else {
                continue;
            };
            let id = self.registry.spawn(tier, merge.pos, false);
            log::debug!(
                "Merged {} + {} into {} (+{})",
                merge.consumed[0],
                merge.consumed[1],
                tier.key,
                merge.points
            );
            self.events.push(GameEvent::Merged {
                id,
                tier: merge.tier,
                pos: merge.pos,
                points: merge.points,
            });
        }
        if outcome.score_delta > 0 {
            self.session.award(outcome.score_delta);
        }

        if !self.session.game_over {
            for id in outcome.boundary_touches {
                self.monitor.note_boundary_touch(id);
            }
        }
    }

    /// Per-frame work: fire due timers, discard fallen fruits, watch for game over
    pub fn frame(&mut self) {
        self.run_due_tasks();

        for id in fallen_out(&self.registry.all(), &self.arena) {
            if self.registry.remove(id) {
                log::info!("Removed fruit {id} that fell out of bounds");
                self.events.push(GameEvent::FellOut { id });
            }
        }

        let live = self.registry.all_live();
        if let Some(window) = self
            .monitor
            .observe(&live, &self.arena, self.session.game_over)
        {
            self.schedule(
                self.config.game_over_grace_ticks(),
                TaskKind::ConfirmGameOver { window },
            );
        }
    }

    fn run_due_tasks(&mut self) {
        for task in self.scheduler.take_due(self.time_ticks) {
            if task.generation != self.generation {
                log::debug!(
                    "Discarding stale {:?} from generation {}",
                    task.kind,
                    task.generation
                );
                continue;
            }
            match task.kind {
                TaskKind::DropCooldown => {
                    self.dropper.finish_cooldown();
                    self.request_next();
                }
                TaskKind::ConfirmGameOver { window } => {
                    let live = self.registry.all_live();
                    if self.monitor.confirm(window, &live, &self.arena) {
                        self.declare_game_over();
                    }
                }
                TaskKind::Autosave => {
                    self.events.push(GameEvent::AutosaveDue);
                    self.schedule_autosave();
                }
            }
        }
    }

    fn declare_game_over(&mut self) {
        if self.session.game_over {
            return;
        }
        self.session.game_over = true;
        log::info!(
            "Game over - fruits stayed above the scoreline (score {})",
            self.session.score
        );
        self.events.push(GameEvent::GameOver {
            score: self.session.score,
        });
        self.events.push(GameEvent::AutosaveDue);
    }

    // === Session state store ===

    /// Capture score flags and every released fruit
    pub fn snapshot(&self) -> PersistedSnapshot {
        let fruits = self
            .registry
            .all_live()
            .into_iter()
            .filter_map(|fruit| {
                let tier = self.catalog.tier_at(fruit.tier).ok()?;
                Some(FruitRecord {
                    kind: tier.key.clone(),
                    x: fruit.pos.x,
                    y: fruit.pos.y,
                })
            })
            .collect();

        PersistedSnapshot {
            score: self.session.score,
            best_score: self.session.best_score,
            is_game_over: self.session.game_over,
            fruits,
        }
    }

    /// Replace the session with a saved one. Unknown tier keys are skipped.
    pub fn restore(&mut self, snapshot: &PersistedSnapshot) -> RestoreSummary {
        self.generation += 1;
        self.registry.clear();
        self.dropper.clear_hand();
        self.monitor.reset();

        let mut summary = RestoreSummary::default();
        for record in &snapshot.fruits {
            match self.catalog.tier_by_key(&record.kind) {
                Ok(tier) => {
                    self.registry
                        .spawn(tier, Vec2::new(record.x, record.y), false);
                    summary.restored += 1;
                }
                Err(e) => {
                    log::warn!("Skipping saved fruit: {e}");
                    summary.skipped += 1;
                }
            }
        }

        self.session
            .reset_to(snapshot.score, snapshot.best_score, snapshot.is_game_over);
        log::info!(
            "Session restored: score {}, {} fruits ({} skipped)",
            snapshot.score,
            summary.restored,
            summary.skipped
        );

        self.schedule_autosave();
        self.request_next();
        summary
    }

    /// Fresh game: empty well, zero score, best score kept
    pub fn restart(&mut self) {
        self.dropper.reset();
        let empty = PersistedSnapshot {
            score: 0,
            best_score: self.session.best_score,
            is_game_over: false,
            fruits: Vec::new(),
        };
        self.restore(&empty);
        self.events.push(GameEvent::AutosaveDue);
        log::info!("Game restarted");
    }
}
