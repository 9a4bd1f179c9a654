//! Drop controller
//!
//! `Empty -> Held -> Released -> Empty`. The released-to-empty edge is driven
//! by the session's cooldown task, not by this type.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::arena::Arena;
use super::physics::PhysicsWorld;
use super::registry::FruitRegistry;
use super::state::FruitId;
use super::tier::TierCatalog;
use crate::error::{GameError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropState {
    /// Nothing in hand
    Empty,
    /// A pinned fruit follows the drop carriage
    Held { id: FruitId },
    /// Just dropped; waiting out the cooldown
    Released,
}

/// Hands fruits to the player and releases them into the well
#[derive(Debug, Clone)]
pub struct DropController {
    state: DropState,
    /// Tier ordinal of the upcoming fruit
    preview: usize,
    /// Where the last fruit was dropped; the next one starts there
    last_drop_x: Option<f32>,
    /// Size of the tier pool fruits are rolled from
    pool: usize,
    rng: Pcg32,
}

impl DropController {
    pub fn new(seed: u64, starter_tiers: usize, catalog: &TierCatalog) -> Self {
        let mut controller = Self {
            state: DropState::Empty,
            preview: 0,
            last_drop_x: None,
            pool: starter_tiers.clamp(1, catalog.tier_count()),
            rng: Pcg32::seed_from_u64(seed),
        };
        controller.preview = controller.roll();
        controller
    }

    fn roll(&mut self) -> usize {
        self.rng.random_range(0..self.pool)
    }

    pub fn state(&self) -> DropState {
        self.state
    }

    /// Tier ordinal the next `request_next` will hand out
    pub fn preview(&self) -> usize {
        self.preview
    }

    pub fn held(&self) -> Option<FruitId> {
        match self.state {
            DropState::Held { id } => Some(id),
            _ => None,
        }
    }

    pub fn last_drop_x(&self) -> Option<f32> {
        self.last_drop_x
    }

    /// Spawn the previewed fruit in hand. A no-op unless the hand is empty,
    /// since input and the cooldown timer can race here.
    pub fn request_next<W: PhysicsWorld>(
        &mut self,
        registry: &mut FruitRegistry<W>,
        catalog: &TierCatalog,
        arena: &Arena,
    ) -> Option<FruitId> {
        if self.state != DropState::Empty {
            log::debug!("request_next ignored in {:?}", self.state);
            return None;
        }

        let tier = match catalog.tier_at(self.preview) {
            Ok(tier) => tier,
            Err(e) => {
                log::warn!("Cannot spawn held fruit: {e}");
                return None;
            }
        };
        let x = self.last_drop_x.unwrap_or_else(|| arena.center_x());
        let id = registry.spawn(tier, arena.held_position(x, tier.radius), true);

        self.state = DropState::Held { id };
        self.preview = self.roll();
        Some(id)
    }

    /// Follow the drop carriage; ignored when nothing is held
    pub fn move_to<W: PhysicsWorld>(
        &mut self,
        registry: &mut FruitRegistry<W>,
        catalog: &TierCatalog,
        arena: &Arena,
        x: f32,
    ) {
        let Some(id) = self.held() else {
            return;
        };
        let Some(fruit) = registry.get(id) else {
            return;
        };
        let Ok(tier) = catalog.tier_at(fruit.tier) else {
            return;
        };
        let mut pos = fruit.pos;
        pos.x = arena.clamp_drop_x(x, tier.radius);
        registry.set_position(id, pos);
    }

    /// Release the held fruit; returns its id and drop x
    pub fn drop<W: PhysicsWorld>(&mut self, registry: &mut FruitRegistry<W>) -> Result<(FruitId, f32)> {
        let Some(id) = self.held() else {
            return Err(GameError::InvalidState(format!(
                "no fruit in hand ({:?})",
                self.state
            )));
        };
        let Some(fruit) = registry.get(id) else {
            // Held fruit vanished underneath us; recover to Empty
            self.state = DropState::Empty;
            return Err(GameError::NotFound(format!("held fruit {id}")));
        };

        registry.release(id)?;
        self.last_drop_x = Some(fruit.pos.x);
        self.state = DropState::Released;
        Ok((id, fruit.pos.x))
    }

    /// Cooldown elapsed: `Released -> Empty`
    pub fn finish_cooldown(&mut self) {
        if self.state == DropState::Released {
            self.state = DropState::Empty;
        }
    }

    /// Forget the hand (its fruit was cleared elsewhere), keep the drop x
    pub fn clear_hand(&mut self) {
        self.state = DropState::Empty;
    }

    /// Back to a fresh session: empty hand, centred spawn
    pub fn reset(&mut self) {
        self.state = DropState::Empty;
        self.last_drop_x = None;
    }
}
