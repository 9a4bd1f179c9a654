//! Fruit registry
//!
//! Single source of truth for which fruits exist. Owns the physics world so
//! a body and its bookkeeping entry are always created and destroyed together.

use std::collections::BTreeMap;

use glam::Vec2;

use super::physics::PhysicsWorld;
use super::state::{Fruit, FruitId};
use super::tier::Tier;
use crate::error::{GameError, Result};

#[derive(Debug, Clone, Copy)]
struct Entry {
    tier: usize,
    held: bool,
}

/// Live and held fruits keyed by body handle
#[derive(Debug)]
pub struct FruitRegistry<W: PhysicsWorld> {
    world: W,
    fruits: BTreeMap<FruitId, Entry>,
}

impl<W: PhysicsWorld> FruitRegistry<W> {
    pub fn new(world: W) -> Self {
        Self {
            world,
            fruits: BTreeMap::new(),
        }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Create a body sized to `tier` and start tracking it
    pub fn spawn(&mut self, tier: &Tier, pos: Vec2, held: bool) -> FruitId {
        let id = self.world.create_circle(pos, tier.radius);
        if held {
            self.world.set_static(id, true);
        }
        let previous = self.fruits.insert(
            id,
            Entry {
                tier: tier.ordinal,
                held,
            },
        );
        debug_assert!(previous.is_none(), "physics world reused handle {id}");
        id
    }

    /// Hand a held fruit over to physics
    pub fn release(&mut self, id: FruitId) -> Result<()> {
        let entry = self
            .fruits
            .get_mut(&id)
            .ok_or_else(|| GameError::NotFound(format!("fruit {id}")))?;
        if !entry.held {
            return Err(GameError::InvalidState(format!("fruit {id} is already live")));
        }
        entry.held = false;
        self.world.set_static(id, false);
        Ok(())
    }

    /// Destroy a fruit; returns false if it was already gone
    pub fn remove(&mut self, id: FruitId) -> bool {
        if self.fruits.remove(&id).is_some() {
            self.world.remove(id);
            true
        } else {
            false
        }
    }

    /// Destroy every fruit, held ones included
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.fruits).into_keys() {
            self.world.remove(id);
        }
    }

    /// Reposition a fruit (used for the held piece)
    pub fn set_position(&mut self, id: FruitId, pos: Vec2) {
        if self.fruits.contains_key(&id) {
            self.world.set_position(id, pos);
        }
    }

    pub fn contains(&self, id: FruitId) -> bool {
        self.fruits.contains_key(&id)
    }

    pub fn get(&self, id: FruitId) -> Option<Fruit> {
        self.fruits.get(&id).map(|&entry| self.read(id, entry))
    }

    pub fn len(&self) -> usize {
        self.fruits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fruits.is_empty()
    }

    /// Every fruit, held included, sorted by id
    pub fn all(&self) -> Vec<Fruit> {
        self.fruits
            .iter()
            .map(|(&id, &entry)| self.read(id, entry))
            .collect()
    }

    /// Released fruits only, sorted by id; a copy, not a live view
    pub fn all_live(&self) -> Vec<Fruit> {
        self.fruits
            .iter()
            .filter(|(_, entry)| !entry.held)
            .map(|(&id, &entry)| self.read(id, entry))
            .collect()
    }

    fn read(&self, id: FruitId, entry: Entry) -> Fruit {
        Fruit {
            id,
            tier: entry.tier,
            pos: self.world.position(id).unwrap_or(Vec2::ZERO),
            vel: self.world.velocity(id).unwrap_or(Vec2::ZERO),
            held: entry.held,
        }
    }
}
