//! Merge resolution
//!
//! `resolve_step` decides, from one step's begin-contact pairs and a copy of
//! the registry, which fruits combine. It mutates nothing; the session applies
//! the outcome in one go.
//!
//! Pairs are normalised and sorted by handle before processing, so the
//! outcome does not depend on the order the engine reported them in. A fruit
//! consumed by one merge is skipped by every later pair in the same step.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use super::physics::{BodyHandle, CollisionPair};
use super::state::{Fruit, FruitId};
use super::tier::TierCatalog;

/// Two fruits of one tier combining into the next
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub consumed: [FruitId; 2],
    /// Tier ordinal of the new fruit
    pub tier: usize,
    /// Midpoint of the two consumed fruits
    pub pos: Vec2,
    pub points: u64,
}

/// Everything a step's collisions imply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub merges: Vec<Merge>,
    /// Fruits to destroy (both halves of every merge)
    pub removals: Vec<FruitId>,
    pub score_delta: u64,
    /// Live fruits that touched the top sensor without merging
    pub boundary_touches: Vec<FruitId>,
}

impl StepOutcome {
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty() && self.boundary_touches.is_empty()
    }
}

/// Resolve one step of collision pairs against the registry contents
pub fn resolve_step(
    pairs: &[CollisionPair],
    fruits: &[Fruit],
    catalog: &TierCatalog,
    top_sensor: Option<BodyHandle>,
) -> StepOutcome {
    let fruits: BTreeMap<FruitId, &Fruit> = fruits.iter().map(|f| (f.id, f)).collect();

    let mut pairs: Vec<CollisionPair> = pairs.iter().map(|p| p.normalized()).collect();
    pairs.sort_by_key(|p| (p.a, p.b));
    pairs.dedup();

    let mut outcome = StepOutcome::default();
    let mut consumed = BTreeSet::new();

    for pair in &pairs {
        if top_sensor.is_some_and(|sensor| pair.involves(sensor)) {
            continue;
        }
        if consumed.contains(&pair.a) || consumed.contains(&pair.b) {
            continue;
        }
        // Unknown handles: walls, or fruits already gone
        let (Some(a), Some(b)) = (fruits.get(&pair.a), fruits.get(&pair.b)) else {
            continue;
        };
        if a.held || b.held || a.tier != b.tier || catalog.is_terminal(a.tier) {
            continue;
        }
        let Some(next) = catalog.next_tier(a.tier) else {
            continue;
        };

        consumed.insert(a.id);
        consumed.insert(b.id);
        outcome.merges.push(Merge {
            consumed: [a.id, b.id],
            tier: next.ordinal,
            pos: (a.pos + b.pos) / 2.0,
            points: next.score,
        });
        outcome.removals.extend([a.id, b.id]);
        outcome.score_delta += next.score;
    }

    if let Some(sensor) = top_sensor {
        for other in pairs.iter().filter_map(|p| p.other(sensor)) {
            let live = fruits.get(&other).is_some_and(|f| f.is_live());
            if live && !consumed.contains(&other) {
                outcome.boundary_touches.push(other);
            }
        }
    }

    outcome
}
