//! Tier catalog
//!
//! The ordered merge progression. Ordinal 0 is the smallest fruit; the last
//! ordinal is terminal and never merges further.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// One rank in the merge progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Rank (assigned from position in the catalog)
    #[serde(skip)]
    pub ordinal: usize,
    /// Display key (sprite name, save-file key)
    pub key: String,
    /// Body radius in pixels
    pub radius: f32,
    /// Points awarded when a fruit of this tier is created by merging
    pub score: u64,
    /// Display colour (0xRRGGBB)
    #[serde(default)]
    pub color: u32,
}

/// Immutable lookup table of tiers
#[derive(Debug, Clone)]
pub struct TierCatalog {
    tiers: Vec<Tier>,
}

impl TierCatalog {
    /// Build a catalog, checking ordering invariants
    pub fn new(mut tiers: Vec<Tier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(GameError::InvalidCatalog("catalog has no tiers".into()));
        }
        for (ordinal, tier) in tiers.iter_mut().enumerate() {
            tier.ordinal = ordinal;
        }
        for pair in tiers.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if hi.radius <= lo.radius {
                return Err(GameError::InvalidCatalog(format!(
                    "radius of '{}' must exceed '{}'",
                    hi.key, lo.key
                )));
            }
            if hi.score <= lo.score {
                return Err(GameError::InvalidCatalog(format!(
                    "score of '{}' must exceed '{}'",
                    hi.key, lo.key
                )));
            }
        }
        for (i, tier) in tiers.iter().enumerate() {
            if tiers[..i].iter().any(|t| t.key == tier.key) {
                return Err(GameError::InvalidCatalog(format!(
                    "duplicate key '{}'",
                    tier.key
                )));
            }
        }
        Ok(Self { tiers })
    }

    /// Load a catalog from a JSON array of tiers
    pub fn from_json(json: &str) -> Result<Self> {
        let tiers: Vec<Tier> = serde_json::from_str(json)?;
        Self::new(tiers)
    }

    /// The stock eleven-fruit progression
    pub fn standard() -> Self {
        const FRUITS: [(&str, f32, u64, u32); 11] = [
            ("cherry", 15.0, 1, 0xF20306),
            ("strawberry", 20.0, 3, 0xFF624C),
            ("grape", 24.0, 6, 0xA969FF),
            ("kumkwat", 28.0, 10, 0xFFAF02),
            ("lemon", 32.0, 15, 0xFC8611),
            ("apple", 40.0, 21, 0xF41615),
            ("mango", 46.0, 28, 0xFDF176),
            ("peach", 53.0, 36, 0xFEB6AC),
            ("pineapple", 61.0, 45, 0xF7E608),
            ("melon", 75.0, 55, 0x89CE13),
            ("watermelon", 85.0, 66, 0x26AA1E),
        ];

        let tiers = FRUITS
            .iter()
            .enumerate()
            .map(|(ordinal, &(key, radius, score, color))| Tier {
                ordinal,
                key: key.to_string(),
                radius,
                score,
                color,
            })
            .collect();
        Self { tiers }
    }

    pub fn tier_at(&self, ordinal: usize) -> Result<&Tier> {
        self.tiers
            .get(ordinal)
            .ok_or_else(|| GameError::NotFound(format!("tier ordinal {ordinal}")))
    }

    pub fn tier_by_key(&self, key: &str) -> Result<&Tier> {
        self.tiers
            .iter()
            .find(|t| t.key == key)
            .ok_or_else(|| GameError::NotFound(format!("tier '{key}'")))
    }

    /// The tier a merge of `ordinal` produces (None at the terminal tier)
    pub fn next_tier(&self, ordinal: usize) -> Option<&Tier> {
        self.tiers.get(ordinal.checked_add(1)?)
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Highest ordinal; fruits of this tier never merge
    pub fn terminal(&self) -> usize {
        self.tiers.len() - 1
    }

    pub fn is_terminal(&self, ordinal: usize) -> bool {
        ordinal >= self.terminal()
    }
}
