//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body handle)
//! - No rendering or platform dependencies

pub mod arena;
pub mod drop;
pub mod merge;
pub mod monitor;
pub mod physics;
pub mod registry;
pub mod schedule;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod tier;
pub mod world;

pub use arena::Arena;
pub use drop::{DropController, DropState};
pub use merge::{Merge, StepOutcome, resolve_step};
pub use monitor::{GameOverMonitor, fallen_out};
pub use physics::{BodyHandle, CollisionPair, PhysicsWorld};
pub use registry::FruitRegistry;
pub use schedule::{Scheduler, Task, TaskKind};
pub use session::GameSession;
pub use snapshot::{FruitRecord, PersistedSnapshot, RestoreSummary};
pub use state::{Fruit, FruitId, GameEvent, Session};
pub use tier::{Tier, TierCatalog};
pub use world::SimpleWorld;
