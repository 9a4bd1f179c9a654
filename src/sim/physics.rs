//! Rigid-body engine contract
//!
//! The engine integrates bodies and detects contacts; the game only creates,
//! moves and removes bodies and listens for begin-contact pairs.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque handle to a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Two bodies that began touching during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub a: BodyHandle,
    pub b: BodyHandle,
}

impl CollisionPair {
    pub fn new(a: BodyHandle, b: BodyHandle) -> Self {
        Self { a, b }
    }

    /// Order-independent form (lower handle first)
    pub fn normalized(self) -> Self {
        if self.a <= self.b {
            self
        } else {
            Self { a: self.b, b: self.a }
        }
    }

    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.a == handle || self.b == handle
    }

    /// The other body of the pair, if `handle` is one of them
    pub fn other(&self, handle: BodyHandle) -> Option<BodyHandle> {
        if self.a == handle {
            Some(self.b)
        } else if self.b == handle {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Operations the game needs from a rigid-body engine
pub trait PhysicsWorld {
    /// Create a dynamic circle and add it to the world
    fn create_circle(&mut self, pos: Vec2, radius: f32) -> BodyHandle;
    /// Create a static box; sensors report contacts but never push back
    fn create_box(&mut self, center: Vec2, size: Vec2, sensor: bool) -> BodyHandle;
    /// Pin or unpin a body
    fn set_static(&mut self, handle: BodyHandle, is_static: bool);
    fn position(&self, handle: BodyHandle) -> Option<Vec2>;
    fn velocity(&self, handle: BodyHandle) -> Option<Vec2>;
    fn set_position(&mut self, handle: BodyHandle, pos: Vec2);
    /// Remove a body; unknown handles are ignored
    fn remove(&mut self, handle: BodyHandle);
    /// Advance one fixed step and report pairs that began touching
    fn step(&mut self, dt: f32) -> Vec<CollisionPair>;
}
