//! Reference rigid-body world
//!
//! A small impulse solver for circles against circles and static boxes.
//! It drives the tests and the headless binary; hosts embedding a real
//! engine implement `PhysicsWorld` over that engine instead.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use super::physics::{BodyHandle, CollisionPair, PhysicsWorld};

/// Position-correction passes per step
const SOLVER_ITERATIONS: usize = 4;
const RESTITUTION: f32 = 0.1;
const FRICTION: f32 = 0.5;
/// Fraction of penetration removed per pass
const CORRECTION: f32 = 0.8;
/// Bodies closer than this still count as touching
const CONTACT_SLOP: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
enum Shape {
    Circle { radius: f32 },
    Box { half: Vec2 },
}

#[derive(Debug, Clone)]
struct Body {
    shape: Shape,
    pos: Vec2,
    vel: Vec2,
    is_static: bool,
    sensor: bool,
}

impl Body {
    fn inv_mass(&self) -> f32 {
        match self.shape {
            _ if self.is_static => 0.0,
            Shape::Circle { radius } => 1.0 / (radius * radius),
            Shape::Box { .. } => 0.0,
        }
    }
}

/// Result of a contact check
#[derive(Debug, Clone)]
pub struct Contact {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vec2,
    /// Overlap depth (negative = separation gap)
    pub penetration: f32,
}

impl Contact {
    fn new(normal: Vec2, penetration: f32) -> Self {
        Self {
            hit: penetration > 0.0,
            normal,
            penetration,
        }
    }

    /// Shapes that are never tested against each other
    fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: f32::NEG_INFINITY,
        }
    }

    fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Contact between two circles (normal from `a` toward `b`)
pub fn circle_circle(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> Contact {
    let delta = pos_b - pos_a;
    let dist = delta.length();
    // Coincident centres: separate vertically
    let normal = if dist > 1e-4 { delta / dist } else { Vec2::Y };
    Contact::new(normal, radius_a + radius_b - dist)
}

/// Contact between an axis-aligned box and a circle (normal from box toward circle)
pub fn box_circle(center: Vec2, half: Vec2, circle_pos: Vec2, radius: f32) -> Contact {
    let closest = circle_pos.clamp(center - half, center + half);
    let delta = circle_pos - closest;
    let dist = delta.length();

    if dist > 1e-4 {
        return Contact::new(delta / dist, radius - dist);
    }

    // Circle centre inside the box: push out along the shallowest axis
    let local = circle_pos - center;
    let overlap = half - local.abs();
    if overlap.x < overlap.y {
        let normal = Vec2::new(local.x.signum(), 0.0);
        Contact::new(normal, radius + overlap.x)
    } else {
        let normal = Vec2::new(0.0, local.y.signum());
        Contact::new(normal, radius + overlap.y)
    }
}

fn contact_between(a: &Body, b: &Body) -> Contact {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a.pos, ra, b.pos, rb)
        }
        (Shape::Box { half }, Shape::Circle { radius }) => box_circle(a.pos, half, b.pos, radius),
        (Shape::Circle { radius }, Shape::Box { half }) => {
            box_circle(b.pos, half, a.pos, radius).flipped()
        }
        (Shape::Box { .. }, Shape::Box { .. }) => Contact::miss(),
    }
}

/// In-process physics world with gravity and begin-contact reporting
#[derive(Debug, Clone)]
pub struct SimpleWorld {
    gravity: Vec2,
    /// Bodies keyed by handle (stable iteration order)
    bodies: BTreeMap<BodyHandle, Body>,
    /// Pairs touching at the end of the previous step
    touching: BTreeSet<(BodyHandle, BodyHandle)>,
    next_id: u32,
}

impl SimpleWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: BTreeMap::new(),
            touching: BTreeSet::new(),
            next_id: 1,
        }
    }

    /// World with downward gravity of `g` px/s²
    pub fn with_gravity(g: f32) -> Self {
        Self::new(Vec2::new(0.0, g))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, vel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            if !body.is_static {
                body.vel = vel;
            }
        }
    }

    fn insert(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.insert(handle, body);
        handle
    }

    /// Push two overlapping solid bodies apart and exchange impulse
    fn solve_pair(&mut self, ha: BodyHandle, hb: BodyHandle) {
        let (Some(a), Some(b)) = (self.bodies.get(&ha), self.bodies.get(&hb)) else {
            return;
        };
        if a.sensor || b.sensor {
            return;
        }
        let (inv_a, inv_b) = (a.inv_mass(), b.inv_mass());
        let total = inv_a + inv_b;
        if total == 0.0 {
            return;
        }
        let contact = contact_between(a, b);
        if !contact.hit {
            return;
        }

        let (mut a, mut b) = (a.clone(), b.clone());
        let normal = contact.normal;

        let correction = normal * (contact.penetration * CORRECTION / total);
        a.pos -= correction * inv_a;
        b.pos += correction * inv_b;

        let vn = (b.vel - a.vel).dot(normal);
        if vn < 0.0 {
            let impulse = normal * (-(1.0 + RESTITUTION) * vn / total);
            a.vel -= impulse * inv_a;
            b.vel += impulse * inv_b;

            let tangent = Vec2::new(-normal.y, normal.x);
            let vt = (b.vel - a.vel).dot(tangent);
            let friction = tangent * (-vt / total * FRICTION);
            a.vel -= friction * inv_a;
            b.vel += friction * inv_b;
        }

        self.bodies.insert(ha, a);
        self.bodies.insert(hb, b);
    }
}

impl PhysicsWorld for SimpleWorld {
    fn create_circle(&mut self, pos: Vec2, radius: f32) -> BodyHandle {
        self.insert(Body {
            shape: Shape::Circle { radius },
            pos,
            vel: Vec2::ZERO,
            is_static: false,
            sensor: false,
        })
    }

    fn create_box(&mut self, center: Vec2, size: Vec2, sensor: bool) -> BodyHandle {
        self.insert(Body {
            shape: Shape::Box { half: size / 2.0 },
            pos: center,
            vel: Vec2::ZERO,
            is_static: true,
            sensor,
        })
    }

    fn set_static(&mut self, handle: BodyHandle, is_static: bool) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.is_static = is_static;
            body.vel = Vec2::ZERO;
        }
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.pos)
    }

    fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.vel)
    }

    fn set_position(&mut self, handle: BodyHandle, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.pos = pos;
        }
    }

    fn remove(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    fn step(&mut self, dt: f32) -> Vec<CollisionPair> {
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| !b.is_static) {
            body.vel += gravity * dt;
            body.pos += body.vel * dt;
        }

        let handles: Vec<BodyHandle> = self.bodies.keys().copied().collect();
        for _ in 0..SOLVER_ITERATIONS {
            for (i, &ha) in handles.iter().enumerate() {
                for &hb in &handles[i + 1..] {
                    self.solve_pair(ha, hb);
                }
            }
        }

        let mut touching = BTreeSet::new();
        for (i, &ha) in handles.iter().enumerate() {
            for &hb in &handles[i + 1..] {
                let (a, b) = (&self.bodies[&ha], &self.bodies[&hb]);
                if a.inv_mass() + b.inv_mass() == 0.0 {
                    continue;
                }
                if contact_between(a, b).penetration > -CONTACT_SLOP {
                    touching.insert((ha, hb));
                }
            }
        }

        let began = touching
            .difference(&self.touching)
            .map(|&(a, b)| CollisionPair::new(a, b))
            .collect();
        self.touching = touching;
        began
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_circle_circle_contact() {
        let contact = circle_circle(Vec2::new(0.0, 0.0), 10.0, Vec2::new(15.0, 0.0), 10.0);
        assert!(contact.hit);
        assert!((contact.penetration - 5.0).abs() < 0.001);
        assert!((contact.normal - Vec2::X).length() < 0.001);

        let apart = circle_circle(Vec2::ZERO, 10.0, Vec2::new(30.0, 0.0), 10.0);
        assert!(!apart.hit);
    }

    #[test]
    fn test_box_circle_contact_points_away_from_box() {
        // Ground box below a circle (y grows downward)
        let contact = box_circle(Vec2::new(0.0, 100.0), Vec2::new(50.0, 5.0), Vec2::new(0.0, 88.0), 10.0);
        assert!(contact.hit);
        assert!(contact.normal.y < 0.0);
        assert!((contact.penetration - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_gravity_moves_dynamic_not_static() {
        let mut world = SimpleWorld::with_gravity(1000.0);
        let falling = world.create_circle(Vec2::new(0.0, 0.0), 10.0);
        let pinned = world.create_circle(Vec2::new(100.0, 0.0), 10.0);
        world.set_static(pinned, true);

        for _ in 0..10 {
            world.step(SIM_DT);
        }
        assert!(world.position(falling).unwrap().y > 0.0);
        assert_eq!(world.position(pinned).unwrap(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_begin_contact_reported_once() {
        let mut world = SimpleWorld::with_gravity(0.0);
        let a = world.create_circle(Vec2::new(100.0, 100.0), 15.0);
        let b = world.create_circle(Vec2::new(120.0, 100.0), 15.0);

        let pairs = world.step(SIM_DT);
        assert_eq!(pairs, vec![CollisionPair::new(a, b)]);

        // Still touching (or just separated) - no new begin event
        let pairs = world.step(SIM_DT);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_circle_rests_on_ground() {
        let mut world = SimpleWorld::with_gravity(1200.0);
        world.create_box(Vec2::new(0.0, 200.0), Vec2::new(400.0, 20.0), false);
        let ball = world.create_circle(Vec2::new(0.0, 150.0), 15.0);

        for _ in 0..600 {
            world.step(SIM_DT);
        }
        let pos = world.position(ball).unwrap();
        assert!(pos.y < 190.0 && pos.y > 170.0, "resting y was {}", pos.y);
        assert!(world.velocity(ball).unwrap().length() < 6.0);
    }

    #[test]
    fn test_sensor_reports_without_pushing() {
        let mut world = SimpleWorld::with_gravity(0.0);
        let sensor = world.create_box(Vec2::new(0.0, 0.0), Vec2::new(400.0, 2.0), true);
        let ball = world.create_circle(Vec2::new(0.0, 5.0), 10.0);
        world.set_velocity(ball, Vec2::new(0.0, -60.0));

        let pairs = world.step(SIM_DT);
        assert_eq!(pairs, vec![CollisionPair::new(sensor, ball)]);
        // Velocity untouched by the sensor
        assert_eq!(world.velocity(ball).unwrap(), Vec2::new(0.0, -60.0));
    }

    #[test]
    fn test_overlapping_boxes_never_touch() {
        let mut world = SimpleWorld::with_gravity(0.0);
        world.create_box(Vec2::new(0.0, 100.0), Vec2::new(400.0, 20.0), false);
        world.create_box(Vec2::new(0.0, 100.0), Vec2::new(400.0, 2.0), true);
        assert!(world.step(SIM_DT).is_empty());
    }

    #[test]
    fn test_remove_unknown_is_ignored() {
        let mut world = SimpleWorld::with_gravity(0.0);
        let a = world.create_circle(Vec2::ZERO, 5.0);
        world.remove(a);
        world.remove(a);
        assert_eq!(world.body_count(), 0);
        assert!(world.position(a).is_none());
    }
}
