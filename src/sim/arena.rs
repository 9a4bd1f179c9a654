//! Play-area geometry
//!
//! The well is inset from the canvas: a margin of width/20 on each side,
//! the top at height/4 and the floor height/7 above the canvas bottom.

use glam::Vec2;

use super::physics::{BodyHandle, PhysicsWorld};
use crate::config::GameConfig;

/// Derived play-area bounds (y grows downward)
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub wall_thickness: f32,
    pub drop_buffer: f32,
    pub spawn_clearance: f32,
    /// Fruits settled above this line end the game
    pub scoreline_y: f32,
    /// Fruits below this line fell out and are discarded
    pub out_of_bounds_y: f32,
}

impl Arena {
    pub fn from_config(config: &GameConfig) -> Self {
        let margin = config.canvas_width / 20.0;
        let top = config.canvas_height / 4.0;
        let bottom = config.canvas_height - config.canvas_height / 7.0;
        Self {
            left: margin,
            right: config.canvas_width - margin,
            top,
            bottom,
            wall_thickness: config.wall_thickness,
            drop_buffer: config.drop_buffer,
            spawn_clearance: config.spawn_clearance,
            scoreline_y: top + (bottom - top) * config.scoreline_fraction,
            out_of_bounds_y: config.canvas_height + config.out_of_bounds_margin,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.left + self.width() / 2.0
    }

    /// Clamp a drop x so a fruit of `radius` stays clear of both walls
    pub fn clamp_drop_x(&self, x: f32, radius: f32) -> f32 {
        let min_x = self.left + self.wall_thickness + radius + self.drop_buffer;
        let max_x = self.right - self.wall_thickness - radius - self.drop_buffer;
        if min_x > max_x {
            // Fruit wider than the well; keep it centred
            return self.center_x();
        }
        x.clamp(min_x, max_x)
    }

    /// Where a held fruit of `radius` waits above the well
    pub fn held_position(&self, x: f32, radius: f32) -> Vec2 {
        Vec2::new(
            self.clamp_drop_x(x, radius),
            self.top - radius - self.spawn_clearance,
        )
    }

    /// Create the walls, floor and top sensor; returns the sensor handle
    pub fn build<W: PhysicsWorld>(&self, world: &mut W) -> BodyHandle {
        let t = self.wall_thickness;
        let wall_y = self.top + self.height() / 2.0;

        world.create_box(
            Vec2::new(self.left + t / 2.0, wall_y),
            Vec2::new(t, self.height()),
            false,
        );
        world.create_box(
            Vec2::new(self.right - t / 2.0, wall_y),
            Vec2::new(t, self.height()),
            false,
        );
        world.create_box(
            Vec2::new(self.center_x(), self.bottom - t / 2.0),
            Vec2::new(self.width(), t),
            false,
        );
        world.create_box(
            Vec2::new(self.center_x(), self.top),
            Vec2::new(self.width(), 2.0),
            true,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimpleWorld;

    #[test]
    fn test_default_layout() {
        let arena = Arena::from_config(&GameConfig::default());
        assert_eq!(arena.left, 20.0);
        assert_eq!(arena.right, 380.0);
        assert_eq!(arena.top, 225.0);
        assert!((arena.bottom - 771.428_6).abs() < 0.01);
        assert!(arena.scoreline_y > arena.top && arena.scoreline_y < arena.bottom);
        assert_eq!(arena.out_of_bounds_y, 1000.0);
    }

    #[test]
    fn test_clamp_drop_x() {
        let arena = Arena::from_config(&GameConfig::default());
        // left + wall + radius + buffer = 20 + 15 + 15 + 5
        assert_eq!(arena.clamp_drop_x(0.0, 15.0), 55.0);
        assert_eq!(arena.clamp_drop_x(1000.0, 15.0), 345.0);
        assert_eq!(arena.clamp_drop_x(200.0, 15.0), 200.0);
        // Oversized fruit stays centred
        assert_eq!(arena.clamp_drop_x(50.0, 500.0), arena.center_x());
    }

    #[test]
    fn test_held_position_above_well() {
        let arena = Arena::from_config(&GameConfig::default());
        let pos = arena.held_position(200.0, 20.0);
        assert_eq!(pos.y, arena.top - 20.0 - 20.0);
    }

    #[test]
    fn test_build_creates_four_bodies() {
        let arena = Arena::from_config(&GameConfig::default());
        let mut world = SimpleWorld::with_gravity(0.0);
        let sensor = arena.build(&mut world);
        assert_eq!(world.body_count(), 4);
        assert_eq!(world.position(sensor).unwrap().y, arena.top);
    }
}
