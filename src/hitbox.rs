//! Axis-aligned bounding boxes: the only geometric primitive the game needs.

use glam::Vec2;

use crate::entities::{Bullet, Enemy, ExpParticle, Pickup, Player};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    pub fn new(pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            width,
            height,
        }
    }

    /// Strict overlap test: boxes that merely share an edge do not intersect.
    pub fn intersects(&self, other: &Hitbox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Anything that takes part in collision checks.
pub trait Collider {
    fn hitbox(&self) -> Hitbox;

    fn collides_with<C: Collider>(&self, other: &C) -> bool {
        self.hitbox().intersects(&other.hitbox())
    }
}

impl Collider for Player {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.pos, self.width, self.height)
    }
}

impl Collider for Enemy {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.pos, self.width, self.height)
    }
}

impl Collider for Bullet {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.pos, self.size, self.size)
    }
}

impl Collider for ExpParticle {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.pos, self.size, self.size)
    }
}

impl Collider for Pickup {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.pos, self.size, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_of_box() {
        let b = Hitbox::new(Vec2::new(10.0, 20.0), 100.0, 40.0);
        assert_eq!(b.center(), Vec2::new(60.0, 40.0));
    }

    #[test]
    fn point_box_overlaps_only_strictly_inside() {
        let a = Hitbox::new(Vec2::new(5.0, 5.0), 0.0, 0.0);
        let b = Hitbox::new(Vec2::new(0.0, 0.0), 10.0, 10.0);
        // a point strictly inside still overlaps on both axes
        assert!(a.intersects(&b));
        let edge = Hitbox::new(Vec2::new(10.0, 5.0), 0.0, 0.0);
        assert!(!edge.intersects(&b));
    }
}
