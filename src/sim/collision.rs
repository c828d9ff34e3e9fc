//! Axis-aligned hitboxes
//!
//! Actor and items are rectangles in the logical field (y grows downward).
//! Collisions use inset hitboxes: the visual box shrunk on every side, so a
//! near miss that only grazes the drawn shape does not count.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height (never negative)
    pub size: Vec2,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width.max(0.0), height.max(0.0)),
        }
    }

    /// Bottom-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Shrink by `amount` on each side, collapsing to the center if too small
    pub fn inset(&self, amount: f32) -> Self {
        let amount = amount.max(0.0);
        let shrink = Vec2::splat(amount * 2.0).min(self.size);
        Self {
            min: self.min + shrink / 2.0,
            size: self.size - shrink,
        }
    }

    /// Strict overlap test; boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_basic() {
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let b = Hitbox::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let right = Hitbox::new(10.0, 0.0, 10.0, 10.0);
        let below = Hitbox::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn test_inset_shrinks_evenly() {
        let b = Hitbox::new(100.0, 50.0, 30.0, 30.0).inset(5.0);
        assert_eq!(b.min, Vec2::new(105.0, 55.0));
        assert_eq!(b.size, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_inset_collapses_to_center() {
        let b = Hitbox::new(0.0, 0.0, 10.0, 4.0).inset(3.0);
        assert_eq!(b.size, Vec2::new(4.0, 0.0));
        assert_eq!(b.min, Vec2::new(3.0, 2.0));
        // A zero-height box never overlaps anything
        assert!(!b.overlaps(&Hitbox::new(-100.0, -100.0, 200.0, 200.0)));
    }

    #[test]
    fn test_inset_removes_grazing_contact() {
        let actor = Hitbox::new(50.0, 150.0, 40.0, 40.0);
        let hazard = Hitbox::new(86.0, 160.0, 30.0, 30.0);
        assert!(actor.overlaps(&hazard));
        assert!(!actor.inset(4.0).overlaps(&hazard.inset(6.0)));
    }

    #[test]
    fn test_negative_inset_is_ignored() {
        let b = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(b.inset(-3.0), b);
    }
}
