//! Axis-aligned bounding-box collision detection
//!
//! Entity counts stay in the low tens, so the round runs a plain pairwise
//! scan each tick; no spatial index is warranted at this scale.

use glam::Vec2;

/// An axis-aligned box. `pos` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Strict rectangle-overlap test. Boxes that merely touch along an
    /// edge do not collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }
}
