//! Axis-aligned box collision
//!
//! Competitors and obstacles are plain rectangles, so a strict interval
//! overlap on both axes is all the collision the game needs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Obstacle;

/// Axis-aligned bounding box (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    #[inline]
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Strict overlap: boxes that only share an edge do not collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        aabb(
            self.pos.x, self.pos.y, self.size.x, self.size.y, other.pos.x, other.pos.y,
            other.size.x, other.size.y,
        )
    }
}

/// Raw overlap test on two boxes given as position + extent
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn aabb(ax: f32, ay: f32, aw: f32, ah: f32, bx: f32, by: f32, bw: f32, bh: f32) -> bool {
    ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
}

/// First obstacle (in iteration order) that `bounds` overlaps
pub fn first_hit<'a>(
    bounds: &Aabb,
    obstacles: impl IntoIterator<Item = &'a Obstacle>,
) -> Option<&'a Obstacle> {
    obstacles.into_iter().find(|o| bounds.overlaps(&o.bounds()))
}
