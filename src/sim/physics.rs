//! Per-competitor integration
//!
//! Stages run in a fixed order every tick: horizontal speed, jump, gravity,
//! integrate, ground clamp, collision. Dead competitors are never touched.

use std::collections::VecDeque;

use super::collision::first_hit;
use super::state::{Competitor, Obstacle};
use crate::input::InputSnapshot;
use crate::tuning::Tuning;

/// Horizontal speed for this tick given the scroll speed and lateral input
#[inline]
pub fn horizontal_speed(scroll_speed: f32, input: &InputSnapshot, tuning: &Tuning) -> f32 {
    let mut vx = scroll_speed;
    if input.left {
        vx -= tuning.lateral_boost;
    }
    if input.right {
        vx += tuning.lateral_boost;
    }
    vx
}

/// Launch a jump if standing on the ground; returns whether it fired
#[inline]
pub fn try_jump(competitor: &mut Competitor, tuning: &Tuning) -> bool {
    if !competitor.on_ground {
        return false;
    }
    competitor.vel.y = -tuning.jump_velocity;
    competitor.on_ground = false;
    true
}

/// Advance one competitor by `dt`
///
/// Returns true if the competitor died this tick.
pub fn step(
    competitor: &mut Competitor,
    input: &InputSnapshot,
    scroll_speed: f32,
    dt: f32,
    tuning: &Tuning,
    lane_obstacles: &VecDeque<Obstacle>,
) -> bool {
    if !competitor.alive {
        return false;
    }

    let vx = horizontal_speed(scroll_speed, input, tuning);
    competitor.vel.x = vx;

    if input.jump {
        try_jump(competitor, tuning);
    }

    competitor.vel.y += tuning.gravity * dt;

    let dx = vx * dt;
    competitor.pos.x += dx;
    competitor.pos.y += competitor.vel.y * dt;
    competitor.distance += dx;

    let rest_y = competitor.rest_y(&tuning.geometry);
    if competitor.pos.y > rest_y {
        competitor.pos.y = rest_y;
        competitor.vel.y = 0.0;
        competitor.on_ground = true;
    }

    if let Some(hit) = first_hit(&competitor.bounds(), lane_obstacles) {
        log::debug!(
            "{} (P{}) hit a {} at x={:.0}",
            competitor.name,
            competitor.lane + 1,
            hit.kind.as_str(),
            hit.pos.x
        );
        competitor.alive = false;
        return true;
    }
    false
}
