//! Computer rival jump decisions
//!
//! Greedy and reactive: look at the nearest obstacle ahead in the lane, jump
//! when it is about to arrive. Tight clusters can beat it, and that is fine.

use std::collections::VecDeque;

use super::physics::try_jump;
use super::rng::RandomSource;
use super::state::{Competitor, Obstacle};
use crate::tuning::Tuning;

/// Nearest obstacle still ahead of `competitor` within `lookahead`
pub fn next_threat<'a>(
    competitor: &Competitor,
    lane_obstacles: &'a VecDeque<Obstacle>,
    lookahead: f32,
) -> Option<&'a Obstacle> {
    let x = competitor.pos.x;
    lane_obstacles
        .iter()
        .find(|o| o.trailing_edge() > x && o.pos.x - x < lookahead)
}

/// Estimated seconds until the competitor reaches `obstacle`
#[inline]
pub fn time_to_impact(competitor: &Competitor, obstacle: &Obstacle, speed: f32) -> f32 {
    (obstacle.pos.x - competitor.pos.x) / speed.max(1.0)
}

/// Run one decision for a computer rival; returns whether it jumped
pub fn decide<R: RandomSource + ?Sized>(
    competitor: &mut Competitor,
    lane_obstacles: &VecDeque<Obstacle>,
    dt: f32,
    speed: f32,
    tuning: &Tuning,
    rng: &mut R,
) -> bool {
    if !competitor.is_computer() || !competitor.alive {
        return false;
    }

    if competitor.jump_cooldown > 0.0 {
        competitor.jump_cooldown -= dt;
    }
    if competitor.jump_cooldown > 0.0 || !competitor.on_ground {
        return false;
    }

    let Some(threat) = next_threat(competitor, lane_obstacles, tuning.ai_lookahead) else {
        return false;
    };
    if time_to_impact(competitor, threat, speed) >= tuning.ai_reaction_time {
        return false;
    }

    try_jump(competitor, tuning);
    competitor.jump_cooldown = rng.in_range(tuning.ai_cooldown);
    true
}
