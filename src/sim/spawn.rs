//! Procedural obstacle generation
//!
//! All lanes race the same course: every spawn rolls one obstacle and drops a
//! copy of it into each lane at the same x. Each lane keeps its copies in a
//! queue ordered by x. New ones are pushed at the back ahead of the leader,
//! old ones are trimmed from the front once they fall behind the camera.

use std::collections::VecDeque;

use glam::Vec2;

use super::rng::RandomSource;
use super::state::{Obstacle, ObstacleKind};
use crate::tuning::Tuning;

/// Gap multiplier after `time` seconds: `rate^time`, strictly decreasing
#[inline]
pub fn gap_decay(rate: f32, time: f32) -> f32 {
    rate.powf(time)
}

/// Roll an obstacle's kind and size
pub fn roll_obstacle<R: RandomSource + ?Sized>(tuning: &Tuning, rng: &mut R) -> (ObstacleKind, Vec2) {
    if rng.chance(tuning.spike_chance) {
        (ObstacleKind::Spike, Vec2::new(tuning.spike_size.0, tuning.spike_size.1))
    } else {
        let h = rng.in_range(tuning.knife_height);
        let w = rng.in_range(tuning.knife_width);
        (ObstacleKind::Knife, Vec2::new(w, h))
    }
}

/// Stand an obstacle of `size` on `lane`'s ground line at `world_x`
pub fn place(lane: usize, kind: ObstacleKind, size: Vec2, world_x: f32, tuning: &Tuning) -> Obstacle {
    Obstacle {
        lane,
        kind,
        pos: Vec2::new(world_x, tuning.geometry.ground_line(lane) - size.y),
        size,
    }
}

/// Roll one obstacle and append it to every lane at `world_x`
///
/// `tracks` is indexed by lane.
pub fn spawn_ahead<R: RandomSource + ?Sized>(
    tracks: &mut [VecDeque<Obstacle>],
    world_x: f32,
    tuning: &Tuning,
    rng: &mut R,
) -> (ObstacleKind, Vec2) {
    let (kind, size) = roll_obstacle(tuning, rng);
    for (lane, track) in tracks.iter_mut().enumerate() {
        track.push_back(place(lane, kind, size, world_x, tuning));
    }
    (kind, size)
}

/// Fill empty lanes with the round's opening obstacles
pub fn seed_track<R: RandomSource + ?Sized>(
    tracks: &mut [VecDeque<Obstacle>],
    tuning: &Tuning,
    rng: &mut R,
) {
    let mut x = tuning.seed_start_x;
    for _ in 0..tuning.seed_count {
        spawn_ahead(tracks, x, tuning, rng);
        x += (tuning.gap_base + rng.in_range(tuning.seed_jitter)).max(tuning.min_gap);
    }
    log::debug!(
        "Seeded {} lanes with {} obstacles up to x={:.0}",
        tracks.len(),
        tuning.seed_count,
        frontier(tracks).unwrap_or(0.0)
    );
}

/// Furthest obstacle x across all lanes
pub fn frontier(tracks: &[VecDeque<Obstacle>]) -> Option<f32> {
    tracks
        .iter()
        .filter_map(|track| track.back())
        .map(|o| o.pos.x)
        .reduce(f32::max)
}

/// Keep at least `spawn_lookahead` of course ahead of the leader
///
/// Spawns at most one obstacle (into every lane) per call and returns its x.
pub fn maintain_lookahead<R: RandomSource + ?Sized>(
    tracks: &mut [VecDeque<Obstacle>],
    leader_x: f32,
    time: f32,
    tuning: &Tuning,
    rng: &mut R,
) -> Option<f32> {
    let next_x = match frontier(tracks) {
        Some(last) if last - leader_x >= tuning.spawn_lookahead => return None,
        Some(last) => {
            let gap = tuning.gap_base * gap_decay(tuning.gap_decay_rate, time)
                + rng.in_range(tuning.spawn_jitter);
            last + gap.max(tuning.min_gap)
        }
        None => leader_x + tuning.spawn_lookahead,
    };
    spawn_ahead(tracks, next_x, tuning, rng);
    Some(next_x)
}

/// Drop obstacles whose x is left of `cutoff_x`; returns how many went
pub fn evict_behind(track: &mut VecDeque<Obstacle>, cutoff_x: f32) -> usize {
    let keep_from = track
        .iter()
        .position(|o| o.pos.x >= cutoff_x)
        .unwrap_or(track.len());
    track.drain(..keep_from);
    keep_from
}
