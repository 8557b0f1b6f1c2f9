//! Data-driven game balance
//!
//! Every constant the simulation reads lives here so a round can be re-tuned
//! from JSON without touching code. Missing fields fall back to `consts`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// A tuning value the simulation cannot run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid tuning value `{field}`: {reason}")]
pub struct InvalidTuning {
    pub field: &'static str,
    pub reason: &'static str,
}

/// Tuning load failures
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] InvalidTuning),
}

/// Vertical layout of the lanes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneGeometry {
    /// Height of one lane band
    pub lane_height: f32,
    /// Ground line sits this far above the band's bottom edge
    pub ground_inset: f32,
}

impl Default for LaneGeometry {
    fn default() -> Self {
        Self {
            lane_height: LANE_HEIGHT,
            ground_inset: GROUND_INSET,
        }
    }
}

impl LaneGeometry {
    /// Top edge of the lane band
    #[inline]
    pub fn top(&self, lane: usize) -> f32 {
        lane as f32 * self.lane_height
    }

    /// Y coordinate competitors stand on and obstacles rest on
    #[inline]
    pub fn ground_line(&self, lane: usize) -> f32 {
        self.top(lane) + self.lane_height - self.ground_inset
    }

    /// Total height of all lanes stacked
    pub fn track_height(&self) -> f32 {
        LANES as f32 * self.lane_height
    }
}

/// Complete balance sheet for a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub geometry: LaneGeometry,

    // === Movement ===
    pub gravity: f32,
    pub jump_velocity: f32,
    pub speed_base: f32,
    pub speed_growth: f32,
    pub lateral_boost: f32,

    // === Competitors ===
    pub competitor_width: f32,
    pub competitor_height: f32,
    pub start_x: f32,

    // === Obstacles ===
    pub gap_base: f32,
    /// Per-second multiplier applied to `gap_base`, in (0, 1)
    pub gap_decay_rate: f32,
    /// Smallest distance between consecutive obstacles in a lane
    pub min_gap: f32,
    pub spawn_jitter: (f32, f32),
    pub spawn_lookahead: f32,
    pub evict_behind: f32,
    pub camera_lead: f32,
    pub spike_size: (f32, f32),
    pub knife_width: (f32, f32),
    pub knife_height: (f32, f32),
    /// Probability that a spawned obstacle is a spike
    pub spike_chance: f32,
    pub seed_count: usize,
    pub seed_start_x: f32,
    pub seed_jitter: (f32, f32),

    // === Computer rivals ===
    pub ai_lookahead: f32,
    pub ai_reaction_time: f32,
    pub ai_cooldown: (f32, f32),
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            geometry: LaneGeometry::default(),

            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            speed_base: RUN_SPEED,
            speed_growth: SPEED_GROWTH,
            lateral_boost: LATERAL_BOOST,

            competitor_width: COMPETITOR_WIDTH,
            competitor_height: COMPETITOR_HEIGHT,
            start_x: START_X,

            gap_base: GAP_BASE,
            gap_decay_rate: GAP_DECAY,
            min_gap: MIN_GAP,
            spawn_jitter: (-150.0, 190.0),
            spawn_lookahead: SPAWN_LOOKAHEAD,
            evict_behind: EVICT_BEHIND,
            camera_lead: CAMERA_LEAD,
            spike_size: (SPIKE_W, SPIKE_H),
            knife_width: (14.0, 20.0),
            knife_height: (50.0, 90.0),
            spike_chance: SPIKE_CHANCE,
            seed_count: SEED_OBSTACLES,
            seed_start_x: SEED_START_X,
            seed_jitter: (-140.0, 170.0),

            ai_lookahead: AI_LOOKAHEAD,
            ai_reaction_time: AI_REACTION_TIME,
            ai_cooldown: (0.25, 0.45),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Scroll speed after `time` seconds of round time
    #[inline]
    pub fn speed_at(&self, time: f32) -> f32 {
        self.speed_base + time * self.speed_growth
    }

    /// Reject values that would break the simulation's invariants
    pub fn validate(&self) -> Result<(), InvalidTuning> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), InvalidTuning> {
            Err(InvalidTuning { field, reason })
        }
        fn ordered(range: (f32, f32)) -> bool {
            range.0 <= range.1
        }

        if self.geometry.lane_height <= 0.0 {
            return invalid("geometry.lane_height", "must be positive");
        }
        if self.geometry.ground_inset < 0.0 || self.geometry.ground_inset >= self.geometry.lane_height {
            return invalid("geometry.ground_inset", "must lie inside the lane");
        }
        if self.gravity <= 0.0 {
            return invalid("gravity", "must be positive");
        }
        if self.jump_velocity <= 0.0 {
            return invalid("jump_velocity", "must be positive");
        }
        if self.speed_base <= 0.0 {
            return invalid("speed_base", "must be positive");
        }
        if self.speed_growth < 0.0 {
            return invalid("speed_growth", "must not be negative");
        }
        // Full left input must still scroll forward
        if self.lateral_boost < 0.0 || self.lateral_boost >= self.speed_base {
            return invalid("lateral_boost", "must be below speed_base");
        }
        if self.competitor_width <= 0.0 || self.competitor_height <= 0.0 {
            return invalid("competitor size", "must be positive");
        }
        if !(self.gap_decay_rate > 0.0 && self.gap_decay_rate < 1.0) {
            return invalid("gap_decay_rate", "must be in (0, 1)");
        }
        if self.min_gap <= 0.0 {
            return invalid("min_gap", "must be positive");
        }
        if !(0.0..=1.0).contains(&self.spike_chance) {
            return invalid("spike_chance", "must be in [0, 1]");
        }
        for (field, range) in [
            ("spawn_jitter", self.spawn_jitter),
            ("knife_width", self.knife_width),
            ("knife_height", self.knife_height),
            ("seed_jitter", self.seed_jitter),
            ("ai_cooldown", self.ai_cooldown),
        ] {
            if !ordered(range) {
                return invalid(field, "range minimum exceeds maximum");
            }
        }
        if self.seed_count == 0 {
            return invalid("seed_count", "must seed at least one obstacle");
        }
        Ok(())
    }
}
