//! Lane Dash - A four-lane endless runner
//!
//! Core modules:
//! - `sim`: Simulation (physics, obstacles, AI, round state)
//! - `tuning`: Data-driven game balance
//! - `config`: Round setup and validation
//! - `input`: Per-lane input snapshots and key bindings
//! - `claim`: Cross-tab slot claims
//! - `settings`: Session settings from the page URL
//! - `hud`: Status line text
//! - `render`: Canvas 2D drawing (wasm only)

pub mod claim;
pub mod config;
pub mod hud;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use config::{ConfigError, LaneAssignment, RoundConfig};
pub use input::InputSnapshot;
pub use settings::Settings;
pub use tuning::{InvalidTuning, LaneGeometry, Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Number of parallel lanes
    pub const LANES: usize = 4;
    /// Largest frame delta the simulation will integrate (seconds)
    pub const MAX_DT: f32 = 0.033;

    /// Lane geometry
    pub const LANE_HEIGHT: f32 = 90.0;
    /// Distance from the lane's bottom edge up to its ground line
    pub const GROUND_INSET: f32 = 16.0;

    /// Gravity (pixels/s², y grows downward)
    pub const GRAVITY: f32 = 2600.0;
    /// Jump impulse magnitude (applied upward)
    pub const JUMP_VELOCITY: f32 = 920.0;
    /// Scroll speed at round start
    pub const RUN_SPEED: f32 = 320.0;
    /// Scroll speed gained per second of round time
    pub const SPEED_GROWTH: f32 = 14.0;
    /// Horizontal speed added/removed by left/right input
    pub const LATERAL_BOOST: f32 = 110.0;

    /// Competitor defaults
    pub const COMPETITOR_WIDTH: f32 = 44.0;
    pub const COMPETITOR_HEIGHT: f32 = 74.0;
    pub const START_X: f32 = 140.0;

    /// Obstacle spacing
    pub const GAP_BASE: f32 = 520.0;
    pub const GAP_DECAY: f32 = 0.995;
    pub const MIN_GAP: f32 = 120.0;
    pub const SPAWN_LOOKAHEAD: f32 = 1150.0;
    pub const EVICT_BEHIND: f32 = 800.0;
    pub const CAMERA_LEAD: f32 = 180.0;

    /// Obstacle sizes
    pub const SPIKE_W: f32 = 26.0;
    pub const SPIKE_H: f32 = 42.0;
    pub const SPIKE_CHANCE: f32 = 0.65;

    /// Seeded obstacles per lane at round start
    pub const SEED_OBSTACLES: usize = 7;
    pub const SEED_START_X: f32 = 700.0;

    /// Computer rival reflexes
    pub const AI_LOOKAHEAD: f32 = 240.0;
    pub const AI_REACTION_TIME: f32 = 0.36;
}

/// Top edge of a lane's vertical band, using the default geometry
#[inline]
pub fn lane_top(lane: usize) -> f32 {
    LaneGeometry::default().top(lane)
}

/// Ground line of a lane, using the default geometry
#[inline]
pub fn lane_ground_line(lane: usize) -> f32 {
    LaneGeometry::default().ground_line(lane)
}
