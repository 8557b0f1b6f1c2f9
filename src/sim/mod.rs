//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform code:
//! - Input arrives as polled snapshots, never callbacks
//! - Randomness comes from an injected `RandomSource`
//! - Stable iteration order (by lane, then by obstacle x)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod physics;
pub mod rng;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, aabb};
pub use rng::{RandomSource, SimRng};
pub use spawn::{gap_decay, roll_obstacle, spawn_ahead};
pub use state::{
    Competitor, ControlMode, Obstacle, ObstacleKind, SimEvent, SimPhase, SimulationState,
    WorldSnapshot,
};
pub use tick::{TickInput, tick};
