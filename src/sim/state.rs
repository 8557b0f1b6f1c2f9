//! World state and core simulation types
//!
//! `SimulationState` owns every competitor and obstacle for the active round.
//! Hosts read it through accessors or `snapshot()`; only `start`, `tick` and
//! `apply_claim` mutate it.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::rng::{RandomSource, SimRng};
use super::{spawn, tick};
use crate::claim::SlotClaim;
use crate::config::{self, ConfigError, LaneAssignment, RoundConfig};
use crate::consts::LANES;
use crate::tuning::{LaneGeometry, Tuning};

/// Current phase of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Waiting for a round configuration
    Idle,
    /// Round in progress (restarts itself when everyone is dead)
    Running,
}

/// Who drives a competitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    Human,
    Computer,
}

/// A racer in one lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub lane: usize,
    pub control: ControlMode,
    /// Top-left corner, y grows downward
    pub pos: Vec2,
    /// x is the horizontal speed applied last tick
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
    pub alive: bool,
    /// Horizontal distance covered this round (score)
    pub distance: f32,
    /// Seconds until a computer rival may jump again
    #[serde(default)]
    pub jump_cooldown: f32,
}

impl Competitor {
    /// Fresh competitor standing on its lane's ground at the start offset
    pub fn new(lane: usize, name: impl Into<String>, control: ControlMode, tuning: &Tuning) -> Self {
        let size = Vec2::new(tuning.competitor_width, tuning.competitor_height);
        Self {
            name: name.into(),
            lane,
            control,
            pos: Vec2::new(tuning.start_x, tuning.geometry.ground_line(lane) - size.y),
            vel: Vec2::ZERO,
            size,
            on_ground: true,
            alive: true,
            distance: 0.0,
            jump_cooldown: 0.0,
        }
    }

    #[inline]
    pub fn is_computer(&self) -> bool {
        self.control == ControlMode::Computer
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Lowest y the competitor's top edge may reach in its lane
    #[inline]
    pub fn rest_y(&self, geometry: &LaneGeometry) -> f32 {
        geometry.ground_line(self.lane) - self.size.y
    }
}

/// Obstacle shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Short, fixed size, always clearable with a jump
    Spike,
    /// Thin and tall, random size
    Knife,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Spike => "spike",
            ObstacleKind::Knife => "knife",
        }
    }
}

/// A static hazard resting on a lane's ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub lane: usize,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Right edge in world space
    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.pos.x + self.size.x
    }
}

/// Notable things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    RoundStarted { round: u32 },
    CompetitorDied { lane: usize, distance: f32 },
    RoundOver { round: u32, winner: usize, distance: f32 },
    SlotClaimed { lane: usize },
}

/// Read-only copy of the world for renderers and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub phase: SimPhase,
    pub round: u32,
    pub time: f32,
    pub speed: f32,
    pub leader: usize,
    pub alive: usize,
    pub camera_x: f32,
    pub geometry: LaneGeometry,
    pub competitors: Vec<Competitor>,
    pub obstacles: Vec<Obstacle>,
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct SimulationState<R: RandomSource = SimRng> {
    pub(crate) tuning: Tuning,
    pub(crate) phase: SimPhase,
    /// Seconds since the current round began
    pub(crate) time: f32,
    /// 1-based round counter (0 while idle)
    pub(crate) round: u32,
    /// One per lane, indexed by lane
    pub(crate) competitors: Vec<Competitor>,
    /// Per-lane obstacles in increasing x order
    pub(crate) obstacles: Vec<VecDeque<Obstacle>>,
    /// Lane the camera prefers to follow
    pub(crate) local_lane: Option<usize>,
    pub(crate) leader: usize,
    pub(crate) camera_x: f32,
    pub(crate) events: Vec<SimEvent>,
    pub(crate) rng: R,
}

impl SimulationState<SimRng> {
    /// Idle simulation with a seeded PCG32
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self::with_rng(tuning, SimRng::new(seed))
    }
}

impl<R: RandomSource> SimulationState<R> {
    /// Idle simulation using the given random source
    pub fn with_rng(tuning: Tuning, rng: R) -> Self {
        Self {
            tuning,
            phase: SimPhase::Idle,
            time: 0.0,
            round: 0,
            competitors: Vec::with_capacity(LANES),
            obstacles: (0..LANES).map(|_| VecDeque::new()).collect(),
            local_lane: None,
            leader: 0,
            camera_x: 0.0,
            events: Vec::new(),
            rng,
        }
    }

    /// Validate `config` and the tuning, then begin the first round
    ///
    /// On error the state is left untouched.
    pub fn start(&mut self, config: &RoundConfig) -> Result<(), ConfigError> {
        self.tuning.validate()?;
        config.validate()?;

        let mut used: Vec<String> = config
            .lanes()
            .iter()
            .flatten()
            .filter_map(|a| a.name().map(str::to_owned))
            .collect();

        let mut competitors = Vec::with_capacity(LANES);
        for (lane, assignment) in config.lanes().iter().enumerate() {
            let Some(assignment) = assignment else {
                return Err(ConfigError::UnassignedLane { lane });
            };
            let competitor = match assignment {
                LaneAssignment::Human { name } => {
                    Competitor::new(lane, config::sanitize_name(name), ControlMode::Human, &self.tuning)
                }
                LaneAssignment::Computer { name: Some(name) } => {
                    Competitor::new(lane, config::sanitize_name(name), ControlMode::Computer, &self.tuning)
                }
                LaneAssignment::Computer { name: None } => {
                    let name = config::random_cpu_name(&used, &mut self.rng);
                    used.push(name.clone());
                    Competitor::new(lane, name, ControlMode::Computer, &self.tuning)
                }
            };
            competitors.push(competitor);
        }

        self.competitors = competitors;
        self.local_lane = config.local_lane();
        self.round = 0;
        self.phase = SimPhase::Running;
        self.restart();
        Ok(())
    }

    /// Begin a new round with the current roster
    ///
    /// Clock, positions and obstacles reset; names and control modes persist.
    pub(crate) fn restart(&mut self) {
        self.time = 0.0;
        self.round += 1;

        for competitor in &mut self.competitors {
            *competitor = Competitor::new(
                competitor.lane,
                std::mem::take(&mut competitor.name),
                competitor.control,
                &self.tuning,
            );
        }

        for track in &mut self.obstacles {
            track.clear();
        }
        spawn::seed_track(&mut self.obstacles, &self.tuning, &mut self.rng);

        self.leader = tick::leader_index(&self.competitors);
        self.camera_x = tick::camera_x(
            &self.competitors,
            self.local_lane,
            self.leader,
            self.tuning.camera_lead,
        );

        log::info!(
            "Round {} started ({} obstacles per lane)",
            self.round,
            self.tuning.seed_count
        );
        self.events.push(SimEvent::RoundStarted { round: self.round });
    }

    /// Hand a computer lane over to a human from another tab
    ///
    /// Ignored while idle or when the lane does not exist. Returns whether
    /// the claim was applied.
    pub fn apply_claim(&mut self, claim: &SlotClaim) -> bool {
        if self.phase != SimPhase::Running {
            return false;
        }
        let Some(competitor) = self.competitors.get_mut(claim.lane) else {
            return false;
        };

        competitor.control = ControlMode::Human;
        if let Some(name) = claim.name.as_deref() {
            let name = config::sanitize_name(name);
            if !name.is_empty() {
                competitor.name = name;
            }
        }
        log::info!("Lane P{} claimed by {}", claim.lane + 1, competitor.name);
        self.events.push(SimEvent::SlotClaimed { lane: claim.lane });
        true
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Current scroll speed
    pub fn speed(&self) -> f32 {
        self.tuning.speed_at(self.time)
    }

    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    pub fn competitor(&self, lane: usize) -> Option<&Competitor> {
        self.competitors.get(lane)
    }

    /// Obstacles in one lane, oldest first
    pub fn lane_obstacles(&self, lane: usize) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.get(lane).into_iter().flatten()
    }

    /// All obstacles, lane by lane
    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().flatten()
    }

    pub fn local_lane(&self) -> Option<usize> {
        self.local_lane
    }

    /// Lane of the competitor with the greatest distance
    pub fn leader(&self) -> usize {
        self.leader
    }

    pub fn camera_x(&self) -> f32 {
        self.camera_x
    }

    pub fn alive_count(&self) -> usize {
        self.competitors.iter().filter(|c| c.alive).count()
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            phase: self.phase,
            round: self.round,
            time: self.time,
            speed: self.speed(),
            leader: self.leader,
            alive: self.alive_count(),
            camera_x: self.camera_x,
            geometry: self.tuning.geometry,
            competitors: self.competitors.clone(),
            obstacles: self.obstacles().copied().collect(),
        }
    }
}
