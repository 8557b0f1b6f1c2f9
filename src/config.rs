//! Round setup
//!
//! A `RoundConfig` says who runs in each lane. It must cover every lane
//! before a round can start.

use thiserror::Error;

use crate::consts::LANES;
use crate::sim::RandomSource;
use crate::tuning::InvalidTuning;

/// Longest display name shown above a competitor
pub const MAX_NAME_LEN: usize = 16;

/// Names handed out to computer rivals
pub const CPU_NAMES: [&str; 20] = [
    "Kenshin", "Hanzo", "Musashi", "Yoshi", "Akira", "Ryu", "Sora", "Takeshi", "Kaito", "Ren",
    "Kaede", "Aiko", "Hikari", "Mika", "Yuna", "Kira", "Rei", "Nobu", "Shin", "Daichi",
];

/// Round configuration problems, reported before the round starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("expected {expected} lane assignments, got {actual}")]
    LaneCountMismatch { expected: usize, actual: usize },
    #[error("lane {lane} does not exist")]
    LaneOutOfRange { lane: usize },
    #[error("lane {lane} has no competitor assigned")]
    UnassignedLane { lane: usize },
    #[error("human competitor in lane {lane} needs a name")]
    EmptyName { lane: usize },
    #[error("local lane {lane} is not human-controlled")]
    LocalLaneNotHuman { lane: usize },
    #[error(transparent)]
    Tuning(#[from] InvalidTuning),
}

/// Who runs in a lane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneAssignment {
    Human { name: String },
    /// `None` draws a name from the roster at round start
    Computer { name: Option<String> },
}

impl LaneAssignment {
    pub fn human(name: impl Into<String>) -> Self {
        LaneAssignment::Human { name: name.into() }
    }

    pub fn computer() -> Self {
        LaneAssignment::Computer { name: None }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            LaneAssignment::Human { name } => Some(name),
            LaneAssignment::Computer { name } => name.as_deref(),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, LaneAssignment::Human { .. })
    }
}

/// Per-lane assignments plus the lane played on this device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundConfig {
    lanes: [Option<LaneAssignment>; LANES],
    local_lane: Option<usize>,
}

impl RoundConfig {
    /// Empty config; every lane still needs an assignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a full list of assignments, one per lane in order
    pub fn from_assignments(assignments: Vec<LaneAssignment>) -> Result<Self, ConfigError> {
        if assignments.len() != LANES {
            return Err(ConfigError::LaneCountMismatch {
                expected: LANES,
                actual: assignments.len(),
            });
        }
        let mut config = Self::new();
        for (slot, assignment) in config.lanes.iter_mut().zip(assignments) {
            *slot = Some(assignment);
        }
        Ok(config)
    }

    /// Every lane run by the computer (attract mode / headless runs)
    pub fn all_computer() -> Self {
        Self {
            lanes: std::array::from_fn(|_| Some(LaneAssignment::computer())),
            local_lane: None,
        }
    }

    /// One local human in `lane`, computer rivals everywhere else
    pub fn single_player(lane: usize, name: &str) -> Result<Self, ConfigError> {
        let mut config = Self::all_computer().assign(lane, LaneAssignment::human(name))?;
        config.local_lane = Some(lane);
        Ok(config)
    }

    pub fn assign(mut self, lane: usize, assignment: LaneAssignment) -> Result<Self, ConfigError> {
        let slot = self
            .lanes
            .get_mut(lane)
            .ok_or(ConfigError::LaneOutOfRange { lane })?;
        *slot = Some(assignment);
        Ok(self)
    }

    pub fn with_local_lane(mut self, lane: usize) -> Result<Self, ConfigError> {
        if lane >= LANES {
            return Err(ConfigError::LaneOutOfRange { lane });
        }
        self.local_lane = Some(lane);
        Ok(self)
    }

    pub fn lanes(&self) -> &[Option<LaneAssignment>; LANES] {
        &self.lanes
    }

    pub fn local_lane(&self) -> Option<usize> {
        self.local_lane
    }

    /// Check that the round can start
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (lane, assignment) in self.lanes.iter().enumerate() {
            match assignment {
                None => return Err(ConfigError::UnassignedLane { lane }),
                Some(LaneAssignment::Human { name }) if sanitize_name(name).is_empty() => {
                    return Err(ConfigError::EmptyName { lane });
                }
                Some(_) => {}
            }
        }
        if let Some(lane) = self.local_lane {
            if !self.lanes[lane].as_ref().is_some_and(LaneAssignment::is_human) {
                return Err(ConfigError::LocalLaneNotHuman { lane });
            }
        }
        Ok(())
    }
}

/// Trim whitespace and cap at `MAX_NAME_LEN` characters
pub fn sanitize_name(raw: &str) -> String {
    raw.trim().chars().take(MAX_NAME_LEN).collect::<String>().trim_end().to_owned()
}

/// Pick an unused roster name, falling back to `CPU-<n>`
pub fn random_cpu_name<R: RandomSource + ?Sized>(used: &[String], rng: &mut R) -> String {
    let pool: Vec<&str> = CPU_NAMES
        .iter()
        .copied()
        .filter(|name| !used.iter().any(|u| u == name))
        .collect();

    if pool.is_empty() {
        let n = (rng.next_unit() * 9999.0) as u32;
        return format!("CPU-{n}");
    }
    let index = ((rng.next_unit() * pool.len() as f32) as usize).min(pool.len() - 1);
    pool[index].to_owned()
}
