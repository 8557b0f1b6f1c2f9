//! HUD text and lane colors
//!
//! Pure formatting so the DOM glue only copies strings around.

use crate::consts::LANES;
use crate::sim::{Competitor, RandomSource, SimPhase, SimulationState};

/// Lane accent colors (CSS)
pub const LANE_COLORS: [&str; LANES] = ["#47b8ff", "#51e08a", "#ff5a6f", "#ffb14a"];

/// Shown before a round has been configured
pub const IDLE_HINT: &str = "Pick a slot + name. Click the game to enable arrow keys.";

pub fn lane_color(lane: usize) -> &'static str {
    LANE_COLORS.get(lane).copied().unwrap_or("#ffffff")
}

/// World units to displayed metres
#[inline]
pub fn distance_metres(distance: f32) -> u32 {
    (distance / 10.0).max(0.0).floor() as u32
}

/// Name tag drawn above a competitor
pub fn competitor_label(competitor: &Competitor) -> String {
    let status = if competitor.alive { "⚔️" } else { "💀" };
    let role = if competitor.is_computer() { "CPU" } else { "HUMAN" };
    format!("{status} {} ({role})", competitor.name)
}

/// One-line status for the hint bar
pub fn status_line<R: RandomSource>(state: &SimulationState<R>, room: &str) -> String {
    if state.phase() == SimPhase::Idle {
        return IDLE_HINT.to_owned();
    }

    let alive = state.alive_count();
    let total = state.competitors().len();
    match state.local_lane().and_then(|lane| state.competitor(lane)) {
        Some(me) => format!(
            "You are P{} ({}) | Distance: {}m | Alive: {alive}/{total} | Room: {room}",
            me.lane + 1,
            me.name,
            distance_metres(me.distance)
        ),
        None => {
            let leader = state.competitor(state.leader());
            format!(
                "Spectating | Leader: {} | Alive: {alive}/{total} | Room: {room}",
                leader.map_or("-", |c| c.name.as_str())
            )
        }
    }
}
