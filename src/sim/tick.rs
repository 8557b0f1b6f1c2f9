//! Simulation tick
//!
//! Core game loop that advances every lane by one frame.

use super::rng::RandomSource;
use super::state::{Competitor, SimEvent, SimPhase, SimulationState};
use super::{ai, physics, spawn};
use crate::consts::{LANES, MAX_DT};
use crate::input::InputSnapshot;

/// Input for a single tick, one snapshot per lane
///
/// Lanes without a local human simply stay idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub lanes: [InputSnapshot; LANES],
}

impl TickInput {
    /// Input with only `lane` driven
    pub fn for_lane(lane: usize, snapshot: InputSnapshot) -> Self {
        let mut input = Self::default();
        input.set(lane, snapshot);
        input
    }

    /// Set a lane's snapshot; out-of-range lanes are ignored
    pub fn set(&mut self, lane: usize, snapshot: InputSnapshot) {
        if let Some(slot) = self.lanes.get_mut(lane) {
            *slot = snapshot;
        }
    }

    pub fn get(&self, lane: usize) -> InputSnapshot {
        self.lanes.get(lane).copied().unwrap_or_default()
    }
}

/// Lane of the competitor with the greatest distance
///
/// Strict comparison, so the lowest lane keeps the lead on ties.
pub fn leader_index(competitors: &[Competitor]) -> usize {
    let mut best = 0;
    for (i, c) in competitors.iter().enumerate().skip(1) {
        if c.distance > competitors[best].distance {
            best = i;
        }
    }
    best
}

/// Camera left edge: follow the local competitor while alive, else the leader
pub fn camera_x(competitors: &[Competitor], local_lane: Option<usize>, leader: usize, lead: f32) -> f32 {
    let follow = local_lane
        .and_then(|lane| competitors.get(lane))
        .filter(|c| c.alive)
        .or_else(|| competitors.get(leader));
    follow.map_or(0.0, |c| c.pos.x - lead)
}

/// Advance the simulation by one frame of `dt` seconds
pub fn tick<R: RandomSource>(state: &mut SimulationState<R>, input: &TickInput, dt: f32) {
    if state.phase != SimPhase::Running {
        return;
    }

    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };
    state.time += dt;

    let SimulationState {
        tuning,
        time,
        competitors,
        obstacles,
        local_lane,
        leader,
        camera_x: camera,
        events,
        rng,
        ..
    } = state;
    let time = *time;
    let speed = tuning.speed_at(time);

    // Move everyone first so spawning sees post-motion positions
    for competitor in competitors.iter_mut() {
        if !competitor.alive {
            continue;
        }
        let lane = competitor.lane;
        let track = &obstacles[lane];

        let lane_input = if competitor.is_computer() {
            ai::decide(competitor, track, dt, speed, tuning, rng);
            InputSnapshot::default()
        } else {
            input.get(lane)
        };

        if physics::step(competitor, &lane_input, speed, dt, tuning, track) {
            events.push(SimEvent::CompetitorDied {
                lane,
                distance: competitor.distance,
            });
        }
    }

    *leader = leader_index(competitors);
    *camera = camera_x(competitors, *local_lane, *leader, tuning.camera_lead);
    let leader_x = competitors.get(*leader).map_or(0.0, |c| c.pos.x);

    for track in obstacles.iter_mut() {
        spawn::evict_behind(track, *camera - tuning.evict_behind);
    }
    spawn::maintain_lookahead(obstacles, leader_x, time, tuning, rng);

    if competitors.iter().all(|c| !c.alive) {
        let winner = *leader;
        let distance = competitors.get(winner).map_or(0.0, |c| c.distance);
        let round = state.round;
        log::info!(
            "Round {} over: P{} wins with {}m",
            round,
            winner + 1,
            crate::hud::distance_metres(distance)
        );
        state.events.push(SimEvent::RoundOver {
            round,
            winner,
            distance,
        });
        state.restart();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::SlotClaim;
    use crate::config::{LaneAssignment, RoundConfig};
    use crate::consts::*;
    use crate::sim::rng::ScriptedRng;
    use crate::sim::state::{ControlMode, Obstacle, ObstacleKind};
    use crate::tuning::Tuning;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn running(seed: u64) -> SimulationState {
        let mut state = SimulationState::new(Tuning::default(), seed);
        state.start(&RoundConfig::single_player(0, "Bob").unwrap()).unwrap();
        state.drain_events();
        state
    }

    fn clear_track<R: RandomSource>(state: &mut SimulationState<R>) {
        for track in &mut state.obstacles {
            track.clear();
        }
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut state = SimulationState::new(Tuning::default(), 1);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.time(), 0.0);
        assert_eq!(state.phase(), SimPhase::Idle);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = running(1);
        tick(&mut state, &TickInput::default(), 5.0);
        assert_eq!(state.time(), MAX_DT);

        tick(&mut state, &TickInput::default(), -1.0);
        assert_eq!(state.time(), MAX_DT);
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let mut state = running(1);
        let before: Vec<_> = state.competitors().iter().map(|c| (c.pos, c.distance)).collect();
        for dt in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            tick(&mut state, &TickInput::default(), dt);
        }
        assert_eq!(state.time(), 0.0);
        let after: Vec<_> = state.competitors().iter().map(|c| (c.pos, c.distance)).collect();
        assert_eq!(after, before);

        tick(&mut state, &TickInput::default(), DT);
        assert!(state.time() > 0.0);
        assert!(state.competitors().iter().all(|c| c.pos.is_finite()));
    }

    #[test]
    fn test_human_jump_input_reaches_lane() {
        let mut state = running(1);
        let jump = InputSnapshot {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &TickInput::for_lane(0, jump), DT);

        let human = state.competitor(0).unwrap();
        assert!(!human.on_ground);
        let expected = -state.tuning().jump_velocity + state.tuning().gravity * DT;
        assert!((human.vel.y - expected).abs() < 1e-3);

        // Input addressed to a computer lane is ignored
        let mut state = running(1);
        tick(&mut state, &TickInput::for_lane(2, jump), DT);
        assert!(state.competitor(2).unwrap().on_ground);
    }

    #[test]
    fn test_leader_ties_go_to_lowest_lane() {
        let tuning = Tuning::default();
        let mut competitors: Vec<_> = (0..LANES)
            .map(|lane| Competitor::new(lane, "X", ControlMode::Computer, &tuning))
            .collect();
        assert_eq!(leader_index(&competitors), 0);

        competitors[1].distance = 50.0;
        competitors[3].distance = 50.0;
        assert_eq!(leader_index(&competitors), 1);

        competitors[3].distance = 50.5;
        assert_eq!(leader_index(&competitors), 3);
    }

    #[test]
    fn test_camera_follows_local_then_leader() {
        let tuning = Tuning::default();
        let mut competitors: Vec<_> = (0..LANES)
            .map(|lane| Competitor::new(lane, "X", ControlMode::Computer, &tuning))
            .collect();
        competitors[0].pos.x = 300.0;
        competitors[2].pos.x = 900.0;

        assert_eq!(camera_x(&competitors, Some(0), 2, 180.0), 120.0);
        competitors[0].alive = false;
        assert_eq!(camera_x(&competitors, Some(0), 2, 180.0), 720.0);
        assert_eq!(camera_x(&competitors, None, 2, 180.0), 720.0);
    }

    #[test]
    fn test_dead_competitor_stays_frozen() {
        let mut state = running(4);
        clear_track(&mut state);
        state.competitors[1].alive = false;
        let frozen = state.competitors[1].clone();

        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(state.time() > 0.4);
        assert_eq!(state.competitors[1].pos, frozen.pos);
        assert_eq!(state.competitors[1].distance, frozen.distance);
        assert!(state.competitors[0].distance > 0.0);
    }

    #[test]
    fn test_alive_runners_advance_monotonically() {
        let mut state = running(8);
        let mut last: Vec<f32> = state.competitors().iter().map(|c| c.pos.x).collect();
        let left = InputSnapshot {
            left: true,
            ..Default::default()
        };
        for _ in 0..300 {
            let round = state.round();
            tick(&mut state, &TickInput::for_lane(0, left), DT);
            if state.round() != round {
                break;
            }
            for (c, prev) in state.competitors().iter().zip(&mut last) {
                assert!(c.pos.x >= *prev);
                assert!(c.pos.y <= c.rest_y(&state.tuning().geometry));
                *prev = c.pos.x;
            }
        }
    }

    #[test]
    fn test_collision_emits_death_event() {
        let mut state = running(2);
        clear_track(&mut state);
        let ground = state.tuning().geometry.ground_line(0);
        let x = state.competitors[0].pos.x + 10.0;
        state.obstacles[0].push_back(Obstacle {
            lane: 0,
            kind: ObstacleKind::Knife,
            pos: Vec2::new(x, ground - 80.0),
            size: Vec2::new(16.0, 80.0),
        });

        tick(&mut state, &TickInput::default(), DT);
        assert!(!state.competitor(0).unwrap().alive);
        let events = state.drain_events();
        assert!(matches!(
            events.as_slice(),
            [SimEvent::CompetitorDied { lane: 0, .. }]
        ));
    }

    #[test]
    fn test_round_restarts_when_everyone_dies() {
        let mut state = running(6);
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), DT);
        }
        state.competitors[2].distance = 999.0;
        for c in &mut state.competitors {
            c.alive = false;
        }
        let names: Vec<_> = state.competitors().iter().map(|c| c.name.clone()).collect();

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.round(), 2);
        assert_eq!(state.time(), 0.0);
        assert_eq!(state.phase(), SimPhase::Running);
        for (lane, c) in state.competitors().iter().enumerate() {
            assert!(c.alive);
            assert_eq!(c.distance, 0.0);
            assert_eq!(c.pos.x, START_X);
            assert_eq!(c.name, names[lane]);
            assert_eq!(state.lane_obstacles(lane).count(), SEED_OBSTACLES);
        }
        assert_eq!(state.competitor(0).unwrap().control, ControlMode::Human);

        let events = state.drain_events();
        assert!(events.contains(&SimEvent::RoundOver {
            round: 1,
            winner: 2,
            distance: 999.0,
        }));
        assert_eq!(events.last(), Some(&SimEvent::RoundStarted { round: 2 }));
    }

    #[test]
    fn test_track_stays_stocked_and_ordered() {
        let config = RoundConfig::all_computer();
        let mut state = SimulationState::new(Tuning::default(), 77);
        state.start(&config).unwrap();

        for _ in 0..3000 {
            tick(&mut state, &TickInput::default(), DT);
            let leader_x = state.competitor(state.leader()).unwrap().pos.x;
            for lane in 0..LANES {
                let xs: Vec<f32> = state.lane_obstacles(lane).map(|o| o.pos.x).collect();
                assert!(xs.windows(2).all(|w| w[1] > w[0]));
                assert!(xs.iter().all(|&x| x >= state.camera_x() - state.tuning().evict_behind));
                if let Some(&last) = xs.last() {
                    assert!(last > leader_x);
                }
            }
        }
        assert!(state.round() >= 1);
    }

    #[test]
    fn test_lanes_share_one_course() {
        let mut state = SimulationState::new(Tuning::default(), 5);
        state.start(&RoundConfig::all_computer()).unwrap();

        let course = |state: &SimulationState, lane: usize| -> Vec<(f32, ObstacleKind, Vec2)> {
            state
                .lane_obstacles(lane)
                .map(|o| (o.pos.x, o.kind, o.size))
                .collect()
        };
        let assert_shared = |state: &SimulationState| {
            let first = course(state, 0);
            assert!(!first.is_empty());
            for lane in 1..LANES {
                assert_eq!(course(state, lane), first, "lane {lane} diverged");
            }
        };

        assert_shared(&state);
        for _ in 0..3000 {
            tick(&mut state, &TickInput::default(), DT);
            assert_shared(&state);
        }
    }

    #[test]
    fn test_claimed_lane_is_not_driven_by_ai() {
        let mut state = SimulationState::with_rng(Tuning::default(), ScriptedRng::constant(0.1));
        state.start(&RoundConfig::all_computer()).unwrap();
        clear_track(&mut state);
        for lane in [1, 2] {
            let ground = state.tuning().geometry.ground_line(lane);
            state.obstacles[lane].push_back(Obstacle {
                lane,
                kind: ObstacleKind::Spike,
                pos: Vec2::new(200.0, ground - 42.0),
                size: Vec2::new(26.0, 42.0),
            });
        }

        assert!(state.apply_claim(&SlotClaim {
            lane: 2,
            name: Some("Tomoe".into()),
        }));
        tick(&mut state, &TickInput::default(), DT);

        // The unclaimed rival reacts to the same spike
        let rival = state.competitor(1).unwrap();
        assert!(!rival.on_ground);
        assert!(rival.jump_cooldown > 0.0);

        let claimed = state.competitor(2).unwrap();
        assert!(claimed.on_ground);
        assert_eq!(claimed.jump_cooldown, 0.0);
        assert_eq!(claimed.vel.y, 0.0);
    }

    #[test]
    fn test_claim_survives_restart() {
        let mut state = SimulationState::new(Tuning::default(), 12);
        state.start(&RoundConfig::all_computer()).unwrap();
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.apply_claim(&SlotClaim {
            lane: 3,
            name: Some("Tomoe".into()),
        }));

        for c in &mut state.competitors {
            c.alive = false;
        }
        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.round(), 2);
        let claimed = state.competitor(3).unwrap();
        assert_eq!(claimed.control, ControlMode::Human);
        assert_eq!(claimed.name, "Tomoe");
        assert!(claimed.alive);
        assert!(state.competitors()[..3].iter().all(Competitor::is_computer));
    }

    #[test]
    fn test_computer_round_clears_some_obstacles() {
        // A lone spike per lane within reach: rivals jump it
        let mut state = SimulationState::with_rng(Tuning::default(), ScriptedRng::constant(0.1));
        state.start(&RoundConfig::all_computer()).unwrap();
        clear_track(&mut state);
        let ground = state.tuning().geometry.ground_line(0);
        state.obstacles[0].push_back(Obstacle {
            lane: 0,
            kind: ObstacleKind::Spike,
            pos: Vec2::new(400.0, ground - 42.0),
            size: Vec2::new(26.0, 42.0),
        });

        for _ in 0..90 {
            tick(&mut state, &TickInput::default(), DT);
        }
        let c = state.competitor(0).unwrap();
        assert!(c.alive);
        assert!(c.pos.x > 426.0);
    }

    #[test]
    fn test_same_seed_same_world() {
        let build = || {
            let mut state = SimulationState::new(Tuning::default(), 99999);
            let config = RoundConfig::new()
                .assign(0, LaneAssignment::human("Bob"))
                .and_then(|c| c.assign(1, LaneAssignment::computer()))
                .and_then(|c| c.assign(2, LaneAssignment::computer()))
                .and_then(|c| c.assign(3, LaneAssignment::computer()))
                .and_then(|c| c.with_local_lane(0))
                .unwrap();
            state.start(&config).unwrap();
            state
        };
        let mut a = build();
        let mut b = build();

        let jump = InputSnapshot {
            jump: true,
            ..Default::default()
        };
        for i in 0..600 {
            let input = if i % 40 == 0 {
                TickInput::for_lane(0, jump)
            } else {
                TickInput::default()
            };
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }

        assert_eq!(a.round(), b.round());
        assert_eq!(a.competitors(), b.competitors());
        assert!(a.obstacles().eq(b.obstacles()));
    }
}
