//! Per-frame round update
//!
//! Order within one tick is fixed: obstacles move, then the actor's lane is
//! resolved, then the goal row is checked.

use super::obstacle::HazardClass;
use super::state::{LossCause, Round, RoundEvent};

/// Advance the round by one frame at `now_ms` (monotonic)
pub fn tick(round: &mut Round, now_ms: f64) -> Option<RoundEvent> {
    if round.over {
        return None;
    }
    round.ticks += 1;

    round.field.advance(now_ms);

    if let Some(cause) = resolve_lane(round) {
        round.over = true;
        round.loss = Some(cause);
        round.actor.on_raft = false;
        log::info!(
            "Round over after {} ticks: {} (score {})",
            round.ticks,
            cause.describe(),
            round.score
        );
        return Some(RoundEvent::Lost(cause));
    }

    if round.actor.row(&round.config) == 0 {
        round.score += 1;
        round.actor.reset(&round.config);
        round.field.regenerate(&mut round.rng, now_ms);
        log::info!("Crossing complete, score {}", round.score);
        return Some(RoundEvent::Scored { score: round.score });
    }

    None
}

/// Resolve the actor against whatever occupies its lane this tick
fn resolve_lane(round: &mut Round) -> Option<LossCause> {
    let actor_box = round.actor.bounds();
    let Some(lane) = round.field.lane_at(round.actor.pos.y) else {
        round.actor.on_raft = false;
        return None;
    };

    match lane.hazard {
        HazardClass::Safe => {
            round.actor.on_raft = false;
            None
        }
        HazardClass::Vehicle => lane
            .first_contact(&actor_box)
            .map(|_| LossCause::HitByVehicle),
        HazardClass::Rail => lane
            .first_contact(&actor_box)
            .map(|_| LossCause::HitByTrain),
        HazardClass::Raft => match lane.first_contact(&actor_box).map(|log| log.speed) {
            Some(carry) => {
                round.actor.on_raft = true;
                round.actor.carry(carry, &round.config);
                None
            }
            None => Some(LossCause::FellInWater),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lane::Lane;
    use crate::sim::obstacle::Obstacle;
    use crate::sim::state::{FieldConfig, Step};

    /// A round whose lanes are all safe except the ones a test installs
    fn open_round() -> Round {
        let config = FieldConfig::default();
        let mut round = Round::new(config, 1, 0.0);
        for lane in &mut round.field.lanes {
            *lane = Lane::safe(lane.y);
        }
        round
    }

    fn stream_lane(hazard: HazardClass, y: f32, xs: &[f32], width: f32, speed: f32) -> Lane {
        Lane {
            y,
            hazard,
            obstacles: xs
                .iter()
                .map(|&x| Obstacle::new(hazard, y, x, width, 30.0, speed))
                .collect(),
            rail: None,
        }
    }

    #[test]
    fn test_vehicle_collision_ends_round() {
        let mut round = open_round();
        // Car will be at x = 160..220 after one step, overlapping 185..215
        round.field.lanes[8] = stream_lane(HazardClass::Vehicle, 320.0, &[158.0], 60.0, 2.0);
        round.move_actor(Step::Up);

        assert_eq!(round.advance(16.0), Some(RoundEvent::Lost(LossCause::HitByVehicle)));
        assert!(round.over);
        // Terminal: nothing further happens
        assert_eq!(round.advance(32.0), None);
        assert!(!round.move_actor(Step::Up));
    }

    #[test]
    fn test_touching_car_is_not_a_hit() {
        let mut round = open_round();
        // After one step the car spans 125..185, flush with the actor's left edge
        round.field.lanes[8] = stream_lane(HazardClass::Vehicle, 320.0, &[123.0], 60.0, 2.0);
        round.move_actor(Step::Up);
        assert_eq!(round.advance(16.0), None);
        assert!(!round.over);
    }

    #[test]
    fn test_raft_carries_actor() {
        let mut round = open_round();
        round.field.lanes[8] = stream_lane(HazardClass::Raft, 320.0, &[150.0], 100.0, -2.0);
        round.move_actor(Step::Up);

        for _ in 0..5 {
            assert_eq!(round.advance(16.0), None);
        }
        assert!(round.actor.on_raft);
        assert_eq!(round.actor.pos.x, 175.0);
    }

    #[test]
    fn test_missing_raft_drowns() {
        let mut round = open_round();
        round.field.lanes[8] = stream_lane(HazardClass::Raft, 320.0, &[0.0], 100.0, 1.0);
        round.move_actor(Step::Up);
        assert_eq!(round.advance(16.0), Some(RoundEvent::Lost(LossCause::FellInWater)));
    }

    #[test]
    fn test_carry_is_clamped_at_board_edge() {
        let mut round = open_round();
        round.field.lanes[8] = stream_lane(HazardClass::Raft, 320.0, &[300.0], 100.0, 3.0);
        round.move_actor(Step::Up);
        round.actor.pos.x = 369.0;
        // Log 303..403 keeps the actor afloat, carry pushes it to the edge only
        assert_eq!(round.advance(16.0), None);
        assert_eq!(round.actor.pos.x, 370.0);
    }

    #[test]
    fn test_rail_only_kills_while_active() {
        let mut round = open_round();
        let mut lane = Lane::generate(
            HazardClass::Rail,
            320.0,
            &round.config,
            &mut round.rng,
            0.0,
        );
        if let Some(gate) = lane.rail.as_mut() {
            gate.direction = 1.0;
        }
        round.field.lanes[8] = lane;
        round.move_actor(Step::Up);

        assert_eq!(round.advance(3500.0), None);
        assert!(round.field.lanes[8].is_warning());

        let mut now = 5000.0;
        let mut outcome = round.advance(now);
        while outcome.is_none() {
            now += 16.0;
            outcome = round.advance(now);
            assert!(now < 20_000.0);
        }
        assert_eq!(outcome, Some(RoundEvent::Lost(LossCause::HitByTrain)));
    }

    #[test]
    fn test_goal_scores_once_and_resets() {
        let mut round = open_round();
        for _ in 0..9 {
            round.move_actor(Step::Up);
        }
        assert_eq!(round.actor.pos.y, 0.0);

        assert_eq!(round.advance(16.0), Some(RoundEvent::Scored { score: 1 }));
        assert_eq!(round.score, 1);
        assert_eq!(round.actor.pos, round.config.spawn_position());

        for i in 0..10 {
            assert_eq!(round.advance(32.0 + i as f64), None);
        }
        assert_eq!(round.score, 1);
    }

    #[test]
    fn test_goal_regenerates_hazard_lanes() {
        let mut round = open_round();
        round.field.lanes[4] = stream_lane(HazardClass::Vehicle, 160.0, &[0.0], 60.0, 1.0);
        for _ in 0..9 {
            round.move_actor(Step::Up);
        }
        round.advance(16.0);
        let lane = &round.field.lanes[4];
        assert_eq!(lane.hazard, HazardClass::Vehicle);
        assert!((2..=4).contains(&lane.obstacles.len()));
        assert!(round.field.lanes[0].obstacles.is_empty());
    }
}
