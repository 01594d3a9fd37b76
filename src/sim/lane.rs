//! Lanes: one horizontal strip of the board
//!
//! A lane is a hazard tag plus its contents. Rail lanes carry their gate as
//! an optional payload instead of being a separate type.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::obstacle::{HazardClass, Obstacle};
use super::rail::RailGate;
use super::state::FieldConfig;

/// Obstacles per stream lane (inclusive)
const MIN_STREAM: usize = 2;
const MAX_STREAM: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    /// Top edge of the lane
    pub y: f32,
    pub hazard: HazardClass,
    /// Cars or logs; always empty for safe and rail lanes
    pub obstacles: Vec<Obstacle>,
    /// Present only on rail lanes
    pub rail: Option<RailGate>,
}

impl Lane {
    pub fn safe(y: f32) -> Self {
        Self {
            y,
            hazard: HazardClass::Safe,
            obstacles: Vec::new(),
            rail: None,
        }
    }

    /// Build a lane of `hazard` with fresh random contents
    pub fn generate<R: Rng + ?Sized>(
        hazard: HazardClass,
        y: f32,
        config: &FieldConfig,
        rng: &mut R,
        now_ms: f64,
    ) -> Self {
        let lane = match hazard {
            HazardClass::Safe => Self::safe(y),
            HazardClass::Vehicle | HazardClass::Raft => Self {
                y,
                hazard,
                obstacles: generate_stream(hazard, y, config, rng),
                rail: None,
            },
            HazardClass::Rail => {
                let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                Self {
                    y,
                    hazard,
                    obstacles: Vec::new(),
                    rail: Some(RailGate::new(
                        config.rail,
                        y,
                        direction,
                        config.rail_length,
                        config.obstacle_height,
                        now_ms,
                    )),
                }
            }
        };
        log::debug!(
            "Lane y={} {}: {} obstacles",
            y,
            hazard.as_str(),
            lane.obstacles.len()
        );
        lane
    }

    /// Reroll contents, keeping the hazard class; safe lanes are untouched
    pub fn regenerate<R: Rng + ?Sized>(&mut self, config: &FieldConfig, rng: &mut R, now_ms: f64) {
        if self.hazard.is_hazardous() {
            *self = Self::generate(self.hazard, self.y, config, rng, now_ms);
        }
    }

    pub fn advance(&mut self, now_ms: f64, field_width: f32) {
        match self.hazard {
            HazardClass::Safe => {}
            HazardClass::Vehicle | HazardClass::Raft => {
                for obstacle in &mut self.obstacles {
                    obstacle.advance(field_width);
                }
            }
            HazardClass::Rail => {
                if let Some(gate) = self.rail.as_mut() {
                    gate.advance(now_ms, field_width);
                }
            }
        }
    }

    /// First obstacle overlapping `rect`; a rail lane only counts its active train
    pub fn first_contact(&self, rect: &Rect) -> Option<&Obstacle> {
        match self.hazard {
            HazardClass::Safe => None,
            HazardClass::Rail => self
                .rail
                .as_ref()
                .and_then(|gate| gate.active_train())
                .filter(|train| train.bounds().intersects(rect)),
            HazardClass::Vehicle | HazardClass::Raft => {
                self.obstacles.iter().find(|o| o.bounds().intersects(rect))
            }
        }
    }

    pub fn is_warning(&self) -> bool {
        self.rail.as_ref().is_some_and(|g| g.is_warning())
    }
}

/// Cars or logs for one lane: 2-4 primaries sharing one speed, spaced evenly
/// over the wrap cycle from a random phase. Logs also get a partner behind
/// each primary when one fits inside the primary's slot.
fn generate_stream<R: Rng + ?Sized>(
    hazard: HazardClass,
    y: f32,
    config: &FieldConfig,
    rng: &mut R,
) -> Vec<Obstacle> {
    let width = match hazard {
        HazardClass::Raft => config.raft_width,
        _ => config.vehicle_width,
    };
    let count = rng.random_range(MIN_STREAM..=MAX_STREAM);
    let magnitude = if config.max_speed > config.min_speed {
        rng.random_range(config.min_speed..=config.max_speed)
    } else {
        config.min_speed
    };
    let speed = if rng.random_bool(0.5) { magnitude } else { -magnitude };

    let cycle = config.width + width;
    let slot = cycle / count as f32;
    let phase = rng.random_range(0.0..slot);

    // Widest gap that keeps a partner clear of the next primary
    let max_gap = slot - 2.0 * width;
    let pair_logs = hazard == HazardClass::Raft && max_gap >= config.min_raft_gap;

    let mut obstacles = Vec::with_capacity(if pair_logs { count * 2 } else { count });
    for i in 0..count {
        let x = -width + phase + i as f32 * slot;
        obstacles.push(Obstacle::new(hazard, y, x, width, config.obstacle_height, speed));

        if pair_logs {
            let gap = rng.random_range(config.min_raft_gap..=max_gap);
            let mut partner_x = x + width + gap;
            if partner_x >= config.width {
                partner_x -= cycle;
            }
            let height = config.obstacle_height;
            obstacles.push(Obstacle::new(hazard, y, partner_x, width, height, speed));
        }
    }
    obstacles
}
