//! The play field: every lane from the goal row down to the spawn row

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::lane::Lane;
use super::obstacle::HazardClass;
use super::state::FieldConfig;

/// Classes an interior lane can roll
const INTERIOR_HAZARDS: [HazardClass; 3] =
    [HazardClass::Vehicle, HazardClass::Raft, HazardClass::Rail];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    pub config: FieldConfig,
    /// Ordered top (goal, row 0) to bottom (spawn)
    pub lanes: Vec<Lane>,
}

impl PlayField {
    /// Lay out a fresh board. Row 0 and the spawn row are always safe.
    pub fn generate<R: Rng + ?Sized>(config: &FieldConfig, rng: &mut R, now_ms: f64) -> Self {
        let spawn_row = config.spawn_row();
        let lanes = (0..config.rows)
            .map(|row| {
                let y = config.row_y(row);
                let forced_safe = row == 0 || row == spawn_row;
                let hazard = if forced_safe || rng.random_bool(config.safe_lane_chance) {
                    HazardClass::Safe
                } else {
                    INTERIOR_HAZARDS[rng.random_range(0..INTERIOR_HAZARDS.len())]
                };
                Lane::generate(hazard, y, config, rng, now_ms)
            })
            .collect();
        let field = Self { config: *config, lanes };
        let [safe, vehicle, raft, rail] = field.hazard_counts();
        log::debug!(
            "Field laid out: {} safe, {} road, {} water, {} rail",
            safe,
            vehicle,
            raft,
            rail
        );
        field
    }

    /// Reroll every hazardous lane's contents; classes and safe lanes stay put
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R, now_ms: f64) {
        let config = self.config;
        for lane in &mut self.lanes {
            lane.regenerate(&config, rng, now_ms);
        }
    }

    pub fn advance(&mut self, now_ms: f64) {
        let width = self.config.width;
        for lane in &mut self.lanes {
            lane.advance(now_ms, width);
        }
    }

    /// Lane containing the vertical coordinate `y`
    pub fn lane_at(&self, y: f32) -> Option<&Lane> {
        if y < 0.0 {
            return None;
        }
        self.lanes.get(self.config.row_of(y))
    }

    pub fn hazard_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for lane in &self.lanes {
            let idx = match lane.hazard {
                HazardClass::Safe => 0,
                HazardClass::Vehicle => 1,
                HazardClass::Raft => 2,
                HazardClass::Rail => 3,
            };
            counts[idx] += 1;
        }
        counts
    }
}
