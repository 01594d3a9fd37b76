//! Round state and core simulation types
//!
//! A `Round` is one playthrough from spawn to the first fatal contact. All
//! randomness flows through its seeded RNG so equal seeds replay equally.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::field::PlayField;
use super::rail::RailTiming;
use crate::consts::*;

/// Board geometry and generation knobs, passed explicitly into the sim
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub cell_size: f32,
    pub rows: u32,
    pub actor_size: f32,
    pub obstacle_height: f32,
    pub vehicle_width: f32,
    pub raft_width: f32,
    pub min_raft_gap: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub safe_lane_chance: f64,
    pub rail: RailTiming,
    pub rail_length: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            cell_size: CELL_SIZE,
            rows: ROWS,
            actor_size: ACTOR_SIZE,
            obstacle_height: OBSTACLE_HEIGHT,
            vehicle_width: VEHICLE_WIDTH,
            raft_width: RAFT_WIDTH,
            min_raft_gap: MIN_RAFT_GAP,
            min_speed: MIN_LANE_SPEED,
            max_speed: MAX_LANE_SPEED,
            safe_lane_chance: SAFE_LANE_CHANCE,
            rail: RailTiming::default(),
            rail_length: RAIL_LENGTH,
        }
    }
}

impl FieldConfig {
    /// Board height in logical px
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Bottom row, where the actor starts
    pub fn spawn_row(&self) -> u32 {
        self.rows.saturating_sub(1)
    }

    pub fn row_y(&self, row: u32) -> f32 {
        row as f32 * self.cell_size
    }

    /// Row index containing `y`
    pub fn row_of(&self, y: f32) -> usize {
        (y / self.cell_size).floor().max(0.0) as usize
    }

    /// Horizontally centred on the spawn row
    pub fn spawn_position(&self) -> Vec2 {
        Vec2::new(
            self.width / 2.0 - self.actor_size / 2.0,
            self.row_y(self.spawn_row()),
        )
    }

    /// Rightmost x the actor may occupy
    pub fn max_actor_x(&self) -> f32 {
        (self.width - self.actor_size).max(0.0)
    }
}

/// A one-cell hop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Up,
    Down,
    Left,
    Right,
}

/// The player token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Top-left corner; `y` stays on the lane grid
    pub pos: Vec2,
    pub size: f32,
    /// Riding a log this tick
    pub on_raft: bool,
}

impl Actor {
    pub fn spawn(config: &FieldConfig) -> Self {
        Self {
            pos: config.spawn_position(),
            size: config.actor_size,
            on_raft: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn row(&self, config: &FieldConfig) -> usize {
        config.row_of(self.pos.y)
    }

    pub fn reset(&mut self, config: &FieldConfig) {
        self.pos = config.spawn_position();
        self.on_raft = false;
    }

    /// Hop one cell; returns false when already against that edge.
    /// Horizontal hops clamp to the board so `x` never leaves it.
    pub fn step(&mut self, step: Step, config: &FieldConfig) -> bool {
        let cell = config.cell_size;
        let bottom = config.row_y(config.spawn_row());
        let right = config.max_actor_x();
        match step {
            Step::Up if self.pos.y > 0.0 => self.pos.y = (self.pos.y - cell).max(0.0),
            Step::Down if self.pos.y < bottom => self.pos.y = (self.pos.y + cell).min(bottom),
            Step::Left if self.pos.x > 0.0 => self.pos.x = (self.pos.x - cell).max(0.0),
            Step::Right if self.pos.x < right => self.pos.x = (self.pos.x + cell).min(right),
            _ => return false,
        }
        true
    }

    /// Displace by a log's speed, then clamp so the ride never leaves the board
    pub fn carry(&mut self, dx: f32, config: &FieldConfig) {
        self.pos.x = (self.pos.x + dx).clamp(0.0, config.max_actor_x());
    }
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossCause {
    HitByVehicle,
    FellInWater,
    HitByTrain,
}

impl LossCause {
    pub fn describe(&self) -> &'static str {
        match self {
            LossCause::HitByVehicle => "hit by a car",
            LossCause::FellInWater => "fell in the water",
            LossCause::HitByTrain => "hit by a train",
        }
    }
}

/// Notable outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// Goal row reached; carries the new score
    Scored { score: u32 },
    Lost(LossCause),
}

/// One playthrough: an actor crossing a field
#[derive(Debug, Clone)]
pub struct Round {
    pub config: FieldConfig,
    pub seed: u64,
    pub actor: Actor,
    pub field: PlayField,
    pub score: u32,
    pub over: bool,
    pub loss: Option<LossCause>,
    /// Simulation tick counter
    pub ticks: u64,
    pub(crate) rng: Pcg32,
}

impl Round {
    pub fn new(config: FieldConfig, seed: u64, now_ms: f64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let field = PlayField::generate(&config, &mut rng, now_ms);
        Self {
            config,
            seed,
            actor: Actor::spawn(&config),
            field,
            score: 0,
            over: false,
            loss: None,
            ticks: 0,
            rng,
        }
    }

    /// Apply a movement intent; ignored once the round is over
    pub fn move_actor(&mut self, step: Step) -> bool {
        if self.over {
            return false;
        }
        self.actor.step(step, &self.config)
    }

    /// Advance one frame, see [`super::tick::tick`]
    pub fn advance(&mut self, now_ms: f64) -> Option<RoundEvent> {
        super::tick::tick(self, now_ms)
    }
}
