//! Timed train gate for rail lanes
//!
//! A rail lane cycles `Idle -> Warning -> Discharging -> Idle`. The cooldown
//! clock starts when the previous train has fully left the board, the
//! warning opens `warning_ms` before the next train and the train itself is
//! longer than the board, so one discharge sweeps the whole lane.

use serde::{Deserialize, Serialize};

use super::obstacle::{HazardClass, Obstacle};

/// Cooldown and warning lengths for a rail lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RailTiming {
    /// Time between the end of one discharge and the start of the next
    pub cooldown_ms: f64,
    /// Lead time of the warning before a discharge
    pub warning_ms: f64,
    /// Train speed magnitude (px per tick)
    pub speed: f32,
}

impl Default for RailTiming {
    fn default() -> Self {
        use crate::consts::*;
        Self {
            cooldown_ms: RAIL_COOLDOWN_MS,
            warning_ms: RAIL_WARNING_MS,
            speed: RAIL_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RailPhase {
    Idle,
    Warning,
    Discharging,
}

/// Gate state carried by a rail lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RailGate {
    pub timing: RailTiming,
    /// When the last train cleared the board (or the lane was laid)
    pub last_discharge_ms: f64,
    pub phase: RailPhase,
    /// The one train this lane can hold
    pub train: Option<Obstacle>,
    /// +1.0 rightward, -1.0 leftward
    pub direction: f32,
    pub train_length: f32,
    pub lane_y: f32,
    pub train_height: f32,
}

impl RailGate {
    pub fn new(
        timing: RailTiming,
        lane_y: f32,
        direction: f32,
        train_length: f32,
        train_height: f32,
        now_ms: f64,
    ) -> Self {
        Self {
            timing,
            last_discharge_ms: now_ms,
            phase: RailPhase::Idle,
            train: None,
            direction: direction.signum(),
            train_length,
            lane_y,
            train_height,
        }
    }

    #[inline]
    pub fn is_warning(&self) -> bool {
        self.phase == RailPhase::Warning
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == RailPhase::Discharging
    }

    /// The train, only while discharging
    pub fn active_train(&self) -> Option<&Obstacle> {
        if self.is_active() { self.train.as_ref() } else { None }
    }

    /// Time since the cooldown clock last reset
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.last_discharge_ms).max(0.0)
    }

    /// Advance the gate to `now_ms` (monotonic, never decreasing)
    pub fn advance(&mut self, now_ms: f64, field_width: f32) {
        let elapsed = self.elapsed_ms(now_ms);

        let warn_at = self.timing.cooldown_ms - self.timing.warning_ms;
        if self.phase == RailPhase::Idle && elapsed >= warn_at {
            self.phase = RailPhase::Warning;
        }

        match self.phase {
            RailPhase::Idle => {}
            RailPhase::Warning => {
                if elapsed >= self.timing.cooldown_ms {
                    self.discharge(field_width);
                }
            }
            RailPhase::Discharging => {
                let cleared = match self.train.as_mut() {
                    Some(train) => {
                        train.translate();
                        if train.speed > 0.0 {
                            train.x > field_width
                        } else {
                            train.x + train.width < 0.0
                        }
                    }
                    None => true,
                };
                if cleared {
                    self.train = None;
                    self.phase = RailPhase::Idle;
                    self.last_discharge_ms = now_ms;
                    log::debug!("Rail lane y={} cleared at {:.0}ms", self.lane_y, now_ms);
                }
            }
        }
    }

    /// Spawn the train just outside the near edge
    fn discharge(&mut self, field_width: f32) {
        let speed = self.timing.speed * self.direction;
        let x = if speed > 0.0 { -self.train_length } else { field_width };
        self.train = Some(Obstacle::new(
            HazardClass::Rail,
            self.lane_y,
            x,
            self.train_length,
            self.train_height,
            speed,
        ));
        self.phase = RailPhase::Discharging;
        log::debug!("Rail lane y={} discharging", self.lane_y);
    }
}
