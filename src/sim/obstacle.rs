//! Moving hazards
//!
//! Cars and logs loop forever: once an obstacle has fully left the board in
//! its direction of travel it re-enters from the other side, so each lane is
//! a continuous stream with a wrap cycle of `field width + obstacle width`.

use serde::{Deserialize, Serialize};

use super::collision::Rect;

/// Behavior class shared by a lane and its obstacles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardClass {
    /// Grass; nothing moves here
    Safe,
    /// Cars; lethal on touch
    Vehicle,
    /// Logs over water; must be ridden
    Raft,
    /// Train track; lethal while a train passes
    Rail,
}

impl HazardClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardClass::Safe => "safe",
            HazardClass::Vehicle => "vehicle",
            HazardClass::Raft => "raft",
            HazardClass::Rail => "rail",
        }
    }

    /// Classes that are rerolled when a lane is regenerated
    pub fn is_hazardous(&self) -> bool {
        !matches!(self, HazardClass::Safe)
    }
}

/// A single moving hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Top of the owning lane
    pub lane_y: f32,
    /// Left edge
    pub x: f32,
    pub width: f32,
    pub height: f32,
    /// Signed px per tick (positive = rightward)
    pub speed: f32,
    pub hazard: HazardClass,
}

impl Obstacle {
    pub fn new(
        hazard: HazardClass,
        lane_y: f32,
        x: f32,
        width: f32,
        height: f32,
        speed: f32,
    ) -> Self {
        Self {
            lane_y,
            x,
            width,
            height,
            speed,
            hazard,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.lane_y, self.width, self.height)
    }

    /// Length of one full loop across a board of `field_width`
    #[inline]
    pub fn wrap_cycle(&self, field_width: f32) -> f32 {
        field_width + self.width
    }

    /// Move by `speed`, wrapping to the opposite edge once fully off-board
    pub fn advance(&mut self, field_width: f32) {
        self.translate();
        let cycle = self.wrap_cycle(field_width);
        if self.speed > 0.0 && self.x > field_width {
            self.x -= cycle;
        } else if self.speed < 0.0 && self.x < -self.width {
            self.x += cycle;
        }
    }

    /// Move by `speed` without wrapping (trains)
    #[inline]
    pub fn translate(&mut self) {
        self.x += self.speed;
    }

    /// Whether any part of the obstacle is over the board
    pub fn is_on_field(&self, field_width: f32) -> bool {
        self.x < field_width && self.x + self.width > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const W: f32 = 400.0;

    #[test]
    fn test_rightward_wrap() {
        let mut car = Obstacle::new(HazardClass::Vehicle, 40.0, 399.0, 60.0, 30.0, 2.0);
        car.advance(W);
        // 401 is past the right edge: re-enter one cycle earlier
        assert!((car.x - (401.0 - 460.0)).abs() < 1e-4);
        assert!(car.x >= -car.width);
    }

    #[test]
    fn test_leftward_wrap() {
        let mut log = Obstacle::new(HazardClass::Raft, 80.0, -99.0, 100.0, 30.0, -2.0);
        log.advance(W);
        assert!((log.x - (-101.0 + 500.0)).abs() < 1e-4);
        assert!(log.x <= W);
    }

    #[test]
    fn test_translate_never_wraps() {
        let mut train = Obstacle::new(HazardClass::Rail, 120.0, 390.0, 560.0, 30.0, 12.0);
        train.translate();
        assert_eq!(train.x, 402.0);
    }

    proptest! {
        #[test]
        fn prop_wrap_is_continuous(
            start in -200.0f32..400.0,
            speed in prop_oneof![-4.0f32..-0.5, 0.5f32..4.0],
            width in 30.0f32..150.0,
            ticks in 1usize..600,
        ) {
            let x = start.max(-width);
            let mut o = Obstacle::new(HazardClass::Vehicle, 0.0, x, width, 30.0, speed);
            let cycle = o.wrap_cycle(W);
            for _ in 0..ticks {
                let before = o.x;
                o.advance(W);
                let moved = o.x - before;
                // Either a plain step, or a step plus exactly one cycle
                let plain = (moved - speed).abs() < 1e-2;
                let wrapped = ((moved - speed).abs() - cycle).abs() < 1e-2;
                prop_assert!(plain || wrapped);
                prop_assert!(o.x >= -width - speed.abs() - 1e-3);
                prop_assert!(o.x <= W + speed.abs() + 1e-3);
            }
        }
    }
}
