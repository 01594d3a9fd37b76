//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestamps only (monotonic, any cadence)
//! - Seeded RNG only
//! - Stable lane order (goal row first)
//! - No rendering or platform dependencies

pub mod collision;
pub mod field;
pub mod lane;
pub mod obstacle;
pub mod rail;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use field::PlayField;
pub use lane::Lane;
pub use obstacle::{HazardClass, Obstacle};
pub use rail::{RailGate, RailPhase, RailTiming};
pub use state::{Actor, FieldConfig, LossCause, Round, RoundEvent, Step};
pub use tick::tick;
