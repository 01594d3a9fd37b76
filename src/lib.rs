//! Lane Hopper - a lane-crossing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, obstacles, collision, rounds)
//! - `session`: Menu / play / game-over / leaderboard state machine
//! - `leaderboard`: Best-time-per-score merge policy
//! - `persistence`: Leaderboard store contract and backends
//! - `platform`: Raw key mapping to game intents
//! - `renderer`: Canvas2D presentation shell (wasm only)

pub mod leaderboard;
pub mod persistence;
pub mod platform;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use session::{Intent, SessionController, SessionState, StoreRequest};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Grid cell edge (logical px); every lane is one cell tall
    pub const CELL_SIZE: f32 = 40.0;
    /// Lanes on the board, goal row included
    pub const ROWS: u32 = 10;
    /// Board width (logical px)
    pub const FIELD_WIDTH: f32 = 400.0;

    /// Player sprite edge
    pub const ACTOR_SIZE: f32 = 30.0;
    /// Height shared by every obstacle sprite
    pub const OBSTACLE_HEIGHT: f32 = 30.0;

    /// Car length
    pub const VEHICLE_WIDTH: f32 = 60.0;
    /// Log length
    pub const RAFT_WIDTH: f32 = 100.0;
    /// Smallest gap between a log and its partner
    pub const MIN_RAFT_GAP: f32 = 10.0;

    /// Lane speed magnitude range (px per tick)
    pub const MIN_LANE_SPEED: f32 = 1.0;
    pub const MAX_LANE_SPEED: f32 = 3.0;

    /// Chance an interior lane is generated safe
    pub const SAFE_LANE_CHANCE: f64 = 0.2;

    /// Train timing (ms)
    pub const RAIL_COOLDOWN_MS: f64 = 5000.0;
    pub const RAIL_WARNING_MS: f64 = 2000.0;
    /// Train speed (px per tick)
    pub const RAIL_SPEED: f32 = 12.0;
    /// Train length; longer than the board so one pass sweeps the whole lane
    pub const RAIL_LENGTH: f32 = 560.0;

    /// Leaderboard rows shown per page
    pub const LEADERBOARD_PAGE_SIZE: usize = 8;
    /// Longest accepted player name
    pub const MAX_NAME_LEN: usize = 16;
}

/// Round elapsed milliseconds to tenths of a second
#[inline]
pub fn tenths_of_second(elapsed_ms: f64) -> f64 {
    (elapsed_ms.max(0.0) / 100.0).round() / 10.0
}
