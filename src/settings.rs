//! Game settings and store configuration
//!
//! Persisted in LocalStorage on the web; native builds use defaults.

use serde::{Deserialize, Serialize};

use crate::consts::{LEADERBOARD_PAGE_SIZE, MAX_NAME_LEN};
use crate::sim::FieldConfig;

/// Where the leaderboard document lives; stored by name (`"local"`, `"gist"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum StoreBackend {
    #[default]
    Local,
    Gist,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Local => "local",
            StoreBackend::Gist => "gist",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" | "localstorage" => Some(StoreBackend::Local),
            "gist" | "github" => Some(StoreBackend::Gist),
            _ => None,
        }
    }
}

impl TryFrom<String> for StoreBackend {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s).ok_or_else(|| format!("unknown store backend {s:?}"))
    }
}

impl From<StoreBackend> for String {
    fn from(backend: StoreBackend) -> Self {
        backend.as_str().to_string()
    }
}

/// Leaderboard store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// Gist holding the document
    pub gist_id: String,
    /// GitHub token with gist scope
    pub token: String,
    /// File inside the gist
    pub file_name: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            gist_id: String::new(),
            token: String::new(),
            file_name: "leaderboard.json".to_string(),
        }
    }
}

impl StoreSettings {
    /// A gist backend needs both an id and a token
    pub fn gist_ready(&self) -> bool {
        !self.gist_id.trim().is_empty() && !self.token.trim().is_empty()
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board geometry and generation
    pub field: FieldConfig,
    /// Leaderboard rows per page
    pub leaderboard_page_size: usize,
    /// Longest accepted player name
    pub max_name_len: usize,
    pub store: StoreSettings,
    /// Fixed RNG seed (otherwise taken from the clock)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            leaderboard_page_size: LEADERBOARD_PAGE_SIZE,
            max_name_len: MAX_NAME_LEN,
            store: StoreSettings::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "lane_hopper_settings";

    /// Clamp values that would break the simulation or paging
    pub fn sanitized(mut self) -> Self {
        let field = &mut self.field;
        field.rows = field.rows.max(3);
        field.cell_size = field.cell_size.max(1.0);
        field.width = field.width.max(field.cell_size);
        field.actor_size = field.actor_size.clamp(1.0, field.cell_size);
        field.obstacle_height = field.obstacle_height.clamp(1.0, field.cell_size);
        field.vehicle_width = field.vehicle_width.max(1.0);
        field.raft_width = field.raft_width.max(1.0);
        field.min_raft_gap = field.min_raft_gap.max(0.0);
        field.min_speed = field.min_speed.max(0.1);
        field.max_speed = field.max_speed.max(field.min_speed);
        field.safe_lane_chance = field.safe_lane_chance.clamp(0.0, 1.0);
        field.rail.cooldown_ms = field.rail.cooldown_ms.max(0.0);
        field.rail.warning_ms = field.rail.warning_ms.clamp(0.0, field.rail.cooldown_ms);
        // A stalled train would never clear its lane
        field.rail.speed = field.rail.speed.max(0.1);
        if field.rail_length <= field.width {
            field.rail_length = field.width + field.cell_size * 4.0;
        }
        self.leaderboard_page_size = self.leaderboard_page_size.max(1);
        self.max_name_len = self.max_name_len.max(1);
        if self.store.backend == StoreBackend::Gist && !self.store.gist_ready() {
            log::warn!("Gist store selected without id/token, using LocalStorage");
            self.store.backend = StoreBackend::Local;
        }
        self
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings.sanitized();
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native builds always start from defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"leaderboard_page_size": 5, "field": {"rows": 12}}"#).unwrap();
        assert_eq!(settings.leaderboard_page_size, 5);
        assert_eq!(settings.field.rows, 12);
        assert_eq!(settings.field.cell_size, 40.0);
        assert_eq!(settings.store.file_name, "leaderboard.json");
    }

    #[test]
    fn test_sanitized_repairs_bad_values() {
        let mut settings = Settings::default();
        settings.leaderboard_page_size = 0;
        settings.field.rows = 1;
        settings.field.rail.warning_ms = 9000.0;
        settings.field.rail_length = 100.0;
        settings.field.vehicle_width = -500.0;
        settings.field.raft_width = 0.0;
        settings.field.min_raft_gap = -3.0;
        settings.field.rail.speed = 0.0;
        settings.store.backend = StoreBackend::Gist;

        let s = settings.sanitized();
        assert_eq!(s.field.vehicle_width, 1.0);
        assert_eq!(s.field.raft_width, 1.0);
        assert_eq!(s.field.min_raft_gap, 0.0);
        assert_eq!(s.field.rail.speed, 0.1);
        assert_eq!(s.leaderboard_page_size, 1);
        assert_eq!(s.field.rows, 3);
        assert_eq!(s.field.rail.warning_ms, s.field.rail.cooldown_ms);
        assert!(s.field.rail_length > s.field.width);
        assert_eq!(s.store.backend, StoreBackend::Local);
    }

    #[test]
    fn test_backend_names() {
        let store: StoreSettings = serde_json::from_str(r#"{"backend": "GitHub"}"#).unwrap();
        assert_eq!(store.backend, StoreBackend::Gist);
        let json = serde_json::to_string(&StoreSettings::default()).unwrap();
        assert!(json.contains(r#""backend":"local""#));
        assert!(serde_json::from_str::<StoreSettings>(r#"{"backend": "ftp"}"#).is_err());
    }

    #[test]
    fn test_degenerate_field_still_plays() {
        // Widths that would leave no room to place obstacles
        let settings: Settings = serde_json::from_str(
            r#"{"field": {"vehicle_width": -500.0, "raft_width": -1.0, "safe_lane_chance": 0.0}}"#,
        )
        .unwrap();
        let field = settings.sanitized().field;
        for seed in 0..16 {
            let mut round = crate::sim::Round::new(field, seed, 0.0);
            for frame in 0..32 {
                round.advance(frame as f64 * 16.0);
            }
        }
    }

    #[test]
    fn test_train_always_clears() {
        let mut settings = Settings::default();
        settings.field.rail.speed = 0.0;
        let field = settings.sanitized().field;
        let timing = field.rail;
        let mut gate = crate::sim::RailGate::new(timing, 40.0, 1.0, field.rail_length, 30.0, 0.0);

        let mut now = 0.0;
        while !gate.is_active() {
            now += 16.0;
            gate.advance(now, field.width);
        }
        let mut ticks = 0;
        while gate.is_active() {
            now += 16.0;
            gate.advance(now, field.width);
            ticks += 1;
            assert!(ticks < 20_000, "train never left the board");
        }
    }
}
