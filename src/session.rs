//! Session state machine
//!
//! `Menu -> Playing -> GameOver -> (Playing | Menu)`, with a `Leaderboard`
//! view reachable from the menu. The controller is driven by two calls from
//! the shell: [`SessionController::handle`] for discrete intents and
//! [`SessionController::tick`] once per frame. Store I/O is queued, never
//! awaited; see [`crate::persistence`].

use crate::leaderboard::{Leaderboard, LeaderboardEntry, MergeOutcome};
use crate::persistence::{StoreError, StoreResponse};
use crate::platform::KeyContext;
use crate::settings::Settings;
use crate::sim::{Round, RoundEvent, Step};
use crate::tenths_of_second;

pub use crate::persistence::StoreRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Menu,
    Playing,
    GameOver,
    Leaderboard,
}

/// A discrete player intent, already decoded from raw input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Move(Step),
    Confirm,
    Back,
    Restart,
    TextChar(char),
    Backspace,
    ToggleLeaderboard,
    ScrollUp,
    ScrollDown,
}

/// Top-level game controller
#[derive(Debug)]
pub struct SessionController {
    settings: Settings,
    state: SessionState,
    player_name: String,
    name_committed: bool,
    round: Round,
    /// Decorative field animated behind the menu
    backdrop: Round,
    start_ms: f64,
    end_ms: Option<f64>,
    leaderboard: Leaderboard,
    page: usize,
    outbox: Vec<StoreRequest>,
    last_store_error: Option<String>,
    base_seed: u64,
    rounds_started: u64,
}

impl SessionController {
    /// New session in the menu; queues an initial leaderboard fetch
    pub fn new(settings: Settings, seed: u64, now_ms: f64) -> Self {
        let settings = settings.sanitized();
        let base_seed = settings.seed.unwrap_or(seed);
        let field = settings.field;
        Self {
            settings,
            state: SessionState::Menu,
            player_name: String::new(),
            name_committed: false,
            round: Round::new(field, base_seed, now_ms),
            backdrop: Round::new(field, base_seed ^ 0x9E37_79B9_7F4A_7C15, now_ms),
            start_ms: now_ms,
            end_ms: None,
            leaderboard: Leaderboard::new(),
            page: 0,
            outbox: vec![StoreRequest::Fetch],
            last_store_error: None,
            base_seed,
            rounds_started: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn name_committed(&self) -> bool {
        self.name_committed
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn backdrop(&self) -> &Round {
        &self.backdrop
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.leaderboard.page_count(self.settings.leaderboard_page_size)
    }

    /// Entries on the current leaderboard page
    pub fn visible_entries(&self) -> &[LeaderboardEntry] {
        self.leaderboard
            .page(self.page, self.settings.leaderboard_page_size)
    }

    pub fn last_store_error(&self) -> Option<&str> {
        self.last_store_error.as_deref()
    }

    /// Round time for the HUD: live while playing, frozen after game over
    pub fn elapsed_seconds(&self, now_ms: f64) -> f64 {
        let end = self.end_ms.unwrap_or(now_ms);
        tenths_of_second(end - self.start_ms)
    }

    /// How the shell should decode the next key press
    pub fn key_context(&self) -> KeyContext {
        match self.state {
            SessionState::Menu if !self.name_committed => KeyContext::NameEntry,
            SessionState::Menu => KeyContext::Menu,
            SessionState::Playing => KeyContext::Playing,
            SessionState::GameOver => KeyContext::GameOver,
            SessionState::Leaderboard => KeyContext::Leaderboard,
        }
    }

    /// Drain queued store work
    pub fn take_requests(&mut self) -> Vec<StoreRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn handle(&mut self, intent: Intent, now_ms: f64) {
        match self.state {
            SessionState::Menu => self.handle_menu(intent, now_ms),
            SessionState::Playing => {
                if let Intent::Move(step) = intent {
                    self.round.move_actor(step);
                }
            }
            SessionState::GameOver => match intent {
                Intent::Restart => self.start_round(now_ms),
                Intent::Confirm | Intent::Back => self.return_to_menu(now_ms),
                _ => {}
            },
            SessionState::Leaderboard => match intent {
                Intent::ScrollUp => self.page = self.page.saturating_sub(1),
                Intent::ScrollDown => {
                    self.page = self
                        .leaderboard
                        .clamp_page(self.page + 1, self.settings.leaderboard_page_size);
                }
                Intent::Back | Intent::ToggleLeaderboard => self.return_to_menu(now_ms),
                _ => {}
            },
        }
    }

    fn handle_menu(&mut self, intent: Intent, now_ms: f64) {
        if !self.name_committed {
            match intent {
                Intent::TextChar(c) if accepts_name_char(c) => {
                    if self.player_name.chars().count() < self.settings.max_name_len {
                        self.player_name.push(c);
                    }
                }
                Intent::Backspace => {
                    self.player_name.pop();
                }
                Intent::Confirm => {
                    let trimmed = self.player_name.trim();
                    if !trimmed.is_empty() {
                        self.player_name = trimmed.to_string();
                        self.name_committed = true;
                        log::info!("Player name set: {}", self.player_name);
                    }
                }
                _ => {}
            }
            return;
        }

        match intent {
            Intent::Confirm => self.start_round(now_ms),
            Intent::ToggleLeaderboard => self.open_leaderboard(),
            // Reopen the name for editing
            Intent::Back => self.name_committed = false,
            _ => {}
        }
    }

    fn next_seed(&mut self) -> u64 {
        self.rounds_started += 1;
        self.base_seed
            .wrapping_add(self.rounds_started.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    fn start_round(&mut self, now_ms: f64) {
        if !self.name_committed {
            return;
        }
        let seed = self.next_seed();
        self.round = Round::new(self.settings.field, seed, now_ms);
        self.start_ms = now_ms;
        self.end_ms = None;
        self.state = SessionState::Playing;
        log::info!("Round started for {} (seed {})", self.player_name, seed);
    }

    fn return_to_menu(&mut self, now_ms: f64) {
        self.state = SessionState::Menu;
        let seed = self.next_seed() ^ 0x9E37_79B9_7F4A_7C15;
        self.backdrop = Round::new(self.settings.field, seed, now_ms);
    }

    fn open_leaderboard(&mut self) {
        self.state = SessionState::Leaderboard;
        self.page = 0;
        self.outbox.push(StoreRequest::Fetch);
        log::info!("Leaderboard opened ({} cached entries)", self.leaderboard.len());
    }

    /// Advance one frame
    pub fn tick(&mut self, now_ms: f64) {
        match self.state {
            SessionState::Menu | SessionState::Leaderboard => self.backdrop.field.advance(now_ms),
            SessionState::Playing => match self.round.advance(now_ms) {
                Some(RoundEvent::Scored { score }) => self.record_milestone(score, now_ms),
                Some(RoundEvent::Lost(cause)) => {
                    self.end_ms = Some(now_ms);
                    self.state = SessionState::GameOver;
                    log::info!(
                        "Game over for {}: {} with score {} in {:.1}s",
                        self.player_name,
                        cause.describe(),
                        self.round.score,
                        self.elapsed_seconds(now_ms)
                    );
                }
                None => {}
            },
            SessionState::GameOver => {}
        }
    }

    /// Record a score the moment it is reached, then push the whole board
    fn record_milestone(&mut self, score: u32, now_ms: f64) {
        let entry = LeaderboardEntry::new(
            self.player_name.clone(),
            score,
            tenths_of_second(now_ms - self.start_ms),
        );
        let outcome = self.leaderboard.add_entry(entry);
        log::debug!("Milestone {} -> {:?}", score, outcome);
        // Only the newest full board is worth writing
        self.outbox
            .retain(|request| !matches!(request, StoreRequest::ReplaceAll(_)));
        self.outbox
            .push(StoreRequest::ReplaceAll(self.leaderboard.entries().to_vec()));
    }

    /// Merge fetched entries into the local board; failures leave it as is
    pub fn on_fetch_complete(&mut self, result: Result<Vec<LeaderboardEntry>, StoreError>) {
        match result {
            Ok(entries) => {
                let mut improved = 0;
                for entry in entries {
                    if self.leaderboard.add_entry(entry) != MergeOutcome::Kept {
                        improved += 1;
                    }
                }
                self.page = self
                    .leaderboard
                    .clamp_page(self.page, self.settings.leaderboard_page_size);
                self.last_store_error = None;
                log::info!(
                    "Leaderboard refreshed: {} entries ({} merged)",
                    self.leaderboard.len(),
                    improved
                );
            }
            Err(e) => {
                log::warn!("Leaderboard fetch failed: {}", e);
                self.last_store_error = Some(e.to_string());
            }
        }
    }

    /// Submissions are at-most-once; a failure is only recorded
    pub fn on_submit_complete(&mut self, result: Result<(), StoreError>) {
        match result {
            Ok(()) => self.last_store_error = None,
            Err(e) => {
                log::error!("Leaderboard submit failed: {}", e);
                self.last_store_error = Some(e.to_string());
            }
        }
    }

    pub fn on_store_response(&mut self, response: StoreResponse) {
        match response {
            StoreResponse::Fetched(result) => self.on_fetch_complete(result),
            StoreResponse::Submitted(result) => self.on_submit_complete(result),
        }
    }
}

fn accepts_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ' ' | '-' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Lane;

    fn named_session() -> SessionController {
        let mut s = SessionController::new(Settings::default(), 7, 0.0);
        for c in "Ana".chars() {
            s.handle(Intent::TextChar(c), 0.0);
        }
        s.handle(Intent::Confirm, 0.0);
        s
    }

    /// Replace every lane of the active round with grass
    fn clear_field(s: &mut SessionController) {
        for lane in &mut s.round.field.lanes {
            *lane = Lane::safe(lane.y);
        }
    }

    #[test]
    fn test_starts_in_menu_with_fetch_queued() {
        let mut s = SessionController::new(Settings::default(), 1, 0.0);
        assert_eq!(s.state(), SessionState::Menu);
        assert_eq!(s.key_context(), KeyContext::NameEntry);
        assert_eq!(s.take_requests(), vec![StoreRequest::Fetch]);
        assert!(s.take_requests().is_empty());
    }

    #[test]
    fn test_name_entry() {
        let mut s = SessionController::new(Settings::default(), 1, 0.0);
        // Empty name cannot be committed or start a round
        s.handle(Intent::Confirm, 0.0);
        assert!(!s.name_committed());

        for c in "Bob!".chars() {
            s.handle(Intent::TextChar(c), 0.0);
        }
        assert_eq!(s.player_name(), "Bob");
        s.handle(Intent::Backspace, 0.0);
        assert_eq!(s.player_name(), "Bo");
        s.handle(Intent::Confirm, 0.0);
        assert!(s.name_committed());
        assert_eq!(s.state(), SessionState::Menu);

        // Characters are ignored once committed
        s.handle(Intent::TextChar('x'), 0.0);
        assert_eq!(s.player_name(), "Bo");

        s.handle(Intent::Back, 0.0);
        assert!(!s.name_committed());
    }

    #[test]
    fn test_name_length_is_capped() {
        let mut s = SessionController::new(Settings::default(), 1, 0.0);
        for _ in 0..40 {
            s.handle(Intent::TextChar('a'), 0.0);
        }
        assert_eq!(s.player_name().len(), 16);
    }

    #[test]
    fn test_confirm_starts_round() {
        let mut s = named_session();
        s.handle(Intent::Confirm, 1000.0);
        assert_eq!(s.state(), SessionState::Playing);
        assert_eq!(s.round().score, 0);
        assert_eq!(s.elapsed_seconds(3460.0), 2.5);
    }

    #[test]
    fn test_score_milestone_is_submitted() {
        let mut s = named_session();
        s.handle(Intent::Confirm, 0.0);
        s.take_requests();
        clear_field(&mut s);

        for _ in 0..9 {
            s.handle(Intent::Move(Step::Up), 0.0);
        }
        s.tick(12_340.0);
        assert_eq!(s.round().score, 1);

        let best = s.leaderboard().best_for(1).unwrap();
        assert_eq!(best.player_name, "Ana");
        assert_eq!(best.elapsed_secs, 12.3);

        match s.take_requests().as_slice() {
            [StoreRequest::ReplaceAll(entries)] => assert_eq!(entries.len(), 1),
            other => panic!("unexpected requests {other:?}"),
        }
    }

    #[test]
    fn test_pending_board_writes_collapse_to_latest() {
        let mut s = named_session();
        s.handle(Intent::Confirm, 0.0);
        clear_field(&mut s);

        for now in [2000.0, 4000.0, 6000.0] {
            for _ in 0..9 {
                s.handle(Intent::Move(Step::Up), now);
            }
            s.tick(now);
        }
        assert_eq!(s.round().score, 3);

        // The initial fetch survives; only the newest board is written
        let requests = s.take_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], StoreRequest::Fetch);
        match &requests[1] {
            StoreRequest::ReplaceAll(entries) => assert_eq!(entries.len(), 3),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_menu_backdrop_animates_and_resets() {
        let mut settings = Settings::default();
        settings.field.safe_lane_chance = 0.0;
        let (mut s, row) = (0..32)
            .find_map(|seed| {
                let s = SessionController::new(settings.clone(), seed, 0.0);
                let row = s
                    .backdrop()
                    .field
                    .lanes
                    .iter()
                    .position(|lane| !lane.obstacles.is_empty())?;
                Some((s, row))
            })
            .expect("a backdrop with moving obstacles");

        let before = s.backdrop().field.lanes[row].obstacles[0].x;
        s.tick(16.0);
        assert_ne!(s.backdrop().field.lanes[row].obstacles[0].x, before);

        s.handle(Intent::TextChar('q'), 16.0);
        s.handle(Intent::Confirm, 16.0);
        s.handle(Intent::ToggleLeaderboard, 16.0);
        let before = s.backdrop().field.lanes[row].obstacles[0].x;
        s.tick(32.0);
        assert_ne!(s.backdrop().field.lanes[row].obstacles[0].x, before);
        s.handle(Intent::Back, 32.0);

        // Frozen while playing, replaced on the way back from game over
        s.handle(Intent::Confirm, 48.0);
        let lanes = s.backdrop().field.lanes.clone();
        s.round.field.lanes[9].hazard = crate::sim::HazardClass::Raft;
        s.tick(64.0);
        assert_eq!(s.state(), SessionState::GameOver);
        assert_eq!(s.backdrop().field.lanes, lanes);

        s.handle(Intent::Confirm, 80.0);
        assert_eq!(s.state(), SessionState::Menu);
        assert_ne!(s.backdrop().field.lanes, lanes);
    }

    #[test]
    fn test_loss_goes_to_game_over_then_restart_or_menu() {
        let mut s = named_session();
        s.handle(Intent::Confirm, 0.0);
        clear_field(&mut s);
        // Water with no logs under the spawn row
        s.round.field.lanes[9] = Lane {
            y: 360.0,
            hazard: crate::sim::HazardClass::Raft,
            obstacles: Vec::new(),
            rail: None,
        };
        s.tick(4000.0);
        assert_eq!(s.state(), SessionState::GameOver);
        assert_eq!(s.elapsed_seconds(99_000.0), 4.0);

        // Movement is ignored after game over
        s.handle(Intent::Move(Step::Up), 4100.0);
        assert_eq!(s.state(), SessionState::GameOver);

        s.handle(Intent::Restart, 5000.0);
        assert_eq!(s.state(), SessionState::Playing);
        assert!(!s.round().over);

        s.round.field.lanes[9].hazard = crate::sim::HazardClass::Raft;
        s.round.field.lanes[9].obstacles.clear();
        s.tick(6000.0);
        assert_eq!(s.state(), SessionState::GameOver);
        s.handle(Intent::Confirm, 6100.0);
        assert_eq!(s.state(), SessionState::Menu);
    }

    #[test]
    fn test_leaderboard_view_fetches_and_pages() {
        let mut settings = Settings::default();
        settings.leaderboard_page_size = 3;
        let mut s = SessionController::new(settings, 1, 0.0);
        s.take_requests();
        s.handle(Intent::TextChar('z'), 0.0);
        s.handle(Intent::Confirm, 0.0);

        s.handle(Intent::ToggleLeaderboard, 0.0);
        assert_eq!(s.state(), SessionState::Leaderboard);
        assert_eq!(s.take_requests(), vec![StoreRequest::Fetch]);

        // Empty board: one page, scrolling stays at 0
        s.handle(Intent::ScrollDown, 0.0);
        assert_eq!(s.page(), 0);

        let fetched: Vec<_> = (1..=7).map(|n| LeaderboardEntry::new("p", n, n as f64)).collect();
        s.on_fetch_complete(Ok(fetched));
        assert_eq!(s.page_count(), 3);
        for _ in 0..5 {
            s.handle(Intent::ScrollDown, 0.0);
        }
        assert_eq!(s.page(), 2);
        assert_eq!(s.visible_entries().len(), 1);
        s.handle(Intent::ScrollUp, 0.0);
        assert_eq!(s.page(), 1);

        s.handle(Intent::Back, 0.0);
        assert_eq!(s.state(), SessionState::Menu);
    }

    #[test]
    fn test_store_failures_are_soft() {
        let mut s = named_session();
        s.on_fetch_complete(Ok(vec![LeaderboardEntry::new("x", 2, 5.0)]));
        s.on_fetch_complete(Err(StoreError::Unavailable("offline".into())));
        assert_eq!(s.leaderboard().len(), 1);
        assert!(s.last_store_error().unwrap().contains("offline"));

        s.on_submit_complete(Err(StoreError::Http { status: 502 }));
        assert!(s.last_store_error().unwrap().contains("502"));
        s.on_submit_complete(Ok(()));
        assert!(s.last_store_error().is_none());
    }

    #[test]
    fn test_fetch_merges_with_local_milestones() {
        let mut s = named_session();
        s.leaderboard.add_entry(LeaderboardEntry::new("Ana", 3, 9.0));
        s.on_fetch_complete(Ok(vec![
            LeaderboardEntry::new("Remote", 3, 12.0),
            LeaderboardEntry::new("Remote", 5, 30.0),
        ]));
        assert_eq!(s.leaderboard().best_for(3).unwrap().player_name, "Ana");
        assert_eq!(s.leaderboard().top_score(), Some(5));
    }
}
