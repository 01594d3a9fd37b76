//! Canvas2D painter
//!
//! Stateless apart from the context handle: every frame is redrawn from the
//! session. Drawing failures (text calls) are ignored for that frame.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::session::{SessionController, SessionState};
use crate::sim::{FieldConfig, HazardClass, Lane, Obstacle, PlayField, Round};

const GRASS: &str = "#2e7d32";
const GOAL: &str = "#43a047";
const ROAD: &str = "#333333";
const WATER: &str = "#4444ff";
const TRACK_BED: &str = "#5d5046";
const RAIL: &str = "#8b4513";
const WARNING: &str = "#ff3b30";
const CAR: &str = "#e53935";
const LOG: &str = "#8d6e63";
const ENGINE: &str = "#212121";
const CARRIAGE: &str = "#616161";
const ACTOR: &str = "#7cfc00";
const SHADE: &str = "rgba(0, 0, 0, 0.6)";

/// Train engine length; the rest of the train is carriages
const ENGINE_LENGTH: f64 = 60.0;
const CARRIAGE_LENGTH: f64 = 50.0;
const CARRIAGE_GAP: f64 = 4.0;

pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasPainter {
    /// Size the canvas for `config` at `dpr` and grab its 2D context
    pub fn new(canvas: &HtmlCanvasElement, config: &FieldConfig, dpr: f64) -> Result<Self, String> {
        let width = config.width as f64;
        let height = config.height() as f64;
        canvas.set_width((width * dpr) as u32);
        canvas.set_height((height * dpr) as u32);

        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("get_context failed: {:?}", e))?
            .ok_or("2d context unavailable")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "not a 2d context".to_string())?;
        ctx.scale(dpr, dpr)
            .map_err(|e| format!("scale failed: {:?}", e))?;

        log::info!("Canvas ready: {}x{} @ {}x", width, height, dpr);
        Ok(Self { ctx, width, height })
    }

    pub fn draw(&self, session: &SessionController, now_ms: f64) {
        match session.state() {
            SessionState::Menu => {
                self.draw_field(&session.backdrop().field, now_ms);
                self.shade();
                self.draw_menu(session);
            }
            SessionState::Playing => {
                self.draw_round(session.round(), now_ms);
                self.draw_hud(session, now_ms);
            }
            SessionState::GameOver => {
                self.draw_round(session.round(), now_ms);
                self.shade();
                self.draw_game_over(session, now_ms);
            }
            SessionState::Leaderboard => {
                self.draw_field(&session.backdrop().field, now_ms);
                self.fill("#000000", 0.0, 0.0, self.width, self.height);
                self.draw_leaderboard(session);
            }
        }
    }

    fn fill(&self, color: &str, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn text(&self, color: &str, font: &str, s: &str, x: f64, y: f64) {
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(font);
        let _ = self.ctx.fill_text(s, x, y);
    }

    fn shade(&self) {
        self.fill(SHADE, 0.0, 0.0, self.width, self.height);
    }

    fn draw_round(&self, round: &Round, now_ms: f64) {
        self.draw_field(&round.field, now_ms);
        let a = &round.actor;
        let inset = (round.config.cell_size - a.size) as f64 / 2.0;
        self.fill(ACTOR, a.pos.x as f64, a.pos.y as f64 + inset, a.size as f64, a.size as f64);
    }

    fn draw_field(&self, field: &PlayField, now_ms: f64) {
        let cell = field.config.cell_size as f64;
        for (row, lane) in field.lanes.iter().enumerate() {
            let y = lane.y as f64;
            let ground = match lane.hazard {
                HazardClass::Safe if row == 0 => GOAL,
                HazardClass::Safe => GRASS,
                HazardClass::Vehicle => ROAD,
                HazardClass::Raft => WATER,
                HazardClass::Rail => TRACK_BED,
            };
            self.fill(ground, 0.0, y, self.width, cell);
            if lane.hazard == HazardClass::Rail {
                self.draw_rail(lane, cell, now_ms);
            }
            let on_board = lane.obstacles.iter().filter(|o| o.is_on_field(field.config.width));
            for obstacle in on_board {
                let color = if obstacle.hazard == HazardClass::Raft { LOG } else { CAR };
                self.draw_obstacle(obstacle, color, cell);
            }
        }
    }

    fn draw_obstacle(&self, o: &Obstacle, color: &str, cell: f64) {
        // Obstacles sit centred in their lane
        let y = o.lane_y as f64 + (cell - o.height as f64) / 2.0;
        self.fill(color, o.x as f64, y, o.width as f64, o.height as f64);
    }

    fn draw_rail(&self, lane: &Lane, cell: f64, now_ms: f64) {
        let y = lane.y as f64;
        self.fill(RAIL, 0.0, y + cell / 2.0 - 2.0, self.width, 4.0);

        let Some(gate) = lane.rail.as_ref() else {
            return;
        };
        // Blink at 4 Hz while a train is due
        if gate.is_warning() && (now_ms / 250.0) as i64 % 2 == 0 {
            self.fill(WARNING, 0.0, y, 6.0, cell);
            self.fill(WARNING, self.width - 6.0, y, 6.0, cell);
        }
        if let Some(train) = gate.active_train() {
            self.draw_train(train, gate.direction, cell);
        }
    }

    /// Engine at the leading end, carriages trailing behind it
    fn draw_train(&self, train: &Obstacle, direction: f32, cell: f64) {
        let x = train.x as f64;
        let w = train.width as f64;
        let h = train.height as f64;
        let y = train.lane_y as f64 + (cell - h) / 2.0;

        let (engine_x, mut car_x, step) = if direction > 0.0 {
            (x + w - ENGINE_LENGTH, x + w - ENGINE_LENGTH - CARRIAGE_LENGTH, -CARRIAGE_LENGTH)
        } else {
            (x, x + ENGINE_LENGTH, CARRIAGE_LENGTH)
        };
        self.fill(ENGINE, engine_x, y, ENGINE_LENGTH, h);

        let carriages = ((w - ENGINE_LENGTH) / CARRIAGE_LENGTH).floor() as usize;
        for _ in 0..carriages {
            self.fill(CARRIAGE, car_x + CARRIAGE_GAP / 2.0, y, CARRIAGE_LENGTH - CARRIAGE_GAP, h);
            car_x += step;
        }
    }

    fn draw_hud(&self, session: &SessionController, now_ms: f64) {
        let font = "20px sans-serif";
        self.text("white", font, &format!("Score: {}", session.round().score), 10.0, 25.0);
        self.text(
            "white",
            font,
            &format!("Time: {:.1}s", session.elapsed_seconds(now_ms)),
            self.width - 120.0,
            25.0,
        );
        if let Some(best) = session.leaderboard().top_score() {
            self.text("white", "14px sans-serif", &format!("Best: {}", best), 10.0, 45.0);
        }
        if let Some(err) = session.last_store_error() {
            let status = format!("offline: {}", err);
            self.text("#ffcc00", "12px sans-serif", &status, 10.0, self.height - 8.0);
        }
    }

    fn draw_menu(&self, session: &SessionController) {
        let cx = self.width / 2.0;
        self.ctx.set_text_align("center");
        self.text("green", "40px sans-serif", "LANE HOPPER", cx, 100.0);

        let font = "20px sans-serif";
        if session.name_committed() {
            self.text("green", font, &format!("Welcome, {}!", session.player_name()), cx, 200.0);
            self.text("green", font, "Press ENTER to Play", cx, 250.0);
            self.text("green", font, "Press L for Leaderboard", cx, 290.0);
        } else {
            self.text("green", font, "Enter your name:", cx, 200.0);
            self.ctx.set_stroke_style_str("green");
            self.ctx.stroke_rect(cx - 100.0, 220.0, 200.0, 40.0);
            self.text("white", font, session.player_name(), cx, 247.0);
        }
        self.ctx.set_text_align("start");
    }

    fn draw_game_over(&self, session: &SessionController, now_ms: f64) {
        let cx = self.width / 2.0;
        let cy = self.height / 2.0;
        self.ctx.set_text_align("center");
        self.text("red", "40px sans-serif", "Game Over!", cx, cy - 40.0);

        let font = "20px sans-serif";
        if let Some(cause) = session.round().loss {
            self.text("white", "16px sans-serif", cause.describe(), cx, cy - 10.0);
        }
        self.text("red", font, &format!("Final Score: {}", session.round().score), cx, cy + 20.0);
        let time = format!("Time: {:.1}s", session.elapsed_seconds(now_ms));
        self.text("red", font, &time, cx, cy + 50.0);
        self.text("red", font, "Press SPACE to restart", cx, cy + 90.0);
        self.text("red", font, "Press ENTER for Menu", cx, cy + 120.0);
        self.ctx.set_text_align("start");
    }

    fn draw_leaderboard(&self, session: &SessionController) {
        let cx = self.width / 2.0;
        self.ctx.set_text_align("center");
        self.text("green", "30px sans-serif", "Leaderboard", cx, 50.0);
        self.ctx.set_text_align("start");

        let font = "18px sans-serif";
        let entries = session.visible_entries();
        if entries.is_empty() {
            self.text("green", font, "No scores yet", 50.0, 100.0);
        }
        for (i, entry) in entries.iter().enumerate() {
            let line = format!(
                "{}. {} - {:.1}s",
                entry.score, entry.player_name, entry.elapsed_secs
            );
            self.text("green", font, &line, 50.0, 100.0 + i as f64 * 30.0);
        }

        self.ctx.set_text_align("center");
        let pager = format!("Page {}/{}", session.page() + 1, session.page_count());
        self.text("green", "14px sans-serif", &pager, cx, self.height - 75.0);
        self.text("green", font, "Press SPACE to return to menu", cx, self.height - 40.0);
        self.ctx.set_text_align("start");
    }
}
