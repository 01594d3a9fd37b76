//! Lane Hopper entry point
//!
//! Web: wires the canvas, keyboard and animation frame loop to a
//! `SessionController` and runs store requests on the browser executor.
//! Native: plays a short scripted session headlessly against `MemoryStore`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use lane_hopper::persistence::{StoreResponse, WebStore, execute};
    use lane_hopper::platform::map_key;
    use lane_hopper::renderer::CanvasPainter;
    use lane_hopper::{SessionController, Settings, StoreRequest};

    /// Game instance holding all state
    struct Game {
        session: SessionController,
        painter: CanvasPainter,
        store: WebStore,
        /// A board write is in flight
        writing: bool,
        /// Newest board waiting for the in-flight write to finish
        queued_write: Option<StoreRequest>,
    }

    impl Game {
        /// Hand queued store work to the browser executor. Board writes run
        /// one at a time so an older board never lands after a newer one.
        fn dispatch_requests(game: &Rc<RefCell<Game>>) {
            let (requests, store) = {
                let mut g = game.borrow_mut();
                let mut requests = Vec::new();
                for request in g.session.take_requests() {
                    match request {
                        StoreRequest::ReplaceAll(_) if g.writing => g.queued_write = Some(request),
                        StoreRequest::ReplaceAll(_) => {
                            g.writing = true;
                            requests.push(request);
                        }
                        StoreRequest::Fetch => requests.push(request),
                    }
                }
                (requests, g.store.clone())
            };
            for request in requests {
                let game = game.clone();
                let store = store.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let response = execute(&store, request).await;
                    let wrote = matches!(response, StoreResponse::Submitted(_));
                    {
                        let mut g = game.borrow_mut();
                        g.session.on_store_response(response);
                        if wrote {
                            g.writing = false;
                        }
                    }
                    if wrote {
                        Game::release_queued_write(&game);
                    }
                });
            }
        }

        fn release_queued_write(game: &Rc<RefCell<Game>>) {
            let (request, store) = {
                let mut g = game.borrow_mut();
                let Some(request) = g.queued_write.take() else {
                    return;
                };
                g.writing = true;
                (request, g.store.clone())
            };
            let game = game.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let response = execute(&store, request).await;
                {
                    let mut g = game.borrow_mut();
                    g.session.on_store_response(response);
                    g.writing = false;
                }
                Game::release_queued_write(&game);
            });
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }

        log::info!("Lane Hopper starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let settings = Settings::load();
        let painter = CanvasPainter::new(&canvas, &settings.field, window.device_pixel_ratio())
            .map_err(|e| JsValue::from_str(&e))?;
        let store = WebStore::from_settings(&settings.store);
        log::info!("Leaderboard backend: {}", settings.store.backend.as_str());

        let now = js_sys::Date::now();
        let seed = now as u64;
        let game = Rc::new(RefCell::new(Game {
            session: SessionController::new(settings, seed, now),
            painter,
            store,
            writing: false,
            queued_write: None,
        }));

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                {
                    let mut g = game.borrow_mut();
                    let Some(intent) = map_key(&event.key(), g.session.key_context()) else {
                        return;
                    };
                    // Keep arrows and space from scrolling the page
                    event.prevent_default();
                    g.session.handle(intent, js_sys::Date::now());
                }
                Game::dispatch_requests(&game);
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Game::dispatch_requests(&game);
        request_animation_frame(game);
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            // Wall-clock ms, the same clock the session was started with
            let now = js_sys::Date::now();
            g.session.tick(now);
            g.painter.draw(&g.session, now);
        }
        Game::dispatch_requests(&game);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lane_hopper::persistence::{MemoryStore, execute};
    use lane_hopper::sim::Step;
    use lane_hopper::{Intent, SessionController, SessionState, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Lane Hopper (native) starting...");
    log::info!("Headless demo; build for wasm32 to play in the browser");

    let store = MemoryStore::new();
    let mut session = SessionController::new(Settings::load(), 0x5EED, 0.0);
    let pump = |session: &mut SessionController| {
        for request in session.take_requests() {
            let response = pollster::block_on(execute(&store, request));
            session.on_store_response(response);
        }
    };

    for c in "demo".chars() {
        session.handle(Intent::TextChar(c), 0.0);
    }
    session.handle(Intent::Confirm, 0.0);
    session.handle(Intent::Confirm, 0.0);
    pump(&mut session);

    // Hop up twice a second until the round ends or a minute passes
    let frame_ms = 1000.0 / 60.0;
    let mut now = 0.0;
    for frame in 0..3600u32 {
        now = frame as f64 * frame_ms;
        if frame % 30 == 0 {
            session.handle(Intent::Move(Step::Up), now);
        }
        session.tick(now);
        pump(&mut session);
        if session.state() != SessionState::Playing {
            break;
        }
    }

    log::info!(
        "Demo finished: score {} in {:.1}s (best on board: {:?})",
        session.round().score,
        session.elapsed_seconds(now),
        session.leaderboard().top_score()
    );

    session.handle(Intent::Confirm, now);
    session.handle(Intent::ToggleLeaderboard, now);
    pump(&mut session);
    for entry in session.visible_entries() {
        println!("{:>3}. {:<16} {:.1}s", entry.score, entry.player_name, entry.elapsed_secs);
    }
    log::info!("Store writes: {}", store.writes());
}
