//! Fruit Merge entry point
//!
//! Native: a headless autoplay run that saves into a directory.
//! Web: drives the session from `requestAnimationFrame`, feeds pointer input,
//! pauses while the tab is hidden, and mirrors score, next fruit and
//! leaderboard into the page's HUD elements. Fruits themselves are not drawn
//! by this crate.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{MouseEvent, TouchEvent};

    use fruit_merge::consts::SIM_DT;
    use fruit_merge::leaderboard::StoredLeaderboard;
    use fruit_merge::persistence::{LocalStorage, SessionStore};
    use fruit_merge::sim::{GameEvent, GameSession, SimpleWorld, TierCatalog};
    use fruit_merge::{GameConfig, Runner, TickInput};

    type WebRunner = Runner<SimpleWorld, LocalStorage, StoredLeaderboard<LocalStorage>>;

    /// Game instance holding all state
    struct Game {
        runner: WebRunner,
        last_time: f64,
        input: TickInput,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let config = GameConfig::default();
            let world = SimpleWorld::with_gravity(config.gravity);
            let session = GameSession::new(world, TierCatalog::standard(), config, seed);
            let runner = Runner::new(
                session,
                SessionStore::new(LocalStorage::new()),
                StoredLeaderboard::open(LocalStorage::new()),
                &mut rand::rng(),
            );
            Self {
                runner,
                last_time: 0.0,
                input: TickInput::default(),
            }
        }

        fn update(&mut self, dt: f32) {
            let input = std::mem::take(&mut self.input);
            for event in self.runner.update(dt, &input) {
                if let GameEvent::GameOver { score } = event {
                    log::info!("Final score {score}");
                    self.show_leaderboard();
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let game = self.runner.game();

            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&game.score().to_string()));
            }
            if let Some(el) = document.get_element_by_id("best-score") {
                el.set_text_content(Some(&format!("Best: {}", game.best_score())));
            }
            if let Some(el) = document.get_element_by_id("next-fruit") {
                let next = game
                    .catalog()
                    .tier_at(game.preview_tier())
                    .map(|t| t.key.clone())
                    .unwrap_or_default();
                el.set_text_content(Some(&next));
            }
            if let Some(el) = document.get_element_by_id("scoreline") {
                let class = if game.in_danger() { "danger" } else { "" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.get_element_by_id("game-over") {
                let class = if game.is_game_over() { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }

        fn show_leaderboard(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let Some(list) = document.get_element_by_id("leaderboard") else {
                return;
            };
            list.set_inner_html("");
            for (i, entry) in self.runner.top_scores().iter().enumerate() {
                if let Ok(li) = document.create_element("li") {
                    li.set_text_content(Some(&format!("{}. {}: {}", i + 1, entry.user_id, entry.score)));
                    let _ = list.append_child(&li);
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Fruit Merge starting...");

        let seed = session_seed();
        let game = Rc::new(RefCell::new(Game::new(seed)));
        game.borrow().show_leaderboard();

        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        setup_visibility_handler(game.clone());
        request_animation_frame(game);
    }

    fn session_seed() -> u64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| (p.now() * 1000.0) as u64)
            .unwrap_or(0)
            ^ rand::random::<u64>()
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(canvas) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("canvas"))
        else {
            log::warn!("No #canvas element; input disabled");
            return;
        };

        // Mouse move - drop carriage follows the pointer
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut().input.target_x = Some(event.offset_x() as f32);
            });
            let _ = canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click - release
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.release = true;
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move - follow the finger
        {
            let game = game.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let left = target.get_bounding_client_rect().left();
                    game.borrow_mut().input.target_x = Some((touch.client_x() as f64 - left) as f32);
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end - release
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().input.release = true;
            });
            let _ = canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Save and pause when the tab is hidden, pick up again when it returns
    fn setup_visibility_handler(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let target = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            if target.hidden() {
                g.runner.pause();
            } else {
                g.runner.resume();
                g.last_time = 0.0;
            }
        });
        let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(button) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("restart-button"))
        else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().input.restart = true;
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fruit Merge (native) starting...");

    let save_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "fruit-merge-save".to_string());
    let config = match std::env::args().nth(2) {
        Some(path) => load_config(&path),
        None => fruit_merge::GameConfig::default(),
    };

    autoplay(&save_dir, config);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(path: &str) -> fruit_merge::GameConfig {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| fruit_merge::GameConfig::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default config, could not load {path}: {e}");
            fruit_merge::GameConfig::default()
        }
    }
}

/// Drop fruits at random spots until the well overflows or time runs out
#[cfg(not(target_arch = "wasm32"))]
fn autoplay(save_dir: &str, config: fruit_merge::GameConfig) {
    use fruit_merge::leaderboard::StoredLeaderboard;
    use fruit_merge::persistence::{FileStorage, SessionStore};
    use fruit_merge::sim::{DropState, GameEvent, GameSession, SimpleWorld, TierCatalog};
    use fruit_merge::{Runner, TickInput};
    use rand::Rng;

    const FRAME_DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    let mut rng = rand::rng();
    let world = SimpleWorld::with_gravity(config.gravity);
    let session = GameSession::new(world, TierCatalog::standard(), config, rng.random());
    let mut runner = Runner::new(
        session,
        SessionStore::new(FileStorage::new(save_dir)),
        StoredLeaderboard::open(FileStorage::new(save_dir)),
        &mut rng,
    );
    if runner.game().is_game_over() {
        runner.update(0.0, &TickInput {
            restart: true,
            ..Default::default()
        });
    }

    let (left, right) = {
        let arena = runner.game().arena();
        (arena.left, arena.right)
    };
    let mut drops = 0u32;
    let mut merges = 0u32;
    for frame in 0..MAX_FRAMES {
        let mut input = TickInput::default();
        if matches!(runner.game().drop_state(), DropState::Held { .. }) && frame % 20 == 0 {
            input.target_x = Some(rng.random_range(left..right));
            input.release = true;
        }

        for event in runner.update(FRAME_DT, &input) {
            match event {
                GameEvent::Dropped { .. } => drops += 1,
                GameEvent::Merged { .. } => merges += 1,
                _ => {}
            }
        }
        if runner.game().is_game_over() {
            break;
        }
    }

    if let Err(e) = runner.autosave() {
        log::warn!("Final save failed: {e}");
    }
    let game = runner.game();
    println!(
        "{} drops, {} merges, score {} (best {}){}",
        drops,
        merges,
        game.score(),
        game.best_score(),
        if game.is_game_over() { ", game over" } else { "" }
    );
    println!("Leaderboard:");
    for (i, entry) in runner.top_scores().iter().enumerate() {
        println!("{:>2}. {}: {}", i + 1, entry.user_id, entry.score);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
