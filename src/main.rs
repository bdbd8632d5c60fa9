//! Mine Storm entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, MouseEvent};

    use mine_storm::Settings;
    use mine_storm::assets::fetch_templates;
    use mine_storm::audio::{AudioManager, SoundEffect};
    use mine_storm::consts::SPAWN_PERIOD_MS;
    use mine_storm::renderer::SdfRenderState;
    use mine_storm::sim::{FrameInfo, GameState, PlayArea, PointerEvent, handle, spawn_mine, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<SdfRenderState>,
        audio: AudioManager,
        settings: Settings,
        frames: u64,
        start_time: f64,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(state: GameState, settings: Settings) -> Self {
            Self {
                state,
                render_state: None,
                audio: AudioManager::new(&settings),
                settings,
                frames: 0,
                start_time: 0.0,
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run one simulation frame and voice its events
        fn update(&mut self, time: f64) {
            if self.frames == 0 {
                self.start_time = time;
                self.last_time = time;
                if let Some(render_state) = self.render_state.as_mut() {
                    render_state.set_start_time(time);
                }
            }

            let frame = FrameInfo {
                count: self.frames,
                time: (time - self.start_time) / 1000.0,
                delta: (time - self.last_time) / 1000.0,
            };
            self.frames += 1;
            self.last_time = time;

            tick(&mut self.state, &frame);

            for event in self.state.drain_events() {
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
            }

            // FPS over the last 60 frames
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (59000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            set_hud_value(document, "#hud-mines .hud-value", &self.state.mines.len().to_string());
            set_hud_value(document, "#hud-shot .hud-value", &self.state.mines_shot.to_string());

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    set_hud_value(document, "#hud-fps .hud-value", &self.fps.to_string());
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }
        }
    }

    fn set_hud_value(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    /// Put a fatal startup error where the loading indicator was
    fn show_error(document: &Document, message: &str) {
        log::error!("{}", message);
        if let Some(el) = document.get_element_by_id("loading") {
            el.set_text_content(Some(message));
            let _ = el.set_attribute("class", "error");
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Mine Storm starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let templates = match fetch_templates("assets").await {
            Ok(templates) => templates,
            Err(e) => {
                let message = format!("Failed to load assets: {e}");
                show_error(&document, &message);
                return Err(message.into());
            }
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        // Simulation runs in CSS pixels, the surface in device pixels
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let mut settings = Settings::load();
        let query = window.location().search().unwrap_or_default();
        if settings.apply_query(&query) {
            settings.save();
        }
        let seed = js_sys::Date::now() as u64;
        let area = PlayArea::new(client_w as f32, client_h as f32);
        let state = GameState::new(seed, area, &templates, &settings);
        let game = Rc::new(RefCell::new(Game::new(state, settings)));

        log::info!(
            "Game initialized with seed {} ({}x{})",
            seed,
            client_w,
            client_h
        );

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to get adapter: {e}")))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = SdfRenderState::new(surface, &adapter, width, height, &templates)
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to create device: {e}")))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_spawn_timer(game.clone())?;
        setup_focus_muting(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Mine Storm running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move - aim
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pointer = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                handle(&mut game.borrow_mut().state, PointerEvent::Move(pointer));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - fire
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                // Browsers only start audio after a user gesture
                g.audio.resume();
                handle(&mut g.state, PointerEvent::Down);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Spawn one mine every SPAWN_PERIOD_MS, independent of the frame rate
    fn setup_spawn_timer(game: Rc<RefCell<Game>>) -> Result<i32, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::<dyn FnMut()>::new(move || {
            spawn_mine(&mut game.borrow_mut().state);
        });
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            SPAWN_PERIOD_MS as i32,
        )?;
        closure.forget();
        Ok(handle)
    }

    fn setup_focus_muting(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                if g.settings.mute_on_blur {
                    g.audio.set_muted(hidden);
                    log::info!("Audio {} (visibility)", if hidden { "muted" } else { "unmuted" });
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                    log::info!("Audio muted (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
            g.update(time);
            g.render(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), mine_storm::AssetError> {
    use mine_storm::sim::PlayArea;
    use mine_storm::{Settings, Templates, headless};

    env_logger::init();
    log::info!("Mine Storm (native) starting...");
    log::info!("Rendering needs a browser - run with `trunk serve`; running headless");

    let mut args = std::env::args().skip(1);
    let seed = parse_arg(args.next(), "seed", 1);
    let frames = parse_arg(args.next(), "frames", 3600);

    let templates = Templates::embedded()?;
    let settings = Settings::load();
    let report = headless::run(
        seed,
        frames,
        PlayArea::new(800.0, 600.0),
        &templates,
        &settings,
    );

    println!("Seed {seed}, {} frames", report.frames);
    println!(
        "  mines: {} spawned, {} destroyed ({} shot), {} alive",
        report.mines_spawned, report.mines_destroyed, report.mines_shot, report.mines_alive
    );
    println!("  lasers fired: {}", report.lasers_fired);
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_arg(arg: Option<String>, name: &str, default: u64) -> u64 {
    match arg.map(|a| a.parse::<u64>()) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            log::warn!("Ignoring {} argument ({}), using {}", name, e, default);
            default
        }
        None => default,
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
