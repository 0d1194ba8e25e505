//! Skyflap entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use skyflap::audio::AudioManager;
    use skyflap::renderer::{BlitPresenter, PresentError};
    use skyflap::{App, GameConfig, InputEvent};

    /// Driver cadence in milliseconds
    const DRIVER_INTERVAL_MS: i32 = 16;

    /// Browser-side game instance
    struct Game {
        app: App,
        presenter: Option<BlitPresenter>,
        audio: AudioManager,
        last_time: f64,
    }

    impl Game {
        fn input(&mut self, event: InputEvent) {
            self.audio.resume();
            self.app.handle_input(event, &self.audio);
        }

        /// Returns true if a repaint must be scheduled
        fn on_timer(&mut self, now: f64) -> bool {
            let elapsed = if self.last_time > 0.0 {
                ((now - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = now;
            self.app.on_timer(elapsed, &self.audio)
        }

        fn paint(&mut self) {
            let Some(presenter) = self.presenter.as_mut() else {
                return;
            };
            match self.app.paint(presenter) {
                Ok(()) => {}
                Err(PresentError::Lost | PresentError::Outdated) => presenter.reconfigure(),
                Err(PresentError::OutOfMemory) => log::error!("Out of memory!"),
                Err(e) => log::warn!("Render error: {}", e),
            }
        }

        fn toggle_autopilot(&mut self) {
            let enabled = !self.app.autopilot();
            self.app.set_autopilot(enabled);
        }

        fn toggle_muted(&mut self) {
            let muted = !self.audio.is_muted();
            self.audio.set_muted(muted);
            log::info!("Audio muted: {}", muted);
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or_else(js_sys::Date::now, |p| p.now())
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Skyflap starting...");

        let config = GameConfig::default();
        let mut app = match App::new(config) {
            Ok(app) => app,
            Err(e) => {
                log::error!("Invalid configuration: {}", e);
                return;
            }
        };

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No canvas element");
            return;
        };

        // The frame is composed at playfield resolution; CSS scales the canvas
        let width = app.config().width.round() as u32;
        let height = app.config().height.round() as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        if let Err(e) = app.start(seed) {
            log::error!("Failed to start session: {}", e);
            return;
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let presenter = match BlitPresenter::new(surface, &adapter, width, height).await {
            Ok(presenter) => presenter,
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                return;
            }
        };

        let audio = AudioManager::new(app.config().audio.clone());
        let game = Rc::new(RefCell::new(Game {
            app,
            presenter: Some(presenter),
            audio,
            last_time: 0.0,
        }));

        setup_input_handlers(&window, &canvas, game.clone());
        start_driver(&window, game.clone());
        request_paint(game);

        log::info!("Skyflap running! Press Space to flap, I to toggle autopilot, M to mute");
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.code().as_str() {
                    "Space" | "ArrowUp" => {
                        event.prevent_default();
                        if !event.repeat() {
                            game.borrow_mut().input(InputEvent::ImpulsePressed);
                        }
                    }
                    "KeyI" => {
                        if !event.repeat() {
                            game.borrow_mut().toggle_autopilot();
                        }
                    }
                    "KeyM" => {
                        if !event.repeat() {
                            game.borrow_mut().toggle_muted();
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.code().as_str(), "Space" | "ArrowUp") {
                    game.borrow_mut().input(InputEvent::ImpulseReleased);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                game.borrow_mut().input(InputEvent::ImpulsePressed);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().input(InputEvent::ImpulseReleased);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Steady cadence: advance the clock, then ask for at most one paint
    fn start_driver(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut()>::new(move || {
            let needs_paint = game.borrow_mut().on_timer(now());
            if needs_paint {
                request_paint(game.clone());
            }
        });
        if let Err(e) = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            DRIVER_INTERVAL_MS,
        ) {
            log::error!("Failed to start driver: {:?}", e);
        }
        closure.forget();
    }

    fn request_paint(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game.borrow_mut().paint();
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use skyflap::platform::{self, HeadlessOptions};
    use skyflap::{App, GameConfig};

    env_logger::init();
    log::info!("Skyflap (native, headless) starting...");

    // skyflap [--interactive] [config.json] [seconds]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let interactive = args.iter().any(|a| a == "--interactive");
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));

    let config = match positional.next() {
        Some(path) => match GameConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                eprintln!("skyflap: {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    let run_for = match positional.next() {
        Some(secs) => match secs.parse::<f64>() {
            Ok(v) if v > 0.0 => Some(Duration::from_secs_f64(v)),
            _ => {
                eprintln!("skyflap: invalid run time: {}", secs);
                std::process::exit(2);
            }
        },
        None if interactive => None,
        None => Some(Duration::from_secs(10)),
    };

    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            eprintln!("skyflap: invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64);
    if let Err(e) = app.start(seed) {
        eprintln!("skyflap: {}", e);
        std::process::exit(1);
    }
    app.set_autopilot(!interactive);

    let summary = platform::run(
        app,
        HeadlessOptions {
            run_for,
            stdin_input: interactive,
            ..Default::default()
        },
    );

    println!(
        "frames: {}, wakeups: {} ({} dropped), final score: {}, best: {}",
        summary.frames_presented,
        summary.wakeups,
        summary.wakeups_dropped,
        summary.final_score,
        summary.best.map_or_else(|| "-".to_string(), |b| b.to_string()),
    );
}
