//! Core Engine struct and main game loop

use std::sync::Arc;
use std::time::Duration;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::core::backend::RenderBackend;
use crate::core::events::EventQueue;
use crate::core::Time;
use crate::ecs::World;
use crate::input::Input;
use crate::script::{update_scripts, ScriptRegistry};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Target frames per second (0 for unlimited)
    pub target_fps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("Vantage"),
            width: 1280,
            height: 720,
            target_fps: 60,
        }
    }
}

impl EngineConfig {
    /// Create a new config with a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set window dimensions
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set target FPS
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }
}

/// Game trait that users implement
pub trait Game: 'static {
    /// Called once when the engine starts
    fn init(&mut self, engine: &mut EngineContext);

    /// Called every frame for game logic updates, after the script tick
    fn update(&mut self, engine: &mut EngineContext);

    /// Called every frame for rendering, between the backend's begin/end
    fn render(&mut self, _engine: &mut EngineContext) {}

    /// Called when the window is resized
    fn on_resize(&mut self, _engine: &mut EngineContext, _width: u32, _height: u32) {}

    /// Called when the game is shutting down
    fn shutdown(&mut self, _engine: &mut EngineContext) {}
}

/// Context passed to game callbacks
pub struct EngineContext {
    /// Time tracking
    pub time: Time,
    /// Input state
    pub input: Input,
    /// ECS world
    pub world: World,
    /// Registered script types
    pub scripts: ScriptRegistry,
    /// Engine event queue (swapped once per frame)
    pub events: EventQueue,
    /// External rendering pipeline, if any
    backend: Option<Box<dyn RenderBackend>>,
    /// Window size
    window_size: PhysicalSize<u32>,
    /// Should the engine quit
    should_quit: bool,
}

impl EngineContext {
    fn new(width: u32, height: u32) -> Self {
        Self {
            time: Time::new(),
            input: Input::new(),
            world: World::new(),
            scripts: ScriptRegistry::new(),
            events: EventQueue::new(),
            backend: None,
            window_size: PhysicalSize::new(width, height),
            should_quit: false,
        }
    }

    /// Plug in an external rendering pipeline
    pub fn set_backend(&mut self, backend: Box<dyn RenderBackend>) {
        self.backend = Some(backend);
    }

    /// Is a rendering pipeline attached?
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Get window width
    pub fn width(&self) -> u32 {
        self.window_size.width
    }

    /// Get window height
    pub fn height(&self) -> u32 {
        self.window_size.height
    }

    /// Get aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.window_size.width as f32 / self.window_size.height.max(1) as f32
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if engine should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Main engine struct
pub struct Engine<G: Game> {
    config: EngineConfig,
    game: G,
    context: EngineContext,
    window: Option<Arc<Window>>,
    initialized: bool,
}

impl<G: Game> Engine<G> {
    /// Create a new engine with the given game
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(config.width, config.height);
        Self {
            config,
            game,
            context,
            window: None,
            initialized: false,
        }
    }

    /// Run the engine
    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();
        log::info!("Starting engine: {}", self.config.title);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        Ok(())
    }

    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let frame_start = std::time::Instant::now();

        self.context.time.update();
        self.context.events.swap();

        // Script lifecycle + update dispatch before game logic
        update_scripts(
            &mut self.context.world,
            &self.context.time,
            &mut self.context.events,
        );

        self.game.update(&mut self.context);

        if self.context.should_quit() {
            self.game.shutdown(&mut self.context);
            event_loop.exit();
            return;
        }

        if let Some(mut backend) = self.context.backend.take() {
            backend.begin_frame();
            backend.render(&self.context.world);
            self.game.render(&mut self.context);
            backend.end_frame();
            self.context.backend = Some(backend);
        } else {
            self.game.render(&mut self.context);
        }

        // Clear per-frame input state
        self.context.input.update();

        // Simple frame limiter when no backend provides vsync
        if self.config.target_fps > 0 {
            let budget = Duration::from_secs_f64(1.0 / f64::from(self.config.target_fps));
            let spent = frame_start.elapsed();
            if spent < budget {
                std::thread::sleep(budget - spent);
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl<G: Game> ApplicationHandler for Engine<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );
        self.window = Some(window);

        if !self.initialized {
            self.game.init(&mut self.context);
            self.initialized = true;
            log::info!("Engine initialized successfully");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down");
                self.game.shutdown(&mut self.context);
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    self.context.window_size = new_size;
                    if let Some(backend) = &mut self.context.backend {
                        backend.resize(new_size.width, new_size.height);
                    }
                    self.game
                        .on_resize(&mut self.context, new_size.width, new_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key_code) = event.physical_key {
                    self.context.input.process_keyboard(key_code, event.state);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.context.input.process_mouse_button(button, state);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.context
                    .input
                    .process_mouse_motion(glam::Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => glam::Vec2::new(x, y),
                    winit::event::MouseScrollDelta::PixelDelta(pos) => {
                        glam::Vec2::new(pos.x as f32, pos.y as f32)
                    }
                };
                self.context.input.process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.tick(event_loop);
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
