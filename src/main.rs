// =============================================================================
// VULKAN TUTORIAL RENDERER - window and input front end
// =============================================================================
//
// Opens a winit window and drives `tutorial_renderer::Renderer` from the
// event loop. Everything Vulkan lives in the library.
//
// FRAME FLOW:
// 1. about_to_wait requests a redraw (unless the swapchain is suspended)
// 2. RedrawRequested -> Renderer::draw_frame
// 3. Resized / keyboard / mouse events feed the renderer and camera
//
// While the window is minimized the loop switches to ControlFlow::Wait and
// sleeps until a non-zero resize arrives.
//
// =============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tutorial_renderer::config::Config;
use tutorial_renderer::renderer::{FrameOutcome, Renderer, SceneEntry};
use tutorial_renderer::scene::CameraMove;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    // Load configuration from config.toml
    let config = Config::load();

    init_logging(&config)?;
    log::info!("Starting Vulkan renderer");
    log::info!(
        "Window: {}x{} ({})",
        config.window.width,
        config.window.height,
        if config.window.fullscreen { "fullscreen" } else { "windowed" }
    );
    log::info!("Present mode: {}", config.graphics.present_mode);

    let scene = config
        .scene_entries()
        .context("Invalid scene configuration")?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, scene);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Configured level as the default, `RUST_LOG` on top. With `log_to_file`
/// the output goes to the log file instead of stderr.
fn init_logging(config: &Config) -> Result<()> {
    use env_logger::{Builder, Target};
    use log::LevelFilter;

    let level = LevelFilter::from_str(&config.debug.log_level).unwrap_or(LevelFilter::Info);

    let mut builder = Builder::new();
    builder.filter_level(level).parse_default_env();

    if config.debug.log_to_file {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&config.debug.log_file)
            .with_context(|| format!("Failed to open log file {}", config.debug.log_file))?;

        writeln!(file, "=== Vulkan Renderer Log ===")?;
        writeln!(file, "Started: {:?}", std::time::SystemTime::now())?;
        writeln!(file)?;

        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// IMPORTANT: the renderer owns the surface, so it must drop before the
/// window. Fields drop in declaration order.
struct App {
    renderer: Option<Renderer>,
    window: Option<Arc<Window>>,

    config: Config,
    scene: Vec<SceneEntry>,
    is_fullscreen: bool,

    /// Last known cursor x, needed when a right-drag starts
    cursor_x: f32,

    // FPS tracking
    frame_count: u32,
    last_fps_update: Instant,
    last_frame_time: Instant,

    /// Fatal error that ended the event loop
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config, scene: Vec<SceneEntry>) -> Self {
        let is_fullscreen = config.window.fullscreen;
        let now = Instant::now();
        Self {
            renderer: None,
            window: None,
            config,
            scene,
            is_fullscreen,
            cursor_x: 0.0,
            frame_count: 0,
            last_fps_update: now,
            last_frame_time: now,
            error: None,
        }
    }

    fn init_renderer(&mut self, window: &Window) -> Result<()> {
        let size = window.inner_size();
        let renderer = Renderer::new(
            window,
            (size.width, size.height),
            &self.config,
            &self.scene,
        )
        .context("Failed to initialize Vulkan renderer")?;

        self.renderer = Some(renderer);
        Ok(())
    }

    /// Log, remember and stop the loop
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match renderer.draw_frame() {
            Ok(FrameOutcome::Presented) | Ok(FrameOutcome::Recreated) => self.update_fps(),
            Ok(FrameOutcome::Skipped) => {
                if renderer.is_suspended() {
                    log::debug!("Framebuffer is zero-sized, waiting for a resize");
                    event_loop.set_control_flow(ControlFlow::Wait);
                }
            }
            Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("Frame rendering failed")),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        let movement = match key {
            KeyCode::KeyW => Some(CameraMove::Forward),
            KeyCode::KeyS => Some(CameraMove::Back),
            KeyCode::KeyA => Some(CameraMove::Left),
            KeyCode::KeyD => Some(CameraMove::Right),
            KeyCode::Escape => {
                log::info!("ESC pressed, exiting...");
                event_loop.exit();
                None
            }
            KeyCode::F11 => {
                self.toggle_fullscreen();
                None
            }
            _ => None,
        };

        if let (Some(movement), Some(renderer)) = (movement, self.renderer.as_mut()) {
            renderer.camera_mut().apply_move(movement);
        }
    }

    // =========================================================================
    // FULLSCREEN TOGGLE
    // =========================================================================

    fn toggle_fullscreen(&mut self) {
        if let Some(ref window) = self.window {
            self.is_fullscreen = !self.is_fullscreen;

            if self.is_fullscreen {
                // Enter fullscreen (use current monitor)
                window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                log::info!("Entered fullscreen mode");
            } else {
                window.set_fullscreen(None);
                log::info!("Exited fullscreen mode");
            }
            // The Resized event that follows triggers swapchain recreation
        }
    }

    // =========================================================================
    // FPS TRACKING
    // =========================================================================

    fn update_fps(&mut self) {
        if !self.config.debug.show_fps {
            return;
        }

        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;
        self.frame_count += 1;

        // Update title every second
        let elapsed = now.duration_since(self.last_fps_update).as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frame_count as f32 / elapsed;

            if let Some(ref window) = self.window {
                let mode = if self.is_fullscreen { "fullscreen" } else { "windowed" };
                window.set_title(&format!(
                    "{} - {:.0} FPS ({:.2}ms) [{}]",
                    self.config.window.title,
                    fps,
                    frame_time * 1000.0,
                    mode
                ));
            }

            self.frame_count = 0;
            self.last_fps_update = now;
        }
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    /// Called when the application is ready to create windows.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut window_attributes = WindowAttributes::default()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        if self.config.window.fullscreen {
            window_attributes =
                window_attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Failed to create window"));
                return;
            }
        };

        if let Err(e) = self.init_renderer(&window) {
            self.fail(event_loop, e);
            return;
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                if let Some(ref renderer) = self.renderer {
                    if let Err(e) = renderer.wait_idle() {
                        log::warn!("wait_idle failed: {}", e);
                    }
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);

                if let Some(ref mut renderer) = self.renderer {
                    renderer.resize(size.width, size.height);
                }

                // Wakes a loop parked in ControlFlow::Wait
                if size.width > 0 && size.height > 0 {
                    event_loop.set_control_flow(ControlFlow::Poll);
                    if let Some(ref window) = self.window {
                        window.request_redraw();
                    }
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.handle_key(event_loop, key);
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_x = position.x as f32;
                if let Some(ref mut renderer) = self.renderer {
                    let camera = renderer.camera_mut();
                    if camera.is_dragging() {
                        camera.drag_to(self.cursor_x);
                    }
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Right,
                ..
            } => {
                if let Some(ref mut renderer) = self.renderer {
                    let camera = renderer.camera_mut();
                    match state {
                        ElementState::Pressed => camera.begin_drag(self.cursor_x),
                        ElementState::Released => camera.end_drag(),
                    }
                }
            }

            _ => {}
        }
    }

    /// Keep redrawing as fast as presentation allows, except while the
    /// swapchain waits for a non-zero framebuffer.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let suspended = self
            .renderer
            .as_ref()
            .map_or(false, |renderer| renderer.is_suspended());

        if suspended {
            event_loop.set_control_flow(ControlFlow::Wait);
        } else if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("Cleaning up Vulkan resources...");
        // Renderer before window: the surface refers to it
        self.renderer = None;
        self.window = None;
        log::info!("Cleanup complete");
    }
}
