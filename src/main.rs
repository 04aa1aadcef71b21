use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

// Import from the library crate
use roomwalk::{
    config::DemoConfig,
    controller::{
        drawable_size, effective_pixel_ratio, EventQueue, FrameLoop, FrameStats, FrameUniforms, InputEvent,
        LoopControl, MouseButton, Quality, Renderer, ResizeProvider,
    },
    logging, ui,
    view::{GpuContext, Overlay, ShaderRenderer},
};

/// Walk around a shader-rendered room
#[derive(Parser, Debug)]
#[command(name = "roomwalk", version, about)]
struct Args {
    /// Shader quality: 0 = low, 1 = medium, 2 = high
    #[arg(long, default_value_t = 1)]
    quality: i32,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Walking speed in units per second
    #[arg(long)]
    move_speed: Option<f32>,

    /// Look sensitivity in radians per pixel of drag
    #[arg(long)]
    look_speed: Option<f32>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = logging::DEFAULT_FILTER)]
    log: String,
}

impl Args {
    fn into_config(self) -> DemoConfig {
        let mut config = DemoConfig::default();
        config.display.initial_width = self.width;
        config.display.initial_height = self.height;
        match Quality::from_index(self.quality) {
            Some(quality) => config.display.quality = quality,
            None => tracing::warn!(index = self.quality, "unknown quality level, using default"),
        }
        if let Some(speed) = self.move_speed {
            config.camera.move_speed = speed;
        }
        if let Some(speed) = self.look_speed {
            config.camera.look_speed = speed;
        }
        config
    }
}

/// Window-side collaborators of the frame loop
struct NativeHost {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: ShaderRenderer,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    events: EventQueue,
    max_pixel_ratio: f64,
}

impl NativeHost {
    fn pixel_ratio(&self) -> f64 {
        effective_pixel_ratio(self.window.scale_factor(), self.max_pixel_ratio)
    }
}

impl ResizeProvider for NativeHost {
    fn reconcile_size(&mut self) -> (u32, u32) {
        let physical = self.window.inner_size();
        let scale = self.window.scale_factor();
        let size = drawable_size(
            physical.width as f64 / scale,
            physical.height as f64 / scale,
            scale,
            self.max_pixel_ratio,
        );
        if size != self.gpu.size() {
            self.gpu.resize(size.0, size.1);
        }
        size
    }
}

impl Renderer for NativeHost {
    fn render(&mut self, uniforms: &FrameUniforms, stats: &FrameStats) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let (mut full_output, picked) = ui::build_ui(&self.egui_ctx, raw_input, uniforms, stats);
        if let Some(quality) = picked {
            self.events.push(InputEvent::QualityChanged(quality));
        }
        self.egui_state
            .handle_platform_output(&self.window, std::mem::take(&mut full_output.platform_output));

        let ppp = self.pixel_ratio() as f32;
        let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), ppp);
        let overlay = Overlay {
            primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point: ppp,
        };
        self.renderer.draw_frame(&self.gpu, uniforms, Some(overlay));
    }
}

struct Running {
    frame_loop: FrameLoop,
    host: NativeHost,
    cursor: (f32, f32),
    touches: u32,
}

struct App {
    config: DemoConfig,
    start: Instant,
    running: Option<Running>,
}

impl App {
    fn new(config: DemoConfig) -> Self {
        Self {
            config,
            start: Instant::now(),
            running: None,
        }
    }

    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<Running, Box<dyn std::error::Error>> {
        let attributes = Window::default_attributes()
            .with_title("roomwalk")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.display.initial_width,
                self.config.display.initial_height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let size = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new_native(window.clone(), size.width, size.height))?;
        let renderer = ShaderRenderer::new(gpu.device.as_ref(), gpu.format);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &*window,
            None,
            None,
            None,
        );

        let frame_loop = FrameLoop::new(&self.config, self.now_ms());
        let host = NativeHost {
            window,
            gpu,
            renderer,
            egui_ctx,
            egui_state,
            events: frame_loop.events(),
            max_pixel_ratio: self.config.display.max_pixel_ratio,
        };

        Ok(Running {
            frame_loop,
            host,
            cursor: (0.0, 0.0),
            touches: 0,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(running) => {
                info!("starting frame loop");
                self.running = Some(running);
            }
            Err(e) => {
                error!("startup failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let now = self.now_ms();
        let Some(app) = self.running.as_mut() else {
            return;
        };
        let events = app.frame_loop.events();

        // Let egui see everything first; pointer presses it consumes do not start a drag
        let egui_consumed = app.host.egui_state.on_window_event(&app.host.window, &event).consumed;

        match event {
            WindowEvent::CloseRequested => {
                app.frame_loop.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                events.push(InputEvent::Resized);
            }
            WindowEvent::Focused(false) => events.push(InputEvent::FocusLost),
            WindowEvent::Occluded(occluded) => events.push(InputEvent::VisibilityChanged { visible: !occluded }),
            WindowEvent::CursorMoved { position, .. } => {
                app.cursor = logical_point(position, app.host.window.scale_factor());
                events.push(InputEvent::PointerMove { x: app.cursor.0, y: app.cursor.1 });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Right => MouseButton::Right,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    _ => MouseButton::Left,
                };
                match state {
                    ElementState::Pressed if !egui_consumed => events.push(InputEvent::PointerDown {
                        button,
                        x: app.cursor.0,
                        y: app.cursor.1,
                    }),
                    ElementState::Pressed => {}
                    ElementState::Released => events.push(InputEvent::PointerUp { button }),
                }
            }
            WindowEvent::Touch(touch) => {
                let (x, y) = logical_point(touch.location, app.host.window.scale_factor());
                match touch.phase {
                    TouchPhase::Started => {
                        app.touches += 1;
                        events.push(InputEvent::TouchStart { touches: app.touches, x, y });
                    }
                    TouchPhase::Moved => events.push(InputEvent::TouchMove { touches: app.touches, x, y }),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        app.touches = app.touches.saturating_sub(1);
                        events.push(InputEvent::TouchEnd { remaining: app.touches });
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape) && event.state == ElementState::Pressed {
                    app.frame_loop.stop();
                    event_loop.exit();
                    return;
                }
                if let Some(key) = key_code_name(event.physical_key) {
                    events.push(match event.state {
                        ElementState::Pressed => InputEvent::KeyDown(key),
                        ElementState::Released => InputEvent::KeyUp(key),
                    });
                }
            }
            WindowEvent::RedrawRequested => {
                if app.frame_loop.tick(now, &mut app.host) == LoopControl::Stop {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = self.running.as_ref() {
            app.host.window.request_redraw();
        }
    }
}

/// Logical pixels, matching the CSS pixels the browser reports, so look
/// speed per pixel is the same on every display density.
fn logical_point(position: PhysicalPosition<f64>, scale_factor: f64) -> (f32, f32) {
    let logical = position.to_logical::<f32>(scale_factor);
    (logical.x, logical.y)
}

/// Physical key code in the spelling of the browser's `KeyboardEvent.code`.
/// winit's `KeyCode` variants are named after those same values.
fn key_code_name(key: PhysicalKey) -> Option<String> {
    match key {
        PhysicalKey::Code(code) => Some(format!("{code:?}")),
        PhysicalKey::Unidentified(_) => None,
    }
}

fn main() {
    let args = Args::parse();
    logging::init(&args.log);
    let config = args.into_config();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("event loop error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomwalk::controller::{KeyBindings, MoveDirection};

    #[test]
    fn test_key_codes_match_browser_codes() {
        let bindings = KeyBindings::default();
        let name = |code| key_code_name(PhysicalKey::Code(code));

        assert_eq!(name(KeyCode::KeyW).as_deref(), Some("KeyW"));
        assert_eq!(name(KeyCode::ArrowLeft).as_deref(), Some("ArrowLeft"));
        assert_eq!(
            name(KeyCode::KeyD).and_then(|code| bindings.direction_for(&code)),
            Some(MoveDirection::Right)
        );
    }

    #[test]
    fn test_pointer_positions_are_logical() {
        assert_eq!(logical_point(PhysicalPosition::new(200.0, 100.0), 2.0), (100.0, 50.0));
        assert_eq!(logical_point(PhysicalPosition::new(200.0, 100.0), 1.0), (200.0, 100.0));
    }
}
