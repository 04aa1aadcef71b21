// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tracing::{error, info};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, Window};

    use crate::config::DemoConfig;
    use crate::controller::input::wasm as dom_input;
    use crate::controller::{
        drawable_size, effective_pixel_ratio, EventQueue, FrameLoop, FrameStats, FrameUniforms, InputEvent,
        InputProcessor, KeyBindings, LoopControl, Renderer, ResizeProvider,
    };
    use crate::error::{DemoError, Result};
    use crate::view::{GpuContext, Overlay, ShaderRenderer};
    use crate::{logging, ui};

    #[wasm_bindgen(start)]
    pub async fn start() -> std::result::Result<(), JsValue> {
        logging::init(logging::DEFAULT_FILTER);

        setup_app(DemoConfig::default()).await.map_err(|e| {
            error!("startup failed: {e}");
            JsValue::from_str(&e.to_string())
        })
    }

    /// Main application setup for WASM
    async fn setup_app(config: DemoConfig) -> Result<()> {
        let (window, document, canvas) = init_canvas()?;

        let css_width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(config.display.initial_width as f64);
        let css_height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(config.display.initial_height as f64);
        let (width, height) = drawable_size(css_width, css_height, window.device_pixel_ratio(), config.display.max_pixel_ratio);
        canvas.set_width(width);
        canvas.set_height(height);

        let gpu = GpuContext::new(&canvas, width, height).await?;
        let renderer = ShaderRenderer::new(gpu.device.as_ref(), gpu.format);

        let now = now_ms(&window);
        let bindings = KeyBindings::default();
        let mut frame_loop =
            FrameLoop::new(&config, now).with_input_processor(InputProcessor::new(bindings.clone()));
        let events = frame_loop.events();
        let egui_ctx = egui::Context::default();
        let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));

        setup_input_listeners(&document, &window, &canvas, &events, &bindings, &egui_ctx, &egui_events)?;

        let mut host = WebHost {
            window: window.clone(),
            canvas,
            gpu,
            renderer,
            egui_ctx,
            egui_events,
            events,
            max_pixel_ratio: config.display.max_pixel_ratio,
            pixel_ratio: effective_pixel_ratio(window.device_pixel_ratio(), config.display.max_pixel_ratio),
        };

        info!(width, height, "starting frame loop");
        AnimationLoop::new(window, move |timestamp| frame_loop.tick(timestamp, &mut host)).start();

        Ok(())
    }

    /// Page-side collaborators of the frame loop: canvas sizing, the GPU
    /// renderer, and the egui HUD.
    struct WebHost {
        window: Window,
        canvas: HtmlCanvasElement,
        gpu: GpuContext,
        renderer: ShaderRenderer,
        egui_ctx: egui::Context,
        egui_events: Rc<RefCell<Vec<egui::Event>>>,
        events: EventQueue,
        max_pixel_ratio: f64,
        pixel_ratio: f64,
    }

    impl ResizeProvider for WebHost {
        fn reconcile_size(&mut self) -> (u32, u32) {
            let (w, h) = self.gpu.size();
            let css_width = self.window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(w as f64);
            let css_height = self.window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(h as f64);
            let dpr = self.window.device_pixel_ratio();

            self.pixel_ratio = effective_pixel_ratio(dpr, self.max_pixel_ratio);
            let size = drawable_size(css_width, css_height, dpr, self.max_pixel_ratio);
            if size != (w, h) {
                self.canvas.set_width(size.0);
                self.canvas.set_height(size.1);
                self.gpu.resize(size.0, size.1);
            }
            size
        }
    }

    impl Renderer for WebHost {
        fn render(&mut self, uniforms: &FrameUniforms, stats: &FrameStats) {
            let ppp = self.pixel_ratio as f32;
            let (w, h) = self.gpu.size();

            let mut raw_input = egui::RawInput::default();
            raw_input.time = Some(uniforms.elapsed_seconds as f64);
            raw_input.screen_rect = Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(w as f32 / ppp, h as f32 / ppp),
            ));
            raw_input.events.extend(self.egui_events.borrow_mut().drain(..));
            self.egui_ctx.set_pixels_per_point(ppp);

            let (mut full_output, picked) = ui::build_ui(&self.egui_ctx, raw_input, uniforms, stats);
            if let Some(quality) = picked {
                self.events.push(InputEvent::QualityChanged(quality));
            }

            let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), ppp);
            let overlay = Overlay {
                primitives,
                textures_delta: full_output.textures_delta,
                pixels_per_point: ppp,
            };
            self.renderer.draw_frame(&self.gpu, uniforms, Some(overlay));
        }
    }

    /// Setup all input event listeners; each one only pushes onto a queue
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        events: &EventQueue,
        bindings: &KeyBindings,
        egui_ctx: &egui::Context,
        egui_events: &Rc<RefCell<Vec<egui::Event>>>,
    ) -> Result<()> {
        // Keyboard down
        {
            let events = events.clone();
            let bindings = bindings.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                // Keep arrow keys from scrolling the page
                if bindings.is_bound(&e.code()) {
                    e.prevent_default();
                }
                events.push(dom_input::keyboard_event_to_input(&e, true));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document
                .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            keydown.forget();
        }

        // Keyboard up
        {
            let events = events.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                events.push(dom_input::keyboard_event_to_input(&e, false));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document
                .add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            keyup.forget();
        }

        // Focus loss - clear all keys
        {
            let events = events.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                events.push(InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            window
                .add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            blur.forget();
        }

        // Visibility change - clear all keys when hidden
        {
            let events = events.clone();
            let doc = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                events.push(InputEvent::VisibilityChanged { visible: !doc.hidden() });
            }) as Box<dyn FnMut(Event)>);
            document
                .add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            visibility.forget();
        }

        // Window resize
        {
            let events = events.clone();
            let resize = Closure::wrap(Box::new(move |_e: Event| {
                events.push(InputEvent::Resized);
            }) as Box<dyn FnMut(Event)>);
            window
                .add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            resize.forget();
        }

        // Mouse down on the canvas starts a look drag unless the HUD is under the pointer
        {
            let events = events.clone();
            let egui_ctx = egui_ctx.clone();
            let egui_events = egui_events.clone();
            let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
                egui_events.borrow_mut().push(egui_button(&e, true));
                if !egui_ctx.is_pointer_over_area() {
                    events.push(dom_input::mouse_down_to_input(&e));
                }
                e.prevent_default();
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas
                .add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            mousedown.forget();
        }

        // Mouse move, tracked on the document so drags may leave the canvas
        {
            let events = events.clone();
            let egui_events = egui_events.clone();
            let mousemove = Closure::wrap(Box::new(move |e: MouseEvent| {
                egui_events
                    .borrow_mut()
                    .push(egui::Event::PointerMoved(egui::pos2(e.client_x() as f32, e.client_y() as f32)));
                events.push(dom_input::mouse_move_to_input(&e));
            }) as Box<dyn FnMut(MouseEvent)>);
            document
                .add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            mousemove.forget();
        }

        // Mouse up
        {
            let events = events.clone();
            let egui_events = egui_events.clone();
            let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
                egui_events.borrow_mut().push(egui_button(&e, false));
                events.push(dom_input::mouse_up_to_input(&e));
            }) as Box<dyn FnMut(MouseEvent)>);
            document
                .add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            mouseup.forget();
        }

        // Touch start / move share the mouse look path
        for (name, is_start) in [("touchstart", true), ("touchmove", false)] {
            let events = events.clone();
            let touch = Closure::wrap(Box::new(move |e: TouchEvent| {
                if let Some(event) = dom_input::touch_to_input(&e, is_start) {
                    events.push(event);
                }
                e.prevent_default();
            }) as Box<dyn FnMut(TouchEvent)>);
            canvas
                .add_event_listener_with_callback(name, touch.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            touch.forget();
        }

        // Touch end / cancel
        for name in ["touchend", "touchcancel"] {
            let events = events.clone();
            let touchend = Closure::wrap(Box::new(move |e: TouchEvent| {
                events.push(dom_input::touch_end_to_input(&e));
            }) as Box<dyn FnMut(TouchEvent)>);
            canvas
                .add_event_listener_with_callback(name, touchend.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            touchend.forget();
        }

        // Context menu prevention
        {
            let contextmenu = Closure::wrap(Box::new(move |e: MouseEvent| {
                e.prevent_default();
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas
                .add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())
                .map_err(dom_error)?;
            contextmenu.forget();
        }

        Ok(())
    }

    fn egui_button(e: &MouseEvent, pressed: bool) -> egui::Event {
        let button = match e.button() {
            1 => egui::PointerButton::Middle,
            2 => egui::PointerButton::Secondary,
            _ => egui::PointerButton::Primary,
        };
        egui::Event::PointerButton {
            pos: egui::pos2(e.client_x() as f32, e.client_y() as f32),
            button,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    /// Full-window canvas without scrollbars or browser touch gestures
    fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement)> {
        let window = web_sys::window().ok_or(DemoError::NoWindow)?;
        let document = window.document().ok_or(DemoError::NoDocument)?;
        let body = document.body().ok_or(DemoError::NoBody)?;
        let canvas = document
            .create_element("canvas")
            .map_err(dom_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| DemoError::Canvas("element is not a canvas".into()))?;

        let body_style = body.style();
        body_style.set_property("margin", "0").map_err(dom_error)?;
        body_style.set_property("overflow", "hidden").map_err(dom_error)?;

        let style = canvas.style();
        for (name, value) in [("display", "block"), ("width", "100vw"), ("height", "100vh"), ("touch-action", "none")] {
            style.set_property(name, value).map_err(dom_error)?;
        }

        body.append_child(&canvas).map_err(dom_error)?;
        Ok((window, document, canvas))
    }

    fn now_ms(window: &Window) -> f64 {
        window.performance().map(|p| p.now()).unwrap_or(0.0)
    }

    fn dom_error(e: JsValue) -> DemoError {
        DemoError::Dom(format!("{e:?}"))
    }

    /// requestAnimationFrame driver that keeps rescheduling itself until the
    /// step returns [`LoopControl::Stop`].
    struct AnimationLoop {
        step: Box<dyn FnMut(f64) -> LoopControl>,
        window: Window,
    }

    impl AnimationLoop {
        fn new(window: Window, step: impl FnMut(f64) -> LoopControl + 'static) -> Self {
            Self {
                step: Box::new(step),
                window,
            }
        }

        fn start(self) {
            let mut step = self.step;
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut(f64)>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
                if step(timestamp) == LoopControl::Stop {
                    info!("animation loop finished");
                    return;
                }

                // Recursively schedule next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        error!("requestAnimationFrame failed: {e:?}");
                    }
                }
            }) as Box<dyn FnMut(f64)>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    error!("requestAnimationFrame failed: {e:?}");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
