use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec3;
use tracing::{info, warn};

use crate::config::DemoConfig;
use crate::controller::frame_clock::FrameClock;
use crate::controller::input::{InputEvent, InputProcessor, InputState};
use crate::controller::resize::ResizeDebouncer;
use crate::model::Camera;

/// Shader quality level, forwarded to the renderer as a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    Low = 0,
    #[default]
    Medium = 1,
    High = 2,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Low, Quality::Medium, Quality::High];

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Quality::Low),
            1 => Some(Quality::Medium),
            2 => Some(Quality::High),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::Low => "Low",
            Quality::Medium => "Medium",
            Quality::High => "High",
        }
    }
}

/// Per-frame parameters handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub elapsed_seconds: f32,
    /// Drawable size in device pixels
    pub resolution: (u32, u32),
    pub camera_position: Vec3,
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub quality: i32,
}

/// GPU layout of [`FrameUniforms`], matching `Uniforms` in `room.wgsl`
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub camera_position: [f32; 3],
    pub time: f32,
    pub resolution: [f32; 2],
    pub yaw: f32,
    pub pitch: f32,
    pub quality: i32,
    pub _pad: [i32; 3],
}

impl From<&FrameUniforms> for ShaderUniforms {
    fn from(u: &FrameUniforms) -> Self {
        Self {
            camera_position: u.camera_position.to_array(),
            time: u.elapsed_seconds,
            resolution: [u.resolution.0 as f32, u.resolution.1 as f32],
            yaw: u.camera_yaw,
            pitch: u.camera_pitch,
            quality: u.quality,
            _pad: [0; 3],
        }
    }
}

/// Frame timing shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub delta_time: f32,
    pub fps: u32,
}

/// Draws one frame from a uniform snapshot
pub trait Renderer {
    fn render(&mut self, uniforms: &FrameUniforms, stats: &FrameStats);
}

/// Owns the drawable surface and knows its current size
pub trait ResizeProvider {
    /// Bring the backbuffer and viewport in line with the current window size
    /// and return that size in device pixels.
    fn reconcile_size(&mut self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Single-threaded queue between event listeners and the frame loop
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Rc<RefCell<VecDeque<InputEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: InputEvent) {
        self.inner.borrow_mut().push_back(event);
    }

    pub fn pop(&self) -> Option<InputEvent> {
        self.inner.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

/// Main loop state and update logic
pub struct FrameLoop {
    camera: Camera,
    input_state: InputState,
    input_processor: InputProcessor,
    clock: FrameClock,
    resize: ResizeDebouncer,
    events: EventQueue,
    quality: Quality,
    resolution: (u32, u32),
    needs_initial_size: bool,
    running: bool,
}

impl FrameLoop {
    pub fn new(config: &DemoConfig, now: f64) -> Self {
        Self {
            camera: Camera::new(&config.camera, config.room),
            input_state: InputState::new(),
            input_processor: InputProcessor::default(),
            clock: FrameClock::new(now, &config.clock),
            resize: ResizeDebouncer::new(config.display.resize_debounce_ms),
            events: EventQueue::new(),
            quality: config.display.quality,
            resolution: (config.display.initial_width, config.display.initial_height),
            needs_initial_size: true,
            running: true,
        }
    }

    pub fn with_input_processor(mut self, processor: InputProcessor) -> Self {
        self.input_processor = processor;
        self
    }

    /// Handle to the queue that event listeners push into
    pub fn events(&self) -> EventQueue {
        self.events.clone()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn input_state(&self) -> &InputState {
        &self.input_state
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the loop; the next tick renders nothing and asks not to be rescheduled.
    pub fn stop(&mut self) {
        if self.running {
            info!("frame loop stopped");
        }
        self.running = false;
    }

    /// Apply a single event immediately. `now` is used to time resize bursts.
    pub fn handle_event(&mut self, event: &InputEvent, now: f64) {
        match event {
            InputEvent::Resized => self.resize.notify(now),
            InputEvent::QualityChanged(quality) => {
                if *quality != self.quality {
                    info!(quality = quality.label(), "quality changed");
                }
                self.quality = *quality;
            }
            _ => self
                .input_processor
                .apply(event, &mut self.input_state, &mut self.camera),
        }
    }

    /// Set the quality from a raw index, ignoring values outside the known set.
    pub fn set_quality_index(&mut self, index: i32) {
        match Quality::from_index(index) {
            Some(quality) => self.handle_event(&InputEvent::QualityChanged(quality), 0.0),
            None => warn!(index, "ignoring unknown quality level"),
        }
    }

    /// Advance one frame: drain queued events, step the clock and the camera,
    /// reconcile the viewport if a resize settled, and hand the uniform
    /// snapshot to the renderer.
    pub fn tick<H>(&mut self, now: f64, host: &mut H) -> LoopControl
    where
        H: Renderer + ResizeProvider,
    {
        if !self.running {
            return LoopControl::Stop;
        }

        while let Some(event) = self.events.pop() {
            self.handle_event(&event, now);
        }

        let (dt, elapsed) = self.clock.tick(now);
        let fps = self.clock.sample_fps(now);

        self.camera.update(dt, &self.input_state);

        if self.needs_initial_size || self.resize.poll(now) {
            let size = host.reconcile_size();
            if size != self.resolution {
                info!(width = size.0, height = size.1, "viewport resized");
            }
            self.resolution = size;
            self.needs_initial_size = false;
        }

        let uniforms = FrameUniforms {
            elapsed_seconds: elapsed,
            resolution: self.resolution,
            camera_position: self.camera.position,
            camera_yaw: self.camera.yaw,
            camera_pitch: self.camera.pitch,
            quality: self.quality.index(),
        };
        host.render(&uniforms, &FrameStats { delta_time: dt, fps });

        LoopControl::Continue
    }
}
