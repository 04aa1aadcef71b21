use std::f32::consts::PI;

use crate::controller::Quality;
use crate::model::RoomBounds;

/// Startup configuration for the whole demo.
#[derive(Debug, Clone, Default)]
pub struct DemoConfig {
    pub camera: CameraConfig,
    pub room: RoomBounds,
    pub clock: ClockConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub move_speed: f32,
    pub look_speed: f32,
    /// Slightly less than π/2 so the view never flips over
    pub max_pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 1.6, 4.0],
            yaw: PI,
            pitch: 0.0,
            move_speed: 2.5,
            look_speed: 0.005,
            max_pitch: 1.48,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Upper bound for a single frame step, in seconds
    pub max_delta: f32,
    /// Minimum time between two fps samples, in milliseconds
    pub fps_sample_ms: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.1,
            fps_sample_ms: 500.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub initial_width: u32,
    pub initial_height: u32,
    /// Cap on the device pixel ratio used for the backbuffer
    pub max_pixel_ratio: f64,
    /// Quiet period before a burst of resize notifications is applied
    pub resize_debounce_ms: f64,
    pub quality: Quality,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            initial_width: 800,
            initial_height: 600,
            max_pixel_ratio: 1.5,
            resize_debounce_ms: 100.0,
            quality: Quality::Medium,
        }
    }
}
