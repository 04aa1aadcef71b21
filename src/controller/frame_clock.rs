use crate::config::ClockConfig;

/// Wall-clock bookkeeping for the frame loop. All timestamps are in
/// milliseconds, as delivered by `performance.now()` or an `Instant`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start_time: f64,
    last_frame_time: f64,
    last_fps_sample_time: f64,
    frame_counter: u32,
    current_fps: u32,
    max_delta: f32,
    fps_sample_ms: f64,
}

impl FrameClock {
    pub fn new(now: f64, config: &ClockConfig) -> Self {
        Self {
            start_time: now,
            last_frame_time: now,
            last_fps_sample_time: now,
            frame_counter: 0,
            current_fps: 0,
            max_delta: config.max_delta,
            fps_sample_ms: config.fps_sample_ms,
        }
    }

    /// Advance to `now` and return `(delta_seconds, elapsed_seconds)`.
    ///
    /// The delta is clamped so a long pause (background tab, debugger) turns
    /// into a single short step. Timestamps older than the previous frame are
    /// treated as no time passing.
    pub fn tick(&mut self, now: f64) -> (f32, f32) {
        let now = now.max(self.last_frame_time);
        let dt = (((now - self.last_frame_time) / 1000.0) as f32).min(self.max_delta);
        self.last_frame_time = now;
        let elapsed = ((now - self.start_time) / 1000.0) as f32;
        (dt, elapsed)
    }

    /// Count one frame and return the frame rate, recomputed once per sample
    /// window and cached in between.
    pub fn sample_fps(&mut self, now: f64) -> u32 {
        self.frame_counter += 1;
        let window = now - self.last_fps_sample_time;
        if window >= self.fps_sample_ms {
            self.current_fps = (self.frame_counter as f64 * 1000.0 / window).round() as u32;
            self.frame_counter = 0;
            self.last_fps_sample_time = now;
            tracing::debug!(fps = self.current_fps, "fps sampled");
        }
        self.current_fps
    }

    pub fn fps(&self) -> u32 {
        self.current_fps
    }

    pub fn last_frame_time(&self) -> f64 {
        self.last_frame_time
    }
}
