/// Coalesces bursts of resize notifications into a single reconciliation
/// once the window has been quiet for the debounce period.
///
/// ```text
/// Events:  R  R  R  R ... R [100ms quiet]
///                               │
///                               ▼
///                       one viewport reconcile
/// ```
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    debounce_ms: f64,
    last_event: Option<f64>,
}

impl ResizeDebouncer {
    pub fn new(debounce_ms: f64) -> Self {
        Self {
            debounce_ms,
            last_event: None,
        }
    }

    /// Record a resize notification at `now` (milliseconds).
    pub fn notify(&mut self, now: f64) {
        self.last_event = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    /// Returns true exactly once per burst, after the quiet period elapsed.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.last_event {
            Some(last) if now - last >= self.debounce_ms => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

/// Device pixel ratio actually used for the backbuffer
pub fn effective_pixel_ratio(device_pixel_ratio: f64, max_ratio: f64) -> f64 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(max_ratio)
    } else {
        1.0
    }
}

/// Backbuffer size in device pixels for a CSS-pixel viewport.
///
/// High-density displays are capped at `max_ratio` so the fragment shader
/// does not run on every physical pixel of a 3x phone screen.
pub fn drawable_size(css_width: f64, css_height: f64, device_pixel_ratio: f64, max_ratio: f64) -> (u32, u32) {
    let ratio = effective_pixel_ratio(device_pixel_ratio, max_ratio);
    let width = (css_width * ratio).floor().max(1.0) as u32;
    let height = (css_height * ratio).floor().max(1.0) as u32;
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_coalesced() {
        let mut debouncer = ResizeDebouncer::new(100.0);
        assert!(!debouncer.poll(0.0));

        for t in [0.0, 16.0, 32.0, 48.0, 64.0] {
            debouncer.notify(t);
            assert!(!debouncer.poll(t + 10.0));
        }
        assert!(debouncer.is_pending());
        assert!(!debouncer.poll(163.0));
        assert!(debouncer.poll(164.0));

        // Only once per burst
        assert!(!debouncer.poll(300.0));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_new_event_restarts_quiet_period() {
        let mut debouncer = ResizeDebouncer::new(100.0);
        debouncer.notify(0.0);
        debouncer.notify(90.0);
        assert!(!debouncer.poll(120.0));
        assert!(debouncer.poll(190.0));
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        assert_eq!(drawable_size(800.0, 600.0, 1.0, 1.5), (800, 600));
        assert_eq!(drawable_size(800.0, 600.0, 1.25, 1.5), (1000, 750));
        assert_eq!(drawable_size(800.0, 600.0, 3.0, 1.5), (1200, 900));
    }

    #[test]
    fn test_bogus_pixel_ratio_falls_back_to_one() {
        assert_eq!(effective_pixel_ratio(0.0, 1.5), 1.0);
        assert_eq!(effective_pixel_ratio(f64::NAN, 1.5), 1.0);
        assert_eq!(effective_pixel_ratio(2.0, 1.5), 1.5);
        assert_eq!(drawable_size(640.0, 480.0, -1.0, 1.5), (640, 480));
    }

    #[test]
    fn test_drawable_size_never_zero() {
        assert_eq!(drawable_size(0.0, 0.0, 2.0, 1.5), (1, 1));
        assert_eq!(drawable_size(0.4, 300.0, 1.0, 1.5), (1, 300));
    }
}
