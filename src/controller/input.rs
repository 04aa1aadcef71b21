/// Platform-agnostic input handling system
use tracing::{debug, warn};

use crate::controller::Quality;
use crate::model::Camera;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Pointer events, in screen pixels
    PointerDown { button: MouseButton, x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { button: MouseButton },

    // Touch events, `touches` is the number of active touch points
    TouchStart { touches: u32, x: f32, y: f32 },
    TouchMove { touches: u32, x: f32, y: f32 },
    TouchEnd { remaining: u32 },

    // Keyboard events, carrying the physical key code ("KeyW", "ArrowUp")
    KeyDown(String),
    KeyUp(String),

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
    Resized,

    // Settings
    QualityChanged(Quality),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// An in-progress look drag
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    pub active: bool,
    pub last_x: f32,
    pub last_y: f32,
}

/// Held movement keys and the current look drag
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub drag: DragState,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a drag at the given point. Ignored while a drag is already active.
    pub fn on_drag_start(&mut self, x: f32, y: f32) {
        if self.drag.active {
            return;
        }
        self.drag = DragState {
            active: true,
            last_x: x,
            last_y: y,
        };
        debug!(x, y, "drag started");
    }

    /// Advance the drag to a new point and return the pixel delta since the
    /// previous one, or `None` if no drag is active.
    pub fn on_drag_move(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        if !self.drag.active {
            return None;
        }
        let delta = (x - self.drag.last_x, y - self.drag.last_y);
        self.drag.last_x = x;
        self.drag.last_y = y;
        Some(delta)
    }

    pub fn on_drag_end(&mut self) {
        if self.drag.active {
            debug!("drag ended");
        }
        self.drag.active = false;
    }

    pub fn set_move_key(&mut self, direction: MoveDirection, pressed: bool) {
        match direction {
            MoveDirection::Forward => self.forward = pressed,
            MoveDirection::Backward => self.backward = pressed,
            MoveDirection::Left => self.left = pressed,
            MoveDirection::Right => self.right = pressed,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Drop every held key and any active drag. Used when the page loses
    /// focus and the matching release events will never arrive.
    pub fn clear(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.drag.active = false;
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec!["KeyW".to_string(), "ArrowUp".to_string()],
            backward: vec!["KeyS".to_string(), "ArrowDown".to_string()],
            left: vec!["KeyA".to_string(), "ArrowLeft".to_string()],
            right: vec!["KeyD".to_string(), "ArrowRight".to_string()],
        }
    }
}

impl KeyBindings {
    /// Movement direction bound to a physical key code. Codes name the key
    /// position, so modifiers held at press or release do not change them.
    pub fn direction_for(&self, code: &str) -> Option<MoveDirection> {
        let matches = |keys: &[String]| keys.iter().any(|k| k == code);
        if matches(&self.forward) {
            Some(MoveDirection::Forward)
        } else if matches(&self.backward) {
            Some(MoveDirection::Backward)
        } else if matches(&self.left) {
            Some(MoveDirection::Left)
        } else if matches(&self.right) {
            Some(MoveDirection::Right)
        } else {
            None
        }
    }

    pub fn is_bound(&self, code: &str) -> bool {
        self.direction_for(code).is_some()
    }
}

/// Maps input events onto the input state and the camera
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    /// Apply one input event. Window and settings events are not handled
    /// here and are ignored.
    pub fn apply(&self, event: &InputEvent, input: &mut InputState, camera: &mut Camera) {
        match event {
            InputEvent::PointerDown { button: MouseButton::Left, x, y } => {
                input.on_drag_start(*x, *y);
            }
            InputEvent::PointerMove { x, y } => {
                Self::look(input, camera, *x, *y);
            }
            InputEvent::PointerUp { button: MouseButton::Left } => {
                input.on_drag_end();
            }
            InputEvent::TouchStart { touches: 1, x, y } => {
                input.on_drag_start(*x, *y);
            }
            InputEvent::TouchMove { touches: 1, x, y } => {
                Self::look(input, camera, *x, *y);
            }
            // A finger still resting on the screen keeps the look going
            InputEvent::TouchEnd { remaining: 0 } => {
                input.on_drag_end();
            }
            InputEvent::KeyDown(key) => {
                if let Some(dir) = self.bindings.direction_for(key) {
                    input.set_move_key(dir, true);
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(dir) = self.bindings.direction_for(key) {
                    input.set_move_key(dir, false);
                }
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { visible: false } => {
                if input.is_moving() || input.drag.active {
                    warn!("clearing held input after focus loss");
                }
                input.clear();
            }
            _ => {}
        }
    }

    fn look(input: &mut InputState, camera: &mut Camera, x: f32, y: f32) {
        if let Some((dx, dy)) = input.on_drag_move(x, y) {
            camera.apply_look(dx, dy);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent, TouchEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let code = e.code();
        if is_down {
            InputEvent::KeyDown(code)
        } else {
            InputEvent::KeyUp(code)
        }
    }

    pub fn mouse_down_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerDown {
            button: MouseButton::from_web_button(e.button()),
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerMove {
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }

    pub fn mouse_up_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerUp {
            button: MouseButton::from_web_button(e.button()),
        }
    }

    /// Touch start/move, located at the first touch point
    pub fn touch_to_input(e: &TouchEvent, is_start: bool) -> Option<InputEvent> {
        let touches = e.touches();
        let first = touches.get(0)?;
        let (count, x, y) = (touches.length(), first.client_x() as f32, first.client_y() as f32);
        Some(if is_start {
            InputEvent::TouchStart { touches: count, x, y }
        } else {
            InputEvent::TouchMove { touches: count, x, y }
        })
    }

    pub fn touch_end_to_input(e: &TouchEvent) -> InputEvent {
        InputEvent::TouchEnd {
            remaining: e.touches().length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::model::RoomBounds;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), RoomBounds::default())
    }

    #[test]
    fn test_drag_start_only_once() {
        let mut input = InputState::new();
        input.on_drag_start(10.0, 20.0);
        input.on_drag_start(50.0, 60.0);
        assert!(input.drag.active);
        assert_eq!((input.drag.last_x, input.drag.last_y), (10.0, 20.0));
    }

    #[test]
    fn test_drag_move_reports_delta() {
        let mut input = InputState::new();
        assert_eq!(input.on_drag_move(5.0, 5.0), None);

        input.on_drag_start(10.0, 20.0);
        assert_eq!(input.on_drag_move(15.0, 18.0), Some((5.0, -2.0)));
        assert_eq!(input.on_drag_move(15.0, 18.0), Some((0.0, 0.0)));

        input.on_drag_end();
        assert_eq!(input.on_drag_move(100.0, 100.0), None);
    }

    #[test]
    fn test_repeated_key_down_is_idempotent() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        let mut cam = camera();

        for _ in 0..5 {
            processor.apply(&InputEvent::KeyDown("KeyW".into()), &mut input, &mut cam);
        }
        assert!(input.forward);

        processor.apply(&InputEvent::KeyUp("KeyW".into()), &mut input, &mut cam);
        assert!(!input.forward);
    }

    #[test]
    fn test_key_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.direction_for("KeyW"), Some(MoveDirection::Forward));
        assert_eq!(bindings.direction_for("ArrowDown"), Some(MoveDirection::Backward));
        assert_eq!(bindings.direction_for("KeyA"), Some(MoveDirection::Left));
        assert_eq!(bindings.direction_for("ArrowRight"), Some(MoveDirection::Right));
        assert_eq!(bindings.direction_for("KeyQ"), None);
        // Typed characters are not key codes
        assert_eq!(bindings.direction_for("w"), None);
        assert!(!bindings.is_bound("ShiftLeft"));
    }

    #[test]
    fn test_release_with_changed_modifier_clears_key() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        let mut cam = camera();

        // Option+W types "∑" on macOS, but the key code stays KeyW on release
        processor.apply(&InputEvent::KeyDown("KeyW".into()), &mut input, &mut cam);
        processor.apply(&InputEvent::KeyDown("KeyD".into()), &mut input, &mut cam);
        processor.apply(&InputEvent::KeyUp("KeyW".into()), &mut input, &mut cam);
        processor.apply(&InputEvent::KeyUp("KeyD".into()), &mut input, &mut cam);
        assert!(!input.forward);
        assert!(!input.right);

        let cam_before = cam.position;
        processor.apply(&InputEvent::KeyDown("KeyW".into()), &mut input, &mut cam);
        processor.apply(&InputEvent::KeyUp("KeyW".into()), &mut input, &mut cam);
        cam.update(0.1, &input);
        assert_eq!(cam.position, cam_before);
    }

    #[test]
    fn test_custom_bindings() {
        let bindings = KeyBindings {
            forward: vec!["KeyI".to_string()],
            backward: vec!["KeyK".to_string()],
            left: vec!["KeyJ".to_string()],
            right: vec!["KeyL".to_string()],
        };
        let processor = InputProcessor::new(bindings);
        let mut input = InputState::new();
        let mut cam = camera();

        processor.apply(&InputEvent::KeyDown("KeyW".into()), &mut input, &mut cam);
        assert!(!input.forward);
        processor.apply(&InputEvent::KeyDown("KeyI".into()), &mut input, &mut cam);
        assert!(input.forward);
    }

    #[test]
    fn test_focus_loss_clears_stuck_input() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        let mut cam = camera();

        processor.apply(&InputEvent::KeyDown("KeyW".into()), &mut input, &mut cam);
        processor.apply(&InputEvent::KeyDown("ArrowLeft".into()), &mut input, &mut cam);
        processor.apply(
            &InputEvent::PointerDown { button: MouseButton::Left, x: 0.0, y: 0.0 },
            &mut input,
            &mut cam,
        );

        processor.apply(&InputEvent::FocusLost, &mut input, &mut cam);
        assert!(!input.is_moving());
        assert!(!input.drag.active);

        processor.apply(&InputEvent::KeyDown("KeyS".into()), &mut input, &mut cam);
        processor.apply(&InputEvent::VisibilityChanged { visible: false }, &mut input, &mut cam);
        assert!(!input.backward);
    }

    #[test]
    fn test_becoming_visible_keeps_state() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        let mut cam = camera();

        processor.apply(&InputEvent::KeyDown("KeyW".into()), &mut input, &mut cam);
        processor.apply(&InputEvent::VisibilityChanged { visible: true }, &mut input, &mut cam);
        assert!(input.forward);
    }

    #[test]
    fn test_mouse_drag_rotates_camera() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        let mut cam = camera();
        let (yaw, pitch) = (cam.yaw, cam.pitch);

        // Moving without a drag does nothing
        processor.apply(&InputEvent::PointerMove { x: 40.0, y: 40.0 }, &mut input, &mut cam);
        assert_eq!((cam.yaw, cam.pitch), (yaw, pitch));

        processor.apply(
            &InputEvent::PointerDown { button: MouseButton::Left, x: 100.0, y: 100.0 },
            &mut input,
            &mut cam,
        );
        processor.apply(&InputEvent::PointerMove { x: 120.0, y: 90.0 }, &mut input, &mut cam);

        assert!((cam.yaw - (yaw - 20.0 * cam.look_speed)).abs() < 1e-6);
        assert!((cam.pitch - (pitch + 10.0 * cam.look_speed)).abs() < 1e-6);

        processor.apply(&InputEvent::PointerUp { button: MouseButton::Left }, &mut input, &mut cam);
        assert!(!input.drag.active);
    }

    #[test]
    fn test_right_button_does_not_drag() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        let mut cam = camera();

        processor.apply(
            &InputEvent::PointerDown { button: MouseButton::Right, x: 0.0, y: 0.0 },
            &mut input,
            &mut cam,
        );
        assert!(!input.drag.active);
    }

    #[test]
    fn test_touch_uses_same_look_path() {
        let processor = InputProcessor::default();

        let mut mouse_input = InputState::new();
        let mut mouse_cam = camera();
        processor.apply(
            &InputEvent::PointerDown { button: MouseButton::Left, x: 10.0, y: 10.0 },
            &mut mouse_input,
            &mut mouse_cam,
        );
        processor.apply(&InputEvent::PointerMove { x: 30.0, y: -5.0 }, &mut mouse_input, &mut mouse_cam);

        let mut touch_input = InputState::new();
        let mut touch_cam = camera();
        processor.apply(&InputEvent::TouchStart { touches: 1, x: 10.0, y: 10.0 }, &mut touch_input, &mut touch_cam);
        processor.apply(&InputEvent::TouchMove { touches: 1, x: 30.0, y: -5.0 }, &mut touch_input, &mut touch_cam);

        assert_eq!(mouse_cam.yaw, touch_cam.yaw);
        assert_eq!(mouse_cam.pitch, touch_cam.pitch);

        processor.apply(&InputEvent::TouchEnd { remaining: 0 }, &mut touch_input, &mut touch_cam);
        assert!(!touch_input.drag.active);
    }

    #[test]
    fn test_lifting_second_finger_keeps_look() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        let mut cam = camera();
        let yaw = cam.yaw;

        processor.apply(&InputEvent::TouchStart { touches: 1, x: 50.0, y: 50.0 }, &mut input, &mut cam);
        processor.apply(&InputEvent::TouchStart { touches: 2, x: 50.0, y: 50.0 }, &mut input, &mut cam);
        processor.apply(&InputEvent::TouchEnd { remaining: 1 }, &mut input, &mut cam);
        assert!(input.drag.active);

        processor.apply(&InputEvent::TouchMove { touches: 1, x: 70.0, y: 50.0 }, &mut input, &mut cam);
        assert!((cam.yaw - (yaw - 20.0 * cam.look_speed)).abs() < 1e-6);

        processor.apply(&InputEvent::TouchEnd { remaining: 0 }, &mut input, &mut cam);
        assert!(!input.drag.active);
    }

    #[test]
    fn test_multi_touch_is_ignored() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        let mut cam = camera();

        processor.apply(&InputEvent::TouchStart { touches: 2, x: 0.0, y: 0.0 }, &mut input, &mut cam);
        assert!(!input.drag.active);
    }
}
