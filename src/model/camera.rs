use glam::{Vec2, Vec3};

use crate::config::CameraConfig;
use crate::controller::InputState;
use crate::model::RoomBounds;

/// First-person camera walking on the floor of the room.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// World units per second
    pub move_speed: f32,
    /// Radians per pixel of drag
    pub look_speed: f32,
    pub max_pitch: f32,
    pub room: RoomBounds,
}

impl Camera {
    /// Raw move vectors shorter than this are treated as no movement.
    const MIN_MOVE_LENGTH: f32 = 0.001;

    pub fn new(config: &CameraConfig, room: RoomBounds) -> Self {
        let mut position = Vec3::from(config.position);
        position.y = room.clamp_height(position.y);

        Self {
            position,
            yaw: config.yaw,
            pitch: config.pitch.clamp(-config.max_pitch, config.max_pitch),
            move_speed: config.move_speed,
            look_speed: config.look_speed,
            max_pitch: config.max_pitch,
            room,
        }
    }

    /// Unit forward direction on the floor plane, as `(x, z)`.
    pub fn forward_xz(&self) -> Vec2 {
        Vec2::new(self.yaw.sin(), self.yaw.cos())
    }

    /// Unit strafe-left direction on the floor plane, as `(x, z)`.
    pub fn left_xz(&self) -> Vec2 {
        Vec2::new(self.yaw.cos(), -self.yaw.sin())
    }

    /// Apply a drag delta in pixels to the look angles.
    pub fn apply_look(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.look_speed;
        self.pitch = (self.pitch - dy * self.look_speed).clamp(-self.max_pitch, self.max_pitch);
    }

    /// Move along the floor according to the held movement keys, then resolve
    /// the result against the room walls and the central platform.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        let mut raw = Vec2::ZERO;
        if input.forward {
            raw += self.forward_xz();
        }
        if input.backward {
            raw -= self.forward_xz();
        }
        if input.left {
            raw += self.left_xz();
        }
        if input.right {
            raw -= self.left_xz();
        }

        let dir = if raw.length() > Self::MIN_MOVE_LENGTH {
            raw.normalize()
        } else {
            Vec2::ZERO
        };
        let step = dir * self.move_speed * dt;

        let (x, z) = self.room.constrain(
            self.position.x + step.x,
            self.position.y,
            self.position.z + step.y,
        );
        self.position.x = x;
        self.position.z = z;
    }

    /// Horizontal distance from the room center.
    pub fn distance_from_center(&self) -> f32 {
        Vec2::new(self.position.x, self.position.z).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MoveDirection;
    use std::f32::consts::PI;

    const EPS: f32 = 1e-4;

    fn camera_at(x: f32, y: f32, z: f32, yaw: f32) -> Camera {
        let config = CameraConfig {
            position: [x, y, z],
            yaw,
            ..CameraConfig::default()
        };
        let mut cam = Camera::new(&config, RoomBounds::default());
        // Bypass the height clamp so tests can place the eye anywhere
        cam.position.y = y;
        cam
    }

    fn holding(dirs: &[MoveDirection]) -> InputState {
        let mut input = InputState::new();
        for dir in dirs {
            input.set_move_key(*dir, true);
        }
        input
    }

    #[test]
    fn test_forward_moves_along_yaw() {
        for i in 0..16 {
            let yaw = i as f32 * PI / 8.0 - PI;
            let mut cam = camera_at(0.0, 1.6, 4.0, yaw);
            cam.room.room_radius = 100.0;
            let start = cam.position;

            cam.update(0.5, &holding(&[MoveDirection::Forward]));

            let moved = cam.position - start;
            let expected = Vec2::new(yaw.sin(), yaw.cos()) * cam.move_speed * 0.5;
            assert!((moved.x - expected.x).abs() < EPS, "yaw {yaw}");
            assert!((moved.z - expected.y).abs() < EPS, "yaw {yaw}");
            assert_eq!(moved.y, 0.0);
        }
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut cam = camera_at(1.0, 1.6, 4.0, 0.3);
        let start = cam.position;

        cam.update(1.0, &holding(&[MoveDirection::Forward, MoveDirection::Backward]));
        assert_eq!(cam.position, start);

        cam.update(1.0, &holding(&[MoveDirection::Left, MoveDirection::Right]));
        assert_eq!(cam.position, start);
    }

    #[test]
    fn test_diagonal_is_not_faster() {
        let mut cam = camera_at(0.0, 1.6, 4.0, 0.7);
        cam.room.room_radius = 100.0;
        let start = cam.position;

        cam.update(0.1, &holding(&[MoveDirection::Forward, MoveDirection::Left]));

        let moved = (cam.position - start).length();
        assert!((moved - cam.move_speed * 0.1).abs() < EPS);
    }

    #[test]
    fn test_strafe_left_direction() {
        let mut cam = camera_at(0.0, 1.6, 4.0, 0.0);
        cam.update(1.0, &holding(&[MoveDirection::Left]));
        assert!((cam.position.x - cam.move_speed).abs() < EPS);
        assert!((cam.position.z - 4.0).abs() < EPS);
    }

    #[test]
    fn test_wall_stops_at_room_radius() {
        let mut cam = camera_at(0.0, 1.6, 5.5, 0.0);
        cam.update(1.0, &holding(&[MoveDirection::Forward]));
        assert!((cam.distance_from_center() - cam.room.room_radius).abs() < EPS);
    }

    #[test]
    fn test_platform_blocks_low_camera() {
        let mut cam = camera_at(0.0, 0.4, 3.0, PI);
        cam.update(0.5, &holding(&[MoveDirection::Forward]));
        assert!((cam.distance_from_center() - cam.room.obstacle_radius).abs() < EPS);
    }

    #[test]
    fn test_platform_ignored_at_eye_height() {
        let mut cam = camera_at(0.0, 0.6, 3.0, PI);
        cam.update(0.5, &holding(&[MoveDirection::Forward]));
        assert!((cam.distance_from_center() - 1.75).abs() < EPS);
        assert!(cam.distance_from_center() < cam.room.obstacle_radius);
    }

    #[test]
    fn test_walk_toward_center_scenario() {
        let mut cam = camera_at(0.0, 1.6, 4.0, PI);
        cam.move_speed = 2.5;

        cam.update(1.0, &holding(&[MoveDirection::Forward]));

        assert!(cam.position.x.abs() < EPS);
        assert_eq!(cam.position.y, 1.6);
        assert!((cam.position.z - 1.5).abs() < EPS);
    }

    #[test]
    fn test_pitch_stays_clamped() {
        let mut cam = camera_at(0.0, 1.6, 4.0, 0.0);
        let deltas = [500.0, -2000.0, 37.0, 10_000.0, -3.0, -10_000.0, 0.5];
        for dy in deltas {
            cam.apply_look(3.0, dy);
            assert!(cam.pitch >= -1.48 && cam.pitch <= 1.48, "pitch {}", cam.pitch);
        }
    }

    #[test]
    fn test_drag_right_turns_right() {
        let mut cam = camera_at(0.0, 1.6, 4.0, 0.0);
        cam.apply_look(100.0, 0.0);
        assert!((cam.yaw + 100.0 * cam.look_speed).abs() < EPS);

        cam.apply_look(0.0, 10.0);
        assert!(cam.pitch < 0.0);
    }

    #[test]
    fn test_new_clamps_start_height() {
        let config = CameraConfig {
            position: [0.0, 9.0, 0.0],
            ..CameraConfig::default()
        };
        let cam = Camera::new(&config, RoomBounds::default());
        assert_eq!(cam.position.y, RoomBounds::default().max_height);
    }
}
