/// Horizontal collision limits of the virtual room.
///
/// The room is a vertical cylinder around the world origin with a low
/// cylindrical platform in its center. Both are soft limits: a position that
/// ends up outside is projected back onto the boundary instead of rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomBounds {
    pub room_radius: f32,
    pub obstacle_radius: f32,
    /// Eye heights at or above this walk over the platform instead of into it.
    pub obstacle_clear_height: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for RoomBounds {
    fn default() -> Self {
        Self {
            room_radius: 6.0,
            obstacle_radius: 2.0,
            obstacle_clear_height: 0.6,
            min_height: 0.5,
            max_height: 3.0,
        }
    }
}

impl RoomBounds {
    /// Smallest distance used when pushing a position off the platform.
    const MIN_PUSH_DISTANCE: f32 = 0.1;

    /// Resolve a candidate horizontal position against the walls and the
    /// central platform. Returns the corrected `(x, z)`.
    pub fn constrain(&self, x: f32, y: f32, z: f32) -> (f32, f32) {
        let (mut x, mut z) = (x, z);

        let dist = (x * x + z * z).sqrt();
        if dist > self.room_radius {
            let scale = self.room_radius / dist;
            x *= scale;
            z *= scale;
        }

        // Re-measure after the wall projection
        let dist = (x * x + z * z).sqrt();
        if dist < self.obstacle_radius && y < self.obstacle_clear_height {
            let scale = self.obstacle_radius / dist.max(Self::MIN_PUSH_DISTANCE);
            x *= scale;
            z *= scale;
        }

        (x, z)
    }

    pub fn clamp_height(&self, y: f32) -> f32 {
        y.clamp(self.min_height, self.max_height)
    }
}
