// MODEL: Camera pose and room geometry
pub mod camera;
pub mod room;

pub use camera::Camera;
pub use room::RoomBounds;
