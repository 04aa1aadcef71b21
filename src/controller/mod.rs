// CONTROLLER: Input, timing, and the update loop
pub mod input;
pub mod frame_clock;
pub mod resize;
pub mod frame_loop;

pub use input::{InputEvent, InputProcessor, InputState, KeyBindings, MouseButton, MoveDirection};
pub use frame_clock::FrameClock;
pub use resize::{drawable_size, effective_pixel_ratio, ResizeDebouncer};
pub use frame_loop::{
    EventQueue, FrameLoop, FrameStats, FrameUniforms, LoopControl, Quality, Renderer, ResizeProvider,
    ShaderUniforms,
};
