use thiserror::Error;

/// Failures while bringing up the page, the GPU, or the window.
///
/// Any of these is fatal: the frame loop is never started.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("no global `window`")]
    NoWindow,
    #[error("no document on window")]
    NoDocument,
    #[error("no body on document")]
    NoBody,
    #[error("failed to create canvas: {0}")]
    Canvas(String),
    #[error("DOM call failed: {0}")]
    Dom(String),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface does not support any texture format")]
    NoSurfaceFormat,
}

pub type Result<T> = std::result::Result<T, DemoError>;
