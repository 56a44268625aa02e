use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to allocate a {width}×{height} framebuffer")]
    Allocation { width: u32, height: u32 },

    #[error("unsupported pixel format: {bytes_per_pixel} bytes per pixel (need at least 3)")]
    InvalidPixelFormat { bytes_per_pixel: usize },

    #[error("failed to start render workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("surface error: {reason}")]
    Surface { reason: String },

    #[error(transparent)]
    Core(#[from] mandelview_core::CoreError),
}
