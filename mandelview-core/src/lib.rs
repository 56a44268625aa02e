pub mod error;
pub mod mandelbrot;
pub mod viewport;

// Re-export primary types for convenience.
pub use error::CoreError;
pub use mandelbrot::compute_orbit;
pub use viewport::{PlaneMapping, Viewport, Waypoint, DEFAULT_MAX_ORBIT, HOME_SPAN};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
