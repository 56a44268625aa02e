pub mod command;
pub mod error;
pub mod framebuffer;
pub mod palette;
pub mod renderer;
pub mod surface;
pub mod tile;
pub mod view;
pub mod worker;

pub use command::{Command, Navigator, Outcome};
pub use error::RenderError;
pub use framebuffer::{Canvas, Framebuffer, PixelFormat, Rect};
pub use palette::{create_palette, ColorWeights, Palette, Rgba, BLACK, MIN_PALETTE_SIZE};
pub use renderer::{render_mandelbrot, MandelbrotRenderer, RegionRenderer, Scene};
pub use surface::{MemorySurface, Surface};
pub use view::View;

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
