use crate::framebuffer::{Framebuffer, PixelFormat};

/// The display a [`View`](crate::View) presents into.
///
/// A surface reports the current window size, accepts a finished frame and
/// shows it. Windowing toolkits implement this; [`MemorySurface`] keeps
/// frames in memory for headless use.
pub trait Surface {
    /// Current drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Layout of the framebuffers rendered for this surface.
    fn pixel_format(&self) -> PixelFormat {
        PixelFormat::BGRX8888
    }

    /// Copy `frame` onto the surface, clipped to the surface size.
    fn blit(&mut self, frame: &Framebuffer) -> crate::Result<()>;

    /// Make the most recent blit visible.
    fn update(&mut self) -> crate::Result<()>;
}

/// A surface that keeps the presented image in a framebuffer.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    width: u32,
    height: u32,
    format: PixelFormat,
    frame: Option<Framebuffer>,
    presents: u64,
}

impl MemorySurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_format(width, height, PixelFormat::BGRX8888)
    }

    pub fn with_format(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            frame: None,
            presents: 0,
        }
    }

    /// Change the reported size, as a window resize would.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// The last image blitted onto the surface.
    pub fn frame(&self) -> Option<&Framebuffer> {
        self.frame.as_ref()
    }

    /// How many times [`update`](Surface::update) has been called.
    pub fn presents(&self) -> u64 {
        self.presents
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn blit(&mut self, frame: &Framebuffer) -> crate::Result<()> {
        let stale = self
            .frame
            .as_ref()
            .is_none_or(|f| f.size() != (self.width, self.height));
        if stale {
            self.frame = None;
            self.frame = Some(Framebuffer::try_new(self.width, self.height, self.format)?);
        }
        if let Some(target) = self.frame.as_mut() {
            frame.blit(frame.bounds(), target, 0, 0);
        }
        Ok(())
    }

    fn update(&mut self) -> crate::Result<()> {
        self.presents += 1;
        Ok(())
    }
}
