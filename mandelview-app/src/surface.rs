use eframe::egui;
use mandelview_render::{Framebuffer, PixelFormat, RenderError, Surface};

/// Presents frames as an egui texture sized to the central panel.
pub struct EguiSurface {
    ctx: egui::Context,
    width: u32,
    height: u32,
    format: PixelFormat,
    pending: Option<egui::ColorImage>,
    texture: Option<egui::TextureHandle>,
}

impl EguiSurface {
    /// Frames are rendered with one texel's worth of bytes per pixel so the
    /// upload is a straight per-pixel conversion.
    pub fn new(ctx: egui::Context, width: u32, height: u32) -> mandelview_render::Result<Self> {
        let format = PixelFormat::new(std::mem::size_of::<egui::Color32>())?;
        Ok(Self {
            ctx,
            width,
            height,
            format,
            pending: None,
            texture: None,
        })
    }

    /// Record a new panel size. Returns `true` when the size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    /// The most recently presented frame, if any.
    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }
}

impl Surface for EguiSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn blit(&mut self, frame: &Framebuffer) -> mandelview_render::Result<()> {
        let (width, height) = frame.size();
        if width == 0 || height == 0 {
            self.pending = None;
            return Ok(());
        }
        let rgba = frame.to_rgba();
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RenderError::Surface {
                reason: format!("frame holds {} bytes, expected {expected}", rgba.len()),
            });
        }
        self.pending = Some(egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            &rgba,
        ));
        Ok(())
    }

    fn update(&mut self) -> mandelview_render::Result<()> {
        let Some(image) = self.pending.take() else {
            return Ok(());
        };
        match self.texture.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(self.ctx.load_texture("mandelbrot", image, egui::TextureOptions::NEAREST));
            }
        }
        self.ctx.request_repaint();
        Ok(())
    }
}
