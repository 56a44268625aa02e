use std::fmt;

use crate::error::RenderError;
use crate::palette::Rgba;

// ---------------------------------------------------------------------------
// Pixel format
// ---------------------------------------------------------------------------

/// Memory layout of one pixel: blue, green, red in the first three bytes,
/// any remaining bytes left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    bytes_per_pixel: usize,
}

impl PixelFormat {
    /// Packed 24-bit BGR.
    pub const BGR888: Self = Self { bytes_per_pixel: 3 };
    /// 32-bit BGR with an unused padding byte.
    pub const BGRX8888: Self = Self { bytes_per_pixel: 4 };

    /// Describe a surface layout, rejecting anything too small for a BGR write.
    pub fn new(bytes_per_pixel: usize) -> crate::Result<Self> {
        if bytes_per_pixel < 3 {
            return Err(RenderError::InvalidPixelFormat { bytes_per_pixel });
        }
        Ok(Self { bytes_per_pixel })
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bytes_per_pixel {
            3 => write!(f, "BGR888, BytesPerPixel=3"),
            4 => write!(f, "BGRX8888, BytesPerPixel=4"),
            n => write!(f, "BGR+{} padding, BytesPerPixel={n}", n - 3),
        }
    }
}

#[inline]
fn write_bgr(bytes: &mut [u8], offset: usize, color: Rgba) {
    bytes[offset] = color.b;
    bytes[offset + 1] = color.g;
    bytes[offset + 2] = color.r;
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// A pixel rectangle. The origin may be negative or lie past the edge of a
/// buffer; consumers clip against their own bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle anchored at the origin.
    pub const fn of_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// One past the rightmost column.
    pub fn right(&self) -> i32 {
        (self.x as i64 + self.width as i64).min(i32::MAX as i64) as i32
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> i32 {
        (self.y as i64 + self.height as i64).min(i32::MAX as i64) as i32
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// The overlapping part of two rectangles, if any.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

// ---------------------------------------------------------------------------
// Framebuffer
// ---------------------------------------------------------------------------

/// A row-major pixel store with a fixed [`PixelFormat`].
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Allocate a zeroed (black) framebuffer.
    ///
    /// Allocation failure is reported instead of aborting the process.
    pub fn try_new(width: u32, height: u32, format: PixelFormat) -> crate::Result<Self> {
        let alloc_err = || RenderError::Allocation { width, height };
        let len = Self::required_bytes(width, height, format).ok_or_else(alloc_err)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| alloc_err())?;
        pixels.resize(len, 0);
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Bytes needed for a `width × height` frame, or `None` on overflow.
    pub fn required_bytes(width: u32, height: u32, format: PixelFormat) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel
    }

    pub fn bounds(&self) -> Rect {
        Rect::of_size(self.width, self.height)
    }

    /// Raw pixel bytes in the buffer's format.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.pitch() + x as usize * self.format.bytes_per_pixel)
    }

    /// Write a pixel. Coordinates outside the buffer are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(offset) = self.offset(x, y) {
            write_bgr(&mut self.pixels, offset, color);
        }
    }

    /// Read a pixel back. Alpha is not stored and reads as 0.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.offset(x, y).map(|i| {
            Rgba::new(self.pixels[i + 2], self.pixels[i + 1], self.pixels[i], 0)
        })
    }

    /// Copy `src_rect` of this buffer into `dst` with its top-left corner at
    /// `(dst_x, dst_y)`.
    ///
    /// Both rectangles are clipped: parts of `src_rect` outside this buffer
    /// shift the destination accordingly, and parts landing outside `dst` are
    /// dropped. Nothing is copied when the overlap is empty.
    pub fn blit(&self, src_rect: Rect, dst: &mut Framebuffer, dst_x: i32, dst_y: i32) {
        let (mut sx, mut sy) = (src_rect.x as i64, src_rect.y as i64);
        let (mut dx, mut dy) = (dst_x as i64, dst_y as i64);
        let (mut w, mut h) = (src_rect.width as i64, src_rect.height as i64);

        // Clip against the source.
        if sx < 0 {
            dx -= sx;
            w += sx;
            sx = 0;
        }
        if sy < 0 {
            dy -= sy;
            h += sy;
            sy = 0;
        }
        w = w.min(self.width as i64 - sx);
        h = h.min(self.height as i64 - sy);

        // Clip against the destination.
        if dx < 0 {
            sx -= dx;
            w += dx;
            dx = 0;
        }
        if dy < 0 {
            sy -= dy;
            h += dy;
            dy = 0;
        }
        w = w.min(dst.width as i64 - dx);
        h = h.min(dst.height as i64 - dy);

        if w <= 0 || h <= 0 {
            return;
        }

        if self.format == dst.format {
            let bpp = self.format.bytes_per_pixel;
            let row_bytes = w as usize * bpp;
            let (src_pitch, dst_pitch) = (self.pitch(), dst.pitch());
            for row in 0..h as usize {
                let s = (sy as usize + row) * src_pitch + sx as usize * bpp;
                let d = (dy as usize + row) * dst_pitch + dx as usize * bpp;
                dst.pixels[d..d + row_bytes].copy_from_slice(&self.pixels[s..s + row_bytes]);
            }
        } else {
            for row in 0..h {
                for col in 0..w {
                    if let Some(c) = self.pixel((sx + col) as i32, (sy + row) as i32) {
                        dst.set_pixel((dx + col) as i32, (dy + row) as i32, c);
                    }
                }
            }
        }
    }

    /// Convert to tightly packed, opaque RGBA for display.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.pixels.chunks_exact(self.format.bytes_per_pixel) {
            out.extend_from_slice(&[px[2], px[1], px[0], 255]);
        }
        out
    }

    /// A canvas covering the whole buffer.
    pub fn canvas(&mut self) -> Canvas<'_> {
        self.canvas_at(0, 0)
    }

    /// A canvas covering the whole buffer, addressed as if the buffer's
    /// top-left pixel sat at `(x, y)` of a larger image.
    pub fn canvas_at(&mut self, x: i32, y: i32) -> Canvas<'_> {
        let bounds = Rect::new(x, y, self.width, self.height);
        let pitch = self.pitch();
        Canvas {
            pixels: self.pixels.as_mut_slice(),
            bounds,
            pitch,
            format: self.format,
        }
    }

    /// Split the buffer into one canvas per band.
    ///
    /// `bands` must be full-width row ranges in top-to-bottom order without
    /// overlap; rows beyond the buffer are dropped. The canvases borrow
    /// disjoint memory and can be filled concurrently.
    pub fn canvases_for_bands(&mut self, bands: &[Rect]) -> Vec<Canvas<'_>> {
        let pitch = self.pitch();
        let (width, height, format) = (self.width, self.height, self.format);
        let mut rest: &mut [u8] = self.pixels.as_mut_slice();
        let mut row = 0u32;
        let mut canvases = Vec::with_capacity(bands.len());

        for band in bands {
            debug_assert!(band.x == 0 && band.width == width, "bands span full rows");
            let top = band.y.max(0) as u32;
            if top < row || top >= height {
                continue;
            }
            let rows = band.height.min(height - top);
            let skip = (top - row) as usize * pitch;
            let (chunk, tail) = std::mem::take(&mut rest)
                .split_at_mut(skip)
                .1
                .split_at_mut(rows as usize * pitch);
            rest = tail;
            row = top + rows;
            canvases.push(Canvas {
                pixels: chunk,
                bounds: Rect::new(0, top as i32, width, rows),
                pitch,
                format,
            });
        }
        canvases
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Mutable window onto a rectangle of a larger image.
///
/// Coordinates passed to [`put`](Self::put) are image coordinates; writes
/// outside [`bounds`](Self::bounds) are ignored.
#[derive(Debug)]
pub struct Canvas<'a> {
    pixels: &'a mut [u8],
    bounds: Rect,
    pitch: usize,
    format: PixelFormat,
}

impl Canvas<'_> {
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Rgba) {
        if !self.bounds.contains(x, y) {
            return;
        }
        let local_x = (x - self.bounds.x) as usize;
        let local_y = (y - self.bounds.y) as usize;
        let offset = local_y * self.pitch + local_x * self.format.bytes_per_pixel;
        write_bgr(self.pixels, offset, color);
    }
}
