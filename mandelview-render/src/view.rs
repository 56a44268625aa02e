use std::time::Instant;

use tracing::{debug, info, warn};

use mandelview_core::{Viewport, Waypoint};

use crate::framebuffer::{Framebuffer, PixelFormat, Rect};
use crate::palette::Palette;
use crate::renderer::{render_bands, render_strips, MandelbrotRenderer, RegionRenderer, Scene};
use crate::surface::Surface;
use crate::tile::exposed_strips;
use crate::worker::default_concurrency;

/// Interactive view of the fractal plane.
///
/// Owns the viewport, the rendered frame and the surface it is shown on.
/// Mutating operations only update state and mark the frame invalid; the
/// actual rendering happens in [`paint`](Self::paint). Scrolling is the
/// exception: while the frame is valid it shifts the existing pixels and
/// renders just the newly exposed edges.
pub struct View<S: Surface, R: RegionRenderer = MandelbrotRenderer> {
    renderer: R,
    surface: S,
    primary: Option<Framebuffer>,
    /// Scratch target for fast scrolling, swapped with `primary` on each scroll.
    scratch: Option<Framebuffer>,
    palette: Palette,
    viewport: Viewport,
    concurrency: usize,
    fast_scroll: bool,
    /// Upper bound on the bytes held by `primary` and `scratch` together.
    frame_memory_limit: Option<usize>,
    valid: bool,
}

impl<S: Surface> View<S> {
    /// A view that draws the Mandelbrot set.
    pub fn mandelbrot(surface: S, palette: Palette) -> Self {
        Self::new(surface, palette, MandelbrotRenderer)
    }
}

impl<S: Surface, R: RegionRenderer> View<S, R> {
    pub fn new(surface: S, palette: Palette, renderer: R) -> Self {
        let concurrency = default_concurrency();
        let (width, height) = surface.size();
        info!(concurrency, width, height, "Created view");
        Self {
            renderer,
            viewport: Viewport::home(width),
            surface,
            primary: None,
            scratch: None,
            palette,
            concurrency,
            fast_scroll: true,
            frame_memory_limit: None,
            valid: false,
        }
    }

    /// Override the number of render workers (at least one).
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self
    }

    pub fn with_fast_scroll(mut self, enabled: bool) -> Self {
        self.fast_scroll = enabled;
        self
    }

    /// Cap the memory spent on frames. An allocation that would exceed the
    /// cap fails like an out-of-memory allocation.
    pub fn with_frame_memory_limit(mut self, bytes: usize) -> Self {
        self.frame_memory_limit = Some(bytes);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn fast_scroll_enabled(&self) -> bool {
        self.fast_scroll
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to report a window resize. The
    /// frame is reallocated on the next render if the size changed.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> Option<&Framebuffer> {
        self.primary.as_ref()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Replace the palette and invalidate.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.invalidate();
    }

    pub fn max_orbit(&self) -> u32 {
        self.viewport.max_orbit
    }

    /// Set the iteration cap and invalidate.
    pub fn set_max_orbit(&mut self, max_orbit: u32) {
        self.viewport.max_orbit = max_orbit;
        self.invalidate();
    }

    /// Change the iteration cap by `delta`, stopping at zero.
    pub fn adjust_max_orbit(&mut self, delta: i32) {
        let max_orbit = self.viewport.max_orbit.saturating_add_signed(delta);
        self.set_max_orbit(max_orbit);
    }

    // -----------------------------------------------------------------------
    // Viewpoint operations
    // -----------------------------------------------------------------------

    /// Mark the frame as stale. Buffers are kept for reuse.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn goto_waypoint(&mut self, waypoint: Waypoint) {
        self.viewport = Viewport::from(waypoint);
        self.invalidate();
    }

    /// Like [`goto_waypoint`](Self::goto_waypoint), but rejects snapshots
    /// that do not describe a usable viewport.
    pub fn try_goto_waypoint(&mut self, waypoint: Waypoint) -> crate::Result<()> {
        waypoint.validate()?;
        self.goto_waypoint(waypoint);
        Ok(())
    }

    pub fn current_waypoint(&self) -> Waypoint {
        Waypoint::from(self.viewport)
    }

    /// Zoom by a pixel delta relative to the window width; positive zooms out.
    pub fn zoom(&mut self, delta: i32) {
        let (width, _) = self.surface.size();
        if !self.viewport.zoom(width, delta) {
            warn!(width, delta, "Ignoring zoom that would collapse the view");
        }
        self.invalidate();
    }

    pub fn rotate(&mut self, degrees: i32) {
        self.viewport.rotate_by(degrees);
        self.invalidate();
    }

    /// Plane coordinates of a window pixel.
    pub fn to_plane(&self, px: f64, py: f64) -> (f64, f64) {
        let (width, height) = self.surface.size();
        self.viewport.to_plane(px, py, width, height)
    }

    /// Move the view by a pixel delta (`dy > 0` moves the view up the plane).
    ///
    /// The viewport is always updated. If the current frame is still valid
    /// and fast scrolling is on, the frame content is shifted and only the
    /// exposed edges are rendered; otherwise the view is invalidated.
    pub fn scroll(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        self.viewport.pan(dx, dy);

        if !self.fast_scroll || !self.valid {
            self.invalidate();
            return;
        }

        let start = Instant::now();
        let (width, height) = self.surface.size();
        let format = self.surface.pixel_format();
        let in_sync = self
            .primary
            .as_ref()
            .is_some_and(|f| f.size() == (width, height) && f.format() == format);
        if !in_sync {
            self.invalidate();
            return;
        }

        let budget = self.budget_beside(self.primary.as_ref());
        if let Err(err) = ensure_frame(&mut self.scratch, width, height, format, budget) {
            warn!(%err, "Disabling fast scroll");
            self.fast_scroll = false;
            self.scratch = None;
            self.invalidate();
            return;
        }

        // Shift the still-valid pixels into the scratch frame, then make it primary.
        if let (Some(primary), Some(scratch)) = (self.primary.as_ref(), self.scratch.as_mut()) {
            primary.blit(Rect::new(dx, dy.saturating_neg(), width, height), scratch, 0, 0);
        }
        std::mem::swap(&mut self.primary, &mut self.scratch);

        let strips = exposed_strips(dx, dy, width, height);
        let scene = Scene {
            viewport: self.viewport,
            palette: &self.palette,
            width,
            height,
        };
        let result = match self.primary.as_mut() {
            Some(frame) => render_strips(&self.renderer, &scene, frame, &strips, self.concurrency),
            None => Ok(()),
        };
        if let Err(err) = result {
            warn!(%err, "Edge render failed, falling back to a full render");
            self.invalidate();
            return;
        }

        debug!(
            dx,
            dy,
            strips = strips.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scroll complete"
        );
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Render the whole frame for the current viewport.
    ///
    /// The frame is reallocated first if the surface size changed. On
    /// failure the view stays invalid so the next paint retries.
    pub fn generate_image(&mut self) -> crate::Result<()> {
        let start = Instant::now();
        let (width, height) = self.surface.size();
        let format = self.surface.pixel_format();

        let budget = self.budget_beside(self.scratch.as_ref());
        let frame = match ensure_frame(&mut self.primary, width, height, format, budget) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "Cannot allocate frame");
                self.valid = false;
                return Err(err);
            }
        };
        self.valid = false;
        let scene = Scene {
            viewport: self.viewport,
            palette: &self.palette,
            width,
            height,
        };
        let bands = render_bands(&self.renderer, &scene, frame, self.concurrency)?;
        self.valid = true;

        info!(
            width,
            height,
            bands,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Full render complete"
        );
        Ok(())
    }

    /// Bytes left under the memory limit while `other` stays allocated.
    fn budget_beside(&self, other: Option<&Framebuffer>) -> Option<usize> {
        let held = other.map_or(0, |f| f.pixels().len());
        self.frame_memory_limit.map(|limit| limit.saturating_sub(held))
    }

    /// Render if needed, then present the frame on the surface.
    pub fn paint(&mut self) -> crate::Result<()> {
        if !self.valid {
            self.generate_image()?;
        }
        if let Some(frame) = self.primary.as_ref() {
            self.surface.blit(frame)?;
        }
        self.surface.update()
    }
}

/// Make sure `slot` holds a frame of the given size and format, freeing any
/// mismatched frame before allocating its replacement.
fn ensure_frame(
    slot: &mut Option<Framebuffer>,
    width: u32,
    height: u32,
    format: PixelFormat,
    budget: Option<usize>,
) -> crate::Result<&mut Framebuffer> {
    let reusable = slot
        .as_ref()
        .is_some_and(|f| f.size() == (width, height) && f.format() == format);
    if !reusable {
        *slot = None;
        let needed = Framebuffer::required_bytes(width, height, format);
        if budget.is_some_and(|limit| needed.is_none_or(|n| n > limit)) {
            return Err(crate::RenderError::Allocation { width, height });
        }
        let frame = Framebuffer::try_new(width, height, format)?;
        debug!(width, height, %format, "Allocated framebuffer");
        return Ok(slot.insert(frame));
    }
    slot.as_mut()
        .ok_or(crate::RenderError::Allocation { width, height })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::framebuffer::Canvas;
    use crate::palette::{create_palette, ColorWeights, BLACK};
    use crate::renderer::render_mandelbrot;
    use crate::surface::MemorySurface;
    use crate::RenderError;

    const W: u32 = 96;
    const H: u32 = 64;

    fn palette() -> Palette {
        create_palette(32, ColorWeights::default())
    }

    /// A viewport whose pixel → plane arithmetic is exact, so shifted pixels
    /// are bit-identical to freshly rendered ones.
    fn dyadic() -> Waypoint {
        Waypoint {
            x: -0.5,
            y: 0.0,
            scale: 64.0,
            bearing: 0,
            max_orbit: 50,
        }
    }

    fn view(workers: usize) -> View<MemorySurface> {
        let mut v = View::mandelbrot(MemorySurface::new(W, H), palette()).with_concurrency(workers);
        v.goto_waypoint(dyadic());
        v
    }

    fn full_render_of(waypoint: Waypoint) -> Framebuffer {
        let mut v = view(1);
        v.goto_waypoint(waypoint);
        v.paint().unwrap();
        v.frame().unwrap().clone()
    }

    #[derive(Default)]
    struct CountingRenderer {
        calls: AtomicUsize,
        pixels: AtomicUsize,
    }

    impl CountingRenderer {
        fn take(&self) -> (usize, usize) {
            (
                self.calls.swap(0, Ordering::SeqCst),
                self.pixels.swap(0, Ordering::SeqCst),
            )
        }
    }

    impl RegionRenderer for CountingRenderer {
        fn render_region(&self, scene: &Scene<'_>, canvas: &mut Canvas<'_>, rect: Rect) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pixels.fetch_add(rect.pixel_count(), Ordering::SeqCst);
            render_mandelbrot(scene, canvas, rect);
        }
    }

    #[test]
    fn view_is_invalid_until_painted() {
        let mut v = view(2);
        assert!(!v.is_valid());
        assert!(v.frame().is_none());

        v.paint().unwrap();
        assert!(v.is_valid());
        assert_eq!(v.surface().presents(), 1);
        assert_eq!(v.surface().frame(), v.frame());
    }

    #[test]
    fn home_view_centre_pixel_is_in_the_set() {
        let mut v = View::mandelbrot(MemorySurface::new(800, 600), palette());
        v.goto_waypoint(Waypoint::from(Viewport::home(800)));
        v.paint().unwrap();
        let frame = v.frame().unwrap();
        assert_eq!(frame.pixel(400, 300), Some(BLACK));
        assert_ne!(frame.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn zero_scroll_is_a_no_op() {
        let mut v = view(2);
        v.paint().unwrap();
        let before = *v.viewport();
        let pixels = v.frame().unwrap().pixels().as_ptr();

        v.scroll(0, 0);
        assert_eq!(*v.viewport(), before);
        assert!(v.is_valid());
        assert_eq!(v.frame().unwrap().pixels().as_ptr(), pixels);

        v.invalidate();
        v.scroll(0, 0);
        assert!(!v.is_valid());
    }

    #[test]
    fn fast_scroll_matches_full_render() {
        let deltas = [
            (5, 0),
            (-7, 0),
            (0, 3),
            (0, -4),
            (6, -5),
            (-3, 9),
            (200, 0),
            (0, -500),
        ];
        for workers in [1, 4] {
            for &(dx, dy) in &deltas {
                let mut v = view(workers);
                v.paint().unwrap();
                v.scroll(dx, dy);
                v.scroll(-2, 1);
                assert!(v.is_valid(), "fast scroll keeps the frame valid");
                let expected = full_render_of(v.current_waypoint());
                assert_eq!(
                    v.frame(),
                    Some(&expected),
                    "scroll ({dx}, {dy}) with {workers} workers"
                );
            }
        }
    }

    #[test]
    fn scroll_on_invalid_view_only_moves_the_viewport() {
        let mut v = view(2);
        v.scroll(16, -32);
        assert!(!v.is_valid());
        assert!(v.frame().is_none());
        assert_eq!(v.viewport().center_x, -0.25);
        assert_eq!(v.viewport().center_y, -0.5);
    }

    #[test]
    fn disabled_fast_scroll_defers_to_full_render() {
        let mut v = view(2).with_fast_scroll(false);
        v.paint().unwrap();
        v.scroll(4, 4);
        assert!(!v.is_valid());
        v.paint().unwrap();
        assert_eq!(v.frame(), Some(&full_render_of(v.current_waypoint())));
    }

    #[test]
    fn scratch_allocation_failure_disables_fast_scroll() {
        let frame_bytes = (W * H * 4) as usize;
        // Room for the primary frame but not for a second one.
        let mut v = view(2).with_frame_memory_limit(frame_bytes + frame_bytes / 2);
        v.paint().unwrap();
        assert!(v.fast_scroll_enabled());

        v.scroll(3, 2);
        assert!(!v.fast_scroll_enabled());
        assert!(!v.is_valid());
        v.paint().unwrap();
        assert!(v.is_valid());
        assert_eq!(v.frame(), Some(&full_render_of(v.current_waypoint())));

        // Stays off: later scrolls on a valid frame only invalidate.
        v.scroll(-1, 0);
        assert!(!v.fast_scroll_enabled());
        assert!(!v.is_valid());
        v.paint().unwrap();
        assert_eq!(v.frame(), Some(&full_render_of(v.current_waypoint())));
    }

    #[test]
    fn memory_limit_applies_to_the_primary_frame() {
        let mut v = view(1).with_frame_memory_limit((W * H) as usize);
        let err = v.paint().unwrap_err();
        assert!(matches!(err, RenderError::Allocation { .. }));
        assert!(!v.is_valid());
    }

    #[test]
    fn invalid_waypoint_is_rejected() {
        let mut v = view(1);
        v.paint().unwrap();
        let err = v
            .try_goto_waypoint(Waypoint {
                scale: 0.0,
                ..dyadic()
            })
            .unwrap_err();
        assert!(matches!(err, RenderError::Core(_)));
        assert_eq!(v.current_waypoint(), dyadic());
        assert!(v.is_valid());
    }

    #[test]
    fn scroll_renders_only_exposed_strips() {
        let mut v = View::new(MemorySurface::new(W, H), palette(), CountingRenderer::default())
            .with_concurrency(4);
        v.goto_waypoint(dyadic());
        v.paint().unwrap();
        assert_eq!(v.renderer().take(), (4, (W * H) as usize));

        v.scroll(5, -3);
        // The corner is rendered by both strips.
        assert_eq!(v.renderer().take(), (2, (5 * H + W * 3) as usize));

        v.scroll(0, 2);
        assert_eq!(v.renderer().take(), (1, (W * 2) as usize));
    }

    #[test]
    fn resize_reallocates_before_next_render() {
        let mut v = view(3);
        v.paint().unwrap();
        v.surface_mut().resize(50, 40);
        // A frame of the old size cannot be scrolled.
        v.scroll(3, 0);
        assert!(!v.is_valid());
        v.paint().unwrap();
        assert_eq!(v.frame().unwrap().size(), (50, 40));
    }

    #[test]
    fn zero_sized_surface_renders_nothing() {
        let mut v = View::mandelbrot(MemorySurface::new(0, 0), palette()).with_concurrency(4);
        v.paint().unwrap();
        assert!(v.is_valid());
        assert!(v.frame().unwrap().pixels().is_empty());
    }

    #[test]
    fn allocation_failure_leaves_view_invalid() {
        let mut v = View::mandelbrot(MemorySurface::new(u32::MAX, u32::MAX), palette());
        let err = v.paint().unwrap_err();
        assert!(matches!(err, RenderError::Allocation { .. }));
        assert!(!v.is_valid());
        assert_eq!(v.surface().presents(), 0);
    }

    #[test]
    fn zoom_applies_window_relative_formula() {
        let mut v = View::mandelbrot(MemorySurface::new(800, 600), palette());
        v.goto_waypoint(Waypoint {
            scale: 200.0,
            ..dyadic()
        });
        v.paint().unwrap();
        v.zoom(50);
        assert_eq!(v.viewport().scale, (800.0 * 200.0) / 850.0);
        assert!(!v.is_valid());
    }

    #[test]
    fn rotate_normalises_bearing() {
        let mut v = view(1);
        v.rotate(-4);
        assert_eq!(v.viewport().bearing, 356);
        v.rotate(364);
        assert_eq!(v.viewport().bearing, 0);
        assert!(!v.is_valid());
    }

    #[test]
    fn max_orbit_adjustment_saturates() {
        let mut v = view(1);
        v.set_max_orbit(5);
        v.adjust_max_orbit(-10);
        assert_eq!(v.max_orbit(), 0);
        v.adjust_max_orbit(10);
        assert_eq!(v.max_orbit(), 10);
    }

    #[test]
    fn waypoints_round_trip_through_the_view() {
        let mut v = view(1);
        let wp = Waypoint {
            x: 0.25,
            y: -0.125,
            scale: 1024.0,
            bearing: 45,
            max_orbit: 300,
        };
        v.goto_waypoint(wp);
        assert_eq!(v.current_waypoint(), wp);
    }

    #[test]
    fn to_plane_uses_surface_size() {
        let v = view(1);
        assert_eq!(v.to_plane(48.0, 32.0), (-0.5, 0.0));
        assert_eq!(v.to_plane(112.0, 0.0), (0.5, 0.5));
    }
}
