use std::time::Instant;

use tracing::debug;

use mandelview_core::{compute_orbit, PlaneMapping, Viewport};

use crate::framebuffer::{Canvas, Framebuffer, Rect};
use crate::palette::Palette;
use crate::tile::build_bands;
use crate::worker::{dispatch, Job};

/// Read-only state shared by every worker of one render call.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub viewport: Viewport,
    pub palette: &'a Palette,
    /// Full image width the viewport is mapped onto.
    pub width: u32,
    /// Full image height the viewport is mapped onto.
    pub height: u32,
}

impl Scene<'_> {
    pub fn bounds(&self) -> Rect {
        Rect::of_size(self.width, self.height)
    }
}

/// Fills a rectangle of the image.
///
/// Implementations are called concurrently from several workers, each with
/// its own canvas, so they must be `Sync`. Plain closures with the matching
/// signature implement this trait.
pub trait RegionRenderer: Sync {
    fn render_region(&self, scene: &Scene<'_>, canvas: &mut Canvas<'_>, rect: Rect);
}

impl<F> RegionRenderer for F
where
    F: Fn(&Scene<'_>, &mut Canvas<'_>, Rect) + Sync,
{
    fn render_region(&self, scene: &Scene<'_>, canvas: &mut Canvas<'_>, rect: Rect) {
        self(scene, canvas, rect)
    }
}

/// Escape-time renderer for the Mandelbrot set.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandelbrotRenderer;

impl RegionRenderer for MandelbrotRenderer {
    fn render_region(&self, scene: &Scene<'_>, canvas: &mut Canvas<'_>, rect: Rect) {
        render_mandelbrot(scene, canvas, rect);
    }
}

/// Colour every pixel of `rect` that lies inside both the image and the
/// canvas. Escape counts equal to the cap are drawn black, the rest index the
/// palette modulo its length.
pub fn render_mandelbrot(scene: &Scene<'_>, canvas: &mut Canvas<'_>, rect: Rect) {
    let Some(area) = rect
        .intersect(&scene.bounds())
        .and_then(|r| r.intersect(&canvas.bounds()))
    else {
        return;
    };

    let mapping = PlaneMapping::new(&scene.viewport, scene.width, scene.height);
    let max_orbit = scene.viewport.max_orbit;
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let (cx, cy) = mapping.to_plane(x as f64, y as f64);
            let orbit = compute_orbit(cx, cy, max_orbit);
            canvas.put(x, y, scene.palette.color_for(orbit, max_orbit));
        }
    }
}

/// Render the whole frame as `degree` horizontal bands, one worker each.
///
/// Returns the number of bands dispatched.
pub fn render_bands<R: RegionRenderer>(
    renderer: &R,
    scene: &Scene<'_>,
    frame: &mut Framebuffer,
    degree: usize,
) -> crate::Result<usize> {
    let bands = build_bands(frame.width(), frame.height(), degree);
    let jobs: Vec<Job> = frame
        .canvases_for_bands(&bands)
        .into_iter()
        .map(|mut canvas| {
            Box::new(move || {
                let rect = canvas.bounds();
                renderer.render_region(scene, &mut canvas, rect);
            }) as Job
        })
        .collect();
    dispatch(degree, jobs)?;
    Ok(bands.len())
}

/// Render each strip into its own patch, then copy the patches into `frame`.
///
/// Strips may overlap; overlapping pixels are computed once per strip and
/// the later strip's copy wins, which is harmless because rendering is
/// deterministic.
pub fn render_strips<R: RegionRenderer>(
    renderer: &R,
    scene: &Scene<'_>,
    frame: &mut Framebuffer,
    strips: &[Rect],
    degree: usize,
) -> crate::Result<()> {
    let start = Instant::now();
    let format = frame.format();
    let mut patches = strips
        .iter()
        .map(|strip| Framebuffer::try_new(strip.width, strip.height, format))
        .collect::<crate::Result<Vec<_>>>()?;

    let jobs: Vec<Job> = patches
        .iter_mut()
        .zip(strips)
        .map(|(patch, &strip)| {
            Box::new(move || {
                let mut canvas = patch.canvas_at(strip.x, strip.y);
                renderer.render_region(scene, &mut canvas, strip);
            }) as Job
        })
        .collect();
    dispatch(degree, jobs)?;

    for (patch, strip) in patches.iter().zip(strips) {
        patch.blit(patch.bounds(), frame, strip.x, strip.y);
    }
    debug!(
        strips = strips.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Rendered exposed strips"
    );
    Ok(())
}
