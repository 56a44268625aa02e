use tracing::{debug, warn};

use mandelview_core::Waypoint;

use crate::palette::{create_palette, ColorWeights, MIN_PALETTE_SIZE};
use crate::renderer::RegionRenderer;
use crate::surface::Surface;
use crate::view::View;

/// Everything the interactive loop can ask of a [`View`].
///
/// Pixel positions are window coordinates with y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Quit,
    /// Primary button pressed at a position; later moves pan the view.
    DragStart { x: i32, y: i32 },
    DragMove { x: i32, y: i32 },
    DragEnd,
    /// Centre the view on a pixel and multiply the scale by `zoom_factor`.
    Recenter { x: i32, y: i32, zoom_factor: f64 },
    /// Pan by a pixel delta (`dy > 0` moves the view up).
    ScrollBy { dx: i32, dy: i32 },
    Rotate(i32),
    /// Window-relative zoom delta; positive zooms out.
    ZoomBy(i32),
    AdjustMaxOrbit(i32),
    AdjustPaletteSize(i32),
    GotoHome,
}

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing visible changed.
    Idle,
    /// Call [`View::paint`].
    Repaint,
    Quit,
}

/// Applies [`Command`]s to a view, tracking the drag anchor and the
/// configuration needed to go home or rebuild the palette.
#[derive(Debug, Clone)]
pub struct Navigator {
    home: Waypoint,
    palette_size: usize,
    weights: ColorWeights,
    drag_anchor: Option<(i32, i32)>,
}

impl Navigator {
    pub fn new(home: Waypoint, palette_size: usize, weights: ColorWeights) -> Self {
        Self {
            home,
            palette_size: palette_size.max(MIN_PALETTE_SIZE),
            weights,
            drag_anchor: None,
        }
    }

    pub fn home(&self) -> Waypoint {
        self.home
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn apply<S: Surface, R: RegionRenderer>(
        &mut self,
        view: &mut View<S, R>,
        command: Command,
    ) -> Outcome {
        debug!(?command, "Applying command");
        match command {
            Command::Quit => return Outcome::Quit,
            Command::DragStart { x, y } => {
                self.drag_anchor = Some((x, y));
                return Outcome::Idle;
            }
            Command::DragMove { x, y } => {
                let Some((ax, ay)) = self.drag_anchor else {
                    return Outcome::Idle;
                };
                view.scroll(ax.saturating_sub(x), y.saturating_sub(ay));
                self.drag_anchor = Some((x, y));
            }
            Command::DragEnd => {
                self.drag_anchor = None;
                return Outcome::Idle;
            }
            Command::Recenter { x, y, zoom_factor } => {
                let mut wp = view.current_waypoint();
                (wp.x, wp.y) = view.to_plane(x as f64, y as f64);
                if zoom_factor.is_finite() && zoom_factor > 0.0 {
                    wp.scale *= zoom_factor;
                }
                if let Err(err) = view.try_goto_waypoint(wp) {
                    warn!(%err, "Ignoring recentre");
                    return Outcome::Idle;
                }
            }
            Command::ScrollBy { dx, dy } => view.scroll(dx, dy),
            Command::Rotate(degrees) => view.rotate(degrees),
            Command::ZoomBy(delta) => {
                let (width, _) = view.surface().size();
                // Keep `width + delta` at least one pixel.
                let floor = 1 - width.min(i32::MAX as u32) as i32;
                view.zoom(delta.max(floor));
            }
            Command::AdjustMaxOrbit(delta) => view.adjust_max_orbit(delta),
            Command::AdjustPaletteSize(delta) => {
                let size = (view.palette().len() as i64 + delta as i64)
                    .max(MIN_PALETTE_SIZE as i64) as usize;
                let palette = view.palette().resized(size);
                view.set_palette(palette);
            }
            Command::GotoHome => {
                view.set_palette(create_palette(self.palette_size, self.weights));
                view.goto_waypoint(self.home);
            }
        }
        Outcome::Repaint
    }
}
