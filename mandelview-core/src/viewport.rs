use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default iteration cap for the home view.
pub const DEFAULT_MAX_ORBIT: u32 = 100;

/// Plane width (in plane units) visible across the window at the home view.
pub const HOME_SPAN: f64 = 3.5;

/// The camera state that decides which part of the fractal plane is on screen.
///
/// `scale` is expressed in pixels per plane unit, so a larger scale means a
/// deeper zoom. `bearing` is a whole number of degrees kept in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Plane x coordinate of the screen centre.
    pub center_x: f64,
    /// Plane y coordinate of the screen centre.
    pub center_y: f64,
    /// Pixels per plane unit.
    pub scale: f64,
    /// Rotation of the view in degrees.
    pub bearing: i32,
    /// Iteration cap handed to the escape-time evaluator.
    pub max_orbit: u32,
}

impl Viewport {
    /// Create a viewport, rejecting scales that cannot map pixels to the plane.
    ///
    /// The bearing is normalised into `[0, 360)`.
    pub fn new(
        center_x: f64,
        center_y: f64,
        scale: f64,
        bearing: i32,
        max_orbit: u32,
    ) -> crate::Result<Self> {
        if scale <= 0.0 || !scale.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("scale must be positive and finite, got {scale}"),
            });
        }
        if !center_x.is_finite() || !center_y.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("centre must be finite, got ({center_x}, {center_y})"),
            });
        }
        Ok(Self {
            center_x,
            center_y,
            scale,
            bearing: bearing.rem_euclid(360),
            max_orbit,
        })
    }

    /// The starting view: the whole set centred at `(-0.75, 0)`, 3.5 plane
    /// units spanning the window width.
    pub fn home(window_width: u32) -> Self {
        Self {
            center_x: -0.75,
            center_y: 0.0,
            scale: window_width.max(1) as f64 / HOME_SPAN,
            bearing: 0,
            max_orbit: DEFAULT_MAX_ORBIT,
        }
    }

    /// Map a pixel of a `width × height` image to plane coordinates.
    ///
    /// Renderers that map many pixels should build a [`PlaneMapping`] once
    /// instead, so the rotation is only evaluated a single time.
    pub fn to_plane(&self, px: f64, py: f64, width: u32, height: u32) -> (f64, f64) {
        PlaneMapping::new(self, width, height).to_plane(px, py)
    }

    /// Move the centre by a pixel delta, honouring the current bearing.
    ///
    /// `dy_pixels` is in plane orientation: positive moves the centre up.
    pub fn pan(&mut self, dx_pixels: i32, dy_pixels: i32) {
        let mut dx = dx_pixels as f64 / self.scale;
        let mut dy = dy_pixels as f64 / self.scale;
        if self.bearing != 0 {
            (dx, dy) = rotate(dx, dy, to_radians(self.bearing));
        }
        self.center_x += dx;
        self.center_y += dy;
    }

    /// Zoom relative to the window width: `scale ← w·scale / (w + delta)`.
    ///
    /// Positive deltas zoom out, negative deltas zoom in. Returns `false` and
    /// leaves the scale untouched when the window has no width, when
    /// `w + delta` is not positive, or when the result would not be a
    /// positive finite scale.
    pub fn zoom(&mut self, window_width: u32, delta: i32) -> bool {
        if window_width == 0 {
            return false;
        }
        let w = window_width as f64;
        let denominator = w + delta as f64;
        if denominator <= 0.0 {
            return false;
        }
        let scale = (w * self.scale) / denominator;
        if !(scale.is_finite() && scale > 0.0) {
            return false;
        }
        self.scale = scale;
        true
    }

    /// Turn the view by `degrees`, keeping the bearing in `[0, 360)`.
    pub fn rotate_by(&mut self, degrees: i32) {
        self.bearing = (self.bearing + degrees.rem_euclid(360)).rem_euclid(360);
    }
}

/// Serializable snapshot of a [`Viewport`], used for the home position,
/// bookmarks and double-click recentring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    #[serde(default)]
    pub bearing: i32,
    pub max_orbit: u32,
}

impl Waypoint {
    /// Check that the snapshot describes a usable viewport.
    pub fn validate(&self) -> crate::Result<()> {
        Viewport::new(self.x, self.y, self.scale, self.bearing, self.max_orbit)?;
        if !(0..360).contains(&self.bearing) {
            return Err(CoreError::InvalidViewport {
                reason: format!("bearing must be in [0, 360), got {}", self.bearing),
            });
        }
        Ok(())
    }
}

impl From<Waypoint> for Viewport {
    fn from(wp: Waypoint) -> Self {
        Self {
            center_x: wp.x,
            center_y: wp.y,
            scale: wp.scale,
            bearing: wp.bearing,
            max_orbit: wp.max_orbit,
        }
    }
}

impl From<Viewport> for Waypoint {
    fn from(vp: Viewport) -> Self {
        Self {
            x: vp.center_x,
            y: vp.center_y,
            scale: vp.scale,
            bearing: vp.bearing,
            max_orbit: vp.max_orbit,
        }
    }
}

/// Pixel → plane transform for one image size, with the rotation
/// precomputed.
///
/// The pixel offset from the image centre is scaled, rotated about the plane
/// origin, and only then translated by the viewport centre. Image y grows
/// downward while plane y grows upward.
#[derive(Debug, Clone, Copy)]
pub struct PlaneMapping {
    half_w: f64,
    half_h: f64,
    scale: f64,
    center_x: f64,
    center_y: f64,
    rotation: Option<(f64, f64)>,
}

impl PlaneMapping {
    pub fn new(viewport: &Viewport, width: u32, height: u32) -> Self {
        let rotation = (viewport.bearing != 0).then(|| {
            let rad = to_radians(viewport.bearing);
            (rad.cos(), rad.sin())
        });
        Self {
            half_w: width as f64 / 2.0,
            half_h: height as f64 / 2.0,
            scale: viewport.scale,
            center_x: viewport.center_x,
            center_y: viewport.center_y,
            rotation,
        }
    }

    #[inline]
    pub fn to_plane(&self, px: f64, py: f64) -> (f64, f64) {
        let mut x = (px - self.half_w) / self.scale;
        let mut y = (self.half_h - py) / self.scale;
        if let Some((cos, sin)) = self.rotation {
            (x, y) = (x * cos - y * sin, x * sin + y * cos);
        }
        (x + self.center_x, y + self.center_y)
    }
}

#[inline]
fn rotate(x: f64, y: f64, radians: f64) -> (f64, f64) {
    let (sin, cos) = radians.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

#[inline]
fn to_radians(degrees: i32) -> f64 {
    PI * degrees as f64 / 180.0
}
