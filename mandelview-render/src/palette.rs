use std::ops::Index;

/// The smallest palette [`create_palette`] will build.
pub const MIN_PALETTE_SIZE: usize = 2;

/// An 8-bit colour with an alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Colour written for points that never escape.
pub const BLACK: Rgba = Rgba::new(0, 0, 0, 0);

/// Per-channel weights applied to the palette's brightness ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorWeights {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ColorWeights {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

impl Default for ColorWeights {
    /// Cyan ramp.
    fn default() -> Self {
        Self::new(0.0, 1.0, 1.0)
    }
}

/// A fixed-length gradient indexed by escape count.
///
/// Palettes are immutable: changing the size means building a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgba>,
    weights: ColorWeights,
}

impl Palette {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The weights this palette was generated from.
    pub fn weights(&self) -> ColorWeights {
        self.weights
    }

    /// Colour for an escape count, wrapping around the palette.
    ///
    /// Escape counts equal to `max_orbit` get [`BLACK`].
    #[inline]
    pub fn color_for(&self, orbit: u32, max_orbit: u32) -> Rgba {
        if orbit == max_orbit {
            BLACK
        } else {
            self.colors[orbit as usize % self.colors.len()]
        }
    }

    /// A palette of the same weights with a different number of entries.
    pub fn resized(&self, count: usize) -> Self {
        create_palette(count, self.weights)
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }
}

impl Index<usize> for Palette {
    type Output = Rgba;

    fn index(&self, index: usize) -> &Rgba {
        &self.colors[index]
    }
}

/// Build a `count`-entry brightness ramp tinted by `weights`.
///
/// Entry `i` has intensity `0.1 + 0.9·i/count`, so only the in-set colour is
/// fully black. Channels are clamped to 255 and truncated; alpha is 0.
/// Counts below [`MIN_PALETTE_SIZE`] are raised to it.
pub fn create_palette(count: usize, weights: ColorWeights) -> Palette {
    let count = count.max(MIN_PALETTE_SIZE);
    let channel = |v: f64, weight: f64| (v * weight * 255.0).clamp(0.0, 255.0) as u8;
    let colors = (0..count)
        .map(|i| {
            let v = 0.1 + 0.9 * (i as f64 / count as f64);
            Rgba::new(
                channel(v, weights.r),
                channel(v, weights.g),
                channel(v, weights.b),
                0,
            )
        })
        .collect();
    Palette { colors, weights }
}
