/// Count the iterations of `z ← z² + c` before the orbit of `c = cx + cy·i`
/// leaves the radius-2 disc.
///
/// The returned value is the 0-based iteration on which `|z|² > 4` was first
/// observed. If the orbit stays bounded for `max_orbit` iterations the cap
/// itself is returned, which callers treat as "inside the set".
#[inline]
pub fn compute_orbit(cx: f64, cy: f64, max_orbit: u32) -> u32 {
    let (mut zx, mut zy) = (0.0_f64, 0.0_f64);
    let (mut zx2, mut zy2) = (0.0_f64, 0.0_f64);

    for orbit in 0..max_orbit {
        // z² = (zx² − zy²) + 2·zx·zy·i
        zy = 2.0 * zx * zy + cy;
        zx = zx2 - zy2 + cx;
        zx2 = zx * zx;
        zy2 = zy * zy;
        if zx2 + zy2 > 4.0 {
            return orbit;
        }
    }

    max_orbit
}
