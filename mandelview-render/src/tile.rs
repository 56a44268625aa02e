use crate::framebuffer::Rect;

/// Split a `width × height` image into `count` full-width horizontal bands.
///
/// Bands have equal height except the last, which takes the remainder. The
/// band count is capped at the number of rows so no band is empty. An empty
/// image yields no bands.
pub fn build_bands(width: u32, height: u32, count: usize) -> Vec<Rect> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let count = count.clamp(1, height as usize) as u32;
    let band_height = height / count;
    (0..count)
        .map(|i| {
            let top = i * band_height;
            let rows = if i == count - 1 {
                height - top
            } else {
                band_height
            };
            Rect::new(0, top as i32, width, rows)
        })
        .collect()
}

/// The regions left without valid pixels after the image content moved by
/// `(-dx, +dy)`.
///
/// A non-zero `dx` exposes a full-height column strip on the right (`dx > 0`)
/// or left (`dx < 0`); a non-zero `dy` exposes a full-width row strip at the
/// top (`dy > 0`) or bottom (`dy < 0`). When both are non-zero the strips
/// share a corner. Strips are clipped to the image.
pub fn exposed_strips(dx: i32, dy: i32, width: u32, height: u32) -> Vec<Rect> {
    let image = Rect::of_size(width, height);
    let mut strips = Vec::with_capacity(2);

    if dx != 0 {
        let x = if dx < 0 {
            0
        } else {
            (width as i64 - dx as i64).max(i32::MIN as i64) as i32
        };
        strips.push(Rect::new(x, 0, dx.unsigned_abs(), height));
    }
    if dy != 0 {
        let y = if dy > 0 {
            0
        } else {
            (height as i64 + dy as i64).max(i32::MIN as i64) as i32
        };
        strips.push(Rect::new(0, y, width, dy.unsigned_abs()));
    }

    strips
        .iter()
        .filter_map(|strip| strip.intersect(&image))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(bands: &[Rect], width: u32, height: u32) {
        let mut covered = vec![false; (width * height) as usize];
        for band in bands {
            for py in band.y..band.bottom() {
                for px in band.x..band.right() {
                    let idx = py as usize * width as usize + px as usize;
                    assert!(!covered[idx], "pixel ({px}, {py}) covered twice");
                    covered[idx] = true;
                }
            }
        }
        assert!(covered.iter().all(|&c| c), "all pixels must be covered");
    }

    #[test]
    fn bands_cover_image_without_overlap() {
        for (w, h, n) in [(200, 150, 4), (17, 9, 3), (5, 7, 7), (8, 100, 6), (3, 1, 1)] {
            let bands = build_bands(w, h, n);
            assert_eq!(bands.len(), n);
            assert_exact_cover(&bands, w, h);
        }
    }

    #[test]
    fn last_band_takes_remainder() {
        let bands = build_bands(10, 10, 3);
        assert_eq!(
            bands.iter().map(|b| b.height).collect::<Vec<_>>(),
            vec![3, 3, 4]
        );
    }

    #[test]
    fn band_count_is_capped_by_rows() {
        let bands = build_bands(10, 3, 16);
        assert_eq!(bands.len(), 3);
        assert_exact_cover(&bands, 10, 3);
        assert_eq!(build_bands(10, 10, 0).len(), 1);
    }

    #[test]
    fn empty_image_has_no_bands() {
        assert!(build_bands(0, 10, 4).is_empty());
        assert!(build_bands(10, 0, 4).is_empty());
    }

    #[test]
    fn horizontal_scroll_exposes_leading_column() {
        assert_eq!(exposed_strips(5, 0, 100, 50), vec![Rect::new(95, 0, 5, 50)]);
        assert_eq!(exposed_strips(-5, 0, 100, 50), vec![Rect::new(0, 0, 5, 50)]);
    }

    #[test]
    fn vertical_scroll_exposes_leading_row() {
        assert_eq!(exposed_strips(0, 4, 100, 50), vec![Rect::new(0, 0, 100, 4)]);
        assert_eq!(exposed_strips(0, -4, 100, 50), vec![Rect::new(0, 46, 100, 4)]);
    }

    #[test]
    fn diagonal_scroll_strips_share_a_corner() {
        let strips = exposed_strips(3, -2, 20, 10);
        assert_eq!(strips, vec![Rect::new(17, 0, 3, 10), Rect::new(0, 8, 20, 2)]);
        assert_eq!(
            strips[0].intersect(&strips[1]),
            Some(Rect::new(17, 8, 3, 2))
        );
    }

    #[test]
    fn oversized_scroll_is_clipped_to_image() {
        assert_eq!(exposed_strips(250, 0, 100, 50), vec![Rect::new(0, 0, 100, 50)]);
        assert_eq!(exposed_strips(0, -80, 100, 50), vec![Rect::new(0, 0, 100, 50)]);
    }

    #[test]
    fn no_scroll_exposes_nothing() {
        assert!(exposed_strips(0, 0, 100, 50).is_empty());
        assert!(exposed_strips(4, 4, 0, 0).is_empty());
    }
}
