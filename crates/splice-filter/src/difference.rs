//! Difference fields between aligned images
//!
//! Per-pixel measures of how much two images disagree, used as the seam
//! cost when routing a boundary.

use splice_core::{Raster, RgbRaster};
use tracing::warn;

/// Per-pixel L2 RGB distance, truncated to an integer and saturated at 255
///
/// On a size mismatch logs a warning and returns zeros of `source`'s size.
pub fn color_difference(source: &RgbRaster, target: &RgbRaster) -> Raster<u8> {
    match source.zip_map(target, |a, b| a.distance(b).min(255.0) as u8) {
        Ok(d) => d,
        Err(e) => {
            warn!(%e, "color difference of mismatched images");
            Raster::new_like(source)
        }
    }
}

/// Gradient magnitude of a gray raster
///
/// Central differences halved in the interior, one-sided differences halved
/// on the first and last row/column. The magnitude is scaled by 1/sqrt(2)
/// so it stays within 0..=255, then truncated.
pub fn gradient_magnitude(gray: &Raster<u8>) -> Raster<u8> {
    let (w, h) = gray.dimensions();
    let at = |x: u32, y: u32| gray.get_pixel_unchecked(x, y) as f64;

    let half = |lo: f64, hi: f64| (hi - lo) / 2.0;

    let mut out = Raster::new_like(gray);
    for y in 0..h {
        for x in 0..w {
            let dx = if w < 2 {
                0.0
            } else if x == 0 {
                half(at(0, y), at(1, y))
            } else if x == w - 1 {
                half(at(x - 1, y), at(x, y))
            } else {
                half(at(x - 1, y), at(x + 1, y))
            };
            let dy = if h < 2 {
                0.0
            } else if y == 0 {
                half(at(x, 0), at(x, 1))
            } else if y == h - 1 {
                half(at(x, y - 1), at(x, y))
            } else {
                half(at(x, y - 1), at(x, y + 1))
            };
            let mag = (dx * dx + dy * dy).sqrt() / std::f64::consts::SQRT_2;
            out.set_pixel_unchecked(x, y, mag.min(255.0) as u8);
        }
    }
    out
}
