//! Rank filters on palette-indexed rasters

use crate::{FilterError, FilterResult};
use splice_core::Raster;

/// Replace every pixel by the most frequent value in its window
///
/// The `size`×`size` window is centered on the pixel and clipped at the
/// raster border. Ties resolve to the smallest value, which makes the
/// filter deterministic on palette indices.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameters`] if `size` is even or zero.
pub fn mode_filter(indexed: &Raster<u8>, size: u32) -> FilterResult<Raster<u8>> {
    if size == 0 || size % 2 == 0 {
        return Err(FilterError::InvalidParameters(format!(
            "window size must be odd, got {size}"
        )));
    }
    let (w, h) = indexed.dimensions();
    let half = size / 2;
    let mut out = Raster::new_like(indexed);
    let mut hist = [0u32; 256];

    for y in 0..h {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half).min(w - 1);

            hist.fill(0);
            for wy in y0..=y1 {
                for wx in x0..=x1 {
                    hist[indexed.get_pixel_unchecked(wx, wy) as usize] += 1;
                }
            }
            let mut best = 0usize;
            for (v, &n) in hist.iter().enumerate() {
                if n > hist[best] {
                    best = v;
                }
            }
            out.set_pixel_unchecked(x, y, best as u8);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_removes_speckle() {
        let mut r = Raster::filled(5, 5, 2u8).unwrap();
        r.set_pixel_unchecked(2, 2, 7);
        let out = mode_filter(&r, 3).unwrap();
        assert!(out.data().iter().all(|&v| v == 2));
    }

    #[test]
    fn test_mode_ties_to_smallest() {
        // Corner window holds two 4s and two 1s
        let r = Raster::from_vec(2, 2, vec![4u8, 1, 1, 4]).unwrap();
        let out = mode_filter(&r, 3).unwrap();
        assert_eq!(out.get_pixel(0, 0), Some(1));
    }

    #[test]
    fn test_mode_size_one_is_identity() {
        let r = Raster::from_vec(3, 1, vec![1u8, 2, 3]).unwrap();
        assert_eq!(mode_filter(&r, 1).unwrap(), r);
        assert!(mode_filter(&r, 2).is_err());
    }
}
