//! splice-test - Regression test framework for splice
//!
//! This crate provides a small regression harness shared by the
//! `tests/*_reg.rs` programs of every crate, plus synthetic fixtures in
//! place of on-disk test images.
//!
//! # Usage
//!
//! ```
//! use splice_test::RegParams;
//!
//! let mut rp = RegParams::new("example");
//! rp.compare_values(4.0, 2.0 + 2.0, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use splice_core::{Mask, Rgb, RgbRaster};

/// Filled disk of `radius` centered at `(cx, cy)` in a `width`×`height` mask
///
/// # Errors
///
/// Returns an error if either dimension is zero.
pub fn disk_mask(width: u32, height: u32, cx: i32, cy: i32, radius: i32) -> TestResult<Mask> {
    let mut mask = Mask::new(width, height)?;
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= radius * radius {
                mask.set_pixel_unchecked(x as u32, y as u32, 1);
            }
        }
    }
    Ok(mask)
}

/// Filled axis-aligned rectangle in a `width`×`height` mask
///
/// # Errors
///
/// Returns an error if either dimension is zero.
pub fn rect_mask(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> TestResult<Mask> {
    let mut mask = Mask::new(width, height)?;
    for y in y0..(y0 + h).min(height) {
        for x in x0..(x0 + w).min(width) {
            mask.set_pixel_unchecked(x, y, 1);
        }
    }
    Ok(mask)
}

/// Uniform color image
///
/// # Errors
///
/// Returns an error if either dimension is zero.
pub fn solid_image(width: u32, height: u32, color: Rgb) -> TestResult<RgbRaster> {
    Ok(RgbRaster::filled(width, height, color)?)
}

/// Image with a horizontal gray ramp from 0 at the left to 255 at the right
///
/// # Errors
///
/// Returns an error if either dimension is zero.
pub fn ramp_image(width: u32, height: u32) -> TestResult<RgbRaster> {
    let mut img = RgbRaster::new(width, height)?;
    let span = (width.max(2) - 1) as f64;
    for y in 0..height {
        for x in 0..width {
            let v = (x as f64 * 255.0 / span).round() as u8;
            img.set_pixel_unchecked(x, y, Rgb::gray(v));
        }
    }
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_mask() {
        let m = disk_mask(10, 10, 5, 5, 3).unwrap();
        assert_eq!(m.get_pixel(5, 5), Some(1));
        assert_eq!(m.get_pixel(5, 8), Some(1));
        assert_eq!(m.get_pixel(8, 8), Some(0));
        assert_eq!(m.count_set(), 29);
    }

    #[test]
    fn test_rect_mask_clips() {
        let m = rect_mask(4, 4, 2, 2, 5, 5).unwrap();
        assert_eq!(m.count_set(), 4);
    }

    #[test]
    fn test_ramp_image() {
        let img = ramp_image(3, 1).unwrap();
        assert_eq!(img.get_pixel(0, 0), Some(Rgb::gray(0)));
        assert_eq!(img.get_pixel(1, 0), Some(Rgb::gray(128)));
        assert_eq!(img.get_pixel(2, 0), Some(Rgb::gray(255)));
    }
}
