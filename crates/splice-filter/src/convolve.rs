//! Convolution and mask feathering
//!
//! All convolutions treat pixels outside the raster as zero.

use crate::{FilterError, FilterResult, Kernel};
use splice_core::{FloatRaster, Mask, Raster, Rect};

/// Default Gaussian standard deviation for feathering
pub const DEFAULT_FEATHER_SIGMA: f32 = 4.0;

/// Default number of zero pixels added around a mask before feathering
pub const DEFAULT_FEATHER_PADDING: u32 = 50;

/// Options for [`feather`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatherOptions {
    /// Gaussian standard deviation; sets the width of the soft ring
    pub sigma: f32,
    /// Zero border added before blurring and cropped afterwards
    pub padding: u32,
}

impl Default for FeatherOptions {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_FEATHER_SIGMA,
            padding: DEFAULT_FEATHER_PADDING,
        }
    }
}

impl FeatherOptions {
    /// Set the Gaussian standard deviation
    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the zero padding
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }
}

/// Convolve a float raster with a 2D kernel.
///
/// Out-of-raster pixels contribute zero.
pub fn convolve(input: &FloatRaster, kernel: &Kernel) -> FloatRaster {
    let (w, h) = input.dimensions();
    let (kw, kh) = (kernel.width() as i32, kernel.height() as i32);
    let (kcx, kcy) = (kernel.center_x() as i32, kernel.center_y() as i32);
    let kdata = kernel.data();

    let mut out = FloatRaster::new_like(input);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let mut sum = 0.0f32;
            for ky in 0..kh {
                let sy = y + ky - kcy;
                if sy < 0 || sy >= h as i32 {
                    continue;
                }
                for kx in 0..kw {
                    let sx = x + kx - kcx;
                    if sx < 0 || sx >= w as i32 {
                        continue;
                    }
                    sum += input.get_pixel_unchecked(sx as u32, sy as u32)
                        * kdata[(ky * kw + kx) as usize];
                }
            }
            out.set_pixel_unchecked(x as u32, y as u32, sum);
        }
    }
    out
}

/// Separable convolution: `kernel_x` along rows, then `kernel_y` along columns.
///
/// # Errors
///
/// Returns [`FilterError::InvalidKernel`] unless `kernel_x` has height 1 and
/// `kernel_y` has width 1.
pub fn convolve_sep(
    input: &FloatRaster,
    kernel_x: &Kernel,
    kernel_y: &Kernel,
) -> FilterResult<FloatRaster> {
    if kernel_x.height() != 1 || kernel_y.width() != 1 {
        return Err(FilterError::InvalidKernel(format!(
            "separable kernels must be 1-D, got {}x{} and {}x{}",
            kernel_x.width(),
            kernel_x.height(),
            kernel_y.width(),
            kernel_y.height()
        )));
    }
    let tmp = convolve(input, kernel_x);
    Ok(convolve(&tmp, kernel_y))
}

/// Soften the edge of a mask into an alpha plane
///
/// The mask is padded with zeros, blurred with a separable Gaussian of the
/// given sigma and cropped back, so set pixels far from the edge end up at
/// 255 and the edge becomes a ring of partial opacity.
///
/// # Arguments
///
/// * `mask` - Binary mask (nonzero = opaque)
/// * `options` - Gaussian sigma and padding
///
/// # Returns
///
/// An alpha raster of the mask's size with values in 0..=255.
pub fn feather(mask: &Mask, options: &FeatherOptions) -> FilterResult<Raster<u8>> {
    let size = Kernel::gaussian_size(options.sigma);
    let kx = Kernel::gaussian_1d(size, options.sigma)?;
    let ky = kx.transposed();

    let (w, h) = mask.dimensions();
    let pad = options.padding;
    let mut padded = FloatRaster::new(w + 2 * pad, h + 2 * pad)?;
    for (x, y, v) in mask.enumerate() {
        if v != 0 {
            padded.set_pixel_unchecked(x + pad, y + pad, 1.0);
        }
    }

    let blurred = convolve_sep(&padded, &kx, &ky)?;
    let inner = blurred.crop(Rect::new_unchecked(pad as i32, pad as i32, w as i32, h as i32))?;
    Ok(inner.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image() -> FloatRaster {
        let mut r = FloatRaster::new(5, 5).unwrap();
        r.set_pixel_unchecked(2, 2, 1.0);
        r
    }

    #[test]
    fn test_convolve_impulse() {
        let k = Kernel::from_slice(3, 3, &[0.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 0.0]).unwrap();
        let out = convolve(&create_test_image(), &k);
        assert_eq!(out.get_pixel(2, 2), Some(2.0));
        assert_eq!(out.get_pixel(1, 2), Some(1.0));
        assert_eq!(out.get_pixel(1, 1), Some(0.0));
    }

    #[test]
    fn test_separable_matches_2d() {
        let kx = Kernel::gaussian_1d(5, 1.0).unwrap();
        let ky = kx.transposed();
        let k2 = Kernel::gaussian(5, 1.0).unwrap();
        let input = create_test_image();
        let a = convolve_sep(&input, &kx, &ky).unwrap();
        let b = convolve(&input, &k2);
        for (x, y, v) in a.enumerate() {
            assert!((v - b.get_pixel_unchecked(x, y)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_convolve_sep_rejects_2d() {
        let k = Kernel::gaussian(3, 1.0).unwrap();
        assert!(convolve_sep(&create_test_image(), &k, &k).is_err());
    }

    #[test]
    fn test_zero_border() {
        // A constant field darkens near the border
        let r = FloatRaster::filled(9, 9, 1.0).unwrap();
        let k = Kernel::gaussian(3, 1.0).unwrap();
        let out = convolve(&r, &k);
        assert!((out.get_pixel_unchecked(4, 4) - 1.0).abs() < 1e-5);
        assert!(out.get_pixel_unchecked(0, 0) < 0.6);
    }

    #[test]
    fn test_feather_ring() {
        let mut mask = Mask::new(60, 60).unwrap();
        for y in 10..50 {
            for x in 10..50 {
                mask.set_pixel_unchecked(x, y, 1);
            }
        }
        let alpha = feather(&mask, &FeatherOptions::default()).unwrap();
        assert_eq!(alpha.get_pixel(30, 30), Some(255));
        assert_eq!(alpha.get_pixel(0, 0), Some(0));
        let edge = alpha.get_pixel_unchecked(10, 30);
        assert!(edge > 64 && edge < 192);
    }
}
