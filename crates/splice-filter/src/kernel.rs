//! Convolution kernels
//!
//! Row-major float kernels with an explicit center. Gaussian kernels are
//! normalized to sum to 1 and always have an odd size.

use crate::{FilterError, FilterResult};

/// A 2D convolution kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Width of the kernel
    width: u32,
    /// Height of the kernel
    height: u32,
    /// X coordinate of the center
    cx: u32,
    /// Y coordinate of the center
    cy: u32,
    /// Kernel data (row-major order)
    data: Vec<f32>,
}

impl Kernel {
    /// Create a zero kernel with the center in the middle.
    pub fn new(width: u32, height: u32) -> FilterResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "kernel dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            data: vec![0.0; (width * height) as usize],
        })
    }

    /// Create a kernel from a slice of values in row-major order.
    pub fn from_slice(width: u32, height: u32, data: &[f32]) -> FilterResult<Self> {
        let mut kernel = Self::new(width, height)?;
        if data.len() != kernel.data.len() {
            return Err(FilterError::InvalidKernel(format!(
                "expected {} values, got {}",
                kernel.data.len(),
                data.len()
            )));
        }
        kernel.data.copy_from_slice(data);
        Ok(kernel)
    }

    /// Kernel size covering three standard deviations on each side
    ///
    /// Always odd: `2 * ceil(3 * sigma) + 1`.
    pub fn gaussian_size(sigma: f32) -> u32 {
        ((sigma * 3.0).ceil() as u32) * 2 + 1
    }

    /// Create a normalized 2D Gaussian kernel.
    ///
    /// # Arguments
    ///
    /// * `size` - Odd side length, at least 3
    /// * `sigma` - Standard deviation
    pub fn gaussian(size: u32, sigma: f32) -> FilterResult<Self> {
        let row = Self::gaussian_1d(size, sigma)?;
        let mut kernel = Self::new(size, size)?;
        for y in 0..size as usize {
            for x in 0..size as usize {
                kernel.data[y * size as usize + x] = row.data[x] * row.data[y];
            }
        }
        kernel.normalize();
        Ok(kernel)
    }

    /// Create a normalized horizontal Gaussian kernel of height 1.
    ///
    /// Use [`Kernel::transposed`] for the vertical pass.
    pub fn gaussian_1d(size: u32, sigma: f32) -> FilterResult<Self> {
        if size < 3 || size % 2 == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "gaussian size must be odd and >= 3, got {size}"
            )));
        }
        if sigma <= 0.0 || !sigma.is_finite() {
            return Err(FilterError::InvalidParameters(format!(
                "sigma must be positive, got {sigma}"
            )));
        }

        let half = (size / 2) as i32;
        let two_s2 = 2.0 * sigma as f64 * sigma as f64;
        // Accumulate in f64; f32 loses too much for wide kernels
        let values: Vec<f64> = (-half..=half)
            .map(|i| (-(i * i) as f64 / two_s2).exp())
            .collect();
        let sum: f64 = values.iter().sum();

        let mut kernel = Self::new(size, 1)?;
        for (dst, v) in kernel.data.iter_mut().zip(&values) {
            *dst = (v / sum) as f32;
        }
        Ok(kernel)
    }

    /// Get the kernel width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the kernel height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the center X coordinate.
    #[inline]
    pub fn center_x(&self) -> u32 {
        self.cx
    }

    /// Get the center Y coordinate.
    #[inline]
    pub fn center_y(&self) -> u32 {
        self.cy
    }

    /// Set the center coordinates.
    pub fn set_center(&mut self, cx: u32, cy: u32) -> FilterResult<()> {
        if cx >= self.width || cy >= self.height {
            return Err(FilterError::InvalidKernel(format!(
                "center ({cx}, {cy}) outside {}x{} kernel",
                self.width, self.height
            )));
        }
        self.cx = cx;
        self.cy = cy;
        Ok(())
    }

    /// Get the kernel data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get a value at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.data[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Set a value at (x, y). Out-of-range positions are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = value;
        }
    }

    /// Sum of all values
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Scale so the values sum to 1. A zero-sum kernel is left unchanged.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum.abs() > f32::EPSILON {
            for v in &mut self.data {
                *v /= sum;
            }
        }
    }

    /// The same kernel with rows and columns swapped
    pub fn transposed(&self) -> Self {
        let mut data = vec![0.0; self.data.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                data[(x * self.height + y) as usize] = self.data[(y * self.width + x) as usize];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cx: self.cy,
            cy: self.cx,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_size() {
        assert_eq!(Kernel::gaussian_size(4.0), 25);
        assert_eq!(Kernel::gaussian_size(1.0), 7);
        assert_eq!(Kernel::gaussian_size(0.5), 5);
    }

    #[test]
    fn test_gaussian_normalized_and_symmetric() {
        let k = Kernel::gaussian(7, 1.0).unwrap();
        assert!((k.sum() - 1.0).abs() < 1e-5);
        assert_eq!(k.center_x(), 3);
        assert_eq!(k.get(0, 3), k.get(6, 3));
        assert_eq!(k.get(3, 0), k.get(3, 6));
        let peak = k.get(3, 3).unwrap();
        assert!(k.data().iter().all(|&v| v <= peak));
    }

    #[test]
    fn test_gaussian_rejects_bad_sizes() {
        assert!(Kernel::gaussian(4, 1.0).is_err());
        assert!(Kernel::gaussian(1, 1.0).is_err());
        assert!(Kernel::gaussian_1d(5, 0.0).is_err());
    }

    #[test]
    fn test_transposed() {
        let k = Kernel::from_slice(3, 1, &[1.0, 2.0, 3.0]).unwrap();
        let t = k.transposed();
        assert_eq!(t.width(), 1);
        assert_eq!(t.height(), 3);
        assert_eq!(t.get(0, 2), Some(3.0));
        assert_eq!(t.center_y(), 1);
    }

    #[test]
    fn test_set_center() {
        let mut k = Kernel::new(3, 3).unwrap();
        assert!(k.set_center(2, 0).is_ok());
        assert!(k.set_center(3, 0).is_err());
        k.set(1, 1, 5.0);
        assert_eq!(k.get(1, 1), Some(5.0));
        assert_eq!(k.get(3, 1), None);
    }
}
