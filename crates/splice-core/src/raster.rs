//! Raster - the 2D pixel container
//!
//! A `Raster<T>` is a width×height grid stored in row-major order. The same
//! container holds binary masks (`u8` with values 0/1), label grids (`u32`),
//! scalar fields (`f32`) and color images ([`Rgb`](crate::Rgb)).
//!
//! Pure functions take rasters by reference; mutation is explicit through
//! [`Raster::set_pixel`] or [`Raster::data_mut`].

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};

/// A width×height grid of pixel values
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

/// Binary raster: 1 marks object pixels, 0 everything else
pub type Mask = Raster<u8>;

/// Integer label raster: 0 is background, 1..N are region ids
pub type LabelGrid = Raster<u32>;

/// Scalar field raster
pub type FloatRaster = Raster<f32>;

fn check_dimensions(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    Ok(width as usize * height as usize)
}

impl<T: Copy + Default> Raster<T> {
    /// Create a raster filled with `T::default()`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, T::default())
    }

    /// Create a default-filled raster with the same dimensions as `other`
    pub fn new_like<U>(other: &Raster<U>) -> Self {
        Self {
            width: other.width,
            height: other.height,
            data: vec![T::default(); other.data.len()],
        }
    }

    /// Copy out the part of this raster covered by `rect`
    ///
    /// Parts of `rect` outside the raster are filled with `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns an error if `rect` is empty.
    pub fn crop(&self, rect: Rect) -> Result<Self> {
        if rect.w <= 0 || rect.h <= 0 {
            return Err(Error::InvalidDimension {
                width: rect.w.max(0) as u32,
                height: rect.h.max(0) as u32,
            });
        }
        let mut out = Self::new(rect.w as u32, rect.h as u32)?;
        out.paste(self, -rect.x, -rect.y);
        Ok(out)
    }
}

impl<T: Copy> Raster<T> {
    /// Create a raster filled with `value`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either dimension is zero.
    pub fn filled(width: u32, height: u32, value: T) -> Result<Self> {
        let len = check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Wrap an existing row-major buffer
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or the buffer length is
    /// not `width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        let len = check_dimensions(width, height)?;
        if data.len() != len {
            return Err(Error::BufferLength {
                expected: len,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Get the raster width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the raster height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; rasters have at least one pixel
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major pixel data
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable row-major pixel data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the raster and return its buffer
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Check whether a signed position lies inside the raster
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Linear index of `(x, y)`
    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a pixel value, or `None` outside the raster
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<T> {
        if x < self.width && y < self.height {
            Some(self.data[self.index_of(x, y)])
        } else {
            None
        }
    }

    /// Get a pixel value without checking the coordinates against the width.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> T {
        self.data[self.index_of(x, y)]
    }

    /// Get a pixel at a signed position, or `None` outside the raster
    #[inline]
    pub fn get(&self, p: Point) -> Option<T> {
        if self.contains(p.x, p.y) {
            Some(self.data[self.index_of(p.x as u32, p.y as u32)])
        } else {
            None
        }
    }

    /// Set a pixel value
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] outside the raster.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: T) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: self.index_of(x.min(self.width), y),
                len: self.data.len(),
            });
        }
        let idx = self.index_of(x, y);
        self.data[idx] = value;
        Ok(())
    }

    /// Set a pixel value without checking the coordinates against the width.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, value: T) {
        let idx = self.index_of(x, y);
        self.data[idx] = value;
    }

    /// Set a pixel at a signed position; positions outside are ignored.
    ///
    /// Returns whether the pixel was written.
    #[inline]
    pub fn put(&mut self, p: Point, value: T) -> bool {
        if self.contains(p.x, p.y) {
            let idx = self.index_of(p.x as u32, p.y as u32);
            self.data[idx] = value;
            true
        } else {
            false
        }
    }

    /// Fill every pixel with `value`
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// Check whether two rasters have identical dimensions
    #[inline]
    pub fn same_size<U>(&self, other: &Raster<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Require identical dimensions
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] when sizes differ.
    pub fn check_same_size<U>(&self, other: &Raster<U>) -> Result<()> {
        if self.same_size(other) {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (other.width, other.height),
            })
        }
    }

    /// Apply `f` to every pixel
    pub fn map<U, F: Fn(T) -> U>(&self, f: F) -> Raster<U> {
        Raster {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two same-sized rasters pixel by pixel
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] when sizes differ.
    pub fn zip_map<U: Copy, V, F: Fn(T, U) -> V>(&self, other: &Raster<U>, f: F) -> Result<Raster<V>> {
        self.check_same_size(other)?;
        Ok(Raster {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Copy `src` into this raster with its origin at `(x, y)`, clipping
    /// whatever falls outside.
    pub fn paste(&mut self, src: &Raster<T>, x: i32, y: i32) {
        for sy in 0..src.height as i32 {
            let dy = sy + y;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width as i32 {
                let dx = sx + x;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let v = src.get_pixel_unchecked(sx as u32, sy as u32);
                self.set_pixel_unchecked(dx as u32, dy as u32, v);
            }
        }
    }

    /// Iterate over `(x, y, value)` in row-major order
    pub fn enumerate(&self) -> impl Iterator<Item = (u32, u32, T)> + '_ {
        let w = self.width as usize;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| ((i % w) as u32, (i / w) as u32, v))
    }
}

impl Raster<u8> {
    /// Check whether a signed position is inside the raster and nonzero.
    #[inline]
    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.contains(x, y) && self.data[self.index_of(x as u32, y as u32)] != 0
    }

    /// Count nonzero pixels
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Check whether no pixel is set
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Build from an 8-bit grayscale image
    ///
    /// # Errors
    ///
    /// Returns an error if the image has a zero dimension.
    pub fn from_gray_image(img: &image::GrayImage) -> Result<Self> {
        Self::from_vec(img.width(), img.height(), img.as_raw().clone())
    }

    /// Convert to an 8-bit grayscale image
    pub fn to_gray_image(&self) -> image::GrayImage {
        // Buffer length always equals width * height
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.get_pixel_unchecked(x, y)])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_dimensions() {
        let r: Raster<u8> = Raster::new(4, 3).unwrap();
        assert_eq!(r.dimensions(), (4, 3));
        assert_eq!(r.len(), 12);
        assert!(r.is_blank());
        assert!(Raster::<u8>::new(0, 3).is_err());
    }

    #[test]
    fn test_get_set_pixel() {
        let mut r: Raster<u32> = Raster::new(5, 5).unwrap();
        r.set_pixel(2, 3, 7).unwrap();
        assert_eq!(r.get_pixel(2, 3), Some(7));
        assert_eq!(r.get_pixel(5, 0), None);
        assert!(r.set_pixel(5, 0, 1).is_err());
        assert_eq!(r.get(Point::new(-1, 0)), None);
        assert!(!r.put(Point::new(0, -1), 3));
    }

    #[test]
    fn test_from_vec_length() {
        assert!(Raster::from_vec(2, 2, vec![0u8; 3]).is_err());
        let r = Raster::from_vec(2, 2, vec![1u8, 0, 0, 1]).unwrap();
        assert_eq!(r.count_set(), 2);
        assert!(r.is_set(1, 1));
        assert!(!r.is_set(2, 1));
    }

    #[test]
    fn test_crop_and_paste() {
        let mut r: Raster<u8> = Raster::new(6, 6).unwrap();
        r.set_pixel(3, 3, 1).unwrap();
        let c = r.crop(Rect::new_unchecked(2, 2, 3, 3)).unwrap();
        assert_eq!(c.dimensions(), (3, 3));
        assert_eq!(c.get_pixel(1, 1), Some(1));

        // Partially outside: missing parts are default
        let c = r.crop(Rect::new_unchecked(-2, -2, 4, 4)).unwrap();
        assert!(c.is_blank());

        let mut back: Raster<u8> = Raster::new(6, 6).unwrap();
        back.paste(&c, 5, 5);
        assert!(back.is_blank());
    }

    #[test]
    fn test_zip_map_mismatch() {
        let a: Raster<u8> = Raster::new(2, 2).unwrap();
        let b: Raster<u8> = Raster::new(3, 2).unwrap();
        assert!(a.zip_map(&b, |x, y| x ^ y).is_err());
    }

    #[test]
    fn test_check_same_size_across_types() {
        let mask: Raster<u8> = Raster::new(4, 3).unwrap();
        let field: Raster<f64> = Raster::new(4, 3).unwrap();
        let labels: Raster<u32> = Raster::new(5, 3).unwrap();
        assert!(mask.check_same_size(&field).is_ok());
        match mask.check_same_size(&labels) {
            Err(Error::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, (4, 3));
                assert_eq!(actual, (5, 3));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_gray_image_roundtrip() {
        let r = Raster::from_vec(3, 1, vec![0u8, 128, 255]).unwrap();
        let img = r.to_gray_image();
        assert_eq!(img.get_pixel(1, 0).0, [128]);
        let back = Raster::from_gray_image(&img).unwrap();
        assert_eq!(back, r);
    }
}
