//! RGB pixels and color images

use crate::error::Result;
use crate::raster::Raster;

/// Channel indices for [`Rgb::channels`]
pub mod channel {
    /// Red channel
    pub const RED: usize = 0;
    /// Green channel
    pub const GREEN: usize = 1;
    /// Blue channel
    pub const BLUE: usize = 2;
    /// Number of color channels
    pub const COUNT: usize = 3;
}

/// An 8-bit-per-channel RGB pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Black
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// White
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Create a new RGB pixel
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a gray pixel
    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v)
    }

    /// Channels as `[r, g, b]`
    #[inline]
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Build from `[r, g, b]`
    #[inline]
    pub fn from_channels(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    /// Mean of the three channels
    #[inline]
    pub fn intensity(self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0
    }

    /// L2 distance in RGB space
    #[inline]
    pub fn distance(self, other: Rgb) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

/// A color image
pub type RgbRaster = Raster<Rgb>;

impl Raster<Rgb> {
    /// Extract one channel as an 8-bit plane
    ///
    /// `c` is one of the [`channel`] constants.
    pub fn channel_plane(&self, c: usize) -> Raster<u8> {
        self.map(|p| p.channels()[c])
    }

    /// Reassemble a color image from three planes
    ///
    /// # Errors
    ///
    /// Returns an error if the planes differ in size.
    pub fn from_planes(planes: &[Raster<u8>; 3]) -> Result<Self> {
        let rg = planes[0].zip_map(&planes[1], |r, g| (r, g))?;
        rg.zip_map(&planes[2], |(r, g), b| Rgb::new(r, g, b))
    }

    /// Build from an `image` crate RGB buffer
    ///
    /// # Errors
    ///
    /// Returns an error if the image has a zero dimension.
    pub fn from_image(img: &image::RgbImage) -> Result<Self> {
        let data = img.pixels().map(|p| Rgb::from_channels(p.0)).collect();
        Self::from_vec(img.width(), img.height(), data)
    }

    /// Convert to an `image` crate RGB buffer
    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width(), self.height(), |x, y| {
            image::Rgb(self.get_pixel_unchecked(x, y).channels())
        })
    }
}
