//! Pasted object layer
//!
//! A [`Composite`] is the object cut out of the source, with its opacity,
//! placed at an origin in target coordinates. It is drawn over the target
//! with [`Composite::flatten`].

use crate::error::MattingResult;
use splice_core::{Mask, Point, Raster, Rect, Rgb, RgbRaster};

/// Object pixels and opacity placed over the target
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    /// Object colors
    pub rgb: RgbRaster,
    /// Opacity, 0 transparent to 255 opaque
    pub alpha: Raster<u8>,
    /// Position of the top-left pixel in target coordinates
    pub origin: Point,
}

impl Composite {
    /// Build a layer from colors and opacity
    ///
    /// # Errors
    ///
    /// Returns an error if `rgb` and `alpha` differ in size.
    pub fn new(rgb: RgbRaster, alpha: Raster<u8>, origin: Point) -> MattingResult<Self> {
        rgb.check_same_size(&alpha)?;
        Ok(Self { rgb, alpha, origin })
    }

    /// Hard-edged layer: opaque on the mask, transparent elsewhere
    ///
    /// # Errors
    ///
    /// Returns an error if `rgb` and `mask` differ in size.
    pub fn from_mask(rgb: RgbRaster, mask: &Mask, origin: Point) -> MattingResult<Self> {
        let alpha = mask.map(|v| if v != 0 { 255 } else { 0 });
        Self::new(rgb, alpha, origin)
    }

    /// Area covered in target coordinates
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.rgb.dimensions();
        Rect::new_unchecked(self.origin.x, self.origin.y, w as i32, h as i32)
    }

    /// Replace the pixels under `region` with `pixels`, fully opaque
    ///
    /// # Errors
    ///
    /// Returns an error if the rasters differ in size from the layer.
    pub fn overlay(&mut self, pixels: &RgbRaster, region: &Mask) -> MattingResult<()> {
        self.rgb.check_same_size(pixels)?;
        self.rgb.check_same_size(region)?;
        for (x, y, v) in region.enumerate() {
            if v != 0 {
                self.rgb.set_pixel_unchecked(x, y, pixels.get_pixel_unchecked(x, y));
                self.alpha.set_pixel_unchecked(x, y, 255);
            }
        }
        Ok(())
    }

    /// Draw the layer over `target`
    ///
    /// Pixels falling outside the target are dropped.
    pub fn flatten(&self, target: &RgbRaster) -> RgbRaster {
        let mut out = target.clone();
        for (x, y, a) in self.alpha.enumerate() {
            if a == 0 {
                continue;
            }
            let p = Point::new(self.origin.x + x as i32, self.origin.y + y as i32);
            let Some(under) = out.get(p) else {
                continue;
            };
            let over = self.rgb.get_pixel_unchecked(x, y);
            out.put(p, mix(over, under, a));
        }
        out
    }
}

/// `over` at opacity `a` on top of `under`, rounded
fn mix(over: Rgb, under: Rgb, a: u8) -> Rgb {
    let a = a as u32;
    let blend = |o: u8, u: u8| ((o as u32 * a + u as u32 * (255 - a) + 127) / 255) as u8;
    Rgb::new(
        blend(over.r, under.r),
        blend(over.g, under.g),
        blend(over.b, under.b),
    )
}

/// The part of `target` lying under a source-frame rectangle
///
/// Source pixel `(x, y)` sits on target pixel `(x + offset.x, y + offset.y)`;
/// target pixels outside the image read as black.
///
/// # Errors
///
/// Returns an error if `frame` is empty.
pub fn aligned_target(target: &RgbRaster, frame: Rect, offset: Point) -> MattingResult<RgbRaster> {
    let shifted = Rect::new_unchecked(frame.x + offset.x, frame.y + offset.y, frame.w, frame.h);
    Ok(target.crop(shifted)?)
}
