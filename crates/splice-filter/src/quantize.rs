//! Palette quantization in L*a*b*

use crate::{FilterError, FilterResult};
use splice_core::{Lab, Raster, Rgb, RgbRaster, rgb_to_lab};
use std::collections::HashMap;

/// Map every pixel to its nearest palette color in L*a*b*
///
/// # Arguments
///
/// * `image` - Color image
/// * `palette` - Between 1 and 255 colors
///
/// # Returns
///
/// A raster of palette indices offset by one: palette entry `i` is written
/// as `i + 1`, leaving 0 free for "no color". Equal distances resolve to
/// the earlier palette entry.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameters`] for an empty palette or one
/// with more than 255 entries.
pub fn quantize_lab(image: &RgbRaster, palette: &[Rgb]) -> FilterResult<Raster<u8>> {
    if palette.is_empty() || palette.len() > 255 {
        return Err(FilterError::InvalidParameters(format!(
            "palette must hold 1..=255 colors, got {}",
            palette.len()
        )));
    }
    let labs: Vec<Lab> = palette.iter().map(|&c| rgb_to_lab(c)).collect();

    // Photographs repeat colors a lot
    let mut cache: HashMap<Rgb, u8> = HashMap::new();
    let nearest = |c: Rgb| -> u8 {
        let lab = rgb_to_lab(c);
        let mut best = 0usize;
        let mut best_d = f32::INFINITY;
        for (i, p) in labs.iter().enumerate() {
            let d = lab.distance_sq(*p);
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        (best + 1) as u8
    };

    let data = image
        .data()
        .iter()
        .map(|&c| *cache.entry(c).or_insert_with(|| nearest(c)))
        .collect();
    Ok(Raster::from_vec(image.width(), image.height(), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_nearest() {
        let palette = [Rgb::new(250, 0, 0), Rgb::new(0, 0, 250), Rgb::gray(128)];
        let mut img = RgbRaster::filled(3, 1, Rgb::new(200, 30, 20)).unwrap();
        img.set_pixel_unchecked(1, 0, Rgb::new(10, 20, 200));
        img.set_pixel_unchecked(2, 0, Rgb::gray(120));
        let q = quantize_lab(&img, &palette).unwrap();
        assert_eq!(q.data(), &[1, 2, 3]);
    }

    #[test]
    fn test_quantize_rejects_empty_palette() {
        let img = RgbRaster::filled(2, 2, Rgb::WHITE).unwrap();
        assert!(quantize_lab(&img, &[]).is_err());
    }
}
