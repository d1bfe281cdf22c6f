//! Seam cost field and energy
//!
//! A seam is cheap where source and target differ by about the same amount
//! everywhere along it: the energy of a point set is the sum of squared
//! deviations of the per-pixel difference from its reference level `k`.

use crate::error::CutResult;
use splice_core::{FloatRaster, Point, Raster, RgbRaster};
use splice_filter::{color_difference, gradient_magnitude};

/// Per-pixel difference measure between source and target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeamMetric {
    /// L2 distance in RGB
    #[default]
    ColorDistance,
    /// Gradient magnitude of the difference image
    GradientMagnitude,
}

/// Difference values of two aligned images
#[derive(Debug, Clone)]
pub struct SeamField {
    values: FloatRaster,
}

impl SeamField {
    /// Compute the field for `metric`
    ///
    /// # Errors
    ///
    /// Returns an error if the images differ in size.
    pub fn new(source: &RgbRaster, target: &RgbRaster, metric: SeamMetric) -> CutResult<Self> {
        source.check_same_size(target)?;
        let values = match metric {
            SeamMetric::ColorDistance => source.zip_map(target, |a, b| a.distance(b) as f32)?,
            SeamMetric::GradientMagnitude => {
                gradient_magnitude(&color_difference(source, target)).map(|v| v as f32)
            }
        };
        Ok(Self { values })
    }

    /// Field dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        self.values.dimensions()
    }

    /// Require `raster` to cover the same pixels as the field
    pub fn check_same_size<T: Copy>(&self, raster: &Raster<T>) -> splice_core::Result<()> {
        self.values.check_same_size(raster)
    }

    /// Difference at `p`, `None` outside the field
    #[inline]
    pub fn at(&self, p: Point) -> Option<f64> {
        self.values.get(p).map(f64::from)
    }

    /// Squared deviation from `k` at `p`; 0 outside the field
    #[inline]
    pub fn cost(&self, p: Point, k: f64) -> f64 {
        self.at(p).map_or(0.0, |d| (d - k) * (d - k))
    }

    /// Reference level `k`: the mean difference over `points`
    ///
    /// Points outside the field count toward the mean with value 0. An
    /// empty set has level 0.
    pub fn reference_level(&self, points: &[Point]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let sum: f64 = points.iter().filter_map(|&p| self.at(p)).sum();
        sum / points.len() as f64
    }

    /// Energy of a point set: `Σ (d - k)²` over points inside the field
    pub fn energy<'a>(&self, points: impl IntoIterator<Item = &'a Point>, k: f64) -> f64 {
        points.into_iter().map(|&p| self.cost(p, k)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_core::Rgb;

    fn create_test_images() -> (RgbRaster, RgbRaster) {
        let source = RgbRaster::filled(6, 4, Rgb::gray(100)).unwrap();
        let mut target = source.clone();
        for y in 0..4 {
            target.set_pixel_unchecked(5, y, Rgb::new(103, 104, 100));
        }
        (source, target)
    }

    #[test]
    fn test_color_distance_field() {
        let (s, t) = create_test_images();
        let f = SeamField::new(&s, &t, SeamMetric::ColorDistance).unwrap();
        assert_eq!(f.at(Point::new(5, 0)), Some(5.0));
        assert_eq!(f.at(Point::new(0, 0)), Some(0.0));
        assert_eq!(f.at(Point::new(6, 0)), None);
    }

    #[test]
    fn test_gradient_field_flat_where_difference_is_flat() {
        let (s, t) = create_test_images();
        let f = SeamField::new(&s, &t, SeamMetric::GradientMagnitude).unwrap();
        assert_eq!(f.at(Point::new(1, 1)), Some(0.0));
        assert!(f.at(Point::new(5, 1)).unwrap() > 0.0);
    }

    #[test]
    fn test_level_and_energy() {
        let (s, t) = create_test_images();
        let f = SeamField::new(&s, &t, SeamMetric::ColorDistance).unwrap();
        let pts = [Point::new(4, 0), Point::new(5, 0), Point::new(9, 9)];
        // (0 + 5 + 0) / 3
        let k = f.reference_level(&pts);
        assert!((k - 5.0 / 3.0).abs() < 1e-12);
        let e = f.energy(&pts, k);
        let expected = k * k + (5.0 - k) * (5.0 - k);
        assert!((e - expected).abs() < 1e-9);
        assert_eq!(f.reference_level(&[]), 0.0);
    }

    #[test]
    fn test_size_mismatch() {
        let a = RgbRaster::filled(3, 3, Rgb::WHITE).unwrap();
        let b = RgbRaster::filled(3, 4, Rgb::WHITE).unwrap();
        assert!(SeamField::new(&a, &b, SeamMetric::ColorDistance).is_err());
    }
}
