//! Region features
//!
//! Per-region shape and color descriptors computed from a labeling:
//! normalized centroid, area, second-moment orientation and elongation,
//! and mean/deviation/skewness of color in scaled L*a*b*.

use crate::error::RegionResult;
use crate::label::{Labeling, label_regions};
use splice_core::{LabelGrid, Mask, Point, Rect, RgbRaster, srgb_to_lab};
use splice_morph::{Sel, dilate, draw_line, or, select_not_equal};
use tracing::debug;

/// Default minimum normalized area for a region to be kept
pub const DEFAULT_MIN_VOLUME: f64 = 0.01;

/// Default weights for position, volume, color and orientation distances
pub const DEFAULT_WEIGHTS: [f64; 4] = [0.25, 0.25, 0.25, 0.25];

/// Shape and color descriptor of one labeled region
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Renumbered label, 1..K
    pub label: u32,
    /// Number of pixels
    pub pixel_count: usize,
    /// Bounding box
    pub bounds: Rect,
    /// Centroid x, normalized by the image width
    pub cx: f64,
    /// Centroid y, normalized by the image height
    pub cy: f64,
    /// Pixel count over image area
    pub volume: f64,
    /// Pixel count over bounding-box area
    pub relative_volume: f64,
    /// Principal orientation in radians
    pub orientation: f64,
    /// Elongation in [0, 1]
    pub elongation: f64,
    /// Mean color, L*a*b* scaled by 0.01
    pub color: [f64; 3],
    /// Color deviation through the same conversion as `color`
    pub deviation: [f64; 3],
    /// Color skewness through the same conversion as `color`
    pub skewness: [f64; 3],
}

impl Region {
    /// Distance terms for position, volume, color and orientation
    pub fn distance_terms(&self, other: &Region) -> [f64; 4] {
        let pd = ((self.cx - other.cx).powi(2) + (self.cy - other.cy).powi(2)).sqrt();
        let vd = ((self.volume - other.volume).powi(2)
            + (self.relative_volume - other.relative_volume).powi(2))
        .sqrt();
        let cd = self
            .color
            .iter()
            .zip(other.color.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt();
        let cos = (self.orientation - other.orientation).cos();
        let ed = (self.elongation - other.elongation).abs();
        let od = (self.elongation * other.elongation * (1.0 - cos.abs()) + ed) / 2.0;
        [pd, vd, cd, od]
    }

    /// Weighted sum of [`Region::distance_terms`]
    pub fn distance_with(&self, other: &Region, weights: [f64; 4]) -> f64 {
        self.distance_terms(other)
            .iter()
            .zip(weights.iter())
            .map(|(d, w)| d * w)
            .sum()
    }

    /// Distance with [`DEFAULT_WEIGHTS`]
    pub fn distance(&self, other: &Region) -> f64 {
        self.distance_with(other, DEFAULT_WEIGHTS)
    }

    /// Index of the candidate whose centroid is nearest, first one on ties
    pub fn closest(&self, candidates: &[Region]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, r) in candidates.iter().enumerate() {
            let d = (self.cx - r.cx).powi(2) + (self.cy - r.cy).powi(2);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Centroid in pixel coordinates of a `width`×`height` image
    pub fn centroid_pixel(&self, width: u32, height: u32) -> Point {
        Point::new(
            (self.cx * width as f64) as i32,
            (self.cy * height as f64) as i32,
        )
    }
}

/// Regions that passed the size filter, with the label remapping
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSet {
    /// Surviving regions, labeled 1..K in input label order
    pub regions: Vec<Region>,
    /// Input label -> new label, 0 for dropped labels
    pub remap: Vec<u32>,
}

impl RegionSet {
    /// Rewrite a label grid with the surviving labels only
    pub fn relabel(&self, grid: &LabelGrid) -> LabelGrid {
        grid.map(|l| self.remap.get(l as usize).copied().unwrap_or(0))
    }

    /// Number of surviving regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check whether no region survived
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[derive(Clone)]
struct Accum {
    n: usize,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    sum_x: u64,
    sum_y: u64,
    sum_color: [f64; 3],
}

/// Compute features for every region with label > 0
///
/// # Arguments
///
/// * `labeling` - Output of [`label_regions`]
/// * `source` - Optional image providing color statistics
/// * `min_volume` - Regions with `volume <= min_volume` are dropped
///
/// # Errors
///
/// Returns an error if `source` differs in size from the labels.
pub fn region_stats(
    labeling: &Labeling,
    source: Option<&RgbRaster>,
    min_volume: f64,
) -> RegionResult<RegionSet> {
    let grid = &labeling.grid;
    if let Some(src) = source {
        grid.check_same_size(src)?;
    }
    let (width, height) = grid.dimensions();
    let nlabels = labeling.count as usize;

    let mut acc = vec![
        Accum {
            n: 0,
            min_x: width,
            min_y: height,
            max_x: 0,
            max_y: 0,
            sum_x: 0,
            sum_y: 0,
            sum_color: [0.0; 3],
        };
        nlabels
    ];

    for (x, y, l) in grid.enumerate() {
        let l = l as usize;
        // Labels outside the declared range are ignored
        if l == 0 || l >= nlabels {
            continue;
        }
        let a = &mut acc[l];
        a.n += 1;
        a.min_x = a.min_x.min(x);
        a.min_y = a.min_y.min(y);
        a.max_x = a.max_x.max(x);
        a.max_y = a.max_y.max(y);
        a.sum_x += x as u64;
        a.sum_y += y as u64;
        if let Some(src) = source {
            let c = src.get_pixel_unchecked(x, y).channels();
            for k in 0..3 {
                a.sum_color[k] += c[k] as f64;
            }
        }
    }

    // Central moments of color need the means first
    let means: Vec<[f64; 3]> = acc
        .iter()
        .map(|a| {
            if a.n == 0 {
                [0.0; 3]
            } else {
                a.sum_color.map(|s| s / a.n as f64)
            }
        })
        .collect();
    let mut dev = vec![[0.0f64; 3]; nlabels];
    let mut skew = vec![[0.0f64; 3]; nlabels];
    if let Some(src) = source {
        for (x, y, l) in grid.enumerate() {
            let l = l as usize;
            if l == 0 || l >= nlabels {
                continue;
            }
            let c = src.get_pixel_unchecked(x, y).channels();
            for k in 0..3 {
                let p = c[k] as f64 - means[l][k];
                dev[l][k] += p * p;
                skew[l][k] += p * p * p;
            }
        }
    }

    let image_area = width as f64 * height as f64;
    let mut regions = Vec::new();
    let mut remap = vec![0u32; nlabels];

    for l in 1..nlabels {
        let a = &acc[l];
        if a.n == 0 {
            continue;
        }
        let n = a.n as f64;
        let volume = n / image_area;
        if volume <= min_volume {
            continue;
        }

        let center_x = a.sum_x as f64 / n;
        let center_y = a.sum_y as f64 / n;

        // Second moments over the half-open bounding box
        let (mut mxx, mut mxy, mut myy) = (0.0f64, 0.0f64, 0.0f64);
        for y in a.min_y..a.max_y {
            for x in a.min_x..a.max_x {
                if grid.get_pixel_unchecked(x, y) as usize == l {
                    let px = x as f64 - center_x;
                    let py = y as f64 - center_y;
                    mxx += px * px;
                    mxy += px * py;
                    myy += py * py;
                }
            }
        }
        mxx /= n;
        mxy *= 2.0 / n;
        myy /= n;
        let (orientation, elongation) = orientation_and_elongation(mxx, mxy, myy);

        let bw = a.max_x - a.min_x + 1;
        let bh = a.max_y - a.min_y + 1;
        let bounds = Rect::new_unchecked(a.min_x as i32, a.min_y as i32, bw as i32, bh as i32);

        let (color, deviation, skewness) = if source.is_some() {
            let mean = means[l].map(|m| m / 255.0);
            let d = dev[l].map(|s| (s / n).sqrt() / 255.0);
            let s = skew[l].map(|s| (s / n).cbrt() / 255.0);
            (scaled_lab(mean), scaled_lab(d), scaled_lab(s))
        } else {
            ([0.0; 3], [0.0; 3], [0.0; 3])
        };

        let label = regions.len() as u32 + 1;
        remap[l] = label;
        regions.push(Region {
            label,
            pixel_count: a.n,
            bounds,
            cx: center_x / width as f64,
            cy: center_y / height as f64,
            volume,
            relative_volume: n / bounds.area() as f64,
            orientation,
            elongation,
            color,
            deviation,
            skewness,
        });
    }

    debug!(
        labels = nlabels,
        kept = regions.len(),
        min_volume,
        "region statistics"
    );
    Ok(RegionSet { regions, remap })
}

fn orientation_and_elongation(mxx: f64, mxy: f64, myy: f64) -> (f64, f64) {
    let ratio = (myy - mxy) / (mxx - mxy);
    let mut orientation = if ratio.is_nan() { 0.0 } else { ratio.atan() };
    if myy < mxy {
        orientation = orientation.abs() - std::f64::consts::FRAC_PI_2;
    }

    let denom = mxx.max(mxy.abs()).max(myy);
    let elongation = if denom > 0.0 {
        ((mxx - myy).abs() + mxy.abs()) / denom
    } else {
        0.0
    };
    (orientation, elongation.min(1.0))
}

fn scaled_lab(v: [f64; 3]) -> [f64; 3] {
    let lab = srgb_to_lab([v[0] as f32, v[1] as f32, v[2] as f32]);
    lab.to_array().map(|c| c as f64 * 0.01)
}

/// Keep only foreground regions larger than `min_volume`
///
/// # Errors
///
/// Propagates errors from [`region_stats`].
pub fn discard_regions(mask: &Mask, min_volume: f64) -> RegionResult<Mask> {
    let labeling = label_regions(mask, Some(0));
    let set = region_stats(&labeling, None, min_volume)?;
    Ok(select_not_equal(&set.relabel(&labeling.grid), 0))
}

/// Join the regions of a mask with thin bridges
///
/// Each region in label order is linked by a digital line from its centroid
/// to the centroid of the nearest region that follows it. The lines are
/// thickened with the plus-shaped element so the result stays 4-connected,
/// then merged with the mask.
///
/// # Errors
///
/// Propagates errors from [`region_stats`].
pub fn connect_regions(mask: &Mask) -> RegionResult<Mask> {
    let (w, h) = mask.dimensions();
    let labeling = label_regions(mask, Some(0));
    let set = region_stats(&labeling, None, DEFAULT_MIN_VOLUME)?;

    let mut lines = Mask::new_like(mask);
    for (i, a) in set.regions.iter().enumerate() {
        let rest = &set.regions[i + 1..];
        if let Some(j) = a.closest(rest) {
            draw_line(
                &mut lines,
                a.centroid_pixel(w, h),
                rest[j].centroid_pixel(w, h),
            );
        }
    }

    Ok(or(&dilate(&lines, &Sel::cross()), mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_core::Rgb;

    fn two_squares() -> Mask {
        // 20x20 with a 4x4 square at (2,2) and a 6x3 bar at (12,10)
        let mut m = Mask::new(20, 20).unwrap();
        for y in 2..6 {
            for x in 2..6 {
                m.set_pixel_unchecked(x, y, 1);
            }
        }
        for y in 10..13 {
            for x in 12..18 {
                m.set_pixel_unchecked(x, y, 1);
            }
        }
        m
    }

    #[test]
    fn test_basic_features() {
        let m = two_squares();
        let l = label_regions(&m, Some(0));
        let set = region_stats(&l, None, 0.0).unwrap();
        assert_eq!(set.len(), 2);

        let sq = &set.regions[0];
        assert_eq!(sq.label, 1);
        assert_eq!(sq.pixel_count, 16);
        assert_eq!(sq.bounds, Rect::new_unchecked(2, 2, 4, 4));
        assert!((sq.cx - 3.5 / 20.0).abs() < 1e-12);
        assert!((sq.volume - 16.0 / 400.0).abs() < 1e-12);
        assert!((sq.relative_volume - 1.0).abs() < 1e-12);

        let bar = &set.regions[1];
        assert_eq!(bar.pixel_count, 18);
        assert!(bar.elongation > 0.5);
        assert!(bar.elongation <= 1.0);
    }

    #[test]
    fn test_threshold_and_relabel() {
        let m = two_squares();
        let l = label_regions(&m, Some(0));
        // 16/400 = 0.04 is dropped, 18/400 = 0.045 kept
        let set = region_stats(&l, None, 0.042).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.regions[0].label, 1);
        assert_eq!(set.regions[0].pixel_count, 18);

        let relabeled = set.relabel(&l.grid);
        assert_eq!(relabeled.get_pixel(3, 3), Some(0));
        assert_eq!(relabeled.get_pixel(12, 10), Some(1));
    }

    #[test]
    fn test_color_statistics() {
        let mut m = Mask::new(10, 10).unwrap();
        for y in 0..5 {
            for x in 0..10 {
                m.set_pixel_unchecked(x, y, 1);
            }
        }
        let img = RgbRaster::filled(10, 10, Rgb::WHITE).unwrap();
        let l = label_regions(&m, Some(0));
        let set = region_stats(&l, Some(&img), 0.01).unwrap();
        let r = &set.regions[0];
        assert!((r.color[0] - 1.0).abs() < 1e-3);
        assert!(r.deviation[0].abs() < 1e-6);
        assert!(r.skewness[0].abs() < 1e-6);

        let small = RgbRaster::new(5, 5).unwrap();
        assert!(region_stats(&l, Some(&small), 0.01).is_err());
    }

    #[test]
    fn test_single_pixel_region_is_finite() {
        let mut m = Mask::new(3, 3).unwrap();
        m.set_pixel_unchecked(1, 1, 1);
        let l = label_regions(&m, Some(0));
        let set = region_stats(&l, None, 0.0).unwrap();
        let r = &set.regions[0];
        assert!(r.orientation.is_finite());
        assert_eq!(r.elongation, 0.0);
    }

    #[test]
    fn test_distance_and_closest() {
        let m = two_squares();
        let l = label_regions(&m, Some(0));
        let set = region_stats(&l, None, 0.0).unwrap();
        let a = &set.regions[0];
        let b = &set.regions[1];
        assert_eq!(a.distance(a), 0.0);
        assert!((a.distance(b) - b.distance(a)).abs() < 1e-12);
        assert!(a.distance(b) > 0.0);
        assert_eq!(a.closest(&set.regions[1..]), Some(0));
        assert_eq!(a.closest(&[]), None);
    }

    #[test]
    fn test_discard_regions() {
        let mut m = two_squares();
        m.set_pixel_unchecked(18, 0, 1);
        let kept = discard_regions(&m, 0.01).unwrap();
        assert_eq!(kept, two_squares());
    }

    #[test]
    fn test_connect_regions() {
        let m = two_squares();
        let joined = connect_regions(&m).unwrap();
        assert!(joined.count_set() > m.count_set());
        let l = label_regions(&joined, Some(0));
        assert_eq!(l.count, 2);
        for (x, y, v) in m.enumerate() {
            if v != 0 {
                assert_eq!(joined.get_pixel(x, y), Some(1));
            }
        }
    }
}
