//! Palette relabeling of the source around an object
//!
//! The source is quantized against the collaborator's palette, smoothed with
//! a mode filter and labeled. Flooding from the frame through background
//! pixels, and through object pixels whose label the flood has already
//! touched, leaves exactly the regions that the object mask encloses.

use crate::error::MattingResult;
use splice_core::{Mask, Rect, Rgb, RgbRaster};
use splice_filter::{mode_filter, quantize_lab};
use splice_morph::{BoundaryPolicy, Sel, bounding_box, dilate_brick, erode, subtract};
use splice_region::{discard_regions, fill_inside, fill_outside_labels, label_regions};
use tracing::debug;

/// Mode filter window applied to the quantized source
const MODE_WINDOW: u32 = 3;

/// Settings for [`hard_segmentation`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentOptions {
    /// Brick size used to grow the rough mask
    pub line: u32,
    /// Regions at or below this share of the frame are dropped
    pub discard_threshold: f64,
    /// Minimum share of the object the relabeling must keep
    pub fallback_ratio: f64,
}

/// Filled region of a stroke overlay: the drawn pixels plus what they enclose
pub fn stroke_region(stroke: &Mask) -> Mask {
    fill_inside(&stroke.map(|v| (v != 0) as u8))
}

/// Pixels strictly enclosed by the drawn lines, the lines excluded
pub fn enclosed_by(stroke: &Mask) -> Mask {
    let lines = stroke.map(|v| (v != 0) as u8);
    subtract(&fill_inside(&lines), &lines)
}

/// Relabel `source` inside `outside` and keep the regions `inside` encloses
///
/// All rasters share one frame.
///
/// # Errors
///
/// Returns an error for an empty or oversized palette.
pub fn label_band(
    source: &RgbRaster,
    palette: &[Rgb],
    outside: &Mask,
    inside: &Mask,
    discard_threshold: f64,
) -> MattingResult<Mask> {
    let quantized = mode_filter(&quantize_lab(source, palette)?, MODE_WINDOW)?;
    // Palette index 0 is never assigned, so it marks pixels outside the band
    let banded = quantized.zip_map(outside, |q, o| if o != 0 { q } else { 0 })?;
    let labeling = label_regions(&banded, None);
    debug!(labels = labeling.count, "relabeled band");

    let kept = fill_outside_labels(&labeling.grid, inside);
    Ok(discard_regions(&kept, discard_threshold)?)
}

/// Refine a rough segmentation by palette relabeling
///
/// # Returns
///
/// The working frame (the bounding box of the grown mask) and the refined
/// mask in that frame. When relabeling keeps less than the fallback share of
/// the object the rough mask is returned instead.
///
/// # Errors
///
/// Returns an error for an invalid brick size or palette.
pub fn hard_segmentation(
    source: &RgbRaster,
    rough: &Mask,
    palette: &[Rgb],
    options: &SegmentOptions,
) -> MattingResult<(Rect, Mask)> {
    let outside = dilate_brick(rough, options.line)?;
    // Ignoring the frame keeps regions such as the sky from gaining a border
    let inside = erode(&outside, &Sel::cross(), BoundaryPolicy::Ignore);
    let frame = bounding_box(&outside);

    let source = source.crop(frame)?;
    let outside = outside.crop(frame)?;
    let inside = inside.crop(frame)?;
    let refined = label_band(&source, palette, &outside, &inside, options.discard_threshold)?;

    let kept = (refined.count_set() + 1) as f64 / (inside.count_set() + 1) as f64;
    if kept < options.fallback_ratio {
        debug!(kept, "relabeling lost the object, keeping the rough mask");
        return Ok((frame, rough.crop(frame)?));
    }
    Ok((frame, refined))
}
