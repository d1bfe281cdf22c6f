//! Binary morphological operations
//!
//! Implements erosion, dilation, opening, closing and the one-pixel
//! contour for 0/1 masks.
//!
//! Pixels outside the mask are handled according to a [`BoundaryPolicy`]
//! for erosion. Dilation never reads outside the mask.

use crate::{MorphError, MorphResult, Sel};
use splice_core::Mask;

/// How erosion treats structuring-element hits that fall outside the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Outside pixels count as 0, so objects touching the border erode there
    #[default]
    ZeroPadding,
    /// Outside pixels are skipped, so border pixels survive
    Ignore,
}

/// Dilate a mask
///
/// For each set pixel in the result there is a hit `(dx, dy)` of the
/// structuring element such that `src(x - dx, y - dy)` is set.
/// Hits falling outside the mask contribute nothing.
pub fn dilate(mask: &Mask, sel: &Sel) -> Mask {
    let (w, h) = mask.dimensions();
    let offsets: Vec<_> = sel.hit_offsets().collect();
    let mut out = Mask::new_like(mask);

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let hit = offsets
                .iter()
                .any(|&(dx, dy)| mask.is_set(x - dx, y - dy));
            if hit {
                out.set_pixel_unchecked(x as u32, y as u32, 1);
            }
        }
    }
    out
}

/// Erode a mask
///
/// A pixel survives when `src(x + dx, y + dy)` is set for every hit
/// `(dx, dy)` of the structuring element.
///
/// # Arguments
///
/// * `mask` - Input 0/1 mask
/// * `sel` - Structuring element
/// * `policy` - Treatment of hits that land outside the mask
pub fn erode(mask: &Mask, sel: &Sel, policy: BoundaryPolicy) -> Mask {
    let (w, h) = mask.dimensions();
    let offsets: Vec<_> = sel.hit_offsets().collect();
    let mut out = Mask::new_like(mask);

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let keep = offsets.iter().all(|&(dx, dy)| {
                let (sx, sy) = (x + dx, y + dy);
                if mask.contains(sx, sy) {
                    mask.is_set(sx, sy)
                } else {
                    policy == BoundaryPolicy::Ignore
                }
            });
            if keep {
                out.set_pixel_unchecked(x as u32, y as u32, 1);
            }
        }
    }
    out
}

/// Open a mask
///
/// Opening = erosion followed by dilation.
pub fn open(mask: &Mask, sel: &Sel, policy: BoundaryPolicy) -> Mask {
    dilate(&erode(mask, sel, policy), sel)
}

/// Close a mask
///
/// Closing = dilation followed by erosion.
pub fn close(mask: &Mask, sel: &Sel, policy: BoundaryPolicy) -> Mask {
    erode(&dilate(mask, sel), sel, policy)
}

/// Dilate with a square brick of side `size`
///
/// Separable: a vertical line pass followed by a horizontal line pass.
///
/// # Errors
///
/// Returns [`MorphError::InvalidParameters`] if `size` is zero.
pub fn dilate_brick(mask: &Mask, size: u32) -> MorphResult<Mask> {
    check_brick_size(size)?;
    if size == 1 {
        return Ok(mask.clone());
    }
    let vertical = Sel::create_vertical(size)?;
    let horizontal = Sel::create_horizontal(size)?;
    Ok(dilate(&dilate(mask, &vertical), &horizontal))
}

/// Erode with a square brick of side `size`
///
/// Separable: a vertical line pass followed by a horizontal line pass.
///
/// # Errors
///
/// Returns [`MorphError::InvalidParameters`] if `size` is zero.
pub fn erode_brick(mask: &Mask, size: u32, policy: BoundaryPolicy) -> MorphResult<Mask> {
    check_brick_size(size)?;
    if size == 1 {
        return Ok(mask.clone());
    }
    let vertical = Sel::create_vertical(size)?;
    let horizontal = Sel::create_horizontal(size)?;
    Ok(erode(&erode(mask, &vertical, policy), &horizontal, policy))
}

/// One-pixel inner boundary of a mask
///
/// `mask XOR erode(mask, cross, ZeroPadding)`: set pixels with at least one
/// 4-neighbor unset or outside the mask.
pub fn contour(mask: &Mask) -> Mask {
    let eroded = erode(mask, &Sel::cross(), BoundaryPolicy::ZeroPadding);
    crate::logic::xor(mask, &eroded)
}

fn check_brick_size(size: u32) -> MorphResult<()> {
    if size == 0 {
        return Err(MorphError::InvalidParameters(
            "brick size must be at least 1".to_string(),
        ));
    }
    Ok(())
}
