//! Seed fill operations
//!
//! 4-connected flood fill for masks, including fills seeded from the
//! virtual one-pixel frame that surrounds every raster. The frame is always
//! passable, so a fill seeded at `(-1, -1)` reaches every background pixel
//! connected to any side of the image.

use crate::error::{RegionError, RegionResult};
use splice_core::{LabelGrid, Mask, Point};
use std::collections::{HashSet, VecDeque};
use tracing::warn;

const NEIGHBORS4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Visited flags over the raster plus its one-pixel frame
struct FramedVisit {
    width: i32,
    height: i32,
    visited: Vec<bool>,
}

impl FramedVisit {
    fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        Self {
            width: w,
            height: h,
            visited: vec![false; ((w + 2) * (h + 2)) as usize],
        }
    }

    #[inline]
    fn in_frame(&self, p: Point) -> bool {
        p.x >= -1 && p.y >= -1 && p.x <= self.width && p.y <= self.height
    }

    #[inline]
    fn is_virtual(&self, p: Point) -> bool {
        p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height
    }

    /// Mark `p` visited; returns false if it already was
    #[inline]
    fn visit(&mut self, p: Point) -> bool {
        let idx = ((p.y + 1) * (self.width + 2) + (p.x + 1)) as usize;
        !std::mem::replace(&mut self.visited[idx], true)
    }
}

/// Breadth-first 4-connected traversal from `seed`
///
/// `enter(p)` decides whether an in-raster pixel may be entered; frame
/// pixels are always entered. `on_visit` sees every in-raster pixel
/// reached, in BFS order.
fn traverse4(
    width: u32,
    height: u32,
    seed: Point,
    mut enter: impl FnMut(Point) -> bool,
    mut on_visit: impl FnMut(Point),
) {
    let mut visit = FramedVisit::new(width, height);
    let mut queue = VecDeque::new();
    visit.visit(seed);
    queue.push_back(seed);

    while let Some(p) = queue.pop_front() {
        if !visit.is_virtual(p) {
            on_visit(p);
        }
        for (dx, dy) in NEIGHBORS4 {
            let np = p.offset(dx, dy);
            if !visit.in_frame(np) {
                continue;
            }
            if (visit.is_virtual(np) || enter(np)) && visit.visit(np) {
                queue.push_back(np);
            }
        }
    }
}

/// Flood fill a mask in place with 4-connectivity
///
/// Sets to 1 every unset pixel 4-connected to `seed`. The seed may lie on
/// the virtual frame around the mask (for example `(-1, -1)`), in which
/// case the fill reaches all background connected to the image border.
///
/// # Arguments
///
/// * `mask` - Mask modified in place
/// * `seed` - Start position, inside the mask or on its one-pixel frame
///
/// # Returns
///
/// The number of pixels that were filled.
///
/// # Errors
///
/// Returns [`RegionError::InvalidSeed`] if the seed lies further outside.
pub fn flood_fill4(mask: &mut Mask, seed: Point) -> RegionResult<usize> {
    let (w, h) = mask.dimensions();
    if seed.x < -1 || seed.y < -1 || seed.x > w as i32 || seed.y > h as i32 {
        return Err(RegionError::InvalidSeed {
            x: seed.x,
            y: seed.y,
        });
    }
    if mask.is_set(seed.x, seed.y) {
        return Ok(0);
    }

    let mut reached = Vec::new();
    traverse4(w, h, seed, |p| !mask.is_set(p.x, p.y), |p| reached.push(p));
    for &p in &reached {
        mask.put(p, 1);
    }
    Ok(reached.len())
}

/// Background pixels connected to the outside of the mask
///
/// Returns a mask with 1 at every unset pixel reachable from the image
/// border through unset pixels.
pub fn fill_exterior(boundary: &Mask) -> Mask {
    let (w, h) = boundary.dimensions();
    let mut out = Mask::new_like(boundary);
    traverse4(
        w,
        h,
        Point::new(-1, -1),
        |p| !boundary.is_set(p.x, p.y),
        |p| {
            out.put(p, 1);
        },
    );
    out
}

/// Region enclosed by a boundary, boundary included
///
/// Every pixel not reachable from the outside without crossing a set pixel.
pub fn fill_inside(boundary: &Mask) -> Mask {
    fill_exterior(boundary).map(|v| (v == 0) as u8)
}

/// Pixels cut off from the exterior by label-guided flooding
///
/// The flood starts on the frame around the image and enters:
/// - every pixel outside `mask`, recording its label;
/// - mask pixels whose label was already recorded.
///
/// Labels are recorded in BFS order, so a mask pixel is only entered once a
/// same-labeled non-mask pixel has been reached earlier. The result has 1 at
/// every pixel never reached.
pub fn fill_outside_labels(labels: &LabelGrid, mask: &Mask) -> Mask {
    let (w, h) = labels.dimensions();
    if !labels.same_size(mask) {
        warn!(
            labels = ?labels.dimensions(),
            mask = ?mask.dimensions(),
            "label/mask size mismatch"
        );
        return Mask::new_like(labels);
    }

    let mut seen = HashSet::new();
    let mut reached = Mask::new_like(labels);
    traverse4(
        w,
        h,
        Point::new(-1, -1),
        |p| {
            let label = labels.get(p).unwrap_or(0);
            if mask.is_set(p.x, p.y) {
                seen.contains(&label)
            } else {
                seen.insert(label);
                true
            }
        },
        |p| {
            reached.put(p, 1);
        },
    );
    reached.map(|v| (v == 0) as u8)
}
