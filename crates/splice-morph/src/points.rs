//! Conversions between masks, value selections and point lists

use splice_core::{Mask, Point, Raster, Rect};
use tracing::warn;

/// Mask of pixels equal to `value`
pub fn select_equal<T: Copy + PartialEq>(raster: &Raster<T>, value: T) -> Mask {
    raster.map(|v| (v == value) as u8)
}

/// Mask of pixels different from `value`
pub fn select_not_equal<T: Copy + PartialEq>(raster: &Raster<T>, value: T) -> Mask {
    raster.map(|v| (v != value) as u8)
}

/// Smallest rectangle holding every set pixel
///
/// An empty mask yields the whole raster.
pub fn bounding_box(mask: &Mask) -> Rect {
    let (w, h) = mask.dimensions();
    let mut min_x = w as i32;
    let mut min_y = h as i32;
    let mut max_x = -1;
    let mut max_y = -1;

    for (x, y, v) in mask.enumerate() {
        if v != 0 {
            let (x, y) = (x as i32, y as i32);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if max_x < 0 {
        return Rect::new_unchecked(0, 0, w as i32, h as i32);
    }
    Rect::new_unchecked(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

/// Set pixels in row-major order
pub fn list_points(mask: &Mask) -> Vec<Point> {
    mask.enumerate()
        .filter(|&(_, _, v)| v != 0)
        .map(|(x, y, _)| Point::new(x as i32, y as i32))
        .collect()
}

/// Draw points into a fresh `width`×`height` mask
///
/// Plotting stops at the first point outside the mask; the points drawn
/// so far are kept.
///
/// # Errors
///
/// Returns an error if either dimension is zero.
pub fn plot(points: &[Point], width: u32, height: u32) -> splice_core::Result<Mask> {
    let mut mask = Mask::new(width, height)?;
    for &p in points {
        if !mask.put(p, 1) {
            warn!(x = p.x, y = p.y, width, height, "plot point out of bounds");
            break;
        }
    }
    Ok(mask)
}

/// Number of set pixels
pub fn count(mask: &Mask) -> usize {
    mask.count_set()
}

/// Pixels of the digital line from `a` to `b`, both endpoints included
///
/// Bresenham's algorithm in all octants, starting at `a`.
pub fn line_points(a: Point, b: Point) -> Vec<Point> {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };

    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    let (mut x, mut y) = (a.x, a.y);
    let mut err = dx + dy;
    loop {
        points.push(Point::new(x, y));
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Draw a line into `mask`; parts outside the mask are clipped
pub fn draw_line(mask: &mut Mask, a: Point, b: Point) {
    for p in line_points(a, b) {
        mask.put(p, 1);
    }
}
