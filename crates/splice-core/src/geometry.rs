//! Point and Rect - integer pixel geometry
//!
//! Coordinates are signed so that virtual positions just outside a raster
//! (such as the `(-1, -1)` exterior seed) can be represented directly.

use crate::error::{Error, Result};

/// An integer pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Point {
    /// X coordinate (column)
    pub x: i32,
    /// Y coordinate (row)
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point
    #[inline]
    pub fn distance_sq(self, other: Point) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Point displaced by `(dx, dy)`
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The 8 neighbors in W, E, N, S, NW, SW, NE, SE order
    pub fn neighbors8(self) -> [Point; 8] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
            self.offset(-1, -1),
            self.offset(-1, 1),
            self.offset(1, -1),
            self.offset(1, 1),
        ]
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// A rectangle region
///
/// A simple Copy type; `right()` and `bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: i32,
    /// Top y coordinate
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Create a new rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is not positive.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        if w <= 0 || h <= 0 {
            return Err(Error::InvalidParameter(format!(
                "rect dimensions must be positive: w={}, h={}",
                w, h
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Create a rectangle without validation
    pub const fn new_unchecked(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Number of pixels covered
    #[inline]
    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// Check whether a point lies inside the rectangle
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Top-left corner
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_sq() {
        let a = Point::new(1, 1);
        assert_eq!(a.distance_sq(Point::new(2, 2)), 2);
        assert_eq!(a.distance_sq(Point::new(4, 5)), 25);
        assert_eq!(a.distance_sq(a), 0);
    }

    #[test]
    fn test_neighbors8_order() {
        let n = Point::new(5, 5).neighbors8();
        assert_eq!(n[0], Point::new(4, 5));
        assert_eq!(n[3], Point::new(5, 6));
        assert_eq!(n[7], Point::new(6, 6));
    }

    #[test]
    fn test_rect() {
        let r = Rect::new(2, 3, 4, 5).unwrap();
        assert_eq!(r.right(), 6);
        assert_eq!(r.bottom(), 8);
        assert_eq!(r.area(), 20);
        assert!(r.contains(Point::new(2, 3)));
        assert!(!r.contains(Point::new(6, 3)));
        assert!(Rect::new(0, 0, 0, 3).is_err());
    }
}
