//! Cuts across the band between two contours
//!
//! A cut opens a closed band so a shortest path can run around it: the
//! seed line joins the nearest pair of outer/inner contour points, and the
//! target line runs alongside it, one step over. A path leaving the seeds
//! has to travel around the whole band before it can arrive at a target.

use splice_core::Point;

/// Seed and target point sets of a cut
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cut {
    /// Points the search starts from
    pub seeds: Vec<Point>,
    /// Points a closed path must end on
    pub targets: Vec<Point>,
}

impl Cut {
    /// A cut with no seeds or no targets cannot be searched
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty() || self.targets.is_empty()
    }
}

/// Nearest pair `(outside[i], inside[j])`; the first pair wins ties
fn nearest_pair(outside: &[Point], inside: &[Point]) -> Option<(Point, Point)> {
    let mut best: Option<(i64, Point, Point)> = None;
    for &a in outside {
        for &b in inside {
            let d = a.distance_sq(b);
            if best.is_none_or(|(bd, _, _)| d < bd) {
                best = Some((d, a, b));
            }
        }
    }
    best.map(|(_, a, b)| (a, b))
}

/// Build the cut between an outer and an inner contour
///
/// # Arguments
///
/// * `outside` - Points of the outer contour
/// * `inside` - Points of the inner contour
/// * `width`, `height` - Bounds every returned point must fall in
///
/// # Returns
///
/// An empty cut when either contour is empty. When the nearest points
/// coincide, the seed is that point and the targets are its in-bounds
/// 8-neighbors except the first one lying on the outer contour. Otherwise
/// the seeds are the Bresenham line between the two points and the targets
/// the same line shifted one step against its minor direction, with one
/// extra target wherever the line stepped sideways, plus a pair before the
/// first and after the last seed.
pub fn shortest_cut(outside: &[Point], inside: &[Point], width: u32, height: u32) -> Cut {
    let Some((a, b)) = nearest_pair(outside, inside) else {
        return Cut::default();
    };
    let (w, h) = (width as i32, height as i32);
    let in_bounds = |p: Point| p.x >= 0 && p.y >= 0 && p.x < w && p.y < h;

    if a == b {
        let mut targets: Vec<Point> = a.neighbors8().into_iter().filter(|&p| in_bounds(p)).collect();
        if let Some(i) = targets.iter().position(|p| outside.contains(p)) {
            targets.remove(i);
        }
        return Cut {
            seeds: vec![a],
            targets,
        };
    }

    let (mut x0, mut y0, mut x1, mut y1) = (a.x, a.y, b.x, b.y);
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    // Bounds and mapping in the (possibly swapped) line frame
    let (bx, by) = if steep { (h, w) } else { (w, h) };
    let to_point = |x: i32, y: i32| if steep { Point::new(y, x) } else { Point::new(x, y) };
    let valid_y = |y: i32| y >= 0 && y < by;

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let ystep = if y0 < y1 { 1 } else { -1 };

    let mut cut = Cut::default();

    if x0 >= 1 {
        if valid_y(y0) {
            cut.targets.push(to_point(x0 - 1, y0));
        }
        if valid_y(y0 - ystep) {
            cut.targets.push(to_point(x0 - 1, y0 - ystep));
        }
    }

    let mut error = 0;
    let mut y = y0;
    let mut displaced = false;
    for x in x0..=x1 {
        if x >= 0 && x < bx && valid_y(y) {
            cut.seeds.push(to_point(x, y));
            let mut yb = y - ystep;
            if valid_y(yb) {
                cut.targets.push(to_point(x, yb));
            }
            yb -= ystep;
            if displaced && valid_y(yb) {
                cut.targets.push(to_point(x, yb));
            }
        }
        error += dy;
        if 2 * error >= dx {
            displaced = true;
            y += ystep;
            error -= dx;
        } else {
            displaced = false;
        }
    }

    let x = x1 + 1;
    if x < bx && y >= 0 {
        for yb in [y - ystep, y - 2 * ystep] {
            if valid_y(yb) {
                cut.targets.push(to_point(x, yb));
            }
        }
    }

    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        let pts = [Point::new(1, 1)];
        assert!(shortest_cut(&[], &pts, 10, 10).is_empty());
        assert!(shortest_cut(&pts, &[], 10, 10).is_empty());
    }

    #[test]
    fn test_coincident_points() {
        let outside = [Point::new(5, 5), Point::new(4, 5)];
        let inside = [Point::new(5, 5)];
        let cut = shortest_cut(&outside, &inside, 10, 10);
        assert_eq!(cut.seeds, vec![Point::new(5, 5)]);
        // 8 neighbors minus the west one, which is on the outer contour
        assert_eq!(cut.targets.len(), 7);
        assert!(!cut.targets.contains(&Point::new(4, 5)));
        assert!(cut.targets.contains(&Point::new(6, 6)));
    }

    #[test]
    fn test_coincident_at_corner() {
        let p = [Point::new(0, 0)];
        let cut = shortest_cut(&p, &p, 4, 4);
        assert_eq!(cut.seeds, vec![Point::new(0, 0)]);
        assert_eq!(cut.targets.len(), 3);
    }

    #[test]
    fn test_horizontal_line() {
        let outside = [Point::new(2, 5)];
        let inside = [Point::new(6, 5), Point::new(9, 9)];
        let cut = shortest_cut(&outside, &inside, 20, 20);
        let expected: Vec<Point> = (2..=6).map(|x| Point::new(x, 5)).collect();
        assert_eq!(cut.seeds, expected);
        // Flat line: ystep is -1, so targets sit on row 6
        assert!(cut.targets.iter().all(|p| p.y == 6 || p.y == 7 || p.y == 5));
        assert!(cut.targets.contains(&Point::new(4, 6)));
        assert!(cut.targets.contains(&Point::new(1, 5)));
        assert!(cut.targets.contains(&Point::new(7, 6)));
        for s in &cut.seeds {
            assert!(!cut.targets.contains(s));
        }
    }

    #[test]
    fn test_steep_line_maps_back() {
        let outside = [Point::new(3, 1)];
        let inside = [Point::new(4, 7)];
        let cut = shortest_cut(&outside, &inside, 10, 10);
        assert_eq!(cut.seeds.first(), Some(&Point::new(3, 1)));
        assert_eq!(cut.seeds.last(), Some(&Point::new(4, 7)));
        assert_eq!(cut.seeds.len(), 7);
        // Consecutive seeds are 8-adjacent
        for pair in cut.seeds.windows(2) {
            assert!(pair[0].distance_sq(pair[1]) <= 2);
        }
        for t in &cut.targets {
            assert!(!cut.seeds.contains(t));
        }
    }
}
