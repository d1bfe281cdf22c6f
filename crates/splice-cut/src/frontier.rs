//! Search frontier and predecessor links
//!
//! [`CostFrontier`] is a min-heap without decrease-key: a cheaper path to a
//! point is pushed as a new entry and the caller skips stale entries on pop.
//! [`PredecessorGrid`] stores, per pixel, the direction back to the pixel
//! it was reached from.

use splice_core::Point;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct Entry {
    cost: f64,
    seq: u64,
    point: Point,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-heap of `(cost, point)` with ties broken by insertion order
#[derive(Debug, Default)]
pub struct CostFrontier {
    heap: BinaryHeap<Reverse<Entry>>,
    seq: u64,
}

impl CostFrontier {
    /// Create an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point with the given path cost
    pub fn push(&mut self, point: Point, cost: f64) {
        self.heap.push(Reverse(Entry {
            cost,
            seq: self.seq,
            point,
        }));
        self.seq += 1;
    }

    /// Remove the cheapest entry
    pub fn pop(&mut self) -> Option<(Point, f64)> {
        self.heap.pop().map(|Reverse(e)| (e.point, e.cost))
    }

    /// Number of entries, stale ones included
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check whether the frontier is exhausted
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

const UNVISITED: u8 = u8::MAX;
const ROOT: u8 = 0;

/// Link code stored at a pixel reached through `Point::neighbors8()[i]`
/// of its predecessor: the direction pointing back.
const OPPOSITE: [u8; 8] = [2, 1, 4, 3, 8, 7, 6, 5];

/// Per-pixel predecessor directions
///
/// Each pixel is unvisited, a root, or holds a code 1..=8 naming the
/// neighbor it was reached from, in [`Point::neighbors8`] order
/// (W, E, N, S, NW, SW, NE, SE).
#[derive(Debug, Clone)]
pub struct PredecessorGrid {
    width: u32,
    height: u32,
    codes: Vec<u8>,
}

impl PredecessorGrid {
    /// Create a grid with every pixel unvisited
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            codes: vec![UNVISITED; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height {
            Some(p.y as usize * self.width as usize + p.x as usize)
        } else {
            None
        }
    }

    /// Mark every pixel unvisited
    pub fn reset(&mut self) {
        self.codes.fill(UNVISITED);
    }

    /// Make `p` the start of a path
    pub fn set_root(&mut self, p: Point) {
        if let Some(i) = self.index(p) {
            self.codes[i] = ROOT;
        }
    }

    /// Record that `q`, neighbor `dir` of its predecessor, was reached from it
    pub fn link(&mut self, q: Point, dir: usize) {
        if let Some(i) = self.index(q) {
            self.codes[i] = OPPOSITE[dir];
        }
    }

    /// Raw link code: `None` when unvisited, 0 for a root, else 1..=8
    pub fn code(&self, p: Point) -> Option<u8> {
        self.index(p)
            .map(|i| self.codes[i])
            .filter(|&c| c != UNVISITED)
    }

    /// Whether `p` has been reached by the search
    pub fn is_reached(&self, p: Point) -> bool {
        self.code(p).is_some()
    }

    /// The pixel `p` was reached from; `None` for roots and unvisited pixels
    pub fn predecessor(&self, p: Point) -> Option<Point> {
        match self.code(p) {
            Some(c) if c != ROOT => Some(p.neighbors8()[(c - 1) as usize]),
            _ => None,
        }
    }

    /// Iterate from `p` back to its root, `p` and the root included
    ///
    /// Stops after `width * height` steps so a corrupted grid cannot loop.
    pub fn chain(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        let limit = self.codes.len();
        std::iter::successors(Some(p), move |&q| self.predecessor(q)).take(limit)
    }

    /// Root of the path ending at `p`
    pub fn first_point(&self, p: Point) -> Point {
        self.chain(p).last().unwrap_or(p)
    }

    /// Whether the path ending at `p` holds at least `min_length` points
    pub fn is_long_path(&self, p: Point, min_length: usize) -> bool {
        self.chain(p).nth(min_length.saturating_sub(1)).is_some()
    }

    /// Points of the path from `p` back to its root
    pub fn point_list(&self, p: Point) -> Vec<Point> {
        self.chain(p).collect()
    }
}
