//! Connected-component labeling by value
//!
//! Two-pass labeling of any raster whose pixels can be compared for
//! equality (palette indices, binary masks, colors). Pixels that share a
//! value and touch through the already-scanned neighbors W, N, NW or NE end
//! up with the same label.

use splice_core::{LabelGrid, Raster};

/// Result of labeling a raster
#[derive(Debug, Clone, PartialEq)]
pub struct Labeling {
    /// Dense labels; 0 is background (or unused when no background is given)
    pub grid: LabelGrid,
    /// Number of labels, label 0 included
    pub count: u32,
}

/// Union-find over provisional labels
///
/// The smaller label of a pair always becomes the root, so every root is
/// the first label assigned to its component.
struct Equivalences {
    parent: Vec<u32>,
}

impl Equivalences {
    fn new() -> Self {
        // Label 0 is reserved
        Self { parent: vec![0] }
    }

    fn make(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, mut a: u32) -> u32 {
        let mut root = a;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Path compression
        while self.parent[a as usize] != root {
            let next = self.parent[a as usize];
            self.parent[a as usize] = root;
            a = next;
        }
        root
    }

    fn associate(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi as usize] = lo;
        }
    }

    /// Map each provisional label to a dense id, roots numbered in order
    fn condense(mut self) -> (Vec<u32>, u32) {
        let n = self.parent.len();
        let mut dense = vec![0u32; n];
        let mut count = 1u32;
        for label in 1..n as u32 {
            let root = self.find(label);
            if root == label {
                dense[label as usize] = count;
                count += 1;
            } else {
                // Roots are smaller, so already numbered
                dense[label as usize] = dense[root as usize];
            }
        }
        (dense, count)
    }
}

/// Label connected regions of equal value
///
/// # Arguments
///
/// * `raster` - Input raster
/// * `background` - Value that never receives a label (stays 0)
///
/// # Returns
///
/// The dense label grid and the number of labels including 0. Labels are
/// numbered in order of first appearance in a row-major scan.
pub fn label_regions<T: Copy + PartialEq>(raster: &Raster<T>, background: Option<T>) -> Labeling {
    let (w, h) = raster.dimensions();
    let mut grid = LabelGrid::new_like(raster);
    let mut eq = Equivalences::new();

    // W, N, NW, NE
    const SCANNED: [(i32, i32); 4] = [(-1, 0), (0, -1), (-1, -1), (1, -1)];

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let value = raster.get_pixel_unchecked(x as u32, y as u32);
            if background == Some(value) {
                continue;
            }

            let mut matches = [0u32; 4];
            let mut n = 0;
            for (dx, dy) in SCANNED {
                let (nx, ny) = (x + dx, y + dy);
                if !raster.contains(nx, ny) {
                    continue;
                }
                if raster.get_pixel_unchecked(nx as u32, ny as u32) == value {
                    matches[n] = grid.get_pixel_unchecked(nx as u32, ny as u32);
                    n += 1;
                }
            }

            let label = if n == 0 {
                eq.make()
            } else {
                let label = matches[n - 1];
                for &other in &matches[..n - 1] {
                    if other != label {
                        eq.associate(other, label);
                    }
                }
                label
            };
            grid.set_pixel_unchecked(x as u32, y as u32, label);
        }
    }

    let (dense, count) = eq.condense();
    for v in grid.data_mut() {
        *v = dense[*v as usize];
    }

    Labeling { grid, count }
}
