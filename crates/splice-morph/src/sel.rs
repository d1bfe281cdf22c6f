//! Structuring Element (SEL) for morphological operations
//!
//! A structuring element defines the neighborhood used in erosion and
//! dilation. The origin (cx, cy) is the reference point for the operation.

use crate::{MorphError, MorphResult};

/// Element type in a structuring element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SelElement {
    /// Don't care - this position is ignored
    #[default]
    DontCare = 0,
    /// Hit - must match foreground (set pixels)
    Hit = 1,
}

/// Structuring Element (SEL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sel {
    width: u32,
    height: u32,
    cx: u32,
    cy: u32,
    data: Vec<SelElement>,
}

impl Sel {
    /// Create a new structuring element with every position set to don't-care
    ///
    /// The origin is placed at the center.
    pub fn new(width: u32, height: u32) -> MorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidSel(format!(
                "dimensions must be positive: {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            data: vec![SelElement::DontCare; (width * height) as usize],
        })
    }

    /// The 3×3 plus-sign element: the origin and its 4-neighbors.
    pub fn cross() -> Self {
        let mut sel = Self {
            width: 3,
            height: 3,
            cx: 1,
            cy: 1,
            data: vec![SelElement::DontCare; 9],
        };
        for (x, y) in [(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)] {
            sel.data[y * 3 + x] = SelElement::Hit;
        }
        sel
    }

    /// Create a cross (+) structuring element with arms of `size` pixels
    ///
    /// `size` must be odd; `create_cross(3)` equals [`Sel::cross`].
    pub fn create_cross(size: u32) -> MorphResult<Self> {
        if size % 2 == 0 {
            return Err(MorphError::InvalidSel(format!(
                "cross size must be odd, got {}",
                size
            )));
        }
        let mut sel = Self::new(size, size)?;
        let c = size / 2;
        for i in 0..size {
            sel.set_element(c, i, SelElement::Hit);
            sel.set_element(i, c, SelElement::Hit);
        }
        Ok(sel)
    }

    /// Create a rectangular "brick" structuring element with all hits
    pub fn create_brick(width: u32, height: u32) -> MorphResult<Self> {
        let mut sel = Self::new(width, height)?;
        sel.data.fill(SelElement::Hit);
        Ok(sel)
    }

    /// Create a horizontal line structuring element
    pub fn create_horizontal(length: u32) -> MorphResult<Self> {
        Self::create_brick(length, 1)
    }

    /// Create a vertical line structuring element
    pub fn create_vertical(length: u32) -> MorphResult<Self> {
        Self::create_brick(1, length)
    }

    /// Create a disk (approximate circle) structuring element
    pub fn create_disk(radius: u32) -> MorphResult<Self> {
        let size = 2 * radius + 1;
        let mut sel = Self::new(size, size)?;
        let r = radius as i32;
        for y in 0..size {
            for x in 0..size {
                let dx = x as i32 - r;
                let dy = y as i32 - r;
                if dx * dx + dy * dy <= r * r {
                    sel.set_element(x, y, SelElement::Hit);
                }
            }
        }
        Ok(sel)
    }

    /// Get the width
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the origin x coordinate
    #[inline]
    pub fn origin_x(&self) -> u32 {
        self.cx
    }

    /// Get the origin y coordinate
    #[inline]
    pub fn origin_y(&self) -> u32 {
        self.cy
    }

    /// Set the origin
    pub fn set_origin(&mut self, cx: u32, cy: u32) -> MorphResult<()> {
        if cx >= self.width || cy >= self.height {
            return Err(MorphError::InvalidSel(format!(
                "origin ({}, {}) outside {}x{}",
                cx, cy, self.width, self.height
            )));
        }
        self.cx = cx;
        self.cy = cy;
        Ok(())
    }

    /// Get an element at (x, y)
    #[inline]
    pub fn get_element(&self, x: u32, y: u32) -> Option<SelElement> {
        if x < self.width && y < self.height {
            Some(self.data[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Set an element at (x, y); positions outside the element are ignored
    #[inline]
    pub fn set_element(&mut self, x: u32, y: u32, elem: SelElement) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = elem;
        }
    }

    /// Count the number of hit elements
    pub fn hit_count(&self) -> usize {
        self.data.iter().filter(|&&e| e == SelElement::Hit).count()
    }

    /// Iterate over hit positions relative to origin
    pub fn hit_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let cx = self.cx as i32;
        let cy = self.cy as i32;
        let width = self.width;

        self.data
            .iter()
            .enumerate()
            .filter(|(_, elem)| **elem == SelElement::Hit)
            .map(move |(idx, _)| {
                let x = (idx as u32 % width) as i32;
                let y = (idx as u32 / width) as i32;
                (x - cx, y - cy)
            })
    }
}

impl Default for Sel {
    fn default() -> Self {
        Self::cross()
    }
}
