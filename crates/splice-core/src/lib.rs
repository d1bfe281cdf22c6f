//! splice-core - Basic data structures for boundary-optimized pasting
//!
//! This crate provides the fundamental data structures used throughout
//! the splice workspace:
//!
//! - [`Raster`] - Generic 2D pixel grid, with the aliases [`Mask`],
//!   [`LabelGrid`] and [`FloatRaster`]
//! - [`Rgb`] / [`RgbRaster`] - Color pixels and images
//! - [`Lab`] - CIE L*a*b* color for perceptual comparisons
//! - [`Point`] / [`Rect`] - Integer pixel geometry
//!
//! # Example
//!
//! ```
//! use splice_core::{Mask, Point};
//!
//! let mut mask = Mask::new(8, 8).unwrap();
//! mask.set_pixel(3, 4, 1).unwrap();
//! assert_eq!(mask.count_set(), 1);
//! assert_eq!(mask.get(Point::new(3, 4)), Some(1));
//! assert_eq!(mask.get(Point::new(-1, -1)), None);
//! ```

pub mod color;
pub mod colorspace;
pub mod error;
pub mod geometry;
pub mod raster;

pub use color::{Rgb, RgbRaster, channel};
pub use colorspace::{Lab, Xyz, rgb_to_lab, srgb_to_lab};
pub use error::{Error, Result};
pub use geometry::{Point, Rect};
pub use raster::{FloatRaster, LabelGrid, Mask, Raster};
