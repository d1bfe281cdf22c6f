//! splice-morph - Binary morphology and mask set operations
//!
//! This crate provides:
//!
//! - Structuring elements (SEL) for defining operation neighborhoods
//! - Binary morphology: erosion, dilation, opening, closing, contour
//! - Separable brick erosion and dilation
//! - Boolean operations between masks
//! - Conversions between masks, value selections and point lists
//!
//! # Example
//!
//! ```
//! use splice_core::Mask;
//! use splice_morph::{contour, dilate, Sel};
//!
//! let mut mask = Mask::new(7, 7).unwrap();
//! mask.set_pixel(3, 3, 1).unwrap();
//! let grown = dilate(&mask, &Sel::cross());
//! assert_eq!(grown.count_set(), 5);
//! assert_eq!(contour(&grown).count_set(), 4);
//! ```

pub mod binary;
mod error;
pub mod logic;
pub mod points;
pub mod sel;

pub use error::{MorphError, MorphResult};
pub use sel::{Sel, SelElement};

// Re-export binary morphology functions
pub use binary::{
    BoundaryPolicy, close, contour, dilate, dilate_brick, erode, erode_brick, open,
};

// Re-export mask logic
pub use logic::{and, difference, not, or, subtract, xor};

// Re-export point-list helpers
pub use points::{
    bounding_box, count, draw_line, line_points, list_points, plot, select_equal,
    select_not_equal,
};
