//! splice-region - Region processing for splice
//!
//! This crate provides region processing functionality including:
//!
//! - **Seed fill operations** - 4-connected flood fill, exterior fill and
//!   label-guided fill
//! - **Connected component labeling** - Two-pass labeling by pixel value
//! - **Region features** - Centroid, area, orientation, elongation and color
//!   descriptors; removal and bridging of regions
//!
//! # Examples
//!
//! ## Labeling
//!
//! ```
//! use splice_core::Mask;
//! use splice_region::label_regions;
//!
//! let mask = Mask::from_vec(4, 1, vec![1, 0, 0, 1]).unwrap();
//! let labeling = label_regions(&mask, Some(0));
//! assert_eq!(labeling.count, 3); // background + 2 regions
//! assert_eq!(labeling.grid.data(), &[1, 0, 0, 2]);
//! ```
//!
//! ## Flood fill
//!
//! ```
//! use splice_core::{Mask, Point};
//! use splice_region::flood_fill4;
//!
//! let mut mask = Mask::new(10, 10).unwrap();
//! let count = flood_fill4(&mut mask, Point::new(-1, -1)).unwrap();
//! assert_eq!(count, 100);
//! ```

mod error;
pub mod label;
pub mod seedfill;
pub mod stats;

pub use error::{RegionError, RegionResult};

// Re-export labeling
pub use label::{Labeling, label_regions};

// Re-export seed fill functions
pub use seedfill::{fill_exterior, fill_inside, fill_outside_labels, flood_fill4};

// Re-export region features
pub use stats::{
    DEFAULT_MIN_VOLUME, DEFAULT_WEIGHTS, Region, RegionSet, connect_regions, discard_regions,
    region_stats,
};
