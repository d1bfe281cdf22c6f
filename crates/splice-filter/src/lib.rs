//! splice-filter - Filters used by boundary refinement and compositing
//!
//! This crate provides:
//!
//! - Gaussian kernels and zero-padded (separable) convolution
//! - Mask feathering into an alpha plane
//! - Color difference and gradient magnitude fields
//! - Mode filtering of palette-indexed rasters
//! - Nearest-palette quantization in L*a*b*
//!
//! # Example
//!
//! ```
//! use splice_core::Mask;
//! use splice_filter::{FeatherOptions, feather};
//!
//! let mut mask = Mask::new(40, 40).unwrap();
//! for y in 5..35 {
//!     for x in 5..35 {
//!         mask.set_pixel(x, y, 1).unwrap();
//!     }
//! }
//! let alpha = feather(&mask, &FeatherOptions::default().with_sigma(2.0)).unwrap();
//! assert_eq!(alpha.get_pixel(20, 20), Some(255));
//! assert!(alpha.get_pixel(5, 20).unwrap() < 255);
//! ```

pub mod convolve;
pub mod difference;
mod error;
pub mod kernel;
pub mod quantize;
pub mod rank;

pub use error::{FilterError, FilterResult};
pub use kernel::Kernel;

// Re-export commonly used functions
pub use convolve::{
    DEFAULT_FEATHER_PADDING, DEFAULT_FEATHER_SIGMA, FeatherOptions, convolve, convolve_sep,
    feather,
};
pub use difference::{color_difference, gradient_magnitude};
pub use quantize::quantize_lab;
pub use rank::mode_filter;
