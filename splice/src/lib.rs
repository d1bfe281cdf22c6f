//! Splice - Drag-and-drop pasting with boundary optimization
//!
//! Pastes an object cut from a source image into a target so that the seam
//! is hard to see: the object boundary is rerouted to where source and
//! target differ least unevenly, the edge is feathered, and the interior is
//! blended in the gradient domain.
//!
//! # Overview
//!
//! - Rasters, colors and geometry (`splice_core`, re-exported at the root)
//! - Binary morphology and mask logic ([`morph`])
//! - Flood fill, labeling and region features ([`region`])
//! - Kernels, feathering, difference fields and quantization ([`filter`])
//! - Minimum-energy boundary search ([`cut`])
//! - Poisson blending ([`blend`])
//! - The controller tying them together ([`matting`])
//!
//! # Example
//!
//! ```
//! use splice::{Mask, Rgb, RgbRaster};
//! use splice::blend::{PoissonOptions, poisson_blend};
//!
//! let source = RgbRaster::filled(12, 12, Rgb::gray(200)).unwrap();
//! let target = RgbRaster::filled(12, 12, Rgb::gray(50)).unwrap();
//! let domain = Mask::filled(12, 12, 1).unwrap();
//! let out = poisson_blend(&source, &target, &domain, None, &PoissonOptions::default()).unwrap();
//! assert_eq!(out.get_pixel(6, 6), Some(Rgb::gray(50)));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use splice_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use splice_blend as blend;
pub use splice_cut as cut;
pub use splice_filter as filter;
pub use splice_matting as matting;
pub use splice_morph as morph;
pub use splice_region as region;
