//! splice-blend - Gradient-domain compositing
//!
//! Solves a discrete Poisson equation per color channel so that the pasted
//! region keeps the gradients of the source while matching the target along
//! its boundary.
//!
//! # Example
//!
//! ```
//! use splice_core::{Mask, Rgb, RgbRaster};
//! use splice_blend::{PoissonOptions, poisson_blend};
//!
//! let source = RgbRaster::filled(10, 10, Rgb::gray(180)).unwrap();
//! let target = RgbRaster::filled(10, 10, Rgb::gray(60)).unwrap();
//! let mut domain = Mask::new(10, 10).unwrap();
//! for y in 2..8 {
//!     for x in 2..8 {
//!         domain.set_pixel(x, y, 1).unwrap();
//!     }
//! }
//! let out = poisson_blend(&source, &target, &domain, None, &PoissonOptions::default()).unwrap();
//! // A flat source carries no gradient: the region takes the target's color
//! assert_eq!(out.get_pixel(5, 5), Some(Rgb::gray(60)));
//! ```

mod error;
pub mod poisson;

pub use error::{BlendError, BlendResult};

// Re-export the solver
pub use poisson::{
    BlendMode, DEFAULT_ACCURACY, DEFAULT_SOURCE_WEIGHT, Parallelism, PoissonOptions,
    poisson_blend,
};
