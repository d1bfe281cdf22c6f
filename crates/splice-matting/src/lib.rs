//! splice-matting - Boundary refinement controller
//!
//! This crate ties the pipeline together for one pasted object:
//!
//! - [`BoundaryController`] runs the rough mask → refinement → feathering →
//!   blending sequence on a background worker, one request at a time
//! - [`MattingConfig`] selects the [`RefineMethod`] and pipeline parameters
//! - [`MattingEvent`] notifies a listener of lifecycle changes
//! - [`Composite`] is the resulting object layer over the target
//! - [`hard_segmentation`] snaps a rough mask to palette regions
//!
//! # Example
//!
//! ```
//! use splice_core::{Mask, Point, Rgb, RgbRaster};
//! use splice_matting::{BoundaryController, MattingConfig, RefineMethod};
//!
//! let config = MattingConfig::default()
//!     .with_method(RefineMethod::None)
//!     .with_blend_mode(None);
//! let mut controller = BoundaryController::new(config).unwrap();
//! controller.set_source(RgbRaster::filled(24, 24, Rgb::WHITE).unwrap());
//! controller.set_target(RgbRaster::filled(24, 24, Rgb::BLACK).unwrap());
//!
//! // A closed square stroke around the object
//! let mut stroke = Mask::new(24, 24).unwrap();
//! for i in 4..20 {
//!     for (x, y) in [(i, 4), (i, 19), (4, i), (19, i)] {
//!         stroke.set_pixel(x, y, 1).unwrap();
//!     }
//! }
//! controller.apply_correction(&stroke).unwrap();
//! controller.wait().unwrap();
//! assert_eq!(controller.mask().unwrap().count_set(), 256);
//! ```

pub mod composite;
pub mod config;
pub mod controller;
mod error;
pub mod event;
pub mod segment;

pub use error::{MattingError, MattingResult};

// Re-export the controller and its configuration
pub use config::{DEFAULT_FALLBACK_RATIO, DEFAULT_SEGMENTATION_LINE, MattingConfig, RefineMethod};
pub use controller::{BoundaryController, ControllerState, Listener};
pub use event::MattingEvent;

// Re-export compositing and segmentation helpers
pub use composite::{Composite, aligned_target};
pub use segment::{SegmentOptions, enclosed_by, hard_segmentation, label_band, stroke_region};
