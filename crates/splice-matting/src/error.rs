//! Error types for splice-matting

use thiserror::Error;

/// Errors that can occur while refining and compositing a pasted object
#[derive(Debug, Error)]
pub enum MattingError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] splice_core::Error),

    /// Morphology error
    #[error("morphology error: {0}")]
    Morph(#[from] splice_morph::MorphError),

    /// Region processing error
    #[error("region error: {0}")]
    Region(#[from] splice_region::RegionError),

    /// Filtering error
    #[error("filter error: {0}")]
    Filter(#[from] splice_filter::FilterError),

    /// Boundary refinement error
    #[error("refinement error: {0}")]
    Cut(#[from] splice_cut::CutError),

    /// Blending error
    #[error("blend error: {0}")]
    Blend(#[from] splice_blend::BlendError),

    /// An input required by the requested operation has not been set
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The refinement worker panicked
    #[error("refinement worker panicked")]
    WorkerPanicked,
}

/// Result type for matting operations
pub type MattingResult<T> = Result<T, MattingError>;
