//! Error types for splice-cut

use thiserror::Error;

/// Errors that can occur while refining a boundary
#[derive(Debug, Error)]
pub enum CutError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] splice_core::Error),

    /// Morphology error
    #[error("morphology error: {0}")]
    Morph(#[from] splice_morph::MorphError),

    /// Region processing error
    #[error("region error: {0}")]
    Region(#[from] splice_region::RegionError),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for boundary refinement
pub type CutResult<T> = Result<T, CutError>;
