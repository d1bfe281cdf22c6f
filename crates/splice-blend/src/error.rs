//! Error types for splice-blend

use thiserror::Error;

/// Errors that can occur during gradient-domain blending
#[derive(Debug, Error)]
pub enum BlendError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] splice_core::Error),

    /// Alpha-aware blending needs an alpha plane
    #[error("blend mode {0} requires an alpha plane")]
    MissingAlpha(&'static str),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for blending operations
pub type BlendResult<T> = Result<T, BlendError>;
