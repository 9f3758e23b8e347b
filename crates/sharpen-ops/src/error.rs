//! Error types for stencil operations.

use thiserror::Error;

/// Error type for stencil operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Image too small for the stencil, or zero-sized.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Buffers have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value (radius, worker counts).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Grid allocation or shape failure.
    #[error(transparent)]
    Core(#[from] sharpen_core::Error),
}

/// Result type for stencil operations.
pub type OpsResult<T> = Result<T, OpsError>;
