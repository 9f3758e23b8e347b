//! Error types for I/O operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or corrupted file (bad header, zero size).
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Decoding error (non-numeric, negative or missing samples).
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Grid construction failed (allocation, shape).
    #[error(transparent)]
    Core(#[from] sharpen_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
