//! Error types for sharpen-core operations.
//!
//! The [`Error`] enum covers the failure modes of grid construction and
//! access that every other crate in the workspace builds on:
//! - Buffer allocation (huge or overflowing sizes)
//! - Dimension validation and mismatches
//!
//! # Usage
//!
//! ```rust
//! use sharpen_core::{Error, Result};
//!
//! fn check(declared: (usize, usize), decoded: (usize, usize)) -> Result<()> {
//!     if declared != decoded {
//!         return Err(Error::dimension_mismatch(declared, decoded));
//!     }
//!     Ok(())
//! }
//! assert!(check((4, 4), (4, 3)).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or accessing grids.
#[derive(Debug, Error)]
pub enum Error {
    /// Memory allocation failed.
    ///
    /// Returned instead of aborting when a buffer cannot be reserved.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// Two shapes that must agree do not (declared vs decoded size).
    #[error("dimension mismatch: {a_rows}x{a_cols} vs {b_rows}x{b_cols}")]
    DimensionMismatch {
        /// First grid rows
        a_rows: usize,
        /// First grid columns
        a_cols: usize,
        /// Second grid rows
        b_rows: usize,
        /// Second grid columns
        b_cols: usize,
    },

    /// Invalid grid dimensions.
    ///
    /// Returned when a dimension is zero, a size calculation overflows, or
    /// a buffer length disagrees with the requested shape.
    #[error("invalid dimensions: {rows}x{cols} ({reason})")]
    InvalidDimensions {
        /// Requested rows
        rows: usize,
        /// Requested columns
        cols: usize,
        /// Reason why dimensions are invalid
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (usize, usize), b: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            a_rows: a.0,
            a_cols: a.1,
            b_rows: b.0,
            b_cols: b.1,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(rows: usize, cols: usize, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            rows,
            cols,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_failed() {
        let err = Error::allocation_failed(1 << 40, "out of memory");
        assert!(err.to_string().contains("out of memory"));
        assert!(matches!(err, Error::AllocationFailed { .. }));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::dimension_mismatch((64, 64), (48, 48));
        let msg = err.to_string();
        assert!(msg.contains("64x64"));
        assert!(msg.contains("48x48"));
    }
}
