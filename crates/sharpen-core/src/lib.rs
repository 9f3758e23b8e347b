//! # sharpen-core
//!
//! Core types shared by every crate of the sharpen workspace.
//!
//! - [`Grid`] - Contiguous row-major 2D buffer with O(1) `(row, col)` indexing
//! - [`Error`], [`Result`] - Shared error type for allocation and shape failures
//!
//! ## Crate Structure
//!
//! ```text
//! sharpen-core (this crate)
//!    ^
//!    |
//!    +-- sharpen-io (PGM codec)
//!    +-- sharpen-ops (kernel, partition, convolution, post-processing)
//!    +-- sharpen-compute (workers, communicators, engine)
//!    +-- sharpen-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod grid;

pub use error::*;
pub use grid::Grid;
