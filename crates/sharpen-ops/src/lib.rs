//! # sharpen-ops
//!
//! Stencil arithmetic for unsharp-mask sharpening.
//!
//! # Modules
//!
//! - [`kernel`] - Radial filter function and precomputed [`Stencil`](kernel::Stencil)
//! - [`buffer`] - Zero padding and interior crop
//! - [`partition`] - Cyclic pixel ownership over a flat worker id space
//! - [`accumulate`] - Per-pixel convolution for owned pixels
//! - [`combine`] - Summing partial buffers
//! - [`postprocess`] - Source minus scaled convolution, then crop
//! - [`serial`] - Single-worker reference pipeline
//! - [`parallel`] - Thread-level accumulation on a Rayon pool (feature `parallel`)
//!
//! # Pipeline
//!
//! ```text
//! source ─ pad ─ accumulate(partition) ─ combine ─ sharpen ─ crop ─ output
//! ```
//!
//! # Example
//!
//! ```rust
//! use sharpen_core::Grid;
//! use sharpen_ops::serial::sharpen_image;
//!
//! let src = Grid::filled(64, 64, 50).unwrap();
//! let out = sharpen_image(&src, 8).unwrap();
//! assert_eq!(out.dims(), (48, 48));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod accumulate;
pub mod buffer;
pub mod combine;
pub mod kernel;
pub mod partition;
pub mod postprocess;
pub mod serial;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use error::{OpsError, OpsResult};
pub use kernel::{Stencil, RADIUS};
pub use partition::Partition;
