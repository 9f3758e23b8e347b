//! # sharpen-io
//!
//! Grey map I/O for the sharpen pipeline.
//!
//! Only the plain-text PGM variant (`P2`) is supported. Images are read into
//! [`sharpen_core::Grid<i32>`] and written from [`sharpen_core::Grid<f64>`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sharpen_io::{probe_size, read, write};
//!
//! let (nx, ny) = probe_size("fuzzy.pgm")?;
//! let image = read("fuzzy.pgm")?;
//! assert_eq!(image.dims(), (nx, ny));
//!
//! let out: sharpen_core::Grid<f64> = sharpen_core::Grid::new(nx, ny)?;
//! write("sharpened.pgm", &out)?;
//! ```
//!
//! # Orientation
//!
//! Grids are indexed `[x][y]` with `y = 0` at the bottom of the picture.
//! See [`pgm`] for the exact sample order.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod pgm;

pub use error::{IoError, IoResult};
pub use pgm::{probe_size, read, write};
