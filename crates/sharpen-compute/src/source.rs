//! Image sources read by the root rank.
//!
//! ```ignore
//! use sharpen_compute::source::{ImageSource, PgmSource};
//!
//! let mut src = PgmSource::new("fuzzy.pgm");
//! let (nx, ny) = src.probe()?;
//! let image = src.load()?;
//! ```

use crate::ComputeResult;
use sharpen_core::Grid;
use tracing::error;

/// Something the root can read an image from.
pub trait ImageSource: Send {
    /// Image size `(nx, ny)` without decoding the samples.
    fn probe(&mut self) -> ComputeResult<(usize, usize)>;

    /// Decodes the whole image.
    fn load(&mut self) -> ComputeResult<Grid<i32>>;

    /// Human-readable name for logs.
    fn describe(&self) -> String;

    /// Probes, loads, and checks that both agree.
    ///
    /// A disagreement is reported as [`sharpen_core::Error::DimensionMismatch`]
    /// with the declared size first.
    fn load_checked(&mut self) -> ComputeResult<Grid<i32>> {
        let declared = self.probe()?;
        let image = self.load()?;
        if image.dims() != declared {
            error!(input = %self.describe(), ?declared, decoded = ?image.dims(), "Image size disagrees with its header");
            return Err(sharpen_core::Error::dimension_mismatch(declared, image.dims()).into());
        }
        Ok(image)
    }
}

/// In-memory source (tests, embedding).
#[derive(Debug, Clone)]
pub struct MemorySource {
    image: Grid<i32>,
}

impl MemorySource {
    pub fn new(image: Grid<i32>) -> Self {
        Self { image }
    }
}

impl ImageSource for MemorySource {
    fn probe(&mut self) -> ComputeResult<(usize, usize)> {
        Ok(self.image.dims())
    }

    fn load(&mut self) -> ComputeResult<Grid<i32>> {
        Ok(self.image.clone())
    }

    fn describe(&self) -> String {
        format!("<memory {}x{}>", self.image.rows(), self.image.cols())
    }
}

// =============================================================================
// PGM files (requires io feature)
// =============================================================================

#[cfg(feature = "io")]
mod pgm_source {
    use super::*;
    use std::path::{Path, PathBuf};

    /// Plain-text PGM file.
    #[derive(Debug, Clone)]
    pub struct PgmSource {
        path: PathBuf,
    }

    impl PgmSource {
        pub fn new<P: AsRef<Path>>(path: P) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl ImageSource for PgmSource {
        fn probe(&mut self) -> ComputeResult<(usize, usize)> {
            Ok(sharpen_io::probe_size(&self.path)?)
        }

        fn load(&mut self) -> ComputeResult<Grid<i32>> {
            Ok(sharpen_io::read(&self.path)?)
        }

        fn describe(&self) -> String {
            self.path.display().to_string()
        }
    }
}

#[cfg(feature = "io")]
pub use pgm_source::PgmSource;
