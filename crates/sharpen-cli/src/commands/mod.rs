//! CLI command implementations

pub mod diff;
pub mod info;
pub mod run;
pub mod worker;

use anyhow::{Context, Result};
use sharpen_core::Grid;
use std::path::Path;

/// Load image from path
pub fn load_image(path: &Path) -> Result<Grid<i32>> {
    sharpen_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &Grid<f64>) -> Result<()> {
    sharpen_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Resolves `0` to the number of available cores.
pub fn resolve_threads(threads: usize) -> usize {
    if threads > 0 {
        return threads;
    }
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
