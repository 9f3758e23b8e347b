//! Image info command.
//!
//! Shows the declared size, the sample range, and the size a sharpened
//! copy would have.

use crate::InfoArgs;
use anyhow::{Context, Result};
use std::fs;

pub fn run(args: InfoArgs) -> Result<()> {
    sharpen_ops::kernel::stencil_width(args.radius)
        .with_context(|| format!("Invalid radius {}", args.radius))?;

    for path in &args.input {
        let file_size = fs::metadata(path)
            .with_context(|| format!("Failed to stat: {}", path.display()))?
            .len();
        let (nx, ny) = sharpen_io::probe_size(path)
            .with_context(|| format!("Failed to read header: {}", path.display()))?;
        let image = super::load_image(path)?;

        let (min, max) = image
            .as_slice()
            .iter()
            .fold((i32::MAX, i32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        println!("{}", path.display());
        println!("  Resolution: {}x{}", nx, ny);
        println!("  Pixels:     {}", nx * ny);
        println!("  Range:      {}..{}", min, max);
        println!("  File size:  {}", super::format_size(file_size));

        let d = args.radius;
        match sharpened_dims(nx, ny, d) {
            Some((cx, cy)) => println!("  Sharpened:  {}x{} (radius {})", cx, cy, d),
            None => println!("  Sharpened:  too small for radius {}", d),
        }

        if args.input.len() > 1 {
            println!();
        }
    }

    Ok(())
}

/// Output size after cropping a `d`-wide border, if anything is left.
fn sharpened_dims(nx: usize, ny: usize, d: usize) -> Option<(usize, usize)> {
    let span = d.checked_mul(2)?;
    Some((nx.checked_sub(span)?, ny.checked_sub(span)?)).filter(|&(cx, cy)| cx > 0 && cy > 0)
}
