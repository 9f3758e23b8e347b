//! Image diff command.
//!
//! Compares two grey maps sample by sample, e.g. the outputs of two
//! topologies, which should match exactly.

use crate::DiffArgs;
use anyhow::{bail, Result};
use sharpen_core::Grid;

pub fn run(args: DiffArgs) -> Result<()> {
    let img_a = super::load_image(&args.a)?;
    let img_b = super::load_image(&args.b)?;

    if !img_a.same_shape(&img_b) {
        bail!(
            "Image dimensions don't match: {}x{} vs {}x{}",
            img_a.rows(),
            img_a.cols(),
            img_b.rows(),
            img_b.cols()
        );
    }

    let stats = compute_diff(&img_a, &img_b);

    println!("Comparing {} vs {}", args.a.display(), args.b.display());
    println!("  Max difference:  {}", stats.max);
    println!("  Mean difference: {:.6}", stats.mean);
    println!(
        "  Pixels differ:   {} ({:.2}%)",
        stats.differing,
        100.0 * stats.differing as f64 / img_a.len() as f64
    );

    if f64::from(stats.max) > args.threshold {
        bail!("FAIL: Max difference {} exceeds threshold {}", stats.max, args.threshold);
    }

    println!("PASS");
    Ok(())
}

struct DiffStats {
    max: i32,
    mean: f64,
    differing: usize,
}

fn compute_diff(a: &Grid<i32>, b: &Grid<i32>) -> DiffStats {
    let mut max = 0;
    let mut sum = 0.0f64;
    let mut differing = 0;
    for (&x, &y) in a.as_slice().iter().zip(b.as_slice()) {
        let d = (x - y).abs();
        max = max.max(d);
        sum += f64::from(d);
        if d != 0 {
            differing += 1;
        }
    }
    DiffStats {
        max,
        mean: sum / a.len() as f64,
        differing,
    }
}
