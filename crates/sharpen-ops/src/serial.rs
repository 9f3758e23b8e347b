//! Single-worker reference pipeline.
//!
//! Runs every stage on the calling thread. Parallel runs must reproduce
//! its output bit for bit.

use crate::accumulate::accumulate;
use crate::buffer::pad;
use crate::kernel::Stencil;
use crate::partition::Partition;
use crate::postprocess::finish;
use crate::OpsResult;
use sharpen_core::Grid;

/// Sharpens `source` with radius `d`, returning the cropped
/// `(nx-2d) × (ny-2d)` result.
pub fn sharpen_image(source: &Grid<i32>, d: usize) -> OpsResult<Grid<f64>> {
    let stencil = Stencil::new(d)?;
    let padded = pad(source, d)?;
    let mut conv: Grid<f64> = Grid::new(source.rows(), source.cols())?;
    accumulate(&padded, &stencil, Partition::whole(), &mut conv)?;
    finish(&padded, &conv, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::RADIUS;
    use crate::postprocess::{norm, SCALE};
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_image_constant_response() {
        let c = 100;
        let src = Grid::filled(40, 36, c).unwrap();
        let out = sharpen_image(&src, RADIUS).unwrap();
        assert_eq!(out.dims(), (24, 20));

        let sum = Stencil::new(RADIUS).unwrap().sum();
        let expected = c as f64 - SCALE / norm(RADIUS) * c as f64 * sum;
        for &v in out.as_slice() {
            assert_relative_eq!(v, expected, max_relative = 1e-12);
        }
        assert_relative_eq!(expected, 140.83, epsilon = 0.01);
    }

    #[test]
    fn test_too_small_image() {
        let src = Grid::filled(16, 64, 1).unwrap();
        assert!(sharpen_image(&src, RADIUS).is_err());
    }
}
