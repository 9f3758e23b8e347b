//! Combining the source with the merged convolution.

use crate::buffer::crop;
use crate::{OpsError, OpsResult};
use sharpen_core::Grid;
use tracing::debug;

/// Strength of the unsharp mask.
pub const SCALE: f64 = 2.0;

/// Normalisation divisor `(2d - 1)²` (225 for `d = 8`).
///
/// This is not the kernel sum; it is a fixed empirical constant.
#[inline]
pub fn norm(d: usize) -> f64 {
    let side = 2.0 * d as f64 - 1.0;
    side * side
}

/// `sharp[i][j] = padded[i+d][j+d] - (SCALE / norm(d)) · conv[i][j]`.
pub fn sharpen(padded: &Grid<f64>, conv: &Grid<f64>, d: usize) -> OpsResult<Grid<f64>> {
    let (nx, ny) = conv.dims();
    let border = d.saturating_mul(2);
    if padded.dims() != (nx.saturating_add(border), ny.saturating_add(border)) {
        return Err(OpsError::SizeMismatch(format!(
            "padded grid {}x{} does not match {nx}x{ny} convolution with radius {d}",
            padded.rows(),
            padded.cols()
        )));
    }

    let factor = SCALE / norm(d);
    let mut sharp: Grid<f64> = Grid::new(nx, ny)?;
    for i in 0..nx {
        let src = &padded.row(i + d)[d..d + ny];
        for ((out, &s), &c) in sharp.row_mut(i).iter_mut().zip(src).zip(conv.row(i)) {
            *out = s - factor * c;
        }
    }
    Ok(sharp)
}

/// Sharpens then crops to the `(nx-2d) × (ny-2d)` interior.
pub fn finish(padded: &Grid<f64>, conv: &Grid<f64>, d: usize) -> OpsResult<Grid<f64>> {
    let sharp = sharpen(padded, conv, d)?;
    let out = crop(&sharp, d)?;
    debug!(nx = out.rows(), ny = out.cols(), "sharpened and cropped");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::pad;
    use approx::assert_relative_eq;

    #[test]
    fn test_norm() {
        assert_eq!(norm(8), 225.0);
        assert_eq!(norm(1), 1.0);
    }

    #[test]
    fn test_sharpen_formula() {
        let d = 1;
        let src = Grid::from_vec(3, 3, (1..=9).collect()).unwrap();
        let padded = pad(&src, d).unwrap();
        let conv = Grid::filled(3, 3, 0.25).unwrap();
        let sharp = sharpen(&padded, &conv, d).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(sharp[(i, j)], src[(i, j)] as f64 - 2.0 * 0.25);
            }
        }
    }

    #[test]
    fn test_finish_crops() {
        let d = 2;
        let src = Grid::filled(7, 9, 10).unwrap();
        let padded = pad(&src, d).unwrap();
        let conv: Grid<f64> = Grid::new(7, 9).unwrap();
        let out = finish(&padded, &conv, d).unwrap();
        assert_eq!(out.dims(), (3, 5));
        assert!(out.as_slice().iter().all(|&v| v == 10.0));
    }

    #[test]
    fn test_sharpen_mismatch() {
        let padded: Grid<f64> = Grid::new(10, 10).unwrap();
        let conv: Grid<f64> = Grid::new(5, 5).unwrap();
        assert!(sharpen(&padded, &conv, 1).is_err());
    }
}
