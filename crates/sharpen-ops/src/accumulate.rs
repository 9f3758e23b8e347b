//! Convolution accumulator.
//!
//! For every owned pixel `(i, j)` of the `nx × ny` source the accumulator
//! evaluates
//!
//! ```text
//! conv[i][j] = Σ_{k=-d..d} Σ_{l=-d..d} filter(d, k, l) · padded[i+d+k][j+d+l]
//! ```
//!
//! starting from `0.0` with `k` outer and `l` inner. The order is fixed so
//! a pixel's value does not depend on which worker computes it.

use crate::kernel::Stencil;
use crate::partition::Partition;
use crate::{OpsError, OpsResult};
use sharpen_core::Grid;
use tracing::trace;

/// Source dimensions `(nx, ny)` implied by a padded grid.
pub fn interior_dims(padded: &Grid<f64>, stencil: &Stencil) -> OpsResult<(usize, usize)> {
    let span = 2 * stencil.radius();
    let (px, py) = padded.dims();
    if px <= 2 * span || py <= 2 * span {
        return Err(OpsError::InvalidDimensions(format!(
            "padded grid {px}x{py} too small for filter radius {}",
            stencil.radius()
        )));
    }
    Ok((px - span, py - span))
}

/// Convolution value at source pixel `(i, j)`.
#[inline]
pub fn convolve_at(padded: &Grid<f64>, stencil: &Stencil, i: usize, j: usize) -> f64 {
    let w = stencil.width();
    let mut acc = 0.0;
    for k in 0..w {
        let taps = stencil.row(k);
        let src = &padded.row(i + k)[j..j + w];
        for (c, v) in taps.iter().zip(src) {
            acc += c * v;
        }
    }
    acc
}

/// Writes the convolution of every pixel owned by `partition` into `partial`.
///
/// Unowned cells are left untouched (zero in a fresh buffer).
pub fn accumulate(
    padded: &Grid<f64>,
    stencil: &Stencil,
    partition: Partition,
    partial: &mut Grid<f64>,
) -> OpsResult<()> {
    let (nx, ny) = interior_dims(padded, stencil)?;
    if partial.dims() != (nx, ny) {
        return Err(OpsError::SizeMismatch(format!(
            "partial buffer is {}x{}, padded grid implies {nx}x{ny}",
            partial.rows(),
            partial.cols()
        )));
    }

    let out = partial.as_mut_slice();
    for p in partition.owned(nx * ny) {
        out[p] = convolve_at(padded, stencil, p / ny, p % ny);
    }
    trace!(%partition, pixels = partition.owned_count(nx * ny), "accumulated");
    Ok(())
}

/// Convolution values for the owned pixels only, in ownership order.
///
/// The compact form a thread hands back before it is merged with
/// [`crate::combine::scatter_add`].
pub fn accumulate_owned(
    padded: &Grid<f64>,
    stencil: &Stencil,
    partition: Partition,
) -> OpsResult<Vec<f64>> {
    let (nx, ny) = interior_dims(padded, stencil)?;
    let total = nx * ny;
    let mut values = Vec::new();
    values
        .try_reserve_exact(partition.owned_count(total))
        .map_err(|e| sharpen_core::Error::allocation_failed(partition.owned_count(total) * 8, e.to_string()))?;
    values.extend(
        partition
            .owned(total)
            .map(|p| convolve_at(padded, stencil, p / ny, p % ny)),
    );
    Ok(values)
}
