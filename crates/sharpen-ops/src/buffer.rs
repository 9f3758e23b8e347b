//! Padding and cropping.
//!
//! ```text
//!  padded (nx+2d) x (ny+2d)          cropped (nx-2d) x (ny-2d)
//!  +-----------------------+         taken from [d, nx-d) x [d, ny-d)
//!  | 0 0 0 0 0 0 0 0 0 0 0 |         of the sharpened nx x ny image
//!  | 0 +---------------+ 0 |
//!  | 0 |   source      | 0 |
//!  | 0 |  at [d, n+d)  | 0 |
//!  | 0 +---------------+ 0 |
//!  | 0 0 0 0 0 0 0 0 0 0 0 |
//!  +-----------------------+
//! ```

use crate::{OpsError, OpsResult};
use sharpen_core::Grid;
use tracing::trace;

/// Checks that an `nx × ny` image can be sharpened with radius `d`.
///
/// # Errors
///
/// [`OpsError::InvalidDimensions`] unless `d >= 1`, `nx > 2d` and `ny > 2d`.
pub fn check_dims(nx: usize, ny: usize, d: usize) -> OpsResult<()> {
    if d == 0 {
        return Err(OpsError::InvalidParameter("filter radius must be >= 1".into()));
    }
    let span = d.saturating_mul(2);
    if nx <= span || ny <= span {
        return Err(OpsError::InvalidDimensions(format!(
            "{nx}x{ny} image is too small for filter radius {d} (each side must exceed {span})"
        )));
    }
    Ok(())
}

/// Embeds `source` in a zero border of width `d`.
pub fn pad(source: &Grid<i32>, d: usize) -> OpsResult<Grid<f64>> {
    let (nx, ny) = source.dims();
    check_dims(nx, ny, d)?;

    let mut padded: Grid<f64> = Grid::new(nx + 2 * d, ny + 2 * d)?;
    for (i, src) in source.iter_rows().enumerate() {
        let dst = &mut padded.row_mut(i + d)[d..d + ny];
        for (out, &v) in dst.iter_mut().zip(src) {
            *out = f64::from(v);
        }
    }
    trace!(nx, ny, d, "padded source");
    Ok(padded)
}

/// Copies the interior `[d, nx-d) × [d, ny-d)` into a re-based grid.
pub fn crop(sharp: &Grid<f64>, d: usize) -> OpsResult<Grid<f64>> {
    let (nx, ny) = sharp.dims();
    check_dims(nx, ny, d)?;

    let (cx, cy) = (nx - 2 * d, ny - 2 * d);
    let mut data = Vec::new();
    data.try_reserve_exact(cx * cy)
        .map_err(|e| sharpen_core::Error::allocation_failed(cx * cy * 8, e.to_string()))?;
    for i in d..nx - d {
        data.extend_from_slice(&sharp.row(i)[d..ny - d]);
    }
    Ok(Grid::from_vec(cx, cy, data)?)
}
