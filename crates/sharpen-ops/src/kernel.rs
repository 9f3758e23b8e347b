//! Radial unsharp-mask kernel.
//!
//! The kernel is a "Mexican hat": a Gaussian multiplied by `(1 - δ)`,
//! scaled by a negative amplitude. Its width grows linearly with the
//! radius so the shape is the same at every size, with `σ = 1.4` at the
//! reference radius of 4.
//!
//! ```text
//! σ² = σ₄² · d² / 4²
//! δ  = (i² + j²) / (2σ²)
//! f  = A · (1 − δ) · e^(−δ)        A = −40
//! ```
//!
//! # Example
//!
//! ```rust
//! use sharpen_ops::kernel::{filter, Stencil, RADIUS};
//!
//! let stencil = Stencil::new(RADIUS).unwrap();
//! assert_eq!(stencil.width(), 17);
//! assert_eq!(stencil.get(2, -3), filter(RADIUS, 2, -3));
//! ```

use crate::{OpsError, OpsResult};
use tracing::trace;

/// Default filter radius.
pub const RADIUS: usize = 8;

/// Radius at which [`REFERENCE_SIGMA`] applies.
pub const REFERENCE_RADIUS: f64 = 4.0;

/// Gaussian width at [`REFERENCE_RADIUS`].
pub const REFERENCE_SIGMA: f64 = 1.4;

/// Peak amplitude of the kernel (negative: centre tap subtracts).
pub const AMPLITUDE: f64 = -40.0;

/// Kernel coefficient at offset `(i, j)` for radius `d`.
///
/// Pure; meaningful for `i, j ∈ [-d, d]`.
#[inline]
pub fn filter(d: usize, i: isize, j: isize) -> f64 {
    let d = d as f64;
    let sigma2 = REFERENCE_SIGMA * REFERENCE_SIGMA * ((d * d) / (REFERENCE_RADIUS * REFERENCE_RADIUS));
    let r2 = (i * i + j * j) as f64;
    let delta = r2 / (2.0 * sigma2);
    AMPLITUDE * (1.0 - delta) * (-delta).exp()
}

/// Stencil width `2d + 1` for radius `d`.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] if `d == 0` or the `(2d+1)²` table size
/// does not fit in `usize`.
pub fn stencil_width(d: usize) -> OpsResult<usize> {
    if d == 0 {
        return Err(OpsError::InvalidParameter("filter radius must be >= 1".into()));
    }
    d.checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .filter(|w| w.checked_mul(*w).is_some())
        .ok_or_else(|| OpsError::InvalidParameter(format!("filter radius {d} too large")))
}

/// Precomputed `(2d+1) × (2d+1)` coefficient table.
///
/// Row-major with offset `k` outer and `l` inner, matching the tap order
/// of the accumulator. Entries are exactly `filter(d, k, l)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    radius: usize,
    width: usize,
    coeffs: Vec<f64>,
}

impl Stencil {
    /// Tabulates the kernel for radius `d`.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] if `d == 0` or the table size overflows.
    pub fn new(d: usize) -> OpsResult<Self> {
        let width = stencil_width(d)?;

        let r = d as isize;
        let mut coeffs = Vec::with_capacity(width * width);
        for k in -r..=r {
            for l in -r..=r {
                coeffs.push(filter(d, k, l));
            }
        }
        trace!(radius = d, width, "tabulated stencil");

        Ok(Self { radius: d, width, coeffs })
    }

    /// Filter radius `d`.
    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Table width `2d + 1`.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Coefficient at offset `(k, l)`, both in `[-d, d]`.
    #[inline]
    pub fn get(&self, k: isize, l: isize) -> f64 {
        let r = self.radius as isize;
        self.coeffs[((k + r) as usize) * self.width + (l + r) as usize]
    }

    /// Coefficients for offset row `k + d` (so `row(0)` is `k = -d`).
    #[inline]
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.width;
        &self.coeffs[start..start + self.width]
    }

    /// All coefficients, row-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.coeffs
    }

    /// Sum of all taps (the flat-image response).
    pub fn sum(&self) -> f64 {
        self.coeffs.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_filter_centre() {
        assert_eq!(filter(RADIUS, 0, 0), AMPLITUDE);
        assert_eq!(filter(3, 0, 0), AMPLITUDE);
    }

    #[test]
    fn test_filter_zero_crossing() {
        // δ = 1 at r² = 2σ²; for d = 4, σ² = 1.96, so r² = 3.92.
        assert!(filter(4, 1, 1) < 0.0);
        assert!(filter(4, 2, 0) > 0.0);
    }

    #[test]
    fn test_filter_symmetry() {
        for d in [1usize, 4, 8] {
            let r = d as isize;
            for i in -r..=r {
                for j in -r..=r {
                    let v = filter(d, i, j);
                    assert_eq!(v, filter(d, -i, j));
                    assert_eq!(v, filter(d, i, -j));
                    assert_eq!(v, filter(d, j, i));
                }
            }
        }
    }

    #[test]
    fn test_stencil_matches_filter() {
        let s = Stencil::new(RADIUS).unwrap();
        assert_eq!(s.width(), 2 * RADIUS + 1);
        assert_eq!(s.as_slice().len(), 17 * 17);
        let r = RADIUS as isize;
        for k in -r..=r {
            for l in -r..=r {
                assert_eq!(s.get(k, l), filter(RADIUS, k, l));
            }
        }
        assert_eq!(s.row(0)[0], filter(RADIUS, -r, -r));
        assert_eq!(s.row(RADIUS)[RADIUS], AMPLITUDE);
    }

    #[test]
    fn test_stencil_sum() {
        let s = Stencil::new(RADIUS).unwrap();
        assert_relative_eq!(s.sum(), -45.932, epsilon = 1e-2);
    }

    #[test]
    fn test_stencil_rejects_zero_radius() {
        assert!(matches!(Stencil::new(0), Err(OpsError::InvalidParameter(_))));
    }

    #[test]
    fn test_stencil_width_overflow() {
        assert_eq!(stencil_width(8).unwrap(), 17);
        for d in [usize::MAX / 2 + 1, usize::MAX / 2, 1 << (usize::BITS / 2)] {
            assert!(matches!(stencil_width(d), Err(OpsError::InvalidParameter(_))), "d = {d}");
        }
    }

    // Sigma is 1.4² times the squared radius ratio, with the ratio taken
    // first; any other grouping drifts by an ulp for some radii.
    #[test]
    fn test_sigma_grouping() {
        for d in [3usize, 9, 11, 16] {
            let ratio = (d * d) as f64 / 16.0;
            let sigma2 = 1.4 * 1.4 * ratio;
            let delta = 5.0 / (2.0 * sigma2);
            assert_eq!(filter(d, 1, 2), -40.0 * (1.0 - delta) * (-delta).exp(), "d = {d}");
        }
    }
}
